//! Error types for the input subsystem

use thiserror::Error;

use super::device::DeviceId;
use super::host::EffectId;

/// Errors returned by explicit bind requests
#[derive(Debug, Error)]
pub enum BindError {
    /// The device id is not (or no longer) in the registry
    #[error("Unknown input device: {0}")]
    UnknownDevice(DeviceId),
}

/// Force-feedback failures reported by the host
#[derive(Debug, Error)]
pub enum HapticError {
    #[error("Haptic effect rejected: {0}")]
    EffectRejected(String),

    #[error("Unknown haptic effect: {0:?}")]
    UnknownEffect(EffectId),

    #[error("Controller {0} is gone")]
    Disconnected(usize),
}

/// Failures while bringing up the host backend
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Failed to initialize gamepad backend: {0}")]
    InitializationError(String),
}
