//! Boundary to the emulation core's device tree.
//!
//! The input layer only ever creates one kind of device, an Xbox-style USB
//! gamepad plugged into one of the four hub ports, and removes it again.

pub mod usb_bus;

use std::fmt;

use thiserror::Error;

pub use usb_bus::VirtualUsbBus;

/// Driver name of the emulated USB gamepad.
pub const GAMEPAD_DRIVER: &str = "usb-xbox-gamepad";

/// Parameters for creating one emulated gamepad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotParams {
    /// Unique device id, `gamepad_N`.
    pub id: String,
    /// Logical port index (0..4) the gamepad reports to the guest.
    pub index: usize,
    /// Physical hub port (1..=4).
    pub port: u8,
}

/// Handle to a plugged emulated device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EmulatedDevice(pub u64);

impl fmt::Display for EmulatedDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "emulated device {}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum DeviceTreeError {
    #[error("Hub port {0} is already occupied")]
    PortOccupied(u8),

    #[error("Hub port {0} does not exist")]
    NoSuchPort(u8),

    #[error("{0} is not plugged")]
    NotPlugged(EmulatedDevice),

    #[error("Unsupported driver: {0}")]
    UnsupportedDriver(String),
}

pub trait DeviceTree {
    fn create_and_plug(
        &mut self,
        kind: &str,
        params: &SlotParams,
    ) -> Result<EmulatedDevice, DeviceTreeError>;

    fn unplug(&mut self, device: EmulatedDevice) -> Result<(), DeviceTreeError>;
}
