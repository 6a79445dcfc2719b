//! Host side of the input subsystem.
//!
//! [`InputHost`] is everything the binding layer needs from the platform:
//! hotplug notifications, native controller/haptic handles, the live
//! key/button/axis state and force-feedback effects. The production
//! implementation is [`super::gilrs_host::GilrsHost`].

use egui::Key;
use std::fmt;

use super::error::HapticError;

/// Native joystick instance, stable for as long as the controller stays attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub usize);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Notifications pumped from the host event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// A controller appeared at the given device index.
    ControllerAdded(usize),
    /// The controller with this instance went away.
    ControllerRemoved(InstanceId),
    /// The host changed the button layout of a controller.
    ControllerRemapped(InstanceId),
}

/// An opened game controller.
///
/// Handles are move-only. The owning device hands them back through
/// [`InputHost::close_controller`], so each one is released exactly once.
#[derive(Debug, PartialEq, Eq)]
pub struct ControllerHandle {
    instance: InstanceId,
    name: String,
    guid: String,
}

impl ControllerHandle {
    pub fn new(instance: InstanceId, name: impl Into<String>, guid: impl Into<String>) -> Self {
        Self {
            instance,
            name: name.into(),
            guid: guid.into(),
        }
    }

    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 32 lowercase hex characters.
    pub fn guid(&self) -> &str {
        &self.guid
    }
}

/// Force-feedback access to an opened controller. Move-only, like [`ControllerHandle`].
#[derive(Debug, PartialEq, Eq)]
pub struct HapticHandle {
    instance: InstanceId,
}

impl HapticHandle {
    pub fn new(instance: InstanceId) -> Self {
        Self { instance }
    }

    pub fn instance(&self) -> InstanceId {
        self.instance
    }
}

/// Host-assigned id of an uploaded force-feedback effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectId(pub u32);

/// Left/right rumble effect. Runs until updated or until its haptic handle is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RumbleEffect {
    /// Large (low frequency) motor.
    pub left: u16,
    /// Small (high frequency) motor.
    pub right: u16,
}

/// Buttons in the host's game-controller layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeButton {
    A,
    B,
    X,
    Y,
    Back,
    Guide,
    Start,
    LeftStick,
    RightStick,
    LeftShoulder,
    RightShoulder,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
}

/// Axes in the host's game-controller layout.
///
/// Stick axes are reported positive-right and positive-down, triggers as
/// `0..=i16::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeAxis {
    LeftX,
    LeftY,
    RightX,
    RightY,
    TriggerLeft,
    TriggerRight,
}

pub trait InputHost {
    /// Next pending hotplug notification, if any. Never blocks.
    fn poll_event(&mut self) -> Option<HostEvent>;

    /// Opens the controller at `index` as a game controller.
    fn open_controller(&mut self, index: usize) -> Option<ControllerHandle>;

    /// `None` when the controller has no force feedback.
    fn open_haptic(&mut self, controller: &ControllerHandle) -> Option<HapticHandle>;

    fn close_haptic(&mut self, haptic: HapticHandle);

    fn close_controller(&mut self, controller: ControllerHandle);

    fn key_down(&self, key: Key) -> bool;

    fn button_down(&self, controller: &ControllerHandle, button: NativeButton) -> bool;

    fn axis(&self, controller: &ControllerHandle, axis: NativeAxis) -> i16;

    fn new_effect(
        &mut self,
        haptic: &HapticHandle,
        effect: &RumbleEffect,
    ) -> Result<EffectId, HapticError>;

    fn run_effect(&mut self, haptic: &HapticHandle, effect: EffectId) -> Result<(), HapticError>;

    /// Changes a running effect in place without restarting it.
    fn update_effect(
        &mut self,
        haptic: &HapticHandle,
        effect: EffectId,
        params: &RumbleEffect,
    ) -> Result<(), HapticError>;
}
