//! Input subsystem: device registry, port binding and per-tick sampling
//!
//! 1. [`hotplug`] - host attach/detach notifications and the default-bind policy
//! 2. [`binding`] - the four-port table and the bind/unbind transition
//! 3. [`sampler`] - rate-limited button/axis refresh and rumble output
//! 4. [`manager`] - lifecycle and public entry point
//!
//! ```text
//! InputHost ──► hotplug ──► DeviceRegistry ──► auto bind ──► PortTable ──► DeviceTree
//!                                   ▲                                        (emulated gamepads)
//!                                   └──── sampler (input pass, rumble pass)
//! ```
//!
//! Everything runs on the UI thread; see [`context::InputContext`].

pub mod binding;
pub mod context;
pub mod device;
pub mod error;
pub mod gilrs_host;
pub mod host;
pub mod hotplug;
pub mod manager;
pub mod navigation;
pub mod registry;
pub mod sampler;

#[cfg(test)]
mod tests;

pub use binding::{Port, PortTable};
pub use context::InputContext;
pub use device::{Device, DeviceClass, DeviceId, PadState, KEYBOARD_IDENTITY};
pub use error::{BindError, HapticError, HostError};
pub use gilrs_host::{GilrsHost, KeyboardFeed};
pub use host::{
    ControllerHandle, EffectId, HapticHandle, HostEvent, InputHost, InstanceId, NativeAxis,
    NativeButton, RumbleEffect,
};
pub use manager::{InputManager, ManagerState, Running, Uninitialized};
pub use navigation::HudNavigation;
pub use registry::DeviceRegistry;
