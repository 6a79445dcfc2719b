//! Explicit context object for the input subsystem.
//!
//! Everything the hotplug handler, the binder and the sampler touch lives
//! here, owned by the application root through [`super::InputManager`].
//! All entry points take `&mut self`, so a bind or a hotplug transition always
//! completes before the next sampler pass can look at the table.

use tracing::{debug, info};

use crate::emulation::DeviceTree;
use crate::notifications::NotificationSink;
use crate::persistence::SettingsStore;

use super::binding::{Port, PortTable};
use super::device::{Device, DeviceId, PadState};
use super::host::InputHost;
use super::registry::DeviceRegistry;

pub struct InputContext {
    pub(crate) host: Box<dyn InputHost>,
    pub(crate) settings: Box<dyn SettingsStore>,
    pub(crate) device_tree: Box<dyn DeviceTree>,
    pub(crate) notifications: Box<dyn NotificationSink>,

    pub(crate) registry: DeviceRegistry,
    pub(crate) ports: PortTable,

    // Guest input is muted while the HUD owns controller focus
    pub(crate) focus_capture: bool,

    // Suffix for emulated gamepad ids, never reset
    pub(crate) gamepad_serial: u32,
}

impl InputContext {
    pub fn new(
        host: Box<dyn InputHost>,
        settings: Box<dyn SettingsStore>,
        device_tree: Box<dyn DeviceTree>,
        notifications: Box<dyn NotificationSink>,
    ) -> Self {
        Self {
            host,
            settings,
            device_tree,
            notifications,
            registry: DeviceRegistry::new(),
            ports: PortTable::default(),
            focus_capture: false,
            gamepad_serial: 0,
        }
    }

    /// Unplugs every port without touching saved bindings and releases all devices.
    pub(crate) fn reset(&mut self) {
        for port in Port::ALL {
            self.release_port(port);
        }
        for device in self.registry.drain() {
            self.release_native(device);
        }
        debug!("Input context reset");
    }

    pub(crate) fn install_keyboard(&mut self) -> DeviceId {
        let id = self.registry.insert_with(Device::keyboard);
        info!("Keyboard registered as {}", id);
        self.auto_bind(id);
        id
    }

    /// Gives a removed device's native handles back to the host, haptic first.
    pub(crate) fn release_native(&mut self, device: Device) {
        if let Some(native) = device.native {
            if let Some(haptic) = native.haptic {
                self.host.close_haptic(haptic);
            }
            self.host.close_controller(native.controller);
        }
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.registry.iter()
    }

    pub fn device(&self, id: DeviceId) -> Option<&Device> {
        self.registry.get(id)
    }

    pub fn set_focus_capture_mode(&mut self, enabled: bool) {
        if self.focus_capture != enabled {
            debug!("Controller focus capture {}", if enabled { "on" } else { "off" });
        }
        self.focus_capture = enabled;
    }

    pub fn focus_capture_mode(&self) -> bool {
        self.focus_capture
    }

    /// Report read by the emulated gamepad on `port` once per emulated step.
    ///
    /// Neutral while focus capture is on, so HUD navigation never reaches the guest.
    pub fn guest_report(&self, port: Port) -> Option<PadState> {
        self.get_bound(port).map(|device| {
            if self.focus_capture {
                PadState::default()
            } else {
                device.state
            }
        })
    }

    /// Motor levels written by the emulated gamepad on `port`.
    /// Pushed to the hardware on the next rumble pass.
    pub fn set_rumble(&mut self, port: Port, left: u16, right: u16) {
        let Some(id) = self.ports.get(port) else {
            debug!("Rumble for unbound {} ignored", port);
            return;
        };
        if let Some(device) = self.registry.get_mut(id) {
            device.rumble_left = left;
            device.rumble_right = right;
        }
    }
}
