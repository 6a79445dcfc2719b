//! Hotplug handling: host attach/detach notifications mutate the registry
//! and trigger the default-bind policy. Nothing in here fails outward; every
//! problem is logged and the event is dropped.

use tracing::{debug, info};

use super::context::InputContext;
use super::device::{Device, DeviceId};
use super::host::{HostEvent, InstanceId};

impl InputContext {
    pub fn process_host_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::ControllerAdded(index) => {
                self.on_attach(index);
            }
            HostEvent::ControllerRemoved(instance) => self.on_detach(instance),
            HostEvent::ControllerRemapped(instance) => {
                debug!("Controller remapped: {}", instance);
            }
        }
    }

    /// Drains the host's pending notifications. Returns how many were handled.
    pub fn pump_events(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.host.poll_event() {
            self.process_host_event(event);
            handled += 1;
        }
        handled
    }

    fn on_attach(&mut self, index: usize) -> Option<DeviceId> {
        debug!("Controller added: {}", index);

        let Some(controller) = self.host.open_controller(index) else {
            debug!("Could not open joystick {} as a game controller", index);
            return None;
        };
        let haptic = self.host.open_haptic(&controller);

        info!(
            "Opened '{}' ({}), instance {}, rumble {}",
            controller.name(),
            controller.guid(),
            controller.instance(),
            if haptic.is_some() { "available" } else { "unavailable" }
        );

        let id = self
            .registry
            .insert_with(|id| Device::controller(id, controller, haptic));
        self.auto_bind(id);
        Some(id)
    }

    fn on_detach(&mut self, instance: InstanceId) {
        debug!("Controller removed: {}", instance);

        let Some(id) = self.registry.find_by_instance(instance) else {
            debug!("Could not find handle for joystick instance {}", instance);
            return;
        };

        if let Some(port) = self.registry.get(id).and_then(Device::bound) {
            self.notifications
                .post(format!("Port {} disconnected", port.number()));
            // Saved binding stays, so the controller returns to this port on reconnect
            self.release_port(port);
        }

        if let Some(device) = self.registry.remove(id) {
            info!("Removed '{}' ({})", device.name, id);
            self.release_native(device);
        }
    }
}
