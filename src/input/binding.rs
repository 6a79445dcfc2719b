//! Port binding table and the bind/unbind protocol.
//!
//! A bind is one flat transition on [`InputContext`]:
//!
//! ```text
//! unplug current occupant ──► persist identity ──► unplug new device's old port ──► plug new device
//! ```
//!
//! After every transition the table and `Device::bound` form a partial
//! bijection: no device sits in two ports and no port holds two devices.

use std::fmt;

use tracing::{debug, error, info, warn};

use crate::emulation::{SlotParams, GAMEPAD_DRIVER};
use crate::persistence::PORT_SETTINGS_KEYS;

use super::context::InputContext;
use super::device::{Device, DeviceId};
use super::error::BindError;

/// Physical hub port behind each logical slot. The wiring order differs from the slot order.
const HUB_PORT_MAP: [u8; Port::COUNT] = [3, 4, 1, 2];

/// One of the four emulated controller ports, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Port(usize);

impl Port {
    pub const COUNT: usize = 4;
    pub const ALL: [Port; Port::COUNT] = [Port(0), Port(1), Port(2), Port(3)];

    pub fn new(index: usize) -> Option<Self> {
        (index < Self::COUNT).then_some(Self(index))
    }

    pub fn index(self) -> usize {
        self.0
    }

    /// One-based number shown to the user.
    pub fn number(self) -> usize {
        self.0 + 1
    }

    pub fn hub_port(self) -> u8 {
        HUB_PORT_MAP[self.0]
    }

    pub fn settings_key(self) -> &'static str {
        PORT_SETTINGS_KEYS[self.0]
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "port {}", self.number())
    }
}

/// Non-owning slot table; the registry owns the devices.
#[derive(Debug, Default)]
pub struct PortTable {
    slots: [Option<DeviceId>; Port::COUNT],
}

impl PortTable {
    pub fn get(&self, port: Port) -> Option<DeviceId> {
        self.slots[port.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Port, Option<DeviceId>)> + '_ {
        Port::ALL.into_iter().map(|port| (port, self.get(port)))
    }

    fn set(&mut self, port: Port, device: DeviceId) {
        self.slots[port.index()] = Some(device);
    }

    fn take(&mut self, port: Port) -> Option<DeviceId> {
        self.slots[port.index()].take()
    }
}

impl InputContext {
    pub fn ports(&self) -> &PortTable {
        &self.ports
    }

    pub fn get_bound(&self, port: Port) -> Option<&Device> {
        self.ports.get(port).and_then(|id| self.registry.get(id))
    }

    /// Binds `device` to `port`, or empties the port when `device` is `None`.
    ///
    /// With `persist` the new identity (empty when unbinding) is saved as the
    /// port's default binding. A device that was bound elsewhere is moved, and
    /// its old port's saved binding is cleared.
    ///
    /// # Panics
    ///
    /// When the emulation core refuses to plug or unplug a gamepad. The table
    /// could no longer mirror the core's device tree after that.
    pub fn bind(
        &mut self,
        port: Port,
        device: Option<DeviceId>,
        persist: bool,
    ) -> Result<(), BindError> {
        if let Some(id) = device {
            if !self.registry.contains(id) {
                return Err(BindError::UnknownDevice(id));
            }
        }

        self.release_port(port);

        if persist {
            let identity = device
                .and_then(|id| self.registry.get(id))
                .map(|device| device.identity.clone())
                .unwrap_or_default();
            self.persist_binding(port, &identity);
        }

        if let Some(id) = device {
            if let Some(previous) = self.registry.get(id).and_then(Device::bound) {
                debug!("{} moves from {} to {}", id, previous, port);
                self.release_port(previous);
                self.persist_binding(previous, "");
            }
            self.plug(port, id);
        }

        debug_assert!(self.bindings_consistent(), "port table out of sync after bind");
        Ok(())
    }

    /// Force-unbinds whatever occupies `port`. Saved bindings are left alone.
    pub(crate) fn release_port(&mut self, port: Port) {
        let Some(id) = self.ports.take(port) else {
            return;
        };
        let Some(device) = self.registry.get_mut(id) else {
            warn!("{} referenced missing device {}", port, id);
            return;
        };

        device.bound = None;
        device.rumble_left = 0;
        device.rumble_right = 0;

        if let Some(emulated) = device.emulated.take() {
            if let Err(e) = self.device_tree.unplug(emulated) {
                panic!(
                    "emulation core refused to unplug '{}' from {}: {}",
                    device.name, port, e
                );
            }
        }
        info!("Unbound '{}' from {}", device.name, port);
    }

    fn persist_binding(&mut self, port: Port, identity: &str) {
        self.settings.set_string(port.settings_key(), identity);
        if let Err(e) = self.settings.save() {
            error!("Failed to save binding for {}: {}", port, e);
        }
    }

    fn plug(&mut self, port: Port, id: DeviceId) {
        let params = SlotParams {
            id: format!("gamepad_{}", self.gamepad_serial),
            index: port.index(),
            port: port.hub_port(),
        };
        self.gamepad_serial += 1;

        let emulated = match self.device_tree.create_and_plug(GAMEPAD_DRIVER, &params) {
            Ok(emulated) => emulated,
            Err(e) => panic!("emulation core refused to plug {} into {}: {}", params.id, port, e),
        };

        self.ports.set(port, id);
        if let Some(device) = self.registry.get_mut(id) {
            device.bound = Some(port);
            device.emulated = Some(emulated);
            info!(
                "Bound '{}' to {} as {} on hub port {}",
                device.name, port, params.id, params.port
            );
        }
    }

    /// First port at or after `start` whose saved identity equals `identity`.
    pub fn default_bind_port(&self, identity: &str, start: usize) -> Option<Port> {
        Port::ALL
            .into_iter()
            .skip(start)
            .find(|port| self.settings.get_string(port.settings_key()) == identity)
    }

    /// Binds a newly registered device to the first free port that remembers it.
    ///
    /// Occupied matches are skipped rather than displaced, so several devices
    /// reporting the same GUID (wireless receivers do this) spread over all
    /// the ports saved with that GUID.
    pub(crate) fn auto_bind(&mut self, id: DeviceId) -> Option<Port> {
        let (identity, name) = {
            let device = self.registry.get(id)?;
            (device.identity.clone(), device.name.clone())
        };

        let mut start = 0;
        while let Some(port) = self.default_bind_port(&identity, start) {
            if self.ports.get(port).is_some() {
                start = port.index() + 1;
                continue;
            }

            if let Err(e) = self.bind(port, Some(id), false) {
                warn!("Default bind of '{}' failed: {}", name, e);
                return None;
            }
            self.notifications
                .post(format!("Connected '{}' to port {}", name, port.number()));
            return Some(port);
        }

        debug!("No free default port for '{}'", name);
        None
    }

    /// `true` when every table entry and every `Device::bound` agree.
    pub fn bindings_consistent(&self) -> bool {
        let table_matches = self.ports.iter().all(|(port, slot)| match slot {
            Some(id) => self
                .registry
                .get(id)
                .is_some_and(|device| device.bound == Some(port)),
            None => true,
        });
        let devices_match = self.registry.iter().all(|device| match device.bound {
            Some(port) => self.ports.get(port) == Some(device.id),
            None => true,
        });
        table_matches && devices_match
    }
}
