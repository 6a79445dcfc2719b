use std::collections::HashMap;

use tracing::{debug, info};

use super::{DeviceTree, DeviceTreeError, EmulatedDevice, SlotParams, GAMEPAD_DRIVER};

const HUB_PORTS: u8 = 4;

/// A device plugged into the virtual hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluggedGamepad {
    pub device: EmulatedDevice,
    pub params: SlotParams,
}

/// In-process stand-in for the emulated USB hub the gamepads hang off.
#[derive(Debug, Default)]
pub struct VirtualUsbBus {
    // Keyed by hub port, 1..=4
    ports: HashMap<u8, PluggedGamepad>,
    next_device: u64,
}

impl VirtualUsbBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plugged(&self, hub_port: u8) -> Option<&PluggedGamepad> {
        self.ports.get(&hub_port)
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

impl DeviceTree for VirtualUsbBus {
    fn create_and_plug(
        &mut self,
        kind: &str,
        params: &SlotParams,
    ) -> Result<EmulatedDevice, DeviceTreeError> {
        if kind != GAMEPAD_DRIVER {
            return Err(DeviceTreeError::UnsupportedDriver(kind.to_string()));
        }
        if !(1..=HUB_PORTS).contains(&params.port) {
            return Err(DeviceTreeError::NoSuchPort(params.port));
        }
        if self.ports.contains_key(&params.port) {
            return Err(DeviceTreeError::PortOccupied(params.port));
        }

        let device = EmulatedDevice(self.next_device);
        self.next_device += 1;
        self.ports.insert(
            params.port,
            PluggedGamepad {
                device,
                params: params.clone(),
            },
        );
        info!("Plugged {} ({}) into hub port {}", params.id, device, params.port);
        Ok(device)
    }

    fn unplug(&mut self, device: EmulatedDevice) -> Result<(), DeviceTreeError> {
        let hub_port = self
            .ports
            .iter()
            .find(|(_, plugged)| plugged.device == device)
            .map(|(port, _)| *port)
            .ok_or(DeviceTreeError::NotPlugged(device))?;

        if let Some(plugged) = self.ports.remove(&hub_port) {
            debug!("Unplugged {} from hub port {}", plugged.params.id, hub_port);
        }
        Ok(())
    }
}
