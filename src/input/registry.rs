use std::collections::BTreeMap;

use super::device::{Device, DeviceId};
use super::host::InstanceId;

/// All live physical devices, in insertion order.
///
/// Keys grow monotonically, so iterating the map walks devices in the order
/// they were registered and a removed device's id never comes back.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: BTreeMap<DeviceId, Device>,
    next_id: u64,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_with(&mut self, build: impl FnOnce(DeviceId) -> Device) -> DeviceId {
        let id = DeviceId::new(self.next_id);
        self.next_id += 1;
        self.devices.insert(id, build(id));
        id
    }

    pub(crate) fn remove(&mut self, id: DeviceId) -> Option<Device> {
        self.devices.remove(&id)
    }

    /// Empties the registry. Ids keep counting up.
    pub(crate) fn drain(&mut self) -> Vec<Device> {
        std::mem::take(&mut self.devices).into_values().collect()
    }

    pub fn get(&self, id: DeviceId) -> Option<&Device> {
        self.devices.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: DeviceId) -> Option<&mut Device> {
        self.devices.get_mut(&id)
    }

    pub fn contains(&self, id: DeviceId) -> bool {
        self.devices.contains_key(&id)
    }

    pub fn find_by_instance(&self, instance: InstanceId) -> Option<DeviceId> {
        self.devices
            .values()
            .find(|device| device.instance() == Some(instance))
            .map(Device::id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Device> {
        self.devices.values_mut()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::host::ControllerHandle;

    fn pad(registry: &mut DeviceRegistry, instance: usize) -> DeviceId {
        registry.insert_with(|id| {
            Device::controller(
                id,
                ControllerHandle::new(InstanceId(instance), "Pad", "00ff"),
                None,
            )
        })
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut registry = DeviceRegistry::new();
        let keyboard = registry.insert_with(Device::keyboard);
        let first = pad(&mut registry, 7);
        let second = pad(&mut registry, 3);

        let order: Vec<DeviceId> = registry.iter().map(Device::id).collect();
        assert_eq!(order, vec![keyboard, first, second]);
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut registry = DeviceRegistry::new();
        let first = pad(&mut registry, 1);
        assert!(registry.remove(first).is_some());

        let second = pad(&mut registry, 1);
        assert_ne!(first, second);
        assert!(registry.get(first).is_none());
    }

    #[test]
    fn finds_controllers_by_instance_only() {
        let mut registry = DeviceRegistry::new();
        registry.insert_with(Device::keyboard);
        let pad_id = pad(&mut registry, 4);

        assert_eq!(registry.find_by_instance(InstanceId(4)), Some(pad_id));
        assert_eq!(registry.find_by_instance(InstanceId(5)), None);
    }

    #[test]
    fn drain_keeps_the_id_counter() {
        let mut registry = DeviceRegistry::new();
        let before = registry.insert_with(Device::keyboard);
        assert_eq!(registry.drain().len(), 1);
        assert!(registry.is_empty());

        let after = registry.insert_with(Device::keyboard);
        assert!(after > before);
    }
}
