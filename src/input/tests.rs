//! Behaviour of the input manager against in-memory collaborators.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::time::{Duration, Instant};

use egui::Key;

use crate::emulation::{DeviceTree, DeviceTreeError, EmulatedDevice, SlotParams, GAMEPAD_DRIVER};
use crate::notifications::NotificationSink;
use crate::persistence::{SettingsError, SettingsStore, PORT_SETTINGS_KEYS};

use super::device::{
    DeviceClass, DeviceId, PadState, AXIS_LSTICK_X, AXIS_LSTICK_Y, AXIS_LTRIG, AXIS_RSTICK_Y,
    AXIS_RTRIG, BUTTON_A, BUTTON_B, BUTTON_BACK, BUTTON_GUIDE, BUTTON_START, BUTTON_WHITE,
};
use super::error::{BindError, HapticError};
use super::host::{
    ControllerHandle, EffectId, HapticHandle, HostEvent, InputHost, InstanceId, NativeAxis,
    NativeButton, RumbleEffect,
};
use super::{InputManager, Port, Running};

const PAD_GUID: &str = "030000005e0400008e02000000007200";
const OTHER_GUID: &str = "050000004c050000cc09000000810000";

fn port(number: usize) -> Port {
    Port::ALL[number - 1]
}

#[derive(Default)]
struct HostState {
    events: VecDeque<HostEvent>,
    // index -> (name, guid, has haptic)
    attached: HashMap<usize, (String, String, bool)>,
    keys: HashSet<Key>,
    buttons: HashMap<InstanceId, HashSet<NativeButton>>,
    axes: HashMap<(InstanceId, NativeAxis), i16>,
    released: Vec<String>,
    created: Vec<RumbleEffect>,
    started: Vec<EffectId>,
    updated: Vec<RumbleEffect>,
    reject_effects: bool,
}

#[derive(Clone, Default)]
struct MockHost(Rc<RefCell<HostState>>);

impl InputHost for MockHost {
    fn poll_event(&mut self) -> Option<HostEvent> {
        self.0.borrow_mut().events.pop_front()
    }

    fn open_controller(&mut self, index: usize) -> Option<ControllerHandle> {
        let state = self.0.borrow();
        let (name, guid, _) = state.attached.get(&index)?;
        Some(ControllerHandle::new(InstanceId(index), name.as_str(), guid.as_str()))
    }

    fn open_haptic(&mut self, controller: &ControllerHandle) -> Option<HapticHandle> {
        let state = self.0.borrow();
        let (_, _, haptic) = state.attached.get(&controller.instance().0)?;
        haptic.then(|| HapticHandle::new(controller.instance()))
    }

    fn close_haptic(&mut self, haptic: HapticHandle) {
        self.0
            .borrow_mut()
            .released
            .push(format!("haptic {}", haptic.instance()));
    }

    fn close_controller(&mut self, controller: ControllerHandle) {
        self.0
            .borrow_mut()
            .released
            .push(format!("controller {}", controller.instance()));
    }

    fn key_down(&self, key: Key) -> bool {
        self.0.borrow().keys.contains(&key)
    }

    fn button_down(&self, controller: &ControllerHandle, button: NativeButton) -> bool {
        self.0
            .borrow()
            .buttons
            .get(&controller.instance())
            .is_some_and(|held| held.contains(&button))
    }

    fn axis(&self, controller: &ControllerHandle, axis: NativeAxis) -> i16 {
        self.0
            .borrow()
            .axes
            .get(&(controller.instance(), axis))
            .copied()
            .unwrap_or(0)
    }

    fn new_effect(
        &mut self,
        _haptic: &HapticHandle,
        effect: &RumbleEffect,
    ) -> Result<EffectId, HapticError> {
        let mut state = self.0.borrow_mut();
        if state.reject_effects {
            return Err(HapticError::EffectRejected("not supported".to_string()));
        }
        state.created.push(*effect);
        Ok(EffectId(state.created.len() as u32))
    }

    fn run_effect(&mut self, _haptic: &HapticHandle, effect: EffectId) -> Result<(), HapticError> {
        self.0.borrow_mut().started.push(effect);
        Ok(())
    }

    fn update_effect(
        &mut self,
        _haptic: &HapticHandle,
        _effect: EffectId,
        params: &RumbleEffect,
    ) -> Result<(), HapticError> {
        self.0.borrow_mut().updated.push(*params);
        Ok(())
    }
}

#[derive(Default)]
struct SettingsState {
    values: HashMap<String, String>,
    saves: usize,
}

#[derive(Clone, Default)]
struct MockSettings(Rc<RefCell<SettingsState>>);

impl MockSettings {
    fn saved(&self, port: Port) -> String {
        self.get_string(port.settings_key())
    }
}

impl SettingsStore for MockSettings {
    fn get_string(&self, key: &str) -> String {
        self.0.borrow().values.get(key).cloned().unwrap_or_default()
    }

    fn set_string(&mut self, key: &str, value: &str) {
        self.0
            .borrow_mut()
            .values
            .insert(key.to_string(), value.to_string());
    }

    fn save(&mut self) -> Result<(), SettingsError> {
        self.0.borrow_mut().saves += 1;
        Ok(())
    }
}

#[derive(Default)]
struct TreeState {
    plugged: HashMap<EmulatedDevice, SlotParams>,
    history: Vec<SlotParams>,
    unplugs: usize,
    next: u64,
    refuse_plug: bool,
    refuse_unplug: bool,
}

#[derive(Clone, Default)]
struct MockTree(Rc<RefCell<TreeState>>);

impl MockTree {
    fn plugged_at(&self, hub_port: u8) -> Option<SlotParams> {
        self.0
            .borrow()
            .plugged
            .values()
            .find(|params| params.port == hub_port)
            .cloned()
    }

    fn plugged_count(&self) -> usize {
        self.0.borrow().plugged.len()
    }
}

impl DeviceTree for MockTree {
    fn create_and_plug(
        &mut self,
        kind: &str,
        params: &SlotParams,
    ) -> Result<EmulatedDevice, DeviceTreeError> {
        assert_eq!(kind, GAMEPAD_DRIVER);
        let mut tree = self.0.borrow_mut();
        if tree.refuse_plug {
            return Err(DeviceTreeError::PortOccupied(params.port));
        }
        let device = EmulatedDevice(tree.next);
        tree.next += 1;
        tree.plugged.insert(device, params.clone());
        tree.history.push(params.clone());
        Ok(device)
    }

    fn unplug(&mut self, device: EmulatedDevice) -> Result<(), DeviceTreeError> {
        let mut tree = self.0.borrow_mut();
        if tree.refuse_unplug {
            return Err(DeviceTreeError::NotPlugged(device));
        }
        tree.unplugs += 1;
        tree.plugged
            .remove(&device)
            .map(|_| ())
            .ok_or(DeviceTreeError::NotPlugged(device))
    }
}

#[derive(Clone, Default)]
struct MockSink(Rc<RefCell<Vec<String>>>);

impl MockSink {
    fn messages(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

impl NotificationSink for MockSink {
    fn post(&mut self, message: String) {
        self.0.borrow_mut().push(message);
    }
}

struct Harness {
    input: InputManager<Running>,
    host: MockHost,
    settings: MockSettings,
    tree: MockTree,
    sink: MockSink,
}

impl Harness {
    /// Starts a manager with the given saved identities, port 1 first.
    fn start(saved: [&str; 4]) -> Self {
        let host = MockHost::default();
        let mut settings = MockSettings::default();
        for (key, value) in PORT_SETTINGS_KEYS.iter().zip(saved) {
            settings.set_string(key, value);
        }
        let tree = MockTree::default();
        let sink = MockSink::default();

        let input = InputManager::create(
            Box::new(host.clone()),
            Box::new(settings.clone()),
            Box::new(tree.clone()),
            Box::new(sink.clone()),
        )
        .initialize();

        Self {
            input,
            host,
            settings,
            tree,
            sink,
        }
    }

    fn attach(&mut self, index: usize, name: &str, guid: &str, haptic: bool) -> Option<DeviceId> {
        {
            let mut host = self.host.0.borrow_mut();
            host.attached
                .insert(index, (name.to_string(), guid.to_string(), haptic));
            host.events.push_back(HostEvent::ControllerAdded(index));
        }
        self.input.pump_events();
        self.input.registry().find_by_instance(InstanceId(index))
    }

    fn detach(&mut self, index: usize) {
        {
            let mut host = self.host.0.borrow_mut();
            host.attached.remove(&index);
            host.events
                .push_back(HostEvent::ControllerRemoved(InstanceId(index)));
        }
        self.input.pump_events();
    }

    fn keyboard(&self) -> DeviceId {
        self.input
            .devices()
            .find(|device| device.class() == DeviceClass::Keyboard)
            .map(|device| device.id())
            .unwrap()
    }

    fn press_keys(&self, keys: &[Key]) {
        self.host.0.borrow_mut().keys = keys.iter().copied().collect();
    }

    fn hold_buttons(&self, index: usize, buttons: &[NativeButton]) {
        self.host
            .0
            .borrow_mut()
            .buttons
            .insert(InstanceId(index), buttons.iter().copied().collect());
    }

    fn set_axis(&self, index: usize, axis: NativeAxis, value: i16) {
        self.host
            .0
            .borrow_mut()
            .axes
            .insert((InstanceId(index), axis), value);
    }

    fn bound_to(&self, number: usize) -> Option<DeviceId> {
        self.input.get_bound(port(number)).map(|device| device.id())
    }
}

const NOTHING_SAVED: [&str; 4] = ["", "", "", ""];

#[test]
fn keyboard_is_registered_first_and_unbound_without_saved_port() {
    let h = Harness::start(NOTHING_SAVED);

    let devices: Vec<_> = h.input.devices().collect();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].class(), DeviceClass::Keyboard);
    assert_eq!(devices[0].identity(), "keyboard");
    assert_eq!(devices[0].bound(), None);
    assert!(h.sink.messages().is_empty());
    assert_eq!(h.tree.plugged_count(), 0);
}

#[test]
fn keyboard_takes_its_saved_port() {
    let h = Harness::start(["", "keyboard", "", ""]);

    assert_eq!(h.bound_to(2), Some(h.keyboard()));
    assert_eq!(
        h.tree.plugged_at(4),
        Some(SlotParams {
            id: "gamepad_0".to_string(),
            index: 1,
            port: 4,
        })
    );
    assert_eq!(h.sink.messages(), vec!["Connected 'Keyboard' to port 2"]);
    // Recall never writes settings
    assert_eq!(h.settings.0.borrow().saves, 0);
}

#[test]
fn attached_controller_is_bound_to_its_saved_port() {
    let mut h = Harness::start(["", "", PAD_GUID, ""]);

    let pad = h.attach(0, "Pad", PAD_GUID, true).unwrap();

    assert_eq!(h.bound_to(3), Some(pad));
    assert_eq!(h.tree.plugged_at(1).map(|params| params.index), Some(2));
    assert_eq!(h.sink.messages(), vec!["Connected 'Pad' to port 3"]);
    assert!(h.input.bindings_consistent());
}

#[test]
fn controller_without_saved_port_stays_unbound() {
    let mut h = Harness::start(["", PAD_GUID, "", ""]);

    let pad = h.attach(0, "Other", OTHER_GUID, false).unwrap();

    assert_eq!(h.input.device(pad).and_then(|device| device.bound()), None);
    assert!(h.sink.messages().is_empty());
    assert_eq!(h.tree.plugged_count(), 0);
}

#[test]
fn controllers_sharing_a_guid_spread_over_saved_ports() {
    let mut h = Harness::start([PAD_GUID, "", PAD_GUID, ""]);

    let first = h.attach(0, "Receiver", PAD_GUID, false).unwrap();
    let second = h.attach(1, "Receiver", PAD_GUID, false).unwrap();
    let third = h.attach(2, "Receiver", PAD_GUID, false).unwrap();

    assert_eq!(h.bound_to(1), Some(first));
    assert_eq!(h.bound_to(3), Some(second));
    assert_eq!(h.input.device(third).and_then(|device| device.bound()), None);
    assert_eq!(
        h.sink.messages(),
        vec![
            "Connected 'Receiver' to port 1",
            "Connected 'Receiver' to port 3"
        ]
    );
}

#[test]
fn default_bind_port_searches_from_offset() {
    let h = Harness::start([PAD_GUID, "", PAD_GUID, "keyboard"]);

    assert_eq!(h.input.default_bind_port(PAD_GUID, 0), Some(port(1)));
    assert_eq!(h.input.default_bind_port(PAD_GUID, 1), Some(port(3)));
    assert_eq!(h.input.default_bind_port(PAD_GUID, 3), None);
    assert_eq!(h.input.default_bind_port(OTHER_GUID, 0), None);
}

#[test]
fn moving_a_device_clears_its_old_saved_port() {
    let mut h = Harness::start([PAD_GUID, "", "", ""]);
    let pad = h.attach(0, "Pad", PAD_GUID, false).unwrap();
    assert_eq!(h.bound_to(1), Some(pad));

    h.input.bind(port(2), Some(pad), true).unwrap();

    assert_eq!(h.bound_to(1), None);
    assert_eq!(h.bound_to(2), Some(pad));
    assert_eq!(h.settings.saved(port(1)), "");
    assert_eq!(h.settings.saved(port(2)), PAD_GUID);
    assert_eq!(h.tree.plugged_count(), 1);
    assert_eq!(h.tree.plugged_at(4).map(|params| params.index), Some(1));
    assert!(h.input.bindings_consistent());
}

#[test]
fn binding_an_occupied_port_displaces_the_occupant() {
    let mut h = Harness::start(["keyboard", "", "", ""]);
    let keyboard = h.keyboard();
    let pad = h.attach(0, "Pad", PAD_GUID, false).unwrap();

    h.input.bind(port(1), Some(pad), true).unwrap();

    assert_eq!(h.bound_to(1), Some(pad));
    assert_eq!(h.input.device(keyboard).and_then(|device| device.bound()), None);
    assert_eq!(h.settings.saved(port(1)), PAD_GUID);
    assert_eq!(h.tree.plugged_count(), 1);
    assert!(h.input.bindings_consistent());
}

#[test]
fn unbinding_with_persist_forgets_the_port() {
    let mut h = Harness::start(["keyboard", "", "", ""]);

    h.input.bind(port(1), None, true).unwrap();

    assert_eq!(h.bound_to(1), None);
    assert_eq!(h.settings.saved(port(1)), "");
    assert!(h.settings.0.borrow().saves >= 1);
    assert_eq!(h.tree.plugged_count(), 0);
}

#[test]
fn unbinding_without_persist_keeps_the_saved_identity() {
    let mut h = Harness::start(["keyboard", "", "", ""]);

    h.input.bind(port(1), None, false).unwrap();

    assert_eq!(h.bound_to(1), None);
    assert_eq!(h.settings.saved(port(1)), "keyboard");
    assert_eq!(h.settings.0.borrow().saves, 0);
}

#[test]
fn binding_an_unknown_device_is_rejected_without_side_effects() {
    let mut h = Harness::start(["keyboard", "", "", ""]);
    let keyboard = h.keyboard();

    let result = h.input.bind(port(1), Some(DeviceId::new(999)), true);

    assert!(matches!(result, Err(BindError::UnknownDevice(_))));
    assert_eq!(h.bound_to(1), Some(keyboard));
    assert_eq!(h.settings.saved(port(1)), "keyboard");
}

#[test]
fn emulated_gamepad_ids_keep_counting() {
    let mut h = Harness::start(NOTHING_SAVED);
    let keyboard = h.keyboard();

    h.input.bind(port(1), Some(keyboard), false).unwrap();
    h.input.bind(port(1), None, false).unwrap();
    h.input.bind(port(4), Some(keyboard), false).unwrap();

    let ids: Vec<String> = h
        .tree
        .0
        .borrow()
        .history
        .iter()
        .map(|params| params.id.clone())
        .collect();
    assert_eq!(ids, vec!["gamepad_0", "gamepad_1"]);
    assert_eq!(h.tree.plugged_at(2).map(|params| params.index), Some(3));
}

#[test]
fn detach_frees_the_port_but_keeps_the_saved_binding() {
    let mut h = Harness::start([PAD_GUID, "", "", ""]);
    h.attach(0, "Pad", PAD_GUID, true).unwrap();

    h.detach(0);

    assert_eq!(h.bound_to(1), None);
    assert_eq!(h.input.registry().len(), 1);
    assert_eq!(h.settings.saved(port(1)), PAD_GUID);
    assert_eq!(h.tree.plugged_count(), 0);
    assert_eq!(
        h.sink.messages().last().map(String::as_str),
        Some("Port 1 disconnected")
    );
    assert_eq!(
        h.host.0.borrow().released,
        vec!["haptic 0".to_string(), "controller 0".to_string()]
    );
}

#[test]
fn reattached_controller_returns_to_its_port() {
    let mut h = Harness::start(["", PAD_GUID, "", ""]);
    let before = h.attach(0, "Pad", PAD_GUID, false).unwrap();
    h.detach(0);

    let after = h.attach(3, "Pad", PAD_GUID, false).unwrap();

    assert_ne!(before, after);
    assert_eq!(h.bound_to(2), Some(after));
    assert_eq!(h.host.0.borrow().released, vec!["controller 0".to_string()]);
}

#[test]
fn detaching_an_unbound_controller_posts_nothing() {
    let mut h = Harness::start(NOTHING_SAVED);
    h.attach(0, "Pad", PAD_GUID, false).unwrap();

    h.detach(0);

    assert!(h.sink.messages().is_empty());
    assert_eq!(h.input.registry().len(), 1);
}

#[test]
fn failed_open_is_silent() {
    let mut h = Harness::start([PAD_GUID, "", "", ""]);
    h.host
        .0
        .borrow_mut()
        .events
        .push_back(HostEvent::ControllerAdded(7));

    assert_eq!(h.input.pump_events(), 1);
    assert_eq!(h.input.registry().len(), 1);
    assert!(h.sink.messages().is_empty());
}

#[test]
fn unknown_detach_and_remap_are_ignored() {
    let mut h = Harness::start(["keyboard", "", "", ""]);
    {
        let mut host = h.host.0.borrow_mut();
        host.events
            .push_back(HostEvent::ControllerRemoved(InstanceId(42)));
        host.events
            .push_back(HostEvent::ControllerRemapped(InstanceId(42)));
    }

    assert_eq!(h.input.pump_events(), 2);
    assert_eq!(h.input.registry().len(), 1);
    assert_eq!(h.bound_to(1), Some(h.keyboard()));
}

#[test]
fn input_refresh_is_rate_limited() {
    let mut h = Harness::start(NOTHING_SAVED);
    let keyboard = h.keyboard();
    let start = Instant::now();

    h.press_keys(&[Key::A]);
    h.input.sample_all_at(start);
    h.press_keys(&[Key::B]);
    h.input.sample_all_at(start + Duration::from_millis(1));
    assert_eq!(h.input.device(keyboard).unwrap().state().buttons, BUTTON_A);

    h.input.sample_all_at(start + Duration::from_micros(2500));
    assert_eq!(h.input.device(keyboard).unwrap().state().buttons, BUTTON_B);
}

#[test]
fn keyboard_layout() {
    let mut h = Harness::start(NOTHING_SAVED);
    let keyboard = h.keyboard();

    h.press_keys(&[Key::Enter, Key::Backspace, Key::Num5, Key::E, Key::D, Key::S, Key::W, Key::O]);
    h.input.sample_all_at(Instant::now());

    let state = *h.input.device(keyboard).unwrap().state();
    assert_eq!(state.buttons, BUTTON_START | BUTTON_BACK | BUTTON_GUIDE);
    // D comes after E, so down wins
    assert_eq!(state.axis(AXIS_LSTICK_Y), i16::MIN);
    assert_eq!(state.axis(AXIS_LSTICK_X), i16::MIN);
    assert_eq!(state.axis(AXIS_LTRIG), i16::MAX);
    assert_eq!(state.axis(AXIS_RTRIG), i16::MAX);
    assert_eq!(state.axis(AXIS_RSTICK_Y), 0);
}

#[test]
fn controller_layout_flips_stick_y() {
    let mut h = Harness::start(NOTHING_SAVED);
    let pad = h.attach(0, "Pad", PAD_GUID, false).unwrap();

    h.hold_buttons(0, &[NativeButton::Start, NativeButton::LeftShoulder]);
    h.set_axis(0, NativeAxis::LeftX, 500);
    h.set_axis(0, NativeAxis::LeftY, 1000);
    h.set_axis(0, NativeAxis::RightY, i16::MIN);
    h.set_axis(0, NativeAxis::TriggerLeft, i16::MAX);
    h.input.sample_all_at(Instant::now());

    let state = *h.input.device(pad).unwrap().state();
    assert_eq!(state.buttons, BUTTON_START | BUTTON_WHITE);
    assert_eq!(state.axis(AXIS_LSTICK_X), 500);
    assert_eq!(state.axis(AXIS_LSTICK_Y), -1001);
    assert_eq!(state.axis(AXIS_RSTICK_Y), i16::MAX);
    assert_eq!(state.axis(AXIS_LTRIG), i16::MAX);
}

#[test]
fn rumble_effect_is_created_once_then_updated() {
    let mut h = Harness::start([PAD_GUID, "", "", ""]);
    h.attach(0, "Pad", PAD_GUID, true).unwrap();
    let start = Instant::now();

    h.input.set_rumble(port(1), 100, 200);
    h.input.sample_all_at(start);
    {
        let host = h.host.0.borrow();
        assert_eq!(host.created, vec![RumbleEffect { left: 100, right: 200 }]);
        assert_eq!(host.started.len(), 1);
    }

    h.input.set_rumble(port(1), 300, 400);
    h.input.sample_all_at(start + Duration::from_millis(1));
    assert!(h.host.0.borrow().updated.is_empty());

    h.input.sample_all_at(start + Duration::from_millis(3));
    let host = h.host.0.borrow();
    assert_eq!(host.created.len(), 1);
    assert_eq!(host.updated, vec![RumbleEffect { left: 300, right: 400 }]);
}

#[test]
fn rejected_effect_disables_rumble_for_good() {
    let mut h = Harness::start([PAD_GUID, "", "", ""]);
    let pad = h.attach(0, "Pad", PAD_GUID, true).unwrap();
    h.host.0.borrow_mut().reject_effects = true;
    let start = Instant::now();

    h.input.sample_all_at(start);
    assert!(!h.input.device(pad).unwrap().has_rumble());
    assert_eq!(h.host.0.borrow().released, vec!["haptic 0".to_string()]);

    h.host.0.borrow_mut().reject_effects = false;
    h.input.sample_all_at(start + Duration::from_millis(10));
    assert!(h.host.0.borrow().created.is_empty());
}

#[test]
fn controller_without_haptic_never_touches_effects() {
    let mut h = Harness::start([PAD_GUID, "", "", ""]);
    h.attach(0, "Pad", PAD_GUID, false).unwrap();

    h.input.set_rumble(port(1), 1000, 1000);
    h.input.sample_all_at(Instant::now());

    let host = h.host.0.borrow();
    assert!(host.created.is_empty());
    assert!(host.updated.is_empty());
}

#[test]
fn unbinding_silences_rumble() {
    let mut h = Harness::start([PAD_GUID, "", "", ""]);
    let pad = h.attach(0, "Pad", PAD_GUID, true).unwrap();

    h.input.set_rumble(port(1), 500, 600);
    assert_eq!(h.input.device(pad).unwrap().rumble(), (500, 600));

    h.input.bind(port(1), None, false).unwrap();
    assert_eq!(h.input.device(pad).unwrap().rumble(), (0, 0));

    // Unbound port: ignored
    h.input.set_rumble(port(1), 700, 700);
    assert_eq!(h.input.device(pad).unwrap().rumble(), (0, 0));
}

#[test]
fn focus_capture_hides_input_from_the_guest() {
    let mut h = Harness::start(["keyboard", "", "", ""]);
    h.press_keys(&[Key::A]);
    h.input.sample_all_at(Instant::now());

    let live = h.input.guest_report(port(1)).unwrap();
    assert_eq!(live.buttons, BUTTON_A);
    assert_eq!(h.input.guest_report(port(2)), None);

    h.input.set_focus_capture_mode(true);
    assert!(h.input.focus_capture_mode());
    assert_eq!(h.input.guest_report(port(1)), Some(PadState::default()));

    h.input.set_focus_capture_mode(false);
    assert_eq!(h.input.guest_report(port(1)), Some(live));
}

#[test]
fn hud_navigation_uses_controllers_only() {
    let mut h = Harness::start(NOTHING_SAVED);
    h.attach(0, "Pad", PAD_GUID, false).unwrap();

    // Keyboard "guide" key does not open the menu
    h.press_keys(&[Key::Num5]);
    h.set_axis(0, NativeAxis::LeftX, 3000);
    h.set_axis(0, NativeAxis::RightX, -4000);
    let start = Instant::now();
    h.input.sample_all_at(start);

    let nav = h.input.hud_navigation();
    assert!(!nav.menu_requested);
    assert_eq!(nav.axes[AXIS_LSTICK_X], 0);
    assert_eq!(nav.axes[4], -4000);

    h.hold_buttons(0, &[NativeButton::Back, NativeButton::Start]);
    h.input.sample_all_at(start + Duration::from_millis(5));
    assert!(h.input.hud_navigation().menu_requested);

    h.hold_buttons(0, &[NativeButton::Guide]);
    h.input.sample_all_at(start + Duration::from_millis(10));
    assert!(h.input.hud_navigation().menu_requested);
}

#[test]
#[should_panic(expected = "refused to unplug")]
fn refused_unplug_is_fatal() {
    let mut h = Harness::start(["keyboard", "", "", ""]);
    h.tree.0.borrow_mut().refuse_unplug = true;

    let _ = h.input.bind(port(1), None, false);
}

#[test]
#[should_panic(expected = "refused to plug")]
fn refused_plug_is_fatal() {
    let mut h = Harness::start(NOTHING_SAVED);
    let keyboard = h.keyboard();
    h.tree.0.borrow_mut().refuse_plug = true;

    let _ = h.input.bind(port(1), Some(keyboard), false);
}

#[test]
fn shutdown_releases_everything_and_keeps_settings() {
    let mut h = Harness::start(["keyboard", PAD_GUID, "", ""]);
    h.attach(0, "Pad", PAD_GUID, true).unwrap();
    assert_eq!(h.tree.plugged_count(), 2);

    let Harness {
        input,
        host,
        settings,
        tree,
        ..
    } = h;
    let _stopped = input.shutdown();

    assert_eq!(tree.plugged_count(), 0);
    assert_eq!(
        host.0.borrow().released,
        vec!["haptic 0".to_string(), "controller 0".to_string()]
    );
    assert_eq!(settings.saved(port(1)), "keyboard");
    assert_eq!(settings.saved(port(2)), PAD_GUID);
    assert_eq!(settings.0.borrow().saves, 0);
}

#[test]
fn table_and_devices_stay_in_step() {
    let mut h = Harness::start(["keyboard", PAD_GUID, "", ""]);
    let keyboard = h.keyboard();
    let pad = h.attach(0, "Pad", PAD_GUID, false).unwrap();
    let other = h.attach(1, "Other", OTHER_GUID, false).unwrap();

    let steps: [(usize, Option<DeviceId>); 6] = [
        (3, Some(keyboard)),
        (3, Some(pad)),
        (1, Some(other)),
        (4, Some(other)),
        (2, Some(keyboard)),
        (4, None),
    ];
    for (number, device) in steps {
        h.input.bind(port(number), device, true).unwrap();
        assert!(h.input.bindings_consistent());

        let bound: Vec<DeviceId> = h.input.ports().iter().filter_map(|(_, id)| id).collect();
        let unique: HashSet<DeviceId> = bound.iter().copied().collect();
        assert_eq!(bound.len(), unique.len());
        assert_eq!(h.tree.plugged_count(), bound.len());
    }

    h.detach(0);
    assert!(h.input.bindings_consistent());
    assert_eq!(h.bound_to(3), None);
}
