//! [`InputHost`] backed by gilrs, plus the keyboard state fed in from the window.

use egui::Key;
use gilrs::ff::{BaseEffect, BaseEffectType, Effect, EffectBuilder, Repeat};
use gilrs::{Axis, Button, Event, EventType, Gamepad, GamepadId, Gilrs};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;
use tracing::{debug, error, info, warn};

use super::error::{HapticError, HostError};
use super::host::{
    ControllerHandle, EffectId, HapticHandle, HostEvent, InputHost, InstanceId, NativeAxis,
    NativeButton, RumbleEffect,
};

/// Keys currently held, as last reported by the window.
///
/// The window layer replaces the set once per frame; the host only reads it.
#[derive(Clone, Debug, Default)]
pub struct KeyboardFeed(Rc<RefCell<HashSet<Key>>>);

impl KeyboardFeed {
    pub fn replace(&self, keys: HashSet<Key>) {
        *self.0.borrow_mut() = keys;
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.0.borrow().contains(&key)
    }
}

// One effect per motor; levels are applied through the effect gain so a
// running effect can be changed without restarting it.
struct RumblePair {
    instance: InstanceId,
    strong: Effect,
    weak: Effect,
}

pub struct GilrsHost {
    gilrs: Gilrs,
    keyboard: KeyboardFeed,
    pending: VecDeque<HostEvent>,
    // Controllers announced to the input layer, by instance index
    announced: HashMap<usize, GamepadId>,
    effects: HashMap<EffectId, RumblePair>,
    next_effect: u32,
}

impl GilrsHost {
    pub fn new(keyboard: KeyboardFeed) -> Result<Self, HostError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(gilrs::Error::NotImplemented(dummy)) => {
                warn!("No gamepad backend on this platform, only the keyboard is available");
                dummy
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(HostError::InitializationError(e.to_string()));
            }
        };

        let mut host = Self {
            gilrs,
            keyboard,
            pending: VecDeque::new(),
            announced: HashMap::new(),
            effects: HashMap::new(),
            next_effect: 0,
        };

        // Controllers present at startup get the same attach path as later ones
        let present: Vec<GamepadId> = host.gilrs.gamepads().map(|(id, _)| id).collect();
        info!("Found {} gamepads", present.len());
        for id in present {
            host.announce(id);
        }

        Ok(host)
    }

    fn announce(&mut self, id: GamepadId) -> Option<HostEvent> {
        let index = usize::from(id);
        if self.announced.insert(index, id).is_some() {
            return None;
        }
        let event = HostEvent::ControllerAdded(index);
        self.pending.push_back(event);
        Some(event)
    }

    fn gamepad(&self, instance: InstanceId) -> Option<Gamepad<'_>> {
        let id = self.announced.get(&instance.0)?;
        self.gilrs.connected_gamepad(*id)
    }

    fn gamepad_id(&self, instance: InstanceId) -> Result<GamepadId, HapticError> {
        self.announced
            .get(&instance.0)
            .copied()
            .ok_or(HapticError::Disconnected(instance.0))
    }

    fn motor_effect(
        &mut self,
        id: GamepadId,
        kind: BaseEffectType,
    ) -> Result<Effect, HapticError> {
        EffectBuilder::new()
            .add_effect(BaseEffect {
                kind,
                ..Default::default()
            })
            .repeat(Repeat::Infinitely)
            .gamepads(&[id])
            .finish(&mut self.gilrs)
            .map_err(|e| HapticError::EffectRejected(e.to_string()))
    }
}

impl InputHost for GilrsHost {
    fn poll_event(&mut self) -> Option<HostEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }

        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            match event {
                EventType::Connected => {
                    if self.announce(id).is_some() {
                        return self.pending.pop_front();
                    }
                }
                EventType::Disconnected => {
                    let index = usize::from(id);
                    if self.announced.remove(&index).is_some() {
                        return Some(HostEvent::ControllerRemoved(InstanceId(index)));
                    }
                }
                // Button/axis state is read from the gamepad snapshot, not the events
                _ => {}
            }
        }

        None
    }

    fn open_controller(&mut self, index: usize) -> Option<ControllerHandle> {
        let gamepad = self.gamepad(InstanceId(index))?;
        Some(ControllerHandle::new(
            InstanceId(index),
            gamepad.name(),
            guid_string(gamepad.uuid()),
        ))
    }

    fn open_haptic(&mut self, controller: &ControllerHandle) -> Option<HapticHandle> {
        let gamepad = self.gamepad(controller.instance())?;
        gamepad
            .is_ff_supported()
            .then(|| HapticHandle::new(controller.instance()))
    }

    fn close_haptic(&mut self, haptic: HapticHandle) {
        // Dropping the effects stops them
        self.effects
            .retain(|_, pair| pair.instance != haptic.instance());
        debug!("Closed haptic for instance {}", haptic.instance());
    }

    fn close_controller(&mut self, controller: ControllerHandle) {
        debug!(
            "Closed controller '{}' (instance {})",
            controller.name(),
            controller.instance()
        );
    }

    fn key_down(&self, key: Key) -> bool {
        self.keyboard.is_down(key)
    }

    fn button_down(&self, controller: &ControllerHandle, button: NativeButton) -> bool {
        self.gamepad(controller.instance())
            .is_some_and(|gamepad| gamepad.is_pressed(map_button(button)))
    }

    fn axis(&self, controller: &ControllerHandle, axis: NativeAxis) -> i16 {
        let Some(gamepad) = self.gamepad(controller.instance()) else {
            return 0;
        };
        // gilrs sticks are positive-up; the host convention is positive-down
        match axis {
            NativeAxis::LeftX => to_i16(gamepad.value(Axis::LeftStickX)),
            NativeAxis::LeftY => to_i16(-gamepad.value(Axis::LeftStickY)),
            NativeAxis::RightX => to_i16(gamepad.value(Axis::RightStickX)),
            NativeAxis::RightY => to_i16(-gamepad.value(Axis::RightStickY)),
            NativeAxis::TriggerLeft => to_i16(trigger_value(&gamepad, Button::LeftTrigger2)),
            NativeAxis::TriggerRight => to_i16(trigger_value(&gamepad, Button::RightTrigger2)),
        }
    }

    fn new_effect(
        &mut self,
        haptic: &HapticHandle,
        effect: &RumbleEffect,
    ) -> Result<EffectId, HapticError> {
        let gamepad = self.gamepad_id(haptic.instance())?;
        let strong = self.motor_effect(
            gamepad,
            BaseEffectType::Strong {
                magnitude: u16::MAX,
            },
        )?;
        let weak = self.motor_effect(
            gamepad,
            BaseEffectType::Weak {
                magnitude: u16::MAX,
            },
        )?;

        let pair = RumblePair {
            instance: haptic.instance(),
            strong,
            weak,
        };
        apply_levels(&pair, effect)?;

        let id = EffectId(self.next_effect);
        self.next_effect += 1;
        self.effects.insert(id, pair);
        debug!("Created rumble effect {:?} for instance {}", id, haptic.instance());
        Ok(id)
    }

    fn run_effect(&mut self, _haptic: &HapticHandle, effect: EffectId) -> Result<(), HapticError> {
        let pair = self
            .effects
            .get(&effect)
            .ok_or(HapticError::UnknownEffect(effect))?;
        pair.strong
            .play()
            .map_err(|e| HapticError::EffectRejected(e.to_string()))?;
        pair.weak
            .play()
            .map_err(|e| HapticError::EffectRejected(e.to_string()))
    }

    fn update_effect(
        &mut self,
        _haptic: &HapticHandle,
        effect: EffectId,
        params: &RumbleEffect,
    ) -> Result<(), HapticError> {
        let pair = self
            .effects
            .get(&effect)
            .ok_or(HapticError::UnknownEffect(effect))?;
        apply_levels(pair, params)
    }
}

fn apply_levels(pair: &RumblePair, effect: &RumbleEffect) -> Result<(), HapticError> {
    pair.strong
        .set_gain(gain(effect.left))
        .map_err(|e| HapticError::EffectRejected(e.to_string()))?;
    pair.weak
        .set_gain(gain(effect.right))
        .map_err(|e| HapticError::EffectRejected(e.to_string()))
}

fn gain(level: u16) -> f32 {
    f32::from(level) / f32::from(u16::MAX)
}

fn trigger_value(gamepad: &Gamepad<'_>, button: Button) -> f32 {
    gamepad
        .button_data(button)
        .map(|data| data.value())
        .unwrap_or(0.0)
}

fn to_i16(value: f32) -> i16 {
    (value.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}

/// SDL-style GUID string: the 16 uuid bytes as lowercase hex.
fn guid_string(uuid: [u8; 16]) -> String {
    uuid.iter().map(|byte| format!("{:02x}", byte)).collect()
}

fn map_button(button: NativeButton) -> Button {
    match button {
        NativeButton::A => Button::South,
        NativeButton::B => Button::East,
        NativeButton::X => Button::West,
        NativeButton::Y => Button::North,
        NativeButton::Back => Button::Select,
        NativeButton::Guide => Button::Mode,
        NativeButton::Start => Button::Start,
        NativeButton::LeftStick => Button::LeftThumb,
        NativeButton::RightStick => Button::RightThumb,
        NativeButton::LeftShoulder => Button::LeftTrigger,
        NativeButton::RightShoulder => Button::RightTrigger,
        NativeButton::DPadUp => Button::DPadUp,
        NativeButton::DPadDown => Button::DPadDown,
        NativeButton::DPadLeft => Button::DPadLeft,
        NativeButton::DPadRight => Button::DPadRight,
    }
}
