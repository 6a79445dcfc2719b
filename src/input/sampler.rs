//! Per-tick sampling of every registered device.
//!
//! Two full passes per tick: input state for all devices first, then rumble
//! for all devices. Both passes are rate limited per device.

use std::time::{Duration, Instant};

use egui::Key;
use tracing::{debug, warn};

use super::context::InputContext;
use super::device::{
    Device, DeviceClass, PadState, AXIS_COUNT, AXIS_LSTICK_X, AXIS_LSTICK_Y, AXIS_LTRIG,
    AXIS_RSTICK_X, AXIS_RSTICK_Y, AXIS_RTRIG, BUTTON_COUNT,
};
use super::host::{ControllerHandle, InputHost, NativeAxis, NativeButton, RumbleEffect};

pub const MIN_INPUT_UPDATE_INTERVAL: Duration = Duration::from_micros(2500);
pub const MIN_HAPTIC_UPDATE_INTERVAL: Duration = Duration::from_micros(2500);

/// Key for each button bit, bit 0 first.
const KEYBOARD_BUTTON_MAP: [Key; BUTTON_COUNT] = [
    Key::A,
    Key::B,
    Key::X,
    Key::Y,
    Key::ArrowLeft,
    Key::ArrowUp,
    Key::ArrowRight,
    Key::ArrowDown,
    Key::Backspace,
    Key::Enter,
    Key::Num1,
    Key::Num2,
    Key::Num3,
    Key::Num4,
    Key::Num5,
];

//    W = LTrig          O = RTrig
//       E                  I
//    S     F            J     L
//       D                  K
// Applied in order; a later key wins on the same axis.
const KEYBOARD_AXIS_CHORDS: [(Key, usize, i16); 10] = [
    (Key::E, AXIS_LSTICK_Y, i16::MAX),
    (Key::S, AXIS_LSTICK_X, i16::MIN),
    (Key::F, AXIS_LSTICK_X, i16::MAX),
    (Key::D, AXIS_LSTICK_Y, i16::MIN),
    (Key::W, AXIS_LTRIG, i16::MAX),
    (Key::I, AXIS_RSTICK_Y, i16::MAX),
    (Key::J, AXIS_RSTICK_X, i16::MIN),
    (Key::L, AXIS_RSTICK_X, i16::MAX),
    (Key::K, AXIS_RSTICK_Y, i16::MIN),
    (Key::O, AXIS_RTRIG, i16::MAX),
];

const CONTROLLER_BUTTON_MAP: [NativeButton; BUTTON_COUNT] = [
    NativeButton::A,
    NativeButton::B,
    NativeButton::X,
    NativeButton::Y,
    NativeButton::DPadLeft,
    NativeButton::DPadUp,
    NativeButton::DPadRight,
    NativeButton::DPadDown,
    NativeButton::Back,
    NativeButton::Start,
    NativeButton::LeftShoulder,
    NativeButton::RightShoulder,
    NativeButton::LeftStick,
    NativeButton::RightStick,
    NativeButton::Guide,
];

const CONTROLLER_AXIS_MAP: [NativeAxis; AXIS_COUNT] = [
    NativeAxis::TriggerLeft,
    NativeAxis::TriggerRight,
    NativeAxis::LeftX,
    NativeAxis::LeftY,
    NativeAxis::RightX,
    NativeAxis::RightY,
];

impl InputContext {
    pub fn sample_all(&mut self) {
        self.sample_all_at(Instant::now());
    }

    /// One tick of sampling as of `now`.
    pub fn sample_all_at(&mut self, now: Instant) {
        for device in self.registry.iter_mut() {
            update_input(&*self.host, device, now);
        }
        for device in self.registry.iter_mut() {
            update_rumble(&mut *self.host, device, now);
        }
    }
}

fn due(last: Option<Instant>, now: Instant, min_interval: Duration) -> bool {
    match last {
        None => true,
        Some(last) => {
            let elapsed = if now >= last { now - last } else { last - now };
            elapsed >= min_interval
        }
    }
}

fn update_input(host: &dyn InputHost, device: &mut Device, now: Instant) {
    if !due(device.last_input_update, now, MIN_INPUT_UPDATE_INTERVAL) {
        return;
    }

    device.state = match (device.class, device.native.as_ref()) {
        (DeviceClass::Keyboard, _) => read_keyboard(host),
        (DeviceClass::GameController, Some(native)) => read_controller(host, &native.controller),
        (DeviceClass::GameController, None) => PadState::default(),
    };
    device.last_input_update = Some(now);
}

pub(crate) fn read_keyboard(host: &dyn InputHost) -> PadState {
    let mut state = PadState::default();

    for (bit, key) in KEYBOARD_BUTTON_MAP.iter().enumerate() {
        if host.key_down(*key) {
            state.buttons |= 1 << bit;
        }
    }
    for (key, axis, value) in KEYBOARD_AXIS_CHORDS {
        if host.key_down(key) {
            state.axes[axis] = value;
        }
    }

    state
}

pub(crate) fn read_controller(host: &dyn InputHost, controller: &ControllerHandle) -> PadState {
    let mut state = PadState::default();

    for (bit, button) in CONTROLLER_BUTTON_MAP.iter().enumerate() {
        if host.button_down(controller, *button) {
            state.buttons |= 1 << bit;
        }
    }
    for (slot, axis) in state.axes.iter_mut().zip(CONTROLLER_AXIS_MAP) {
        *slot = host.axis(controller, axis);
    }

    // Host reports sticks positive-down; -1 - v flips them without overflowing at i16::MIN
    state.axes[AXIS_LSTICK_Y] = !state.axes[AXIS_LSTICK_Y];
    state.axes[AXIS_RSTICK_Y] = !state.axes[AXIS_RSTICK_Y];

    state
}

fn update_rumble(host: &mut dyn InputHost, device: &mut Device, now: Instant) {
    let Some(native) = device.native.as_mut() else {
        return;
    };
    let Some(haptic) = native.haptic.as_ref() else {
        return;
    };
    if !due(device.last_haptic_update, now, MIN_HAPTIC_UPDATE_INTERVAL) {
        return;
    }

    let effect = RumbleEffect {
        left: device.rumble_left,
        right: device.rumble_right,
    };

    match device.effect {
        Some(id) => {
            if let Err(e) = host.update_effect(haptic, id, &effect) {
                warn!("Failed to update rumble on '{}': {}", device.name, e);
            }
        }
        None => match host.new_effect(haptic, &effect) {
            Ok(id) => {
                if let Err(e) = host.run_effect(haptic, id) {
                    warn!("Failed to start rumble on '{}': {}", device.name, e);
                }
                device.effect = Some(id);
            }
            Err(e) => {
                warn!("Rumble disabled for '{}': {}", device.name, e);
                if let Some(haptic) = native.haptic.take() {
                    host.close_haptic(haptic);
                }
                return;
            }
        },
    }

    device.last_haptic_update = Some(now);
    debug!(
        "Rumble {}/{} pushed to '{}'",
        effect.left, effect.right, device.name
    );
}
