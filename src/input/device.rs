use std::fmt;
use std::time::Instant;

use crate::emulation::EmulatedDevice;

use super::binding::Port;
use super::host::{ControllerHandle, EffectId, HapticHandle, InstanceId};

pub const BUTTON_COUNT: usize = 15;
pub const AXIS_COUNT: usize = 6;

// Button bits, in the order the emulated gamepad reports them
pub const BUTTON_A: u16 = 1 << 0;
pub const BUTTON_B: u16 = 1 << 1;
pub const BUTTON_X: u16 = 1 << 2;
pub const BUTTON_Y: u16 = 1 << 3;
pub const BUTTON_DPAD_LEFT: u16 = 1 << 4;
pub const BUTTON_DPAD_UP: u16 = 1 << 5;
pub const BUTTON_DPAD_RIGHT: u16 = 1 << 6;
pub const BUTTON_DPAD_DOWN: u16 = 1 << 7;
pub const BUTTON_BACK: u16 = 1 << 8;
pub const BUTTON_START: u16 = 1 << 9;
pub const BUTTON_WHITE: u16 = 1 << 10;
pub const BUTTON_BLACK: u16 = 1 << 11;
pub const BUTTON_LSTICK: u16 = 1 << 12;
pub const BUTTON_RSTICK: u16 = 1 << 13;
pub const BUTTON_GUIDE: u16 = 1 << 14;

pub const BUTTON_NAMES: [&str; BUTTON_COUNT] = [
    "A", "B", "X", "Y", "Left", "Up", "Right", "Down", "Back", "Start", "White", "Black",
    "LStick", "RStick", "Guide",
];

pub const AXIS_LTRIG: usize = 0;
pub const AXIS_RTRIG: usize = 1;
pub const AXIS_LSTICK_X: usize = 2;
pub const AXIS_LSTICK_Y: usize = 3;
pub const AXIS_RSTICK_X: usize = 4;
pub const AXIS_RSTICK_Y: usize = 5;

pub const AXIS_NAMES: [&str; AXIS_COUNT] = ["LTrig", "RTrig", "LStickX", "LStickY", "RStickX", "RStickY"];

/// Identity string stored for the keyboard in place of a controller GUID.
pub const KEYBOARD_IDENTITY: &str = "keyboard";

/// Buttons and axes of one device, as the emulated gamepad sees them.
///
/// Stick axes are positive-right and positive-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PadState {
    pub buttons: u16,
    pub axes: [i16; AXIS_COUNT],
}

impl PadState {
    pub fn is_pressed(&self, mask: u16) -> bool {
        self.buttons & mask != 0
    }

    pub fn axis(&self, index: usize) -> i16 {
        self.axes[index]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Keyboard,
    GameController,
}

/// Registry key of a device. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(u64);

impl DeviceId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Native handles owned by a controller device for its whole lifetime.
#[derive(Debug)]
pub(crate) struct NativeHandles {
    pub(crate) controller: ControllerHandle,
    pub(crate) haptic: Option<HapticHandle>,
}

/// A physical input device known to the registry.
#[derive(Debug)]
pub struct Device {
    pub(crate) id: DeviceId,
    pub(crate) class: DeviceClass,
    pub(crate) name: String,
    pub(crate) identity: String,
    pub(crate) native: Option<NativeHandles>,

    pub(crate) state: PadState,
    pub(crate) last_input_update: Option<Instant>,
    pub(crate) last_haptic_update: Option<Instant>,

    pub(crate) rumble_left: u16,
    pub(crate) rumble_right: u16,
    pub(crate) effect: Option<EffectId>,

    pub(crate) bound: Option<Port>,
    pub(crate) emulated: Option<EmulatedDevice>,
}

impl Device {
    pub(crate) fn keyboard(id: DeviceId) -> Self {
        Self::with_identity(id, DeviceClass::Keyboard, "Keyboard", KEYBOARD_IDENTITY, None)
    }

    pub(crate) fn controller(
        id: DeviceId,
        controller: ControllerHandle,
        haptic: Option<HapticHandle>,
    ) -> Self {
        let name = controller.name().to_string();
        let identity = controller.guid().to_string();
        Self::with_identity(
            id,
            DeviceClass::GameController,
            name,
            identity,
            Some(NativeHandles { controller, haptic }),
        )
    }

    fn with_identity(
        id: DeviceId,
        class: DeviceClass,
        name: impl Into<String>,
        identity: impl Into<String>,
        native: Option<NativeHandles>,
    ) -> Self {
        Self {
            id,
            class,
            name: name.into(),
            identity: identity.into(),
            native,
            state: PadState::default(),
            last_input_update: None,
            last_haptic_update: None,
            rumble_left: 0,
            rumble_right: 0,
            effect: None,
            bound: None,
            emulated: None,
        }
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn class(&self) -> DeviceClass {
        self.class
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Controller GUID, or [`KEYBOARD_IDENTITY`].
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn bound(&self) -> Option<Port> {
        self.bound
    }

    pub fn state(&self) -> &PadState {
        &self.state
    }

    /// `(left, right)` motor levels requested by the emulated gamepad.
    pub fn rumble(&self) -> (u16, u16) {
        (self.rumble_left, self.rumble_right)
    }

    pub fn has_rumble(&self) -> bool {
        self.native
            .as_ref()
            .is_some_and(|native| native.haptic.is_some())
    }

    pub fn instance(&self) -> Option<InstanceId> {
        self.native
            .as_ref()
            .map(|native| native.controller.instance())
    }

    pub fn emulated(&self) -> Option<EmulatedDevice> {
        self.emulated
    }

    pub fn last_input_update(&self) -> Option<Instant> {
        self.last_input_update
    }

    pub fn last_haptic_update(&self) -> Option<Instant> {
        self.last_haptic_update
    }
}
