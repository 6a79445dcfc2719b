use super::context::InputContext;
use super::device::{DeviceClass, AXIS_COUNT, BUTTON_BACK, BUTTON_GUIDE, BUTTON_START};

/// Axis deflection (about 10 %) needed before a stick counts for HUD navigation.
pub const NAV_AXIS_THRESHOLD: i16 = 3276;

/// Controller input merged across every attached controller, for driving the HUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HudNavigation {
    pub buttons: u16,
    pub axes: [i16; AXIS_COUNT],
    /// Guide, or Back+Start on pads without a guide button.
    pub menu_requested: bool,
}

impl InputContext {
    /// Uses the state from the latest sampler pass; the keyboard is left out.
    pub fn hud_navigation(&self) -> HudNavigation {
        let mut nav = HudNavigation::default();

        for device in self
            .registry
            .iter()
            .filter(|device| device.class == DeviceClass::GameController)
        {
            nav.buttons |= device.state.buttons;
            for (merged, &value) in nav.axes.iter_mut().zip(device.state.axes.iter()) {
                if value > NAV_AXIS_THRESHOLD || value < -NAV_AXIS_THRESHOLD {
                    *merged = value;
                }
            }
        }

        let back_start = BUTTON_BACK | BUTTON_START;
        nav.menu_requested =
            nav.buttons & BUTTON_GUIDE != 0 || nav.buttons & back_start == back_start;
        nav
    }
}
