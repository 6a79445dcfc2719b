//! Colors and small drawing helpers shared by the HUD panels.

use eframe::egui::{self, Color32, Frame, Stroke, Ui};

use crate::input::device::{AXIS_NAMES, BUTTON_NAMES};
use crate::input::PadState;

pub struct UiColors;

impl UiColors {
    pub const MAIN_BG: Color32 = Color32::from_rgb(30, 30, 30);
    pub const INNER_BG: Color32 = Color32::from_rgb(25, 25, 25);
    pub const BORDER: Color32 = Color32::from_rgb(60, 60, 60);
    pub const ACTIVE: Color32 = Color32::from_rgb(50, 200, 20);
    pub const INACTIVE: Color32 = Color32::from_rgb(110, 110, 110);
    pub const TOAST_BG: Color32 = Color32::from_rgba_premultiplied(20, 20, 20, 230);
}

pub fn section_frame() -> Frame {
    Frame::new()
        .stroke(Stroke::new(1.0, UiColors::BORDER))
        .fill(UiColors::MAIN_BG)
        .inner_margin(8.0)
        .outer_margin(2.0)
}

/// Pressed buttons highlighted, then one bar per axis.
pub fn pad_state_readout(ui: &mut Ui, state: &PadState) {
    ui.horizontal_wrapped(|ui| {
        for (bit, name) in BUTTON_NAMES.iter().enumerate() {
            let color = if state.is_pressed(1 << bit) {
                UiColors::ACTIVE
            } else {
                UiColors::INACTIVE
            };
            ui.colored_label(color, *name);
        }
    });

    egui::Grid::new(ui.id().with("axes"))
        .num_columns(2)
        .show(ui, |ui| {
            for (index, name) in AXIS_NAMES.iter().enumerate() {
                let value = state.axis(index);
                ui.label(*name);
                ui.add(
                    egui::ProgressBar::new(axis_fill(value))
                        .desired_width(160.0)
                        .text(value.to_string()),
                );
                ui.end_row();
            }
        });
}

/// Maps `i16::MIN..=i16::MAX` onto `0.0..=1.0`.
fn axis_fill(value: i16) -> f32 {
    (f32::from(value) - f32::from(i16::MIN)) / (f32::from(i16::MAX) - f32::from(i16::MIN))
}
