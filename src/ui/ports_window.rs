//! Port selector window: pick one of the four ports, then the device for it.

use eframe::egui::{self, ComboBox, Context, RichText, Ui};
use tracing::{error, info};

use crate::input::device::{BUTTON_DPAD_LEFT, BUTTON_DPAD_RIGHT};
use crate::input::{DeviceId, HudNavigation, InputContext, Port};

use super::common::{pad_state_readout, section_frame, UiColors};

const NOT_CONNECTED: &str = "Not connected";

pub struct PortsWindow {
    pub open: bool,
    active: Port,
    // Buttons held on the previous frame, for edge-triggered port switching
    held: u16,
}

impl Default for PortsWindow {
    fn default() -> Self {
        Self {
            open: false,
            active: Port::ALL[0],
            held: 0,
        }
    }
}

impl PortsWindow {
    pub fn active(&self) -> Port {
        self.active
    }

    /// D-pad left/right steps through the ports while the window is open.
    pub fn navigate(&mut self, nav: &HudNavigation) {
        let pressed = nav.buttons & !self.held;
        self.held = nav.buttons;
        if !self.open {
            return;
        }

        let index = self.active.index();
        if pressed & BUTTON_DPAD_LEFT != 0 && index > 0 {
            self.active = Port::ALL[index - 1];
        }
        if pressed & BUTTON_DPAD_RIGHT != 0 && index + 1 < Port::COUNT {
            self.active = Port::ALL[index + 1];
        }
    }

    pub fn show(&mut self, ctx: &Context, input: &mut InputContext) {
        let mut open = self.open;
        egui::Window::new("Input Settings")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                self.port_selector(ui, input);
                ui.separator();
                self.device_selector(ui, input);
                ui.separator();
                match input.get_bound(self.active) {
                    Some(device) => section_frame().show(ui, |ui| {
                        ui.label(RichText::new(device.name()).strong());
                        pad_state_readout(ui, device.state());
                    }),
                    None => section_frame().show(ui, |ui| {
                        ui.label("Please select an available input device");
                    }),
                };
            });
        self.open = open;
    }

    fn port_selector(&mut self, ui: &mut Ui, input: &InputContext) {
        ui.columns(Port::COUNT, |columns| {
            for (column, port) in columns.iter_mut().zip(Port::ALL) {
                let bound = input.get_bound(port).is_some();
                column.vertical_centered(|ui| {
                    let label = RichText::new(format!("Port {}", port.number())).color(if bound {
                        UiColors::ACTIVE
                    } else {
                        UiColors::INACTIVE
                    });
                    if ui.selectable_label(self.active == port, label).clicked() {
                        self.active = port;
                    }
                });
            }
        });
    }

    fn device_selector(&mut self, ui: &mut Ui, input: &mut InputContext) {
        let current = input.ports().get(self.active);
        let mut choice = current;

        let selected_text = input
            .get_bound(self.active)
            .map(|device| device.name().to_string())
            .unwrap_or_else(|| NOT_CONNECTED.to_string());

        let entries: Vec<(DeviceId, String)> = input
            .devices()
            .map(|device| {
                let label = match device.bound() {
                    Some(port) => format!("{} (Port {})", device.name(), port.number()),
                    None => device.name().to_string(),
                };
                (device.id(), label)
            })
            .collect();

        ui.horizontal(|ui| {
            ui.label("Input Devices");
            ComboBox::from_id_salt("input_devices")
                .selected_text(selected_text)
                .width(260.0)
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut choice, None, NOT_CONNECTED);
                    for (id, label) in &entries {
                        ui.selectable_value(&mut choice, Some(*id), label.as_str());
                    }
                });
        });

        if choice != current {
            info!("Rebinding {} from the HUD", self.active);
            if let Err(e) = input.bind(self.active, choice, true) {
                error!("Bind request failed: {}", e);
            }
        }
    }
}
