//! # HUD
//!
//! Small egui front end over the input manager. Every frame it:
//!
//! 1. hands the window's key state to the host,
//! 2. pumps hotplug events and runs one sampler tick,
//! 3. opens the port window on the menu chord (Guide, or Back+Start),
//! 4. draws the port overview and the current notification.
//!
//! While the port window is open (or a widget has keyboard focus) the input
//! manager is in focus capture mode, so the guest sees neutral pads.

pub mod common;
pub mod ports_window;

use std::time::{Duration, Instant};

use eframe::egui::{self, Align2, Context, RichText, Vec2};
use tracing::info;

use crate::input::{InputManager, KeyboardFeed, Port, Running};
use crate::notifications::NotificationQueue;
use crate::persistence::HudConfig;

use self::common::{pad_state_readout, section_frame, UiColors};
use self::ports_window::PortsWindow;

pub struct HudApp {
    // Taken on drop to run the shutdown transition
    input: Option<InputManager<Running>>,
    keyboard: KeyboardFeed,
    notifications: NotificationQueue,
    ports_window: PortsWindow,
    config: HudConfig,
    menu_held: bool,
}

impl HudApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        input: InputManager<Running>,
        keyboard: KeyboardFeed,
        notifications: NotificationQueue,
        config: HudConfig,
    ) -> Self {
        cc.egui_ctx.set_theme(egui::Theme::Dark);
        Self {
            input: Some(input),
            keyboard,
            notifications,
            ports_window: PortsWindow::default(),
            config,
            menu_held: false,
        }
    }

    fn frame_interval(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.config.fps.max(1) as f32)
    }

    fn show_overview(&self, ctx: &Context) {
        let Some(input) = self.input.as_ref() else {
            return;
        };

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Controller Ports");
                if input.focus_capture_mode() {
                    ui.colored_label(UiColors::INACTIVE, "(input captured by HUD)");
                }
            });
            ui.label("Press Guide or Back+Start to change bindings.");
            ui.add_space(8.0);

            ui.columns(Port::COUNT, |columns| {
                for (column, port) in columns.iter_mut().zip(Port::ALL) {
                    section_frame().show(column, |ui| {
                        ui.label(RichText::new(format!("Port {}", port.number())).strong());
                        match input.get_bound(port) {
                            Some(device) => {
                                ui.colored_label(UiColors::ACTIVE, device.name());
                                if self.config.show_readout {
                                    pad_state_readout(ui, device.state());
                                }
                            }
                            None => {
                                ui.colored_label(UiColors::INACTIVE, "Not connected");
                            }
                        }
                    });
                }
            });
        });
    }

    fn show_notification(&mut self, ctx: &Context) {
        let now = Instant::now();
        let Some(active) = self.notifications.poll(now) else {
            return;
        };

        let opacity = active.remaining(now).sqrt();
        egui::Area::new(egui::Id::new("notification"))
            .anchor(Align2::CENTER_BOTTOM, Vec2::new(0.0, -24.0))
            .interactable(false)
            .show(ctx, |ui| {
                ui.set_opacity(opacity);
                egui::Frame::new()
                    .fill(UiColors::TOAST_BG)
                    .stroke(egui::Stroke::new(1.0, UiColors::BORDER))
                    .inner_margin(10.0)
                    .corner_radius(6.0)
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.colored_label(
                                UiColors::INACTIVE,
                                active.notification.posted_at.format("%H:%M:%S").to_string(),
                            );
                            ui.label(active.notification.message.as_str());
                        });
                    });
            });
    }
}

impl eframe::App for HudApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let widget_focused = ctx.memory(|memory| memory.focused().is_some());
        self.keyboard.replace(ctx.input(|i| i.keys_down.clone()));

        if let Some(input) = self.input.as_mut() {
            input.pump_events();
            input.sample_all();

            let nav = input.hud_navigation();
            if nav.menu_requested && !self.menu_held {
                self.ports_window.open = !self.ports_window.open;
            }
            self.menu_held = nav.menu_requested;
            self.ports_window.navigate(&nav);

            input.set_focus_capture_mode(self.ports_window.open || widget_focused);
            self.ports_window.show(ctx, input);
        }

        self.show_overview(ctx);
        self.show_notification(ctx);

        ctx.request_repaint_after(self.frame_interval());
    }
}

impl Drop for HudApp {
    fn drop(&mut self) {
        if let Some(input) = self.input.take() {
            info!("HUD closed");
            input.shutdown();
        }
    }
}
