use color_eyre::{eyre::eyre, Result};
use eframe::egui;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use padbind::emulation::VirtualUsbBus;
use padbind::input::{GilrsHost, InputManager, KeyboardFeed};
use padbind::notifications;
use padbind::persistence::{HudConfig, SettingsFile};
use padbind::ui::HudApp;

fn main() -> Result<()> {
    setup()?;

    let settings = SettingsFile::load_default()?;
    info!("Using settings at {}", settings.path().display());
    let hud_config: HudConfig = settings.section("ui");

    let keyboard = KeyboardFeed::default();
    let host = GilrsHost::new(keyboard.clone())?;
    let (sink, queue) = notifications::channel();

    let input = InputManager::create(
        Box::new(host),
        Box::new(settings),
        Box::new(VirtualUsbBus::new()),
        Box::new(sink),
    )
    .initialize();

    info!("Starting HUD");
    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = egui::ViewportBuilder::default()
        .with_title("padbind")
        .with_inner_size([960.0, 540.0]);

    eframe::run_native(
        "padbind",
        native_options,
        Box::new(|cc| Ok(Box::new(HudApp::new(cc, input, keyboard, queue, hud_config)))),
    )
    .map_err(|e| eyre!("HUD exited with an error: {}", e))?;

    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
