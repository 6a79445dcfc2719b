//! Input-device lifecycle and port binding for an emulator front-end.
//!
//! Physical devices (the keyboard plus hot-plugged game controllers) live in a
//! [`input::DeviceRegistry`]. Up to four of them are bound to emulated
//! controller ports, each binding plugging an emulated gamepad into the
//! emulation core's [`emulation::DeviceTree`]. Bindings are remembered per
//! port in the [`persistence::SettingsStore`] and recalled when a device with
//! the same identity shows up again.
//!
//! ```text
//! InputHost events ──► hotplug ──► DeviceRegistry ──► default bind ──► PortTable
//!                                                                        │
//!        sample_all (input pass, then rumble pass) ◄─────────────────────┘
//! ```

pub mod emulation;
pub mod input;
pub mod notifications;
pub mod persistence;
pub mod ui;
