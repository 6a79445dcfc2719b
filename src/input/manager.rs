//! Input manager with a statum lifecycle.
//!
//! ```text
//! Uninitialized ──initialize()──► Running ──shutdown()──► Uninitialized
//! ```
//!
//! Only a `Running` manager exposes the binding surface (through `Deref` to
//! [`InputContext`]), so nothing can bind or sample before the keyboard is
//! registered.

use statum::{machine, state};
use std::ops::{Deref, DerefMut};
use tracing::info;

use crate::emulation::DeviceTree;
use crate::notifications::NotificationSink;
use crate::persistence::SettingsStore;

use super::context::InputContext;
use super::host::InputHost;

#[state]
#[derive(Debug, Clone)]
pub enum ManagerState {
    Uninitialized,
    Running,
}

#[machine]
pub struct InputManager<S: ManagerState> {
    context: InputContext,
}

impl InputManager<Uninitialized> {
    pub fn create(
        host: Box<dyn InputHost>,
        settings: Box<dyn SettingsStore>,
        device_tree: Box<dyn DeviceTree>,
        notifications: Box<dyn NotificationSink>,
    ) -> Self {
        Self::new(InputContext::new(host, settings, device_tree, notifications))
    }

    /// Resets the registry and table, registers the keyboard and tries its default port.
    pub fn initialize(mut self) -> InputManager<Running> {
        info!("Initializing input manager");
        self.context.reset();
        self.context.install_keyboard();
        self.transition()
    }
}

impl InputManager<Running> {
    /// Unplugs every port (saved bindings stay) and releases all native handles.
    pub fn shutdown(mut self) -> InputManager<Uninitialized> {
        info!("Shutting down input manager");
        self.context.reset();
        self.transition()
    }
}

impl Deref for InputManager<Running> {
    type Target = InputContext;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

impl DerefMut for InputManager<Running> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.context
    }
}
