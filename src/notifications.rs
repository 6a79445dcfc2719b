//! Short user-facing messages ("Connected 'Pad' to port 2").
//!
//! The input layer posts through [`NotificationSink`]; the HUD drains a
//! [`NotificationQueue`] and shows one message at a time.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

/// How long each message stays on screen.
pub const DISPLAY_DURATION: Duration = Duration::from_secs(4);

pub trait NotificationSink {
    fn post(&mut self, message: String);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub posted_at: DateTime<Local>,
}

/// Sending half, handed to the input layer.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: UnboundedSender<Notification>,
}

impl NotificationSink for ChannelSink {
    fn post(&mut self, message: String) {
        info!("{}", message);
        let notification = Notification {
            message,
            posted_at: Local::now(),
        };
        if self.sender.send(notification).is_err() {
            warn!("Notification dropped, the HUD is gone");
        }
    }
}

/// The message currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveNotification {
    pub notification: Notification,
    pub shown_at: Instant,
}

impl ActiveNotification {
    /// Remaining share of the display time, `1.0` down to `0.0`.
    pub fn remaining(&self, now: Instant) -> f32 {
        let shown = now.saturating_duration_since(self.shown_at);
        1.0 - (shown.as_secs_f32() / DISPLAY_DURATION.as_secs_f32()).min(1.0)
    }
}

pub struct NotificationQueue {
    receiver: UnboundedReceiver<Notification>,
    pending: VecDeque<Notification>,
    active: Option<ActiveNotification>,
}

pub fn channel() -> (ChannelSink, NotificationQueue) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (
        ChannelSink { sender },
        NotificationQueue {
            receiver,
            pending: VecDeque::new(),
            active: None,
        },
    )
}

impl NotificationQueue {
    /// Pulls new messages and returns the one to display at `now`, if any.
    pub fn poll(&mut self, now: Instant) -> Option<&ActiveNotification> {
        loop {
            match self.receiver.try_recv() {
                Ok(notification) => self.pending.push_back(notification),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        let expired = self
            .active
            .as_ref()
            .is_some_and(|active| now.saturating_duration_since(active.shown_at) >= DISPLAY_DURATION);
        if expired {
            self.active = None;
        }

        if self.active.is_none() {
            if let Some(notification) = self.pending.pop_front() {
                debug!("Showing notification: {}", notification.message);
                self.active = Some(ActiveNotification {
                    notification,
                    shown_at: now,
                });
            }
        }

        self.active.as_ref()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
