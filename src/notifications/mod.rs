// ABOUTME: Transient user-visible notifications raised by view operations
// ABOUTME: Notifier sink trait, per-request queue, and the per-browser flash store that carries them across redirects
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Flash storage keyed by browser
pub mod flash;

use std::sync::{Mutex, PoisonError};

use serde::Serialize;

pub use flash::FlashStore;

/// Severity of a notification, also used as its CSS class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// Action completed
    Success,
    /// Action failed or was refused
    Error,
}

/// One toast-style message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Severity
    pub level: NotificationLevel,
    /// Text shown to the user
    pub message: String,
}

impl Notification {
    /// Success message
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    /// Error message
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Sink view operations report user-facing outcomes to
pub trait Notifier: Send + Sync {
    /// Record one notification
    fn notify(&self, notification: Notification);

    /// Record a success message
    fn success(&self, message: &str) {
        self.notify(Notification::success(message));
    }

    /// Record an error message
    fn error(&self, message: &str) {
        self.notify(Notification::error(message));
    }
}

/// In-memory notifier collecting everything raised while handling one request
#[derive(Debug, Default)]
pub struct NotificationQueue {
    items: Mutex<Vec<Notification>>,
}

impl NotificationQueue {
    /// Empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every queued notification
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.items.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Copy of the queued notifications
    #[must_use]
    pub fn snapshot(&self) -> Vec<Notification> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of queued notifications
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing is queued
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for NotificationQueue {
    fn notify(&self, notification: Notification) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}
