// ABOUTME: Flash notification store keyed by the per-browser client cookie
// ABOUTME: Notifications raised by a POST survive the redirect and are shown once by the next page
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use lru::LruCache;
use recipe_core::constants::defaults;

use super::Notification;

/// Oldest entries are dropped beyond this many pending notifications per browser
const MAX_PENDING_PER_CLIENT: usize = 16;

/// Pending notifications per client key
///
/// Bounded: once more than the capacity of browsers have something pending,
/// the least recently touched browser loses its notifications.
#[derive(Debug)]
pub struct FlashStore {
    pending: Mutex<LruCache<String, Vec<Notification>>>,
}

impl FlashStore {
    const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(defaults::MAX_TRACKED_BROWSERS)
    {
        Some(n) => n,
        None => NonZeroUsize::MIN,
    };

    /// Empty store holding up to the default number of browsers
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Empty store holding up to `capacity` browsers
    #[must_use]
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            pending: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn pending(&self) -> MutexGuard<'_, LruCache<String, Vec<Notification>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue notifications for the next page `client_key` renders
    pub fn push_all(&self, client_key: &str, notifications: Vec<Notification>) {
        if notifications.is_empty() {
            return;
        }
        let mut pending = self.pending();
        let entry = pending.get_or_insert_mut(client_key.to_owned(), Vec::new);
        entry.extend(notifications);
        let overflow = entry.len().saturating_sub(MAX_PENDING_PER_CLIENT);
        if overflow > 0 {
            entry.drain(..overflow);
        }
    }

    /// Remove and return everything pending for `client_key`
    #[must_use]
    pub fn take(&self, client_key: &str) -> Vec<Notification> {
        self.pending().pop(client_key).unwrap_or_default()
    }

    /// Browsers with something pending
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending().len()
    }

    /// Nothing pending for anyone
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending().is_empty()
    }
}

impl Default for FlashStore {
    fn default() -> Self {
        Self::new()
    }
}
