// ABOUTME: View lifetime with a generation counter handing out fetch tokens
// ABOUTME: Responses carrying an outdated token (re-mount, unmount, newer fetch) are discarded
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Generation a fetch was started in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchToken(u64);

/// Tracks whether a view is mounted and which fetch generation is current
#[derive(Debug, Default)]
pub struct ViewLifetime {
    generation: AtomicU64,
    mounted: AtomicBool,
}

impl ViewLifetime {
    /// Unmounted lifetime
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch generation, superseding every earlier token
    pub fn begin(&self) -> FetchToken {
        self.mounted.store(true, Ordering::SeqCst);
        FetchToken(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Token of the current generation without superseding it
    ///
    /// Used by follow-up fetches (a comment re-fetch) that must not cancel a
    /// concurrent mount.
    #[must_use]
    pub fn current(&self) -> FetchToken {
        FetchToken(self.generation.load(Ordering::SeqCst))
    }

    /// Invalidate every outstanding token
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Whether a response carrying `token` may still be applied
    #[must_use]
    pub fn is_current(&self, token: FetchToken) -> bool {
        self.mounted.load(Ordering::SeqCst) && self.generation.load(Ordering::SeqCst) == token.0
    }

    /// Whether the view is mounted
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }
}
