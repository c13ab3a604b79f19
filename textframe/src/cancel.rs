// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cooperative cancellation.

use core::sync::atomic::{AtomicBool, Ordering};

/// A flag that can be polled by long running layout and drawing operations.
///
/// Once set, a flag stays set. Layout checks the flag between paragraphs, lines and scale
/// candidates and gives up without producing a result.
#[derive(Debug, Default)]
pub struct CancellationFlag {
    cancelled: AtomicBool,
}

impl CancellationFlag {
    /// Creates a flag that is not set.
    pub const fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
        }
    }

    /// Sets the flag.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Returns `true` if [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

pub(crate) fn is_cancelled(flag: Option<&CancellationFlag>) -> bool {
    flag.is_some_and(CancellationFlag::is_cancelled)
}
