// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation and progress reporting for long-running operations.
///
/// Cancellation is polled between work items (signs or pages);
/// a shortest-path search in flight always runs to completion.
pub trait Feedback {
    fn is_canceled(&self) -> bool {
        false
    }

    /// Reports progress, as a percentage in the range `[0, 100]`.
    fn set_progress(&self, _percent: f64) {}
}

/// [Feedback] which never cancels and ignores progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFeedback;

impl Feedback for NoFeedback {}

impl Feedback for AtomicBool {
    fn is_canceled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}
