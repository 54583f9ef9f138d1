//! Progress reporting and cancellation support.
//!
//! This module provides [`ProgressCallback`] for observing batch progress and
//! [`CancellationToken`] for cooperative cancellation. The orchestrator
//! reports once per processed combination and checks the token between
//! combinations, never mid-video, so a cancelled batch always leaves whole
//! per-video outputs behind.
//!
//! # Example
//!
//! ```
//! use webcat::{BatchProgress, ProgressCallback};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, progress: &BatchProgress) {
//!         println!("{}/{} {}", progress.completed, progress.total, progress.name);
//!     }
//! }
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// A snapshot of batch progress, delivered after each combination.
#[derive(Debug, Clone)]
pub struct BatchProgress {
    /// Derived name of the combination just processed.
    pub name: String,
    /// Combinations processed so far, including this one.
    pub completed: u64,
    /// Total combinations in the batch.
    pub total: u64,
    /// Frames saved for this combination (`0` when it failed).
    pub frames_saved: u64,
    /// Whether this combination succeeded.
    pub succeeded: bool,
}

/// Trait for receiving progress updates while a batch runs.
///
/// Implementations must be [`Send`] and [`Sync`] so a token-holding thread
/// can observe progress while the batch runs elsewhere.
///
/// Callbacks observe the batch; they cannot halt it. Stopping early is the
/// job of a [`CancellationToken`].
pub trait ProgressCallback: Send + Sync {
    /// Called once after each combination completes or fails.
    fn on_progress(&self, progress: &BatchProgress);
}

/// A no-op implementation that discards all progress notifications.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _progress: &BatchProgress) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clone the token and share it between threads; call
/// [`cancel`](CancellationToken::cancel) from any thread to stop the batch
/// after the combination currently in flight finishes. Previously persisted
/// outputs are left intact.
///
/// # Example
///
/// ```
/// use webcat::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    ///
    /// All clones of this token will observe the cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
