//! Error Types
//!
//! This module defines the error types used by the scheduler and its
//! configuration layer.
//!
//! # Overview
//!
//! Timer operations themselves never fail: redundant calls are no-ops and
//! negative durations are normalised. [`HourglassError`] therefore only covers
//! the host boundary:
//! - Suspension points that observed a cancelled token
//! - Spawning work after the owning [`FrameScheduler`](crate::FrameScheduler) was dropped
//! - Loading and validating [`SchedulerSettings`](crate::SchedulerSettings)
//!
//! # Usage
//!
//! ```rust,ignore
//! use hourglass_core::errors::Result;
//!
//! fn schedule(scheduler: &Scheduler) -> Result<()> {
//!     scheduler.spawn(async { /* ... */ })?;
//!     Ok(())
//! }
//! ```

use futures::task::SpawnError;
use thiserror::Error;

/// The main error type for the Hourglass crates.
#[derive(Error, Debug)]
pub enum HourglassError {
    // ========================================================================
    // Scheduling
    // ========================================================================
    /// A suspension point resumed after its cancellation token was signalled.
    #[error("Operation was cancelled")]
    Cancelled,

    /// The frame scheduler backing this handle no longer exists.
    #[error("Frame scheduler has shut down: {0}")]
    SchedulerShutdown(#[from] SpawnError),

    // ========================================================================
    // Configuration
    // ========================================================================
    /// A settings value is outside its accepted range.
    #[error("Invalid scheduler settings: {0}")]
    InvalidSettings(String),

    /// Settings JSON could not be parsed.
    #[error("Failed to parse scheduler settings: {0}")]
    SettingsParse(#[from] serde_json::Error),
}

impl HourglassError {
    /// Returns `true` for the cooperative-cancellation case, which callers
    /// usually treat as a normal termination rather than a failure.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Alias for `std::result::Result<T, HourglassError>`.
pub type Result<T> = std::result::Result<T, HourglassError>;
