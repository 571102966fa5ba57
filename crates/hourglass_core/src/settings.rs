//! Scheduler Settings
//!
//! Configuration consumed by [`FrameScheduler::with_settings`](crate::FrameScheduler::with_settings).
//!
//! ```rust,ignore
//! use hourglass_core::SchedulerSettings;
//!
//! // Defaults: normal speed, no delta clamping
//! let settings = SchedulerSettings::default();
//!
//! // Slow motion, never advance more than a quarter second per frame
//! let settings = SchedulerSettings {
//!     time_scale: 0.5,
//!     max_delta: Some(0.25),
//! };
//!
//! // Or from a config file
//! let settings = SchedulerSettings::from_json_str(r#"{ "time_scale": 2.0 }"#)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{HourglassError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Initial global time scale. `0.0` freezes scaled time.
    pub time_scale: f32,

    /// Upper bound for the raw delta of a single frame, in seconds.
    ///
    /// Protects timers from a huge jump after the host stalls (debugger
    /// breakpoints, window drags). `None` disables clamping.
    pub max_delta: Option<f32>,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            max_delta: None,
        }
    }
}

impl SchedulerSettings {
    /// Parses and validates settings from JSON. Missing fields take their
    /// default values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            return Err(HourglassError::InvalidSettings(format!(
                "time_scale must be finite and non-negative, got {}",
                self.time_scale
            )));
        }
        if let Some(max_delta) = self.max_delta
            && !(max_delta.is_finite() && max_delta > 0.0)
        {
            return Err(HourglassError::InvalidSettings(format!(
                "max_delta must be positive, got {max_delta}"
            )));
        }
        Ok(())
    }

    /// Applies `max_delta` to a raw frame delta.
    #[inline]
    #[must_use]
    pub fn clamp_delta(&self, raw_delta: f32) -> f32 {
        match self.max_delta {
            Some(max_delta) => raw_delta.min(max_delta),
            None => raw_delta,
        }
    }
}
