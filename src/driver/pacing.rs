use crate::foundation::error::{StageError, StageResult};

/// Fallback interval when the display does not report one.
pub const DEFAULT_FRAME_INTERVAL: f64 = 1.0 / 60.0;

/// Frame pacing parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Seconds between frames. `0` follows the display refresh, negative is uncapped.
    pub target_interval_secs: f64,
    /// Remaining wait below which the driver returns without sleeping.
    pub sleep_threshold_secs: f64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            target_interval_secs: 0.0,
            sleep_threshold_secs: 0.002,
        }
    }
}

impl PacingConfig {
    /// Fixed rate of `fps` frames per second.
    pub fn fixed_fps(fps: f64) -> StageResult<Self> {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(StageError::validation("fps must be finite and > 0"));
        }
        Ok(Self {
            target_interval_secs: 1.0 / fps,
            ..Self::default()
        })
    }

    /// Draw as often as `pump` is called.
    pub fn uncapped() -> Self {
        Self {
            target_interval_secs: -1.0,
            ..Self::default()
        }
    }

    /// Reject non-finite values and negative thresholds.
    pub fn validate(&self) -> StageResult<()> {
        if !self.target_interval_secs.is_finite() {
            return Err(StageError::validation("pacing interval must be finite"));
        }
        if !(self.sleep_threshold_secs.is_finite() && self.sleep_threshold_secs >= 0.0) {
            return Err(StageError::validation(
                "pacing sleep threshold must be finite and >= 0",
            ));
        }
        Ok(())
    }

    /// Interval in effect: `None` when uncapped.
    pub fn resolve_interval(&self, display_refresh: Option<f64>) -> Option<f64> {
        if self.target_interval_secs < 0.0 {
            return None;
        }
        if self.target_interval_secs > 0.0 {
            return Some(self.target_interval_secs);
        }
        Some(
            display_refresh
                .filter(|r| r.is_finite() && *r > 0.0)
                .unwrap_or(DEFAULT_FRAME_INTERVAL),
        )
    }
}

/// What the pacer says about the current instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Poll {
    /// A frame is due; `dt` is the time since the previous frame started.
    Due {
        /// Seconds since the previous frame, 0 for the first.
        dt: f64,
    },
    /// Too early. Sleep for `sleep` seconds when present, otherwise return immediately.
    Wait {
        /// Suggested sleep.
        sleep: Option<f64>,
    },
}

/// Deadline tracking for a fixed or uncapped frame rate.
#[derive(Clone, Debug)]
pub struct FramePacer {
    interval: Option<f64>,
    sleep_threshold: f64,
    next_due: Option<f64>,
    last_frame: Option<f64>,
    resyncs: u64,
}

impl FramePacer {
    /// Pacer with a resolved interval (`None` = uncapped).
    pub fn new(interval: Option<f64>, sleep_threshold: f64) -> Self {
        Self {
            interval,
            sleep_threshold,
            next_due: None,
            last_frame: None,
            resyncs: 0,
        }
    }

    /// Interval in effect.
    pub fn interval(&self) -> Option<f64> {
        self.interval
    }

    /// Deadline of the next frame, once the first frame has run.
    pub fn next_due(&self) -> Option<f64> {
        self.next_due
    }

    /// How often the deadline was pulled forward after a stall.
    pub fn resyncs(&self) -> u64 {
        self.resyncs
    }

    /// Whether a frame is due at `now`.
    pub fn poll(&self, now: f64) -> Poll {
        let dt = self.last_frame.map_or(0.0, |last| (now - last).max(0.0));
        match self.next_due {
            Some(due) if now < due => {
                let remaining = due - now;
                let sleep = (remaining > self.sleep_threshold)
                    .then_some(remaining - self.sleep_threshold);
                Poll::Wait { sleep }
            }
            _ => Poll::Due { dt },
        }
    }

    /// Record a frame started at `now` and schedule the next deadline.
    ///
    /// The deadline advances by one interval. When that is still in the past the driver
    /// fell behind by more than a frame, so the deadline restarts from `now` instead of
    /// bursting through the missed frames.
    pub fn commit(&mut self, now: f64) {
        self.last_frame = Some(now);
        let Some(interval) = self.interval else {
            return;
        };
        let mut next = self.next_due.map_or(now, |due| due) + interval;
        if now >= next {
            tracing::debug!(now, missed_deadline = next, "frame pacer resync");
            next = now + interval;
            self.resyncs += 1;
        }
        self.next_due = Some(next);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/driver/pacing.rs"]
mod tests;
