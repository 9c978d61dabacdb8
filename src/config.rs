use crate::driver::pacing::PacingConfig;
use crate::foundation::core::{ISize, Rgba8};
use crate::foundation::error::{StageError, StageResult};

/// Stage settings. Every field has a default, so partial JSON documents are accepted.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Design-time size the appropriate scale is measured against.
    pub default_size: ISize,
    /// Color the surface is cleared to before each draw.
    pub clear_color: Rgba8,
    /// Frame pacing.
    pub pacing: PacingSettings,
    /// Run `on_update` for top-level subtrees on a worker pool.
    pub parallel_update: bool,
    /// Worker count for the parallel update; `None` lets rayon decide.
    pub threads: Option<usize>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            default_size: ISize::new(800, 600),
            clear_color: Rgba8::BLACK,
            pacing: PacingSettings::default(),
            parallel_update: false,
            threads: None,
        }
    }
}

/// Human-facing pacing settings, converted to a [`PacingConfig`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PacingSettings {
    /// Frames per second; `0` follows the display, negative is uncapped.
    pub target_fps: f64,
    /// Remaining wait (ms) below which the driver does not sleep.
    pub sleep_threshold_ms: f64,
}

impl Default for PacingSettings {
    fn default() -> Self {
        Self {
            target_fps: 0.0,
            sleep_threshold_ms: 2.0,
        }
    }
}

impl PacingSettings {
    /// Seconds-based pacing for the frame driver.
    pub fn to_pacing(self) -> PacingConfig {
        let target_interval_secs = if self.target_fps > 0.0 {
            1.0 / self.target_fps
        } else if self.target_fps < 0.0 {
            -1.0
        } else {
            0.0
        };
        PacingConfig {
            target_interval_secs,
            sleep_threshold_secs: self.sleep_threshold_ms / 1000.0,
        }
    }
}

impl StageConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> StageResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| StageError::serde(format!("parse stage config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check sizes, pacing and threading.
    pub fn validate(&self) -> StageResult<()> {
        if self.default_size.is_empty() {
            return Err(StageError::validation("default_size must be > 0 on both axes"));
        }
        if !self.pacing.target_fps.is_finite() {
            return Err(StageError::validation("pacing.target_fps must be finite"));
        }
        self.pacing.to_pacing().validate()?;
        if self.threads == Some(0) {
            return Err(StageError::validation(
                "threads must be >= 1 when set",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
