//! Configuration types.

use serde::{Deserialize, Serialize};

use crate::Error;

/// What to do with a sample that arrives while a processing pass is running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlapPolicy {
    /// Discard it. Later samples are still processed.
    #[default]
    Drop,
    /// Keep only the newest one and process it as soon as the pass finishes.
    QueueLatest,
}

/// Notional size of the preview surface, used to answer bounds queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewSize {
    /// Surface width in points.
    pub width: f64,
    /// Surface height in points.
    pub height: f64,
    /// Distance kept between the pointer and the surface edge.
    pub gap: f64,
}

impl Default for PreviewSize {
    fn default() -> Self {
        Self {
            width: 320.0,
            height: 200.0,
            gap: 8.0,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Per-axis movement below which a pointer sample is ignored.
    pub jitter_threshold: f64,
    /// Handling of samples that overlap a running pass.
    pub overlap: OverlapPolicy,
    /// Bundle identifier of the process whose icons are hit-tested.
    pub dock_bundle_id: String,
    /// Preview surface geometry.
    pub preview: PreviewSize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jitter_threshold: 5.0,
            overlap: OverlapPolicy::Drop,
            dock_bundle_id: "com.apple.dock".to_string(),
            preview: PreviewSize::default(),
        }
    }
}

impl Config {
    /// Check value ranges that the type system cannot express.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.jitter_threshold.is_finite() || self.jitter_threshold < 0.0 {
            return Err(invalid(format!(
                "jitter_threshold must be a non-negative number, got {}",
                self.jitter_threshold
            )));
        }
        if self.dock_bundle_id.trim().is_empty() {
            return Err(invalid("dock_bundle_id must not be empty".to_string()));
        }
        let p = &self.preview;
        if !(p.width > 0.0 && p.height > 0.0) {
            return Err(invalid(format!(
                "preview size must be positive, got {}x{}",
                p.width, p.height
            )));
        }
        if !p.gap.is_finite() || p.gap < 0.0 {
            return Err(invalid(format!("preview gap must be non-negative, got {}", p.gap)));
        }
        Ok(())
    }

    /// Render as pretty RON.
    pub fn to_ron(&self) -> String {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .unwrap_or_else(|e| format!("/* serialization failed: {e} */"))
    }
}

/// Build a validation error without a path.
fn invalid(message: String) -> Error {
    Error::Validation {
        path: None,
        message,
    }
}
