//! Engine configuration

use std::fs::File;
use std::io::Read;
use std::path::Path;

use ptz_control::TrackerConfig;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Runtime configuration: loop cadence, detector threshold and the nested
/// controller tuning. Loadable from JSON; missing fields fall back to the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Target loop cadence in frames per second
    pub target_fps: u32,
    /// Initial detector confidence threshold, shared with the detection source
    pub confidence_threshold: f32,
    /// Sleep before retrying when no frame is available, milliseconds
    pub acquisition_backoff_ms: u64,
    pub tracker: TrackerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_fps: 30,
            confidence_threshold: 0.5,
            acquisition_backoff_ms: 100,
            tracker: TrackerConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.target_fps == 0 || self.target_fps > 240 {
            return Err(EngineError::invalid_config(format!(
                "target_fps must lie in [1, 240], got {}",
                self.target_fps
            )));
        }
        if !self.confidence_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.confidence_threshold)
        {
            return Err(EngineError::invalid_config(format!(
                "confidence_threshold must lie in [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        self.tracker.validate()?;
        Ok(())
    }

    pub fn from_json<R: Read>(reader: R) -> Result<Self> {
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(File::open(path)?)
    }
}
