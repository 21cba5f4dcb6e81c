//! Controller tuning parameters and configuration-time validation

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Out-of-range tunables are rejected when the controller is built, never
/// silently clamped mid-loop.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f32 },

    #[error("{name} must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("lost_max_frames must be at least 1")]
    ZeroLostFrames,
}

/// PID gains for one axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

impl AxisGains {
    pub fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self { kp, ki, kd }
    }

    fn validate(&self, axis: &'static str) -> Result<(), ConfigError> {
        for (name, value) in [("kp", self.kp), ("ki", self.ki), ("kd", self.kd)] {
            if !value.is_finite() || value < 0.0 {
                log::warn!("invalid {name} on {axis} axis: {value}");
                return Err(ConfigError::OutOfRange {
                    name,
                    value,
                    min: 0.0,
                    max: f32::INFINITY,
                });
            }
        }
        Ok(())
    }
}

/// All tunables of the tracking controller.
///
/// Defaults match the reference head tuning; every field is serde-exposed so
/// a deployment can override individual values from a JSON config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Minimum detection confidence accepted as a target
    pub conf_min: f32,
    /// Minimum normalized apparent size accepted as a target
    pub nz_min: f32,
    /// Symmetric deadband half-width applied to axis errors
    pub deadband: f32,
    pub gains_x: AxisGains,
    pub gains_y: AxisGains,
    /// Anti-windup clamp on each integral accumulator
    pub i_max: f32,
    /// Power-law exponent of the non-linear speed shaping curve
    pub gamma: f32,
    /// Edge distance at which near-edge damping engages
    pub near_edge_threshold: f32,
    /// Edge distance at which full-scale recovery may engage
    pub approach_limit: f32,
    /// Target velocity above which a near-edge target triggers recovery
    pub v_thresh: f32,
    /// Maximum speed change per second between cycles
    pub slew_rate: f32,
    /// Time constant of both exponential low-pass filters, seconds
    pub lpf_tau: f32,
    /// Positional error under which a manual seek is considered converged
    pub stop_threshold: f32,
    /// Consecutive target-less cycles tolerated before the controller stops
    pub lost_max_frames: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            conf_min: 0.5,
            nz_min: 0.02,
            deadband: 0.03,
            gains_x: AxisGains::new(1.2, 0.05, 0.06),
            gains_y: AxisGains::new(1.0, 0.05, 0.05),
            i_max: 0.5,
            gamma: 0.8,
            near_edge_threshold: 0.15,
            approach_limit: 0.05,
            v_thresh: 0.02,
            slew_rate: 0.6,
            lpf_tau: 0.08,
            stop_threshold: 0.02,
            lost_max_frames: 15,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit_ranged = [
            ("conf_min", self.conf_min),
            ("nz_min", self.nz_min),
            ("v_thresh", self.v_thresh),
            ("stop_threshold", self.stop_threshold),
        ];
        for (name, value) in unit_ranged {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    name,
                    value,
                    min: 0.0,
                    max: 1.0,
                });
            }
        }
        // The deadband and edge thresholds are distances from center/edge;
        // anything at or past half the frame would swallow every error.
        let half_ranged = [
            ("deadband", self.deadband),
            ("near_edge_threshold", self.near_edge_threshold),
            ("approach_limit", self.approach_limit),
        ];
        for (name, value) in half_ranged {
            if !value.is_finite() || !(0.0..0.5).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    name,
                    value,
                    min: 0.0,
                    max: 0.5,
                });
            }
        }
        let positive = [
            ("i_max", self.i_max),
            ("gamma", self.gamma),
            ("slew_rate", self.slew_rate),
            ("lpf_tau", self.lpf_tau),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        if self.approach_limit > self.near_edge_threshold {
            return Err(ConfigError::OutOfRange {
                name: "approach_limit",
                value: self.approach_limit,
                min: 0.0,
                max: self.near_edge_threshold,
            });
        }
        if self.lost_max_frames == 0 {
            return Err(ConfigError::ZeroLostFrames);
        }
        self.gains_x.validate("x")?;
        self.gains_y.validate("y")?;
        Ok(())
    }
}
