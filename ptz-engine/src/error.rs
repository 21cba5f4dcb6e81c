//! Error types for the tracking runtime

use thiserror::Error;

/// Result type alias for the runtime
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while the tracking loop runs.
///
/// None of these are fatal to the process: acquisition failures skip the
/// cycle, detector failures yield an empty detection set, and actuator
/// failures degrade the transport to a no-op with a one-time notification.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("frame acquisition failed: {0}")]
    Acquisition(String),

    #[error("detector error: {0}")]
    Detector(String),

    #[error("actuator transport unavailable")]
    ActuatorUnavailable,

    #[error("invalid controller configuration: {0}")]
    Config(#[from] ptz_control::ConfigError),

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    pub fn acquisition<S: Into<String>>(msg: S) -> Self {
        Self::Acquisition(msg.into())
    }

    pub fn detector<S: Into<String>>(msg: S) -> Self {
        Self::Detector(msg.into())
    }

    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
