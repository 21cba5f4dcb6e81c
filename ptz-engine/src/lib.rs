//! Real-time PTZ tracking runtime
//!
//! Drives one acquire → detect → select → normalize → control → emit cycle
//! per frame period on a dedicated worker thread, and turns the resulting
//! motion commands into VISCA frames on a serial transport.
//!
//! The control math lives in `ptz-control`; this crate owns the scheduling,
//! the detector and frame-source seams, and the actuator.

pub mod actuator;
pub mod config;
pub mod detector;
pub mod engine;
pub mod error;
pub mod source;
pub mod visca;

pub use actuator::{Actuator, NullActuator, ViscaActuator};
pub use config::EngineConfig;
pub use detector::{Detector, ScriptedDetector};
pub use engine::{EngineEvent, TrackingEngine};
pub use error::{EngineError, Result};
pub use source::{Frame, FrameSource, SyntheticSource};
