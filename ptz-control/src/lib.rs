//! Pure pan/tilt tracking control core
//!
//! This crate turns noisy per-frame detections into smooth, slew-limited
//! motion commands for a motorized PTZ head. It contains no I/O and no
//! threads: the runtime crate drives it once per cycle with the elapsed
//! time and the latest accepted target.
//!
//! # Per-cycle flow
//!
//! ```rust,ignore
//! use ptz_control::{select_target, normalize, TrackerConfig, TrackingController};
//!
//! let cfg = TrackerConfig::default();
//! let mut controller = TrackingController::new(cfg.clone())?;
//! controller.set_auto_tracking(true);
//!
//! let target = select_target(&frame_size, &detections)
//!     .and_then(|det| normalize::accepted(&frame_size, det, &cfg));
//! if let Some(cmd) = controller.update(target.as_ref(), dt) {
//!     // hand cmd to the actuator
//! }
//! ```

pub mod axis;
pub mod config;
pub mod controller;
pub mod normalize;
pub mod select;
pub mod types;

pub use config::{AxisGains, ConfigError, TrackerConfig};
pub use controller::{TrackMode, TrackingController};
pub use select::select_target;
pub use types::{BoundingBox, Detection, FrameSize, MotionCommand, NormalizedTarget};
