//! Value types shared across the tracking pipeline

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in source-frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center_x(&self) -> f32 {
        self.left + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.top + self.height / 2.0
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// Single detection produced by the detection source for one frame.
/// Immutable; discarded at the end of the cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    /// Confidence score in [0, 1]
    pub confidence: f32,
    pub label: String,
}

impl Detection {
    pub fn new(bbox: BoundingBox, confidence: f32, label: impl Into<String>) -> Self {
        Self {
            bbox,
            confidence,
            label: label.into(),
        }
    }
}

/// Dimensions of the source frame in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    /// Frame diagonal in pixels
    pub fn diagonal(&self) -> f32 {
        let w = self.width as f32;
        let h = self.height as f32;
        (w * w + h * h).sqrt()
    }
}

/// Target position and apparent size in resolution-independent coordinates.
/// `nx`/`ny` are in [0, 1] with 0.5 = frame center on each axis; `nz` is the
/// box diagonal divided by the frame diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTarget {
    pub nx: f32,
    pub ny: f32,
    pub nz: f32,
}

/// Discrete command for the pan/tilt head.
///
/// `Stop` is the explicit (0, 0); `Move` magnitudes are bounded by the
/// device caps enforced at the actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionCommand {
    Move { pan: i32, tilt: i32 },
    Stop,
}

impl MotionCommand {
    /// Pan/tilt values as sent to the actuator
    pub fn pan_tilt(&self) -> (i32, i32) {
        match *self {
            MotionCommand::Move { pan, tilt } => (pan, tilt),
            MotionCommand::Stop => (0, 0),
        }
    }
}
