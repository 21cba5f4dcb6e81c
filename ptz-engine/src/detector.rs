//! Detection source contract
//!
//! The neural-network inference producing raw detections is an external
//! collaborator. The loop only sees this trait; any backend (ONNX, OpenCV
//! DNN, a remote service) plugs in behind it. The two divergent bbox
//! output-layout conventions seen across model exporters are the backend's
//! problem, not ours: detections arriving here are already in frame pixels.

use std::collections::VecDeque;

use image::RgbImage;
use ptz_control::Detection;

use crate::error::Result;

/// Common interface for per-frame object detectors
pub trait Detector: Send {
    /// Detect objects in a single frame. May return an empty list.
    /// No ordering guarantee on the returned detections.
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Detection>>;

    /// Update the minimum confidence the detector reports.
    fn set_confidence_threshold(&mut self, threshold: f32);

    /// Detector name, for logging
    fn name(&self) -> &str;
}

/// Plays back pre-scripted detection lists, one per frame; the playback
/// detector used by tests and the simulation example. Returns empty lists
/// once the script is exhausted.
pub struct ScriptedDetector {
    script: VecDeque<Vec<Detection>>,
    threshold: f32,
}

impl ScriptedDetector {
    pub fn new(script: Vec<Vec<Detection>>) -> Self {
        Self {
            script: script.into(),
            threshold: 0.0,
        }
    }
}

impl Detector for ScriptedDetector {
    fn detect(&mut self, _frame: &RgbImage) -> Result<Vec<Detection>> {
        let detections = self.script.pop_front().unwrap_or_default();
        Ok(detections
            .into_iter()
            .filter(|d| d.confidence >= self.threshold)
            .collect())
    }

    fn set_confidence_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptz_control::BoundingBox;

    fn det(conf: f32) -> Detection {
        Detection::new(BoundingBox::new(10.0, 10.0, 50.0, 100.0), conf, "person")
    }

    #[test]
    fn scripted_detector_plays_back_in_order() {
        let mut d = ScriptedDetector::new(vec![vec![det(0.9)], vec![], vec![det(0.7)]]);
        let frame = RgbImage::new(64, 64);
        assert_eq!(d.detect(&frame).unwrap().len(), 1);
        assert_eq!(d.detect(&frame).unwrap().len(), 0);
        assert_eq!(d.detect(&frame).unwrap().len(), 1);
        // Exhausted script keeps returning empty
        assert_eq!(d.detect(&frame).unwrap().len(), 0);
    }

    #[test]
    fn threshold_filters_detections() {
        let mut d = ScriptedDetector::new(vec![vec![det(0.4), det(0.9)]]);
        d.set_confidence_threshold(0.5);
        let frame = RgbImage::new(64, 64);
        let out = d.detect(&frame).unwrap();
        assert_eq!(out.len(), 1);
        assert!((out[0].confidence - 0.9).abs() < 1e-6);
    }
}
