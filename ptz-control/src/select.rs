//! Target selection among per-frame detections

use crate::types::{Detection, FrameSize};

/// Softens the centrality term so a box sitting exactly on the frame center
/// cannot blow the score up, and extreme centrality stops dominating size.
const CENTER_SOFTENING: f32 = 100.0;

/// Selection score: larger, more central, more confident boxes win.
pub fn score(frame: &FrameSize, det: &Detection) -> f32 {
    let (cx, cy) = frame.center();
    let dx = det.bbox.center_x() - cx;
    let dy = det.bbox.center_y() - cy;
    let distance = (dx * dx + dy * dy).sqrt();
    det.bbox.area() / (distance + CENTER_SOFTENING) * det.confidence
}

/// Pick the single detection to track.
///
/// Pure function of its inputs: the same list and frame size always yield
/// the same choice. Ties resolve to the first detection scanned. Returns
/// `None` for an empty list.
pub fn select_target<'a>(frame: &FrameSize, detections: &'a [Detection]) -> Option<&'a Detection> {
    let mut best: Option<(&Detection, f32)> = None;
    for det in detections {
        let s = score(frame, det);
        match best {
            Some((_, best_score)) if s <= best_score => {}
            _ => best = Some((det, s)),
        }
    }
    best.map(|(det, _)| det)
}
