//! Pixel-space bounding boxes to normalized target coordinates

use crate::config::TrackerConfig;
use crate::types::{BoundingBox, Detection, FrameSize, NormalizedTarget};

/// Map a bounding box into normalized coordinates, independent of frame
/// resolution: `nx = centerX / width`, `ny = centerY / height`,
/// `nz = sqrt(boxW * boxH) / frame diagonal`.
pub fn normalize(frame: &FrameSize, bbox: &BoundingBox) -> NormalizedTarget {
    NormalizedTarget {
        nx: bbox.center_x() / frame.width as f32,
        ny: bbox.center_y() / frame.height as f32,
        nz: bbox.area().max(0.0).sqrt() / frame.diagonal(),
    }
}

/// Normalize a detection and apply the acceptance gate: targets smaller than
/// `nz_min` or below `conf_min` confidence are too unreliable to track.
pub fn accepted(
    frame: &FrameSize,
    det: &Detection,
    cfg: &TrackerConfig,
) -> Option<NormalizedTarget> {
    if det.confidence < cfg.conf_min {
        return None;
    }
    let target = normalize(frame, &det.bbox);
    if target.nz < cfg.nz_min {
        log::debug!(
            "rejecting target: apparent size {:.4} below minimum {:.4}",
            target.nz,
            cfg.nz_min
        );
        return None;
    }
    Some(target)
}
