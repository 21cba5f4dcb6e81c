//! Frame acquisition contract

use std::time::Instant;

use image::RgbImage;

use crate::error::Result;

/// Frame with metadata, as handed to the loop each cycle
#[derive(Clone)]
pub struct Frame {
    pub frame_id: u64,
    pub image: RgbImage,
    pub timestamp: Instant,
}

/// Source of video frames.
///
/// `Ok(None)` means no frame is available this cycle; the loop backs off
/// briefly and retries rather than busy-spinning. Acquisition may block up
/// to the source's own timeout.
pub trait FrameSource: Send {
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

/// Emits a blank frame of fixed size on every call. Stands in for a real
/// capture device in tests and simulations, where the scripted detector
/// supplies the scene content anyway.
pub struct SyntheticSource {
    width: u32,
    height: u32,
    next_id: u64,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            next_id: 0,
        }
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let frame = Frame {
            frame_id: self.next_id,
            image: RgbImage::new(self.width, self.height),
            timestamp: Instant::now(),
        };
        self.next_id += 1;
        Ok(Some(frame))
    }
}
