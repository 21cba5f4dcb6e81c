//! The tracking engine: a dedicated worker running the control cycle
//!
//! One thread executes acquire → detect → select → normalize → control →
//! emit at the configured cadence. The worker is the only writer of the
//! controller state; the controlling surface talks to it through a shared
//! input snapshot (read once per cycle) and listens on an event channel.
//! Commands are emitted strictly in cycle order, at most one in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{bounded, Receiver, Sender};
use ptz_control::{
    normalize, select_target, Detection, FrameSize, MotionCommand, TrackingController,
};

use crate::actuator::Actuator;
use crate::config::EngineConfig;
use crate::detector::Detector;
use crate::error::Result;
use crate::source::FrameSource;

/// Events emitted by the worker, in cycle order
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// One processed frame with its (possibly empty) detections
    Frame {
        frame_id: u64,
        detections: Vec<Detection>,
    },
    /// A command handed to the actuator this cycle
    Command(MotionCommand),
    /// Measured loop rate, emitted roughly once per second
    FpsUpdate(f64),
    /// Number of detections this cycle
    DetectionCount(usize),
    /// One-time notification that the actuator transport failed
    ActuatorError(String),
    /// The worker has shut down
    Stopped,
}

/// Flags written by the controlling surface and read once per cycle by the
/// worker. A stale read for one extra cycle is acceptable; every consumer
/// of these values is idempotent with respect to repeated reads.
#[derive(Debug)]
struct ControlInputs {
    auto_tracking: bool,
    confidence_threshold: f32,
    manual_target: Option<(f32, f32)>,
}

/// Handle to a running tracking loop. Dropping the handle requests
/// shutdown and joins the worker, so the in-flight cycle always finishes
/// and the head is left stopped.
pub struct TrackingEngine {
    inputs: Arc<Mutex<ControlInputs>>,
    running: Arc<AtomicBool>,
    events: Receiver<EngineEvent>,
    worker: Option<JoinHandle<()>>,
}

impl TrackingEngine {
    /// Validate the configuration and spawn the worker.
    pub fn start(
        config: EngineConfig,
        source: Box<dyn FrameSource>,
        detector: Box<dyn Detector>,
        actuator: Box<dyn Actuator>,
    ) -> Result<Self> {
        config.validate()?;
        let controller = TrackingController::new(config.tracker.clone())?;

        let inputs = Arc::new(Mutex::new(ControlInputs {
            auto_tracking: false,
            confidence_threshold: config.confidence_threshold,
            manual_target: None,
        }));
        let running = Arc::new(AtomicBool::new(true));
        let (event_tx, event_rx) = bounded(256);

        let worker = {
            let inputs = Arc::clone(&inputs);
            let running = Arc::clone(&running);
            thread::spawn(move || {
                worker_loop(
                    config, controller, source, detector, actuator, inputs, running, event_tx,
                );
            })
        };

        Ok(Self {
            inputs,
            running,
            events: event_rx,
            worker: Some(worker),
        })
    }

    /// Event stream from the worker. The channel is bounded; events are
    /// dropped rather than stalling the control loop when no one listens.
    pub fn events(&self) -> Receiver<EngineEvent> {
        self.events.clone()
    }

    pub fn set_auto_tracking(&self, enabled: bool) {
        self.inputs.lock().expect("inputs poisoned").auto_tracking = enabled;
    }

    pub fn set_confidence_threshold(&self, threshold: f32) {
        let threshold = threshold.clamp(0.0, 1.0);
        self.inputs
            .lock()
            .expect("inputs poisoned")
            .confidence_threshold = threshold;
    }

    /// Request a one-shot go-to-point; applied atomically at the start of
    /// the next cycle. A newer request replaces a pending one.
    pub fn request_manual_target(&self, x: f32, y: f32) {
        self.inputs.lock().expect("inputs poisoned").manual_target =
            Some((x.clamp(0.0, 1.0), y.clamp(0.0, 1.0)));
    }

    /// Cooperative shutdown: the in-flight cycle finishes, the worker stops
    /// the head and exits, then the thread is joined.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("tracking worker panicked");
            }
        }
    }
}

impl Drop for TrackingEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[allow(clippy::too_many_arguments)]
fn worker_loop(
    config: EngineConfig,
    mut controller: TrackingController,
    mut source: Box<dyn FrameSource>,
    mut detector: Box<dyn Detector>,
    mut actuator: Box<dyn Actuator>,
    inputs: Arc<Mutex<ControlInputs>>,
    running: Arc<AtomicBool>,
    events: Sender<EngineEvent>,
) {
    let period = Duration::from_secs_f64(1.0 / config.target_fps as f64);
    let backoff = Duration::from_millis(config.acquisition_backoff_ms);

    let mut last_cycle = Instant::now();
    let mut last_threshold = config.confidence_threshold;
    let mut fps_window_start = Instant::now();
    let mut fps_frames = 0u32;
    let mut actuator_fault_reported = false;

    detector.set_confidence_threshold(last_threshold);
    log::info!(
        "tracking worker started: {} fps target, detector '{}'",
        config.target_fps,
        detector.name()
    );

    while running.load(Ordering::Relaxed) {
        let cycle_start = Instant::now();

        // Snapshot the cross-thread inputs exactly once per cycle
        let (auto, threshold, manual) = {
            let mut guard = inputs.lock().expect("inputs poisoned");
            (
                guard.auto_tracking,
                guard.confidence_threshold,
                guard.manual_target.take(),
            )
        };
        controller.set_auto_tracking(auto);
        if threshold != last_threshold {
            log::info!("confidence threshold changed to {threshold:.2}");
            detector.set_confidence_threshold(threshold);
            last_threshold = threshold;
        }
        if let Some((x, y)) = manual {
            controller.request_manual_target(x, y);
        }

        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                log::debug!("no frame available, backing off");
                thread::sleep(backoff);
                continue;
            }
            Err(e) => {
                log::warn!("frame acquisition failed: {e}");
                thread::sleep(backoff);
                continue;
            }
        };

        let frame_size = FrameSize::new(frame.image.width(), frame.image.height());
        let detections = match detector.detect(&frame.image) {
            Ok(detections) => detections,
            Err(e) => {
                // A failed forward pass is a target-less cycle, not a crash
                log::error!("detector failed: {e}");
                Vec::new()
            }
        };
        let _ = events.try_send(EngineEvent::DetectionCount(detections.len()));

        let target = select_target(&frame_size, &detections)
            .and_then(|det| normalize::accepted(&frame_size, det, &config.tracker));

        let now = Instant::now();
        let dt = now.duration_since(last_cycle).as_secs_f32();
        last_cycle = now;

        if let Some(command) = controller.update(target.as_ref(), dt) {
            let sent = match command {
                MotionCommand::Move { pan, tilt } => actuator.set_motion(pan, tilt),
                MotionCommand::Stop => actuator.stop(),
            };
            match sent {
                Ok(()) => actuator_fault_reported = false,
                Err(e) => {
                    // Degrade to no-op; notify once, do not retry
                    if !actuator_fault_reported {
                        actuator_fault_reported = true;
                        log::warn!("actuator unavailable: {e}");
                        let _ = events.try_send(EngineEvent::ActuatorError(e.to_string()));
                    }
                }
            }
            let _ = events.try_send(EngineEvent::Command(command));
        }

        let _ = events.try_send(EngineEvent::Frame {
            frame_id: frame.frame_id,
            detections,
        });

        fps_frames += 1;
        let window = fps_window_start.elapsed();
        if window >= Duration::from_secs(1) {
            let fps = fps_frames as f64 / window.as_secs_f64();
            let _ = events.try_send(EngineEvent::FpsUpdate(fps));
            fps_frames = 0;
            fps_window_start = Instant::now();
        }

        // Sleep out the rest of the period; never a negative duration
        if let Some(remaining) = period.checked_sub(cycle_start.elapsed()) {
            thread::sleep(remaining);
        }
    }

    // Leave the head stopped no matter how the loop ended
    if let Err(e) = actuator.stop() {
        log::warn!("final stop failed: {e}");
    }
    let _ = events.try_send(EngineEvent::Stopped);
    log::info!("tracking worker stopped");
}
