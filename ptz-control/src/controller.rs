//! The tracking controller: target resolution, loss handling, manual seek
//! and command emission
//!
//! This is the only stateful component in the pipeline. Everything upstream
//! (selection, normalization) is pure; everything downstream (actuator) is
//! a sink. The controller owns its state exclusively: one `update()` call
//! per cycle, driven by a single worker.

use crate::axis::{Axis, SPEED_MAX, SPEED_MIN};
use crate::config::{ConfigError, TrackerConfig};
use crate::types::{MotionCommand, NormalizedTarget};

/// Guard added to dt so a zero elapsed time cannot divide by zero
const DT_EPSILON: f32 = 1e-6;

/// Below this deadbanded error on both axes the head is considered centered
/// and an explicit stop is emitted instead of a near-zero crawl.
const NEAR_ZERO: f32 = 0.01;

/// Apparent size assumed for a manual go-to-point target
const MANUAL_NOMINAL_NZ: f32 = 0.1;

/// Cycles a manual seek may drive before it is forcibly cleared with a
/// stop. There is no position feedback to confirm convergence, so a single
/// gesture must not command motion indefinitely; 90 cycles is three seconds
/// at the nominal 30 fps cadence.
const MANUAL_SEEK_BUDGET: u32 = 90;

/// Pan speed scale: smoothed speed in [1, 2] maps to device units [6, 12]
const PAN_SCALE: f32 = 6.0;
/// Tilt speed scale; the emitted sign is inverted to match the head's
/// mechanical convention (positive tilt error needs a negative command).
const TILT_SCALE: f32 = 5.0;

/// Controller state as seen from outside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackMode {
    /// Tracking disabled, nothing emitted
    Idle,
    /// Continuous detection-driven tracking
    Auto,
    /// One-shot convergence onto a requested point
    ManualSeek,
    /// Target missing for `lost_max_frames` cycles; holding stopped
    Lost,
}

/// Per-axis PID controller with loss decay, manual override and command
/// scaling. See the crate docs for the cycle contract.
#[derive(Debug, Clone)]
pub struct TrackingController {
    cfg: TrackerConfig,
    x: Axis,
    y: Axis,
    last_target: Option<NormalizedTarget>,
    lost_frames: u32,
    auto_enabled: bool,
    manual: Option<(f32, f32)>,
    manual_frames: u32,
}

impl TrackingController {
    /// Build a controller, rejecting out-of-range tunables up front.
    pub fn new(cfg: TrackerConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            x: Axis::new(),
            y: Axis::new(),
            last_target: None,
            lost_frames: 0,
            auto_enabled: false,
            manual: None,
            manual_frames: 0,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.cfg
    }

    pub fn mode(&self) -> TrackMode {
        if self.manual.is_some() {
            TrackMode::ManualSeek
        } else if !self.auto_enabled {
            TrackMode::Idle
        } else if self.lost_frames >= self.cfg.lost_max_frames {
            TrackMode::Lost
        } else {
            TrackMode::Auto
        }
    }

    pub fn last_target(&self) -> Option<&NormalizedTarget> {
        self.last_target.as_ref()
    }

    /// Enable or disable continuous tracking. The off-to-on transition
    /// resets all PID state.
    pub fn set_auto_tracking(&mut self, enabled: bool) {
        if enabled && !self.auto_enabled {
            log::info!("auto tracking enabled");
            self.reset_pid_state();
            self.last_target = None;
            self.lost_frames = 0;
        } else if !enabled && self.auto_enabled {
            log::info!("auto tracking disabled");
        }
        self.auto_enabled = enabled;
    }

    /// Request a one-shot seek to a normalized frame point. Takes precedence
    /// over auto tracking until positional error falls under the stop
    /// threshold. A fresh request resets PID state.
    pub fn request_manual_target(&mut self, x: f32, y: f32) {
        let x = x.clamp(0.0, 1.0);
        let y = y.clamp(0.0, 1.0);
        log::info!("manual target requested at ({x:.3}, {y:.3})");
        self.reset_pid_state();
        self.manual = Some((x, y));
        self.manual_frames = 0;
    }

    fn reset_pid_state(&mut self) {
        self.x.reset();
        self.y.reset();
    }

    /// Every emitted stop leaves the head at rest; the speed baselines must
    /// agree so the next motion ramps up from the device minimum.
    fn halt_axes(&mut self) {
        self.x.halt();
        self.y.halt();
    }

    /// Run one control cycle.
    ///
    /// `target` is the accepted normalized target for this cycle, if any;
    /// `dt` is the measured elapsed time since the previous cycle in
    /// seconds. Returns `None` when there is nothing to emit (idle, or
    /// auto tracking armed but no target seen yet).
    pub fn update(&mut self, target: Option<&NormalizedTarget>, dt: f32) -> Option<MotionCommand> {
        let dt = dt.max(0.0) + DT_EPSILON;

        // Manual override takes precedence while set
        if let Some((mx, my)) = self.manual {
            let ex = mx - 0.5;
            let ey = my - 0.5;
            let converged = (ex * ex + ey * ey).sqrt() < self.cfg.stop_threshold;
            if converged || self.manual_frames >= MANUAL_SEEK_BUDGET {
                // One-shot gesture over; hand control back and stop the head
                if converged {
                    log::info!("manual target reached");
                } else {
                    log::warn!("manual seek exhausted its cycle budget, stopping");
                }
                self.manual = None;
                self.halt_axes();
                return Some(MotionCommand::Stop);
            }
            self.manual_frames += 1;
            let resolved = NormalizedTarget {
                nx: mx,
                ny: my,
                nz: MANUAL_NOMINAL_NZ,
            };
            return Some(self.drive(&resolved, dt, true));
        }

        if !self.auto_enabled {
            return None;
        }

        let resolved = match target {
            Some(t) => {
                if self.lost_frames >= self.cfg.lost_max_frames {
                    log::info!("target reacquired after {} lost cycles", self.lost_frames);
                }
                self.lost_frames = 0;
                self.last_target = Some(*t);
                *t
            }
            None => {
                self.lost_frames = self.lost_frames.saturating_add(1);
                if self.lost_frames >= self.cfg.lost_max_frames {
                    if self.lost_frames == self.cfg.lost_max_frames {
                        log::warn!(
                            "target lost for {} cycles, stopping",
                            self.cfg.lost_max_frames
                        );
                    }
                    self.halt_axes();
                    return Some(MotionCommand::Stop);
                }
                match self.last_target {
                    Some(t) => {
                        // Coast on the cached position while gently bleeding
                        // off the accumulated command
                        self.x.decay_integral();
                        self.y.decay_integral();
                        t
                    }
                    // Armed but never saw a target: nothing to chase
                    None => return None,
                }
            }
        };

        Some(self.drive(&resolved, dt, false))
    }

    /// PID/shaping chain for both axes plus command emission
    fn drive(&mut self, t: &NormalizedTarget, dt: f32, manual: bool) -> MotionCommand {
        let ex = Axis::deadband(t.nx - 0.5, self.cfg.deadband);
        let ey = Axis::deadband(t.ny - 0.5, self.cfg.deadband);

        if ex.abs() < NEAR_ZERO && ey.abs() < NEAR_ZERO && !manual {
            // Centered: an explicit stop beats a near-zero crawl. Record the
            // errors so the next cycle's derivative stays sane.
            self.x.observe(ex);
            self.y.observe(ey);
            self.halt_axes();
            return MotionCommand::Stop;
        }

        let speed_x = self.x.step(&self.cfg.gains_x, &self.cfg, ex, t.nx, dt);
        let speed_y = self.y.step(&self.cfg.gains_y, &self.cfg, ey, t.ny, dt);
        debug_assert!((SPEED_MIN..=SPEED_MAX).contains(&speed_x));
        debug_assert!((SPEED_MIN..=SPEED_MAX).contains(&speed_y));

        let pan = sign(ex) * (speed_x * PAN_SCALE).round() as i32;
        let tilt = -sign(ey) * (speed_y * TILT_SCALE).round() as i32;

        log::trace!(
            "drive: err=({ex:.3}, {ey:.3}) speed=({speed_x:.3}, {speed_y:.3}) cmd=({pan}, {tilt})"
        );
        MotionCommand::Move { pan, tilt }
    }
}

/// Direction of the deadbanded error; zero maps to zero (f32::signum does not)
fn sign(v: f32) -> i32 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}
