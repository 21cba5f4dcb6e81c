//! Single-axis PID state and the per-cycle speed shaping chain
//!
//! One `Axis` holds everything that persists across cycles for one degree
//! of freedom: the integral accumulator, the previous deadbanded error, the
//! filtered derivative and the previously emitted speed. `step()` runs the
//! full chain for one cycle: PID, power-law shaping, edge-of-frame policy,
//! slew limiting and final smoothing.

use crate::config::{AxisGains, TrackerConfig};

/// Minimum non-zero device speed the head accepts
pub const SPEED_MIN: f32 = 1.0;
/// Maximum device speed
pub const SPEED_MAX: f32 = 2.0;

/// Integral relaxation factor applied while coasting on a cached target
pub const LOST_DECAY: f32 = 0.95;

/// Near-edge deceleration factor for slow targets
const EDGE_DAMPING: f32 = 0.7;

/// Gain of the power-law shaping curve before clamping to [0, 1]
const SHAPING_GAIN: f32 = 1.5;

/// Persistent per-axis controller state
#[derive(Debug, Clone, Default)]
pub struct Axis {
    integral: f32,
    prev_error: f32,
    prev_derivative: f32,
    prev_speed: f32,
}

impl Axis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero all persistent state. Called whenever tracking is (re)armed so
    /// stale integral/derivative carry-over cannot produce a spurious kick.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Relax the integral accumulator while the target is missing, rather
    /// than snapping the command to zero.
    pub fn decay_integral(&mut self) {
        self.integral *= LOST_DECAY;
    }

    pub fn integral(&self) -> f32 {
        self.integral
    }

    pub fn prev_error(&self) -> f32 {
        self.prev_error
    }

    pub fn prev_speed(&self) -> f32 {
        self.prev_speed
    }

    /// Symmetric deadband: errors inside the band are exactly zero; outside
    /// it, the band width is subtracted from the magnitude, preserving sign.
    pub fn deadband(error: f32, band: f32) -> f32 {
        if error.abs() < band {
            0.0
        } else {
            error.signum() * (error.abs() - band)
        }
    }

    /// Record this cycle's deadbanded error without driving the axis.
    /// Used on cycles that end in an explicit stop so the next derivative
    /// does not see a stale error.
    pub fn observe(&mut self, error: f32) {
        self.prev_error = error;
    }

    /// Record that the head has been stopped. The next `step()` ramps up
    /// from standstill instead of resuming at the pre-stop speed.
    pub fn halt(&mut self) {
        self.prev_speed = 0.0;
    }

    /// Run one control cycle for this axis.
    ///
    /// * `error` — deadbanded positional error
    /// * `pos` — resolved target position on this axis, in [0, 1]
    /// * `dt` — elapsed seconds since the previous cycle, already
    ///   epsilon-guarded by the caller
    ///
    /// Returns the speed magnitude in [`SPEED_MIN`, `SPEED_MAX`].
    pub fn step(
        &mut self,
        gains: &AxisGains,
        cfg: &TrackerConfig,
        error: f32,
        pos: f32,
        dt: f32,
    ) -> f32 {
        // Instantaneous target velocity, used only by the edge policy below
        let velocity = (error - self.prev_error) / dt;

        // PID with anti-windup and filtered derivative
        let p = gains.kp * error;
        self.integral = (self.integral + gains.ki * error * dt).clamp(-cfg.i_max, cfg.i_max);
        let alpha = (-dt / cfg.lpf_tau).exp();
        let derivative = alpha * self.prev_derivative + (1.0 - alpha) * velocity;
        self.prev_derivative = derivative;
        let raw = p + self.integral + gains.kd * derivative;

        // Power-law shaping: fine control near zero error, smooth saturation
        let mut shaped = (SHAPING_GAIN * raw.abs().powf(cfg.gamma)).clamp(0.0, 1.0);

        // Edge-of-frame policy. A fast target about to leave frame must be
        // caught aggressively; a slow one near the edge must not be chased
        // past the boundary.
        let edge_distance = pos.min(1.0 - pos);
        if edge_distance <= cfg.near_edge_threshold {
            let toward_edge = if pos < 0.5 { -velocity } else { velocity };
            if edge_distance <= cfg.approach_limit && toward_edge > cfg.v_thresh {
                shaped = 1.0;
            } else {
                shaped *= EDGE_DAMPING;
            }
        }

        // Map into the device speed range, then bound acceleration and blend
        // with the previous cycle. The final clamp also floors the damped
        // near-edge speed at the device minimum.
        let target = SPEED_MIN + shaped * (SPEED_MAX - SPEED_MIN);
        let max_step = cfg.slew_rate * dt;
        let slewed = target.clamp(self.prev_speed - max_step, self.prev_speed + max_step);
        let speed = (alpha * self.prev_speed + (1.0 - alpha) * slewed).clamp(SPEED_MIN, SPEED_MAX);

        self.prev_speed = speed;
        self.prev_error = error;
        speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    const DT: f32 = 1.0 / 30.0;

    fn cfg() -> TrackerConfig {
        TrackerConfig::default()
    }

    #[test]
    fn deadband_zeroes_small_errors() {
        for e in [-0.029, -0.01, 0.0, 0.005, 0.0299] {
            assert_eq!(Axis::deadband(e, 0.03), 0.0, "error {e}");
        }
    }

    #[test]
    fn deadband_subtracts_width_outside_band() {
        assert_abs_diff_eq!(Axis::deadband(0.10, 0.03), 0.07, epsilon = 1e-6);
        assert_abs_diff_eq!(Axis::deadband(-0.10, 0.03), -0.07, epsilon = 1e-6);
    }

    #[test]
    fn speed_stays_in_device_range() {
        let cfg = cfg();
        let mut axis = Axis::new();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let error = Axis::deadband(rng.gen_range(-0.5..0.5), cfg.deadband);
            let pos = rng.gen_range(0.0..1.0);
            let speed = axis.step(&cfg.gains_x, &cfg, error, pos, DT);
            assert!(speed.is_finite());
            assert!((SPEED_MIN..=SPEED_MAX).contains(&speed), "speed {speed}");
        }
    }

    #[test]
    fn slew_rate_bounds_speed_change() {
        let cfg = cfg();
        let mut axis = Axis::new();
        let mut rng = StdRng::seed_from_u64(11);
        // First cycle brings prev_speed into the device range
        let mut prev = axis.step(&cfg.gains_x, &cfg, 0.1, 0.6, DT);
        for _ in 0..500 {
            let error = Axis::deadband(rng.gen_range(-0.5..0.5), cfg.deadband);
            let speed = axis.step(&cfg.gains_x, &cfg, error, 0.5, DT);
            assert!(
                (speed - prev).abs() <= cfg.slew_rate * DT + 1e-5,
                "jump {} exceeds slew bound",
                (speed - prev).abs()
            );
            prev = speed;
        }
    }

    #[test]
    fn integral_never_exceeds_clamp() {
        let cfg = cfg();
        let mut axis = Axis::new();
        // Sustained large error would wind the integral up without the clamp
        for _ in 0..10_000 {
            axis.step(&cfg.gains_x, &cfg, 0.45, 0.95, DT);
            assert!(axis.integral().abs() <= cfg.i_max + 1e-6);
        }
        let mut axis = Axis::new();
        for _ in 0..10_000 {
            axis.step(&cfg.gains_x, &cfg, -0.45, 0.05, DT);
            assert!(axis.integral().abs() <= cfg.i_max + 1e-6);
        }
    }

    #[test]
    fn edge_recovery_forces_full_speed() {
        let cfg = cfg();
        let mut axis = Axis::new();
        // Target inside the approach limit and moving toward the right edge
        // at 0.3/s, well over v_thresh: full-scale recovery engages.
        let mut speed = 0.0;
        let mut error = 0.1;
        for _ in 0..300 {
            error += 0.01;
            speed = axis.step(&cfg.gains_x, &cfg, error, 0.97, DT);
        }
        // Slew and smoothing need time, but the forced full-scale target
        // must saturate the speed at the device maximum.
        assert_abs_diff_eq!(speed, SPEED_MAX, epsilon = 0.02);
    }

    #[test]
    fn near_edge_slow_target_is_damped() {
        let cfg = cfg();
        let mut center = Axis::new();
        let mut edge = Axis::new();
        // Same error history, one target near the edge but stationary
        let mut center_speed = 0.0;
        let mut edge_speed = 0.0;
        for _ in 0..120 {
            center_speed = center.step(&cfg.gains_x, &cfg, 0.3, 0.5, DT);
            edge_speed = edge.step(&cfg.gains_x, &cfg, 0.3, 0.9, DT);
        }
        assert!(
            edge_speed < center_speed,
            "edge {edge_speed} should be damped below center {center_speed}"
        );
        assert!(edge_speed >= SPEED_MIN);
    }

    #[test]
    fn integral_decay_relaxes_accumulator() {
        let cfg = cfg();
        let mut axis = Axis::new();
        for _ in 0..200 {
            axis.step(&cfg.gains_x, &cfg, 0.3, 0.6, DT);
        }
        let before = axis.integral();
        assert!(before > 0.0);
        axis.decay_integral();
        assert_abs_diff_eq!(axis.integral(), before * LOST_DECAY, epsilon = 1e-6);
    }

    #[test]
    fn halt_restarts_ramp_from_standstill() {
        let cfg = cfg();
        let mut axis = Axis::new();
        for _ in 0..300 {
            axis.step(&cfg.gains_x, &cfg, 0.37, 0.6, DT);
        }
        assert!(axis.prev_speed() > SPEED_MIN + 0.5);
        axis.halt();
        // First cycle after a halt starts at the device minimum, however
        // large the error: the slew bound acts on the standstill baseline.
        let speed = axis.step(&cfg.gains_x, &cfg, 0.37, 0.6, DT);
        assert_abs_diff_eq!(speed, SPEED_MIN, epsilon = 1e-5);
    }

    #[test]
    fn reset_clears_all_state() {
        let cfg = cfg();
        let mut axis = Axis::new();
        for _ in 0..50 {
            axis.step(&cfg.gains_x, &cfg, 0.3, 0.6, DT);
        }
        axis.reset();
        assert_eq!(axis.integral(), 0.0);
        assert_eq!(axis.prev_error(), 0.0);
        assert_eq!(axis.prev_speed(), 0.0);
    }
}
