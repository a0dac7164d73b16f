//! Discrete PI regulator for ball alignment
//!
//! Converts the bearing error into a turn speed. The integral leaks a
//! fraction of its value every tick so that stale error decays, and is
//! clamped for anti-windup.

use crate::system::ball_bearing::BUFFER_WIDTH;
use crate::system::wheel_command::MOTOR_SPEED_LIMIT;

/// Proportional gain
pub const KP: f32 = 0.5;
/// Integral gain
pub const KI: f32 = 0.15;
/// Integral leak per tick; the regulator forgets with time
pub const KI_PRIOR: f32 = 0.93;
/// Anti-windup clamp on the accumulated error
pub const MAX_SUM_ERROR: f32 = MOTOR_SPEED_LIMIT as f32 / (5.0 * KI);
/// Bearing setpoint: ball centered in the scanline
pub const GOAL: u16 = BUFFER_WIDTH / 2;
/// Dead-band below which no correction is issued (px); perfect alignment is
/// not achievable anyway
pub const ROTATION_THRESHOLD: i16 = 10;

/// PI regulator state. The accumulated error survives across ticks until the
/// owning regulator resets it.
pub struct PiRegulator {
    sum_error: f32,
}

impl PiRegulator {
    pub const fn new() -> Self {
        Self { sum_error: 0.0 }
    }

    /// One regulation step toward [`GOAL`]. Returns the turn speed.
    ///
    /// Inside the dead-band the output is 0 and the accumulated error is
    /// left untouched, so near-alignment does not creep the integral.
    pub fn update(&mut self, position: u16) -> i16 {
        let error = position as i16 - GOAL as i16;

        if error.abs() < ROTATION_THRESHOLD {
            return 0;
        }

        self.sum_error = (self.sum_error * KI_PRIOR + error as f32)
            .clamp(-MAX_SUM_ERROR, MAX_SUM_ERROR);

        (KP * error as f32 + KI * self.sum_error) as i16
    }

    /// Accumulated integral error.
    pub fn sum_error(&self) -> f32 {
        self.sum_error
    }

    pub fn reset(&mut self) {
        self.sum_error = 0.0;
    }
}
