//! Rotational regulator
//!
//! Aligns the chassis toward the ball using the camera bearing. It behaves
//! differently depending on whether the ball is in sight:
//! - ball in sight: the PI regulator calculates the rotation speed
//! - ball recently out of sight: keep regulating on the last bearing, the
//!   camera may well find it again (this tolerates false reads)
//! - ball gone for too long: constant speed turn in hope of finding it again
//!
//! Once the bearing has been centered for enough consecutive ticks the
//! regulator declares lock, reports success to the state machine and starts
//! the straight charge component. It keeps running during the charge until
//! the ball disappears or gets too close.

use embassy_time::{Duration, Instant};

use crate::control::pi::{PiRegulator, ROTATION_THRESHOLD};
use crate::system::ball_bearing::BearingEstimate;
use crate::system::phase::{Phase, PhaseMachine};
use crate::system::wheel_command::{self, WheelSpeeds, MOTOR_SPEED_LIMIT};

/// Maximum allowed time with the ball out of sight before committing to a
/// manual turn
const BALL_LOST_TIMEOUT: Duration = Duration::from_millis(700);
/// Forced turn window after a run of dubious reads; re-acquisition is
/// ignored while it lasts to prevent flicker reversals
const FORCED_TURN_WINDOW: Duration = Duration::from_millis(100);
/// Time allowed to settle and find the ball
const SEARCH_TIMEOUT: Duration = Duration::from_millis(6000);

/// Confidence budget of a sighting; dubious reads drain it
const MEASURE_POTENTIAL: u8 = 20;
/// Consecutive centered ticks required to declare lock
const ALIGNED_TICKS: u8 = 12;

/// Fixed sweep speed while turning blind
const MANUAL_TURN_SPEED: i16 = MOTOR_SPEED_LIMIT / 2;
/// Straight drive component once committed to the ball
pub const CHARGE_SPEED: i16 = MOTOR_SPEED_LIMIT - 100;

/// Regulator memory, cleared by [`reset`](RotationRegulator::reset) whenever
/// the phase leaves the regulator's active set.
pub struct RotationRegulator {
    pi: PiRegulator,
    speed: i16,
    speed_offset: i16,
    aligned_count: u8,
    // Replenished by sightings, deliberately not by reset
    measure_potential: u8,
    ball_lost: bool,
    manual_turn: bool,
    forced_turn: bool,
    lost_since: Instant,
    forced_since: Instant,
    search_started: Instant,
}

impl RotationRegulator {
    pub fn new(now: Instant) -> Self {
        Self {
            pi: PiRegulator::new(),
            speed: 0,
            speed_offset: 0,
            aligned_count: 0,
            measure_potential: 0,
            ball_lost: false,
            manual_turn: false,
            forced_turn: false,
            lost_since: now,
            forced_since: now,
            search_started: now,
        }
    }

    /// Clears all regulator memory and restarts the search clock.
    /// Idempotent; the dispatcher calls it on every idle tick.
    pub fn reset(&mut self, now: Instant) {
        self.pi.reset();
        self.speed = 0;
        self.speed_offset = 0;
        self.aligned_count = 0;
        self.ball_lost = false;
        self.manual_turn = false;
        self.forced_turn = false;
        self.search_started = now;
    }

    /// One control step. Transitions made here go through `phase` and are
    /// visible to the caller immediately. Returns the wheel command for
    /// this tick; the command is produced every tick, including zero.
    pub fn tick(
        &mut self,
        phase: &mut PhaseMachine,
        bearing: BearingEstimate,
        now: Instant,
    ) -> WheelSpeeds {
        if !bearing.seen && !self.ball_lost {
            self.lost_since = now;
            self.ball_lost = true;
        } else if bearing.seen && !self.forced_turn {
            self.measure_potential = MEASURE_POTENTIAL;
            self.ball_lost = false;
            self.manual_turn = false;
        } else if self.ball_lost && phase.get() == Phase::SearchBall {
            // Ball reported missing: drain the confidence of the current
            // measurement; if it has been missing for too long (unseen or
            // dubious reads), go for the manual turn.
            if self.measure_potential > 0 {
                self.measure_potential -= 1;
                if self.measure_potential == 0 {
                    self.forced_turn = true;
                    self.manual_turn = true;
                    self.forced_since = now;
                }
            }
            if now.duration_since(self.lost_since) > BALL_LOST_TIMEOUT {
                self.manual_turn = true;
            }
            if self.forced_turn
                && now.duration_since(self.forced_since) > FORCED_TURN_WINDOW
            {
                self.forced_turn = false;
            }
        }

        if !self.manual_turn {
            self.speed = self.pi.update(bearing.position);
        } else if phase.get() == Phase::SearchBall {
            self.speed = MANUAL_TURN_SPEED;
        }

        // Ball nearly in front of the camera: don't rotate, count the tick
        if self.speed.abs() <= ROTATION_THRESHOLD && self.speed_offset == 0 && bearing.seen {
            self.aligned_count += 1;
        } else if self.speed_offset == 0 {
            self.aligned_count = 0;
        }

        if self.aligned_count > ALIGNED_TICKS && self.speed_offset == 0 {
            // Aligned over enough consecutive reads: time to charge
            if phase.get() == Phase::SearchBall {
                phase.switch(true);
            }
            self.speed_offset = CHARGE_SPEED;
            self.aligned_count = 0;
            self.pi.reset();
        } else if phase.get() == Phase::BallLocked && !bearing.seen {
            // Ball got out of sight (too near, or removed by a mean user):
            // treat it as imminent contact and charge straight
            self.speed = 0;
            phase.switch(true);
            self.speed_offset = CHARGE_SPEED;
        }

        if phase.get() == Phase::SearchBall
            && now.duration_since(self.search_started) > SEARCH_TIMEOUT
        {
            self.speed = 0;
            phase.switch(false);
        }

        if phase.get() == Phase::ChargeBall {
            self.speed = 0;
        }

        wheel_command::mix(self.speed, self.speed_offset)
    }
}
