//! Control loop dispatcher
//!
//! Runs the rotational regulator and the charge regulator on a fixed 10 ms
//! cadence. Both regulators run under one lock of the phase machine, against
//! one phase snapshot per tick, so a phase switch made by one regulator is
//! never half-observed by the other.

use defmt::info;
use embassy_time::{Duration, Instant, Ticker};

use crate::control::charge::ChargeRegulator;
use crate::control::rotation::RotationRegulator;
use crate::system::ball_bearing;
use crate::system::phase::{self, Phase, PHASE};
use crate::system::proximity;
use crate::system::wheel_command;

const TICK_INTERVAL: Duration = Duration::from_millis(10);

#[embassy_executor::task]
pub async fn regulate() {
    let mut rotation = RotationRegulator::new(Instant::now());
    let mut charge = ChargeRegulator::new();
    let mut ticker = Ticker::every(TICK_INTERVAL);

    loop {
        ticker.next().await;

        let now = Instant::now();
        let bearing = ball_bearing::snapshot();
        let dist_mm = proximity::distance_mm();

        let (before, after) = {
            let mut machine = PHASE.lock().await;
            let before = machine.get();
            match before {
                Phase::SearchBall | Phase::BallLocked | Phase::ChargeBall => {
                    if before != Phase::ChargeBall {
                        let speeds = rotation.tick(&mut machine, bearing, now);
                        wheel_command::update(speeds);
                    }
                    if before != Phase::SearchBall {
                        if let Some(speeds) = charge.tick(&mut machine, dist_mm, now) {
                            wheel_command::update(speeds);
                        }
                    }
                }
                _ => {
                    rotation.reset(now);
                    charge.reset();
                }
            }
            (before, machine.get())
        };

        if after != before {
            info!("Phase switch: {} -> {}", before, after);
            phase::announce(after);
        }
    }
}
