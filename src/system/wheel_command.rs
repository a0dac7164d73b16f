//! Wheel speed commands
//!
//! Both regulators contribute to the same pair of wheel outputs: a
//! rotational component that turns the chassis in place and a straight
//! charge component added identically to both wheels. [`mix`] is the single
//! place where the two are composed into left/right speeds.
//!
//! Commands travel to the motor task over a Signal, so the motors always
//! apply the most recently issued command.

use defmt::Format;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Maximum wheel speed in control units.
pub const MOTOR_SPEED_LIMIT: i16 = 1100;

/// A pair of signed wheel speeds in control units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub struct WheelSpeeds {
    pub left: i16,
    pub right: i16,
}

impl WheelSpeeds {
    pub const fn stop() -> Self {
        Self { left: 0, right: 0 }
    }
}

/// Composes the rotational and straight components into wheel speeds.
/// A positive rotation drives the left wheel forward and the right wheel
/// backward.
pub fn mix(rotation: i16, charge: i16) -> WheelSpeeds {
    WheelSpeeds {
        left: charge
            .saturating_add(rotation)
            .clamp(-MOTOR_SPEED_LIMIT, MOTOR_SPEED_LIMIT),
        right: charge
            .saturating_sub(rotation)
            .clamp(-MOTOR_SPEED_LIMIT, MOTOR_SPEED_LIMIT),
    }
}

/// Latest wheel command for the motor task.
static WHEELS: Signal<CriticalSectionRawMutex, WheelSpeeds> = Signal::new();

/// Issues a new wheel command. Synchronous; latest value wins.
pub fn update(speeds: WheelSpeeds) {
    WHEELS.signal(speeds);
}

/// Waits for the next wheel command.
pub async fn wait() -> WheelSpeeds {
    WHEELS.wait().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_rotation_is_differential() {
        let speeds = mix(400, 0);
        assert_eq!(speeds, WheelSpeeds { left: 400, right: -400 });
    }

    #[test]
    fn pure_charge_is_straight() {
        let speeds = mix(0, 1000);
        assert_eq!(speeds, WheelSpeeds { left: 1000, right: 1000 });
    }

    #[test]
    fn composition_adds_and_subtracts() {
        let speeds = mix(-50, 1000);
        assert_eq!(speeds, WheelSpeeds { left: 950, right: 1050 });
    }

    #[test]
    fn output_is_clamped_to_the_motor_limit() {
        let speeds = mix(500, 1000);
        assert_eq!(speeds.left, MOTOR_SPEED_LIMIT);
        assert_eq!(speeds.right, 500);

        let speeds = mix(i16::MIN, i16::MIN);
        assert_eq!(speeds.left, -MOTOR_SPEED_LIMIT);
        assert_eq!(speeds.right, MOTOR_SPEED_LIMIT);
    }
}
