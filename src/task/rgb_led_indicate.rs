//! RGB LED Indicator Module
//!
//! This module controls the RGB LED indicator for the robot, providing visual
//! feedback about the current phase. Steady phases get a steady color, the
//! charge gets a fast red blink, and the transient announce phases play a
//! blink animation after which this task advances the phase machine itself.

use crate::system::phase::{self, Phase};
use crate::system::resources::RGBLedResources;
use embassy_futures::select::select;
use embassy_futures::select::Either;
use embassy_rp::pwm;
use embassy_rp::pwm::SetDutyCycle;
use embassy_time::{Duration, Timer};

/// Half-period of the announce blink animations
const ANNOUNCE_STEP: Duration = Duration::from_millis(200);

/// On/off cycles of one announce animation
const ANNOUNCE_CYCLES: u8 = 7;

/// Half-period of the red blink while charging
const CHARGE_BLINK_INTERVAL: Duration = Duration::from_millis(150);

/// Controls the RGB LED indicator based on the operating phase.
///
/// For the `Led*` announce phases this task owns the transition: it plays
/// the animation to completion and only then switches the machine onward, so
/// the announce phases last exactly as long as their light show.
#[embassy_executor::task]
pub async fn rgb_led_indicate(r: RGBLedResources) {
    // configure pwm for rgb led, 100Hz should suffice
    let desired_freq_hz = 100;
    let clock_freq_hz = embassy_rp::clocks::clk_sys_freq(); // 150MHz

    // Calculate minimum divider needed to keep period under 16-bit limit (65535)
    let divider = ((clock_freq_hz / desired_freq_hz) / 65535 + 1) as u8;
    let period = (clock_freq_hz / (desired_freq_hz * divider as u32)) as u16 - 1;

    // Configure red LED PWM
    let mut config_red = pwm::Config::default();
    config_red.divider = divider.into();
    config_red.top = period;
    let mut pwm_red = pwm::Pwm::new_output_a(r.pwm_red, r.red_pin, config_red.clone());

    // Configure green LED PWM
    let mut config_green = pwm::Config::default();
    config_green.divider = divider.into();
    config_green.top = period;
    let mut pwm_green = pwm::Pwm::new_output_a(r.pwm_green, r.green_pin, config_green.clone());

    // set initial color to off
    let _ = pwm_red.set_duty_cycle_fully_off();
    let _ = pwm_green.set_duty_cycle_fully_off();

    let mut current = Phase::Startup;

    loop {
        if current.is_led_announce() {
            // Which legs of the LED take part in the animation
            let (red, green) = match current {
                Phase::LedMoveToSearch => (true, true),
                Phase::LedBallNotFound => (true, false),
                _ => (false, true),
            };

            let mut led_on = false;
            for _ in 0..ANNOUNCE_CYCLES * 2 {
                led_on = !led_on;
                if red && led_on {
                    let _ = pwm_red.set_duty_cycle_fully_on();
                } else {
                    let _ = pwm_red.set_duty_cycle_fully_off();
                }
                if green && led_on {
                    let _ = pwm_green.set_duty_cycle_fully_on();
                } else {
                    let _ = pwm_green.set_duty_cycle_fully_off();
                }
                Timer::after(ANNOUNCE_STEP).await;
            }

            let _ = pwm_red.set_duty_cycle_fully_off();
            let _ = pwm_green.set_duty_cycle_fully_off();

            // The animation is over, advance the machine past the announce
            current = phase::switch(true).await;
            continue;
        }

        if current == Phase::ChargeBall {
            // Fast red blink until the regulators leave the charge
            let mut led_on = false;
            'blink: loop {
                led_on = !led_on;
                if led_on {
                    let _ = pwm_red.set_duty_cycle_fully_on();
                } else {
                    let _ = pwm_red.set_duty_cycle_fully_off();
                }
                let _ = pwm_green.set_duty_cycle_fully_off();

                if let Either::Second(next) =
                    select(Timer::after(CHARGE_BLINK_INTERVAL), phase::announced()).await
                {
                    current = next;
                    break 'blink;
                }
            }
            continue;
        }

        // Steady colors for the long-lived phases
        match current {
            Phase::Startup => {
                // Amber: waiting for the reset tone
                let _ = pwm_red.set_duty_cycle_fully_on();
                let _ = pwm_green.set_duty_cycle_percent(30);
            }
            Phase::ManualMove => {
                let _ = pwm_red.set_duty_cycle_fully_off();
                let _ = pwm_green.set_duty_cycle_fully_on();
            }
            Phase::SearchBall => {
                // Dim red while sweeping
                let _ = pwm_red.set_duty_cycle_percent(30);
                let _ = pwm_green.set_duty_cycle_fully_off();
            }
            _ => {
                // BallLocked
                let _ = pwm_red.set_duty_cycle_fully_off();
                let _ = pwm_green.set_duty_cycle_fully_on();
            }
        }

        current = phase::announced().await;
    }
}
