//! Drive Task Module
//!
//! This module implements the drive control task that turns wheel speed
//! commands into motor output using a TB6612FNG motor driver. Speeds arrive
//! in control units and are scaled down to the driver's percent range here,
//! keeping the regulators free of motor driver details.

use crate::system::resources::MotorDriverResources;
use crate::system::wheel_command::{self, MOTOR_SPEED_LIMIT};
use embassy_rp::gpio;
use embassy_rp::pwm;
use embassy_time::{Duration, Timer};
use tb6612fng::{DriveCommand, Motor, Tb6612fng};

type WheelMotor = Motor<gpio::Output<'static>, gpio::Output<'static>, pwm::Pwm<'static>>;

/// Scales a wheel speed in control units to the driver's -100..=100 range.
fn to_percent(speed: i16) -> i8 {
    (speed as i32 * 100 / MOTOR_SPEED_LIMIT as i32) as i8
}

fn apply(motor: &mut WheelMotor, percent: i8) {
    let command = if percent > 0 {
        DriveCommand::Forward(percent as u8)
    } else if percent < 0 {
        DriveCommand::Backward(-percent as u8)
    } else {
        DriveCommand::Stop
    };
    motor.drive(command).unwrap();
}

#[embassy_executor::task]
pub async fn drive(r: MotorDriverResources) {
    // Configure PWM for motor control
    // We use 10kHz frequency as cheaper DC motors often work better at lower frequencies
    let desired_freq_hz = 10_000;
    let clock_freq_hz = embassy_rp::clocks::clk_sys_freq(); // 150MHz

    // Calculate minimum divider needed to keep period under 16-bit limit (65535)
    let divider = ((clock_freq_hz / desired_freq_hz) / 65535 + 1) as u8;
    let period = (clock_freq_hz / (desired_freq_hz * divider as u32)) as u16 - 1;

    // Configure PWM
    let mut pwm_config = pwm::Config::default();
    pwm_config.divider = divider.into();
    pwm_config.top = period;

    // Initialize TB6612FNG motor driver pins
    let stby = gpio::Output::new(r.standby_pin, gpio::Level::Low);

    // motor A, here defined to be the left motor
    let left_fwd = gpio::Output::new(r.left_forward_pin, gpio::Level::Low);
    let left_bckw = gpio::Output::new(r.left_backward_pin, gpio::Level::Low);
    let left_pwm = pwm::Pwm::new_output_a(r.left_slice, r.left_pwm_pin, pwm_config.clone());
    let left_motor = Motor::new(left_fwd, left_bckw, left_pwm).unwrap();

    // motor B, here defined to be the right motor
    let right_fwd = gpio::Output::new(r.right_forward_pin, gpio::Level::Low);
    let right_bckw = gpio::Output::new(r.right_backward_pin, gpio::Level::Low);
    let right_pwm = pwm::Pwm::new_output_b(r.right_slice, r.right_pwm_pin, pwm_config.clone());
    let right_motor = Motor::new(right_fwd, right_bckw, right_pwm).unwrap();

    // Create motor driver controller instance
    let mut control = Tb6612fng::new(left_motor, right_motor, stby).unwrap();

    // The driver stays out of standby for the whole run, the regulators
    // command explicit stops instead
    control.disable_standby().unwrap();
    Timer::after(Duration::from_millis(100)).await;

    loop {
        let speeds = wheel_command::wait().await;
        apply(&mut control.motor_a, to_percent(speeds.left));
        apply(&mut control.motor_b, to_percent(speeds.right));
    }
}
