//! Hardware Resource Management
//!
//! Manages and allocates hardware resources (pins, peripherals) to the
//! robot's tasks. This module ensures safe and organized access to the
//! hardware by:
//! - Defining clear ownership of hardware resources
//! - Preventing conflicts in hardware access
//! - Providing safe concurrent access to shared resources (the ADC)
//!
//! # Resource Groups
//! - Distance Sensor: HC-SR04 ultrasonic sensor pins
//! - Line Camera: linear pixel array strobe/clock outputs and analog video
//! - Microphone: back microphone amplifier output
//! - RGB LED: PWM-controlled indicator LED pins
//! - Motor Control: dual motor driver pins and PWM channels
//!
//! # Shared Resources
//! The ADC is shared between the line camera and the microphone and is
//! protected by a mutex. The two never sample at the same time in practice
//! because their phases are disjoint, but the mutex keeps the access safe
//! regardless.

use assign_resources::assign_resources;
use embassy_rp::adc::InterruptHandler as AdcInterruptHandler;
use embassy_rp::adc::{Adc, Async as AdcAsync};
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{self, ADC};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;

/// Global ADC (Analog-to-Digital Converter) instance protected by a mutex.
///
/// The mutex ensures safe concurrent access from the tasks that read analog
/// values (line camera, microphone). Only one task can access the ADC at a
/// time, preventing conflicts in hardware access.
static ADC: Mutex<CriticalSectionRawMutex, Option<Adc<'static, AdcAsync>>> = Mutex::new(None);

/// Initializes the ADC peripheral.
///
/// This should only be called once during system initialization in main.rs,
/// before any tasks are spawned.
pub fn init_adc(adc: ADC) {
    let adc = Adc::new(adc, Irqs, embassy_rp::adc::Config::default());
    critical_section::with(|_| {
        *ADC.try_lock().unwrap() = Some(adc);
    });
}

/// Returns a reference to the protected ADC instance.
///
/// Tasks should acquire the mutex lock, perform their sampling burst, and
/// release the lock as quickly as possible.
pub fn get_adc() -> &'static Mutex<CriticalSectionRawMutex, Option<Adc<'static, AdcAsync>>> {
    &ADC
}

assign_resources! {
    /// HC-SR04 forward distance sensor pins
    distance_sensor: DistanceSensorResources {
        trigger_pin: PIN_15,
        echo_pin: PIN_14,
    },
    /// Linear pixel array camera: start-of-scan strobe, pixel clock and
    /// analog video output (ADC capable pin required)
    line_camera: LineCameraResources {
        strobe_pin: PIN_16,
        clock_pin: PIN_17,
        video_pin: PIN_26,
    },
    /// Back microphone amplifier output (ADC capable pin required)
    microphone: MicrophoneResources {
        mic_pin: PIN_29,
    },
    /// PWM-controlled RGB LED indicator pins
    rgb_led: RGBLedResources {
        pwm_red: PWM_SLICE1,
        pwm_green: PWM_SLICE2,
        red_pin: PIN_2,
        green_pin: PIN_4,
    },
    /// TB6612FNG dual motor driver pins and PWM channels
    motor_driver: MotorDriverResources {
        standby_pin: PIN_22,
        // Motor drive PWM
        left_slice: PWM_SLICE6,
        left_pwm_pin: PIN_28,
        left_forward_pin: PIN_21,
        left_backward_pin: PIN_20,
        // Motor drive PWM
        right_slice: PWM_SLICE5,
        right_pwm_pin: PIN_27,
        right_forward_pin: PIN_19,
        right_backward_pin: PIN_18,
    },
}

bind_interrupts!(pub struct Irqs {
    ADC_IRQ_FIFO => AdcInterruptHandler;
});
