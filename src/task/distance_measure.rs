//! Distance sensor handling
//!
//! Measures the distance to whatever is in front of the striker using the
//! HC-SR04 ultrasonic sensor and publishes it for the charge regulator.
//!
//! # Sensor Operation
//! - Uses async HC-SR04 driver for non-blocking measurements
//! - Measurements taken every 100ms
//! - Distance published in millimeters
//! - Assumes fixed ambient temperature of 21.5°C
//!
//! # Signal Processing
//! - Uses a moving median filter to reduce noise
//! - Window size of 3 measurements provides good balance of:
//!   - Noise reduction
//!   - Quick response to real changes
//!   - Memory efficiency
//!
//! # Error Handling
//! - Failed measurements publish the no-reading sentinel (0 mm)
//! - The charge regulator treats the sentinel as "nothing in range"

use crate::system::proximity::{self, NO_READING_MM};
use crate::system::resources::DistanceSensorResources;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_time::{Duration, Timer};
use hcsr04_async::{Config, DistanceUnit, Hcsr04, TemperatureUnit};
use moving_median::MovingMedian;

/// Time between measurements (100ms provides good balance of responsiveness and stability)
const MEASUREMENT_INTERVAL: Duration = Duration::from_millis(100);

/// Size of median filter window (3 samples balances noise reduction vs. latency)
const MEDIAN_WINDOW_SIZE: usize = 3;

/// Fixed ambient temperature for distance calculations
/// Slight inaccuracy acceptable as we care more about consistent readings
const TEMPERATURE: f64 = 21.5;

/// Main distance measurement task
///
/// Applies median filtering to smooth measurements and publishes the latest
/// filtered distance for the charge regulator to pick up on its own cadence.
#[embassy_executor::task]
pub async fn distance_measure(r: DistanceSensorResources) {
    // Configure sensor for centimeter measurements
    let config: Config = Config {
        distance_unit: DistanceUnit::Centimeters,
        temperature_unit: TemperatureUnit::Celsius,
    };

    // Initialize sensor with trigger and echo pins
    let trigger = Output::new(r.trigger_pin, Level::Low);
    let echo = Input::new(r.echo_pin, Pull::None);
    let mut sensor = Hcsr04::new(trigger, echo, config);

    // Initialize median filter for noise reduction
    let mut median_filter = MovingMedian::<f64, MEDIAN_WINDOW_SIZE>::new();

    loop {
        match sensor.measure(TEMPERATURE).await {
            Ok(distance_cm) => {
                median_filter.add_value(distance_cm);
                proximity::publish((median_filter.median() * 10.0) as u16);
            }
            Err(_) => proximity::publish(NO_READING_MM),
        };

        // Wait before next measurement
        Timer::after(MEASUREMENT_INTERVAL).await;
    }
}
