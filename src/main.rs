//! Striker robot firmware entry point
//!
//! Initializes system and spawns the sensing, control and actuation tasks.

#![no_std]
#![no_main]

use crate::task::{
    distance_measure::distance_measure, drive::drive, line_scan::line_scan, regulate::regulate,
    rgb_led_indicate::rgb_led_indicate, sound_remote::sound_remote,
};
use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use system::resources::{
    self, AssignedResources, DistanceSensorResources, LineCameraResources, MicrophoneResources,
    MotorDriverResources, RGBLedResources,
};
use {defmt_rtt as _, panic_probe as _};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

/// Pure regulator and detector logic
mod control;
/// System core modules
mod system;
/// Task implementations
mod task;

/// Firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());

    // Initialize the global ADC instance before spawning any tasks.
    // This initialization must happen here to ensure:
    // 1. The ADC is ready before any tasks that need it (camera, microphone)
    // 2. We only initialize once, as multiple initializations could corrupt the hardware state
    // 3. No race conditions can occur since this happens before any tasks are spawned
    resources::init_adc(p.ADC);

    // Split the resources into separate groups for each task, for all the resources that we do not share between tasks.
    let r = split_resources!(p);

    // Finally spawn all the tasks
    spawner.spawn(drive(r.motor_driver)).unwrap();
    spawner.spawn(rgb_led_indicate(r.rgb_led)).unwrap();
    // Sensing tasks feed the regulators, spawn them before the control loop
    spawner.spawn(distance_measure(r.distance_sensor)).unwrap();
    spawner.spawn(line_scan(r.line_camera)).unwrap();
    spawner.spawn(sound_remote(r.microphone)).unwrap();
    spawner.spawn(regulate()).unwrap();
}
