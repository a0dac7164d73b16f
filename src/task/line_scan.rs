//! Line camera scan task
//!
//! Drives the linear pixel array camera and publishes the ball bearing.
//! Each scan strobes a new exposure, clocks the pixels out one by one
//! through the ADC, and runs the scanline detector over the captured line.
//! Scanning only happens in the phases that steer by vision.

use defmt::warn;
use embassy_rp::adc::Channel;
use embassy_rp::gpio::{Level, Output, Pull};
use embassy_time::{Duration, Ticker};

use crate::control::scanline;
use crate::system::ball_bearing::{self, BUFFER_WIDTH};
use crate::system::phase::{self, Phase};
use crate::system::resources::{self, LineCameraResources};

const SCAN_INTERVAL: Duration = Duration::from_millis(20);

#[embassy_executor::task]
pub async fn line_scan(r: LineCameraResources) {
    let mut strobe = Output::new(r.strobe_pin, Level::Low);
    let mut clock = Output::new(r.clock_pin, Level::Low);
    let mut video = Channel::new_pin(r.video_pin, Pull::None);

    let mut line = [0u8; BUFFER_WIDTH as usize];
    let mut ticker = Ticker::every(SCAN_INTERVAL);

    loop {
        ticker.next().await;

        let current = phase::get().await;
        if current != Phase::SearchBall && current != Phase::BallLocked {
            continue;
        }

        let captured = {
            // Hold the ADC for the whole pixel burst
            let mut adc_guard = resources::get_adc().lock().await;
            let adc = adc_guard.as_mut().unwrap();

            // Start-of-scan strobe, clocked in with one pixel clock edge
            strobe.set_high();
            clock.set_high();
            clock.set_low();
            strobe.set_low();

            let mut ok = true;
            for px in line.iter_mut() {
                clock.set_high();
                match adc.read(&mut video).await {
                    // Keep the 8 most significant bits of the 12-bit sample
                    Ok(raw) => *px = (raw >> 4) as u8,
                    Err(_) => {
                        ok = false;
                        break;
                    }
                }
                clock.set_low();
            }
            ok
        };

        if !captured {
            warn!("Line camera ADC read failed, dropping scan");
            ball_bearing::publish_lost();
            continue;
        }

        match scanline::locate_ball(&line) {
            Some(position) => ball_bearing::publish(position),
            None => ball_bearing::publish_lost(),
        }
    }
}
