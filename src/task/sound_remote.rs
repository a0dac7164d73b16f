//! Sound remote task
//!
//! Listens for whistle commands on the back microphone. A frame of samples
//! is captured at a fixed rate, transformed into the frequency domain, and
//! handed to the tone tracker. The task only listens in the phases where
//! audio commands are meaningful; while the robot hunts the ball the
//! microphone stays idle and the ADC is free for the camera.

use defmt::warn;
use embassy_rp::adc::Channel;
use embassy_rp::gpio::Pull;
use embassy_time::{Duration, Ticker, Timer};
use libm::sqrtf;
use microfft::real::rfft_1024;

use crate::control::sound::{ToneBand, ToneTracker, FFT_SIZE, SPEED_MV_COMMAND, SPEED_WAIT_COMMAND};
use crate::system::phase::{self, Phase};
use crate::system::resources::{self, MicrophoneResources};
use crate::system::wheel_command::{self, mix, WheelSpeeds};

/// Audio sampling rate, giving 15.6 Hz per FFT bin
const SAMPLE_RATE_HZ: u64 = 16_000;
/// Poll interval while the robot is in a non-listening phase
const IDLE_POLL: Duration = Duration::from_millis(100);

#[embassy_executor::task]
pub async fn sound_remote(r: MicrophoneResources) {
    let mut mic = Channel::new_pin(r.mic_pin, Pull::None);
    let mut tracker = ToneTracker::new();
    let mut samples = [0.0f32; FFT_SIZE];

    loop {
        let current = phase::get().await;
        if current != Phase::Startup && current != Phase::ManualMove {
            tracker.rearm();
            Timer::after(IDLE_POLL).await;
            continue;
        }

        let captured = {
            let mut adc_guard = resources::get_adc().lock().await;
            let adc = adc_guard.as_mut().unwrap();

            let mut ticker = Ticker::every(Duration::from_hz(SAMPLE_RATE_HZ));
            let mut ok = true;
            for sample in samples.iter_mut() {
                ticker.next().await;
                match adc.read(&mut mic).await {
                    // Center the 12-bit sample around zero
                    Ok(raw) => *sample = raw as f32 - 2048.0,
                    Err(_) => {
                        ok = false;
                        break;
                    }
                }
            }
            ok
        };

        if !captured {
            warn!("Microphone ADC read failed, dropping frame");
            tracker.rearm();
            continue;
        }

        let spectrum = rfft_1024(&mut samples);
        let mut magnitudes = [0.0f32; FFT_SIZE / 2];
        for (magnitude, bin) in magnitudes.iter_mut().zip(spectrum.iter()) {
            *magnitude = sqrtf(bin.re * bin.re + bin.im * bin.im);
        }

        let Some(peak) = tracker.track(&magnitudes) else {
            continue;
        };

        // The phase may have moved while the frame was being captured
        match phase::get().await {
            Phase::Startup => {
                if peak.band() == Some(ToneBand::Reset) {
                    phase::switch(true).await;
                }
            }
            Phase::ManualMove => match peak.band() {
                Some(ToneBand::Forward) if peak.steady => {
                    wheel_command::update(mix(0, SPEED_MV_COMMAND));
                }
                Some(ToneBand::Search) if peak.steady => {
                    wheel_command::update(WheelSpeeds::stop());
                    phase::switch(true).await;
                }
                // Spin in place while waiting for a command
                _ => wheel_command::update(mix(-SPEED_WAIT_COMMAND, 0)),
            },
            _ => {}
        }
    }
}
