//! Tone command detection
//!
//! The remote control is a whistle: every audio frame is reduced to its
//! dominant frequency bin inside a narrow analysis window, and three bands
//! map to commands. Forward and search commands additionally require two
//! consecutive frames on nearly the same bin, debouncing one-shot noise
//! spikes; the reset tone acts on a single frame.

/// Audio FFT size; magnitude frames carry `FFT_SIZE / 2` usable bins.
pub const FFT_SIZE: usize = 1024;

/// First analyzed bin (~1000 Hz); nothing below carries commands
const MIN_FREQ_BIN: i16 = 68;
/// Wake/reset tone (~1100 Hz)
const RESET_BIN: i16 = 70;
/// Forward drive tone (~1250 Hz)
const FORWARD_BIN: i16 = 80;
/// Search kickoff tone (~1400 Hz)
const SEARCH_BIN: i16 = 90;
/// Last analyzed bin (~1440 Hz)
const MAX_FREQ_BIN: i16 = 92;
/// Half-width of each command band, and the debounce tolerance (bins)
const BIN_TOLERANCE: i16 = 3;

/// Absolute magnitude floor below which a peak is noise
const MAGNITUDE_FLOOR: f32 = 17500.0;

/// Wheel speed while spinning in place awaiting a command (control units)
pub const SPEED_WAIT_COMMAND: i16 = 400;
/// Wheel speed of the forward drive command (control units)
pub const SPEED_MV_COMMAND: i16 = 700;

/// Recognized command bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneBand {
    Reset,
    Forward,
    Search,
}

/// Dominant peak of one magnitude frame.
#[derive(Debug, Clone, Copy)]
pub struct TonePeak {
    /// Winning bin, -1 when nothing rose above the floor
    pub bin: i16,
    /// Whether the previous frame's winner was within tolerance
    pub steady: bool,
}

impl TonePeak {
    /// Command band the peak falls into, if any.
    pub fn band(&self) -> Option<ToneBand> {
        if self.bin < 0 {
            return None;
        }
        if (self.bin - RESET_BIN).abs() <= BIN_TOLERANCE {
            Some(ToneBand::Reset)
        } else if (self.bin - FORWARD_BIN).abs() <= BIN_TOLERANCE {
            Some(ToneBand::Forward)
        } else if (self.bin - SEARCH_BIN).abs() <= BIN_TOLERANCE {
            Some(ToneBand::Search)
        } else {
            None
        }
    }
}

/// Per-frame peak tracker with the startup discard and the debounce memory.
pub struct ToneTracker {
    prev_bin: i16,
    discard_next: bool,
}

impl ToneTracker {
    pub const fn new() -> Self {
        Self {
            prev_bin: 0,
            discard_next: true,
        }
    }

    /// Arms the first-frame discard again. The microphone front-end returns
    /// garbage on the first frame after a pause.
    pub fn rearm(&mut self) {
        self.discard_next = true;
    }

    /// Reduces one magnitude frame to its dominant peak. Returns `None` for
    /// the discarded first frame after (re)arming.
    pub fn track(&mut self, magnitudes: &[f32]) -> Option<TonePeak> {
        debug_assert_eq!(magnitudes.len(), FFT_SIZE / 2);
        if self.discard_next {
            self.discard_next = false;
            return None;
        }

        let mut max_norm = MAGNITUDE_FLOOR;
        let mut bin: i16 = -1;
        for i in MIN_FREQ_BIN as usize..=MAX_FREQ_BIN as usize {
            if magnitudes[i] > max_norm {
                max_norm = magnitudes[i];
                bin = i as i16;
            }
        }

        let steady = (self.prev_bin - bin).abs() <= BIN_TOLERANCE;
        self.prev_bin = bin;
        Some(TonePeak { bin, steady })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(bin: usize, magnitude: f32) -> [f32; FFT_SIZE / 2] {
        let mut magnitudes = [0.0; FFT_SIZE / 2];
        magnitudes[bin] = magnitude;
        magnitudes
    }

    fn armed() -> ToneTracker {
        let mut tracker = ToneTracker::new();
        // Consume the discarded startup frame
        assert!(tracker.track(&frame(70, 50_000.0)).is_none());
        tracker
    }

    #[test]
    fn first_frame_is_discarded_and_rearm_discards_again() {
        let mut tracker = armed();
        assert!(tracker.track(&frame(70, 50_000.0)).is_some());
        tracker.rearm();
        assert!(tracker.track(&frame(70, 50_000.0)).is_none());
        assert!(tracker.track(&frame(70, 50_000.0)).is_some());
    }

    #[test]
    fn quiet_frame_has_no_peak() {
        let mut tracker = armed();
        let peak = tracker.track(&frame(70, 10_000.0)).unwrap();
        assert_eq!(peak.bin, -1);
        assert_eq!(peak.band(), None);
    }

    #[test]
    fn loud_tone_outside_the_window_is_ignored() {
        let mut tracker = armed();
        let peak = tracker.track(&frame(40, 90_000.0)).unwrap();
        assert_eq!(peak.bin, -1);
    }

    #[test]
    fn bands_cover_their_tolerance() {
        let mut tracker = armed();
        assert_eq!(tracker.track(&frame(73, 50_000.0)).unwrap().band(), Some(ToneBand::Reset));
        assert_eq!(tracker.track(&frame(77, 50_000.0)).unwrap().band(), Some(ToneBand::Forward));
        assert_eq!(tracker.track(&frame(83, 50_000.0)).unwrap().band(), Some(ToneBand::Forward));
        assert_eq!(tracker.track(&frame(87, 50_000.0)).unwrap().band(), Some(ToneBand::Search));
        assert_eq!(tracker.track(&frame(92, 50_000.0)).unwrap().band(), Some(ToneBand::Search));
        assert_eq!(tracker.track(&frame(85, 50_000.0)).unwrap().band(), None);
    }

    #[test]
    fn a_sustained_tone_reads_steady() {
        let mut tracker = armed();
        tracker.track(&frame(80, 50_000.0));
        let peak = tracker.track(&frame(81, 50_000.0)).unwrap();
        assert!(peak.steady);
    }

    #[test]
    fn a_jumping_tone_does_not() {
        let mut tracker = armed();
        tracker.track(&frame(80, 50_000.0));
        let peak = tracker.track(&frame(90, 50_000.0)).unwrap();
        assert!(!peak.steady);
        assert_eq!(peak.band(), Some(ToneBand::Search));
    }
}
