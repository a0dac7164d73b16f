//! Proximity snapshot
//!
//! Latest forward distance in millimeters, written by the distance task and
//! read by the charge regulator every control tick. The 0 sentinel means
//! "no valid reading", which the control core treats exactly like "nothing
//! there".

use core::sync::atomic::{AtomicU16, Ordering};

/// Sentinel published when a measurement failed.
pub const NO_READING_MM: u16 = 0;

static DISTANCE_MM: AtomicU16 = AtomicU16::new(NO_READING_MM);

/// Publishes a fresh distance reading.
pub fn publish(mm: u16) {
    DISTANCE_MM.store(mm, Ordering::Relaxed);
}

/// Latest distance in millimeters, 0 when there is no valid reading.
pub fn distance_mm() -> u16 {
    DISTANCE_MM.load(Ordering::Relaxed)
}
