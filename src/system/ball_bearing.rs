//! Ball bearing snapshot
//!
//! Latest camera-derived bearing of the ball: its pixel position within the
//! scanline and whether the last extraction actually found it. Written by
//! the line scan task, read by the rotation regulator every control tick.
//!
//! The two fields are separate atomics; a tick that pairs a fresh flag with
//! the previous position is harmless at the control rate, so no lock is
//! taken on this path.

use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use defmt::Format;

/// Width of the camera scanline in pixels.
pub const BUFFER_WIDTH: u16 = 640;

/// Snapshot of the latest bearing estimate.
#[derive(Debug, Clone, Copy, Format)]
pub struct BearingEstimate {
    /// Ball center within the scanline, `0..BUFFER_WIDTH`
    pub position: u16,
    /// Whether the last extraction found the ball
    pub seen: bool,
}

static POSITION: AtomicU16 = AtomicU16::new(BUFFER_WIDTH / 2);
static SEEN: AtomicBool = AtomicBool::new(false);

/// Publishes a successful extraction.
pub fn publish(position: u16) {
    POSITION.store(position, Ordering::Relaxed);
    SEEN.store(true, Ordering::Relaxed);
}

/// Marks the last extraction as unsuccessful. The position keeps its last
/// value; readers decide how long a stale bearing is still useful.
pub fn publish_lost() {
    SEEN.store(false, Ordering::Relaxed);
}

/// Latest snapshot.
pub fn snapshot() -> BearingEstimate {
    BearingEstimate {
        position: POSITION.load(Ordering::Relaxed),
        seen: SEEN.load(Ordering::Relaxed),
    }
}
