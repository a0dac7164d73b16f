//! Pure control logic
//!
//! Everything in here is free of hardware access so it can be unit tested:
//! the alignment PI regulator, the two phase regulators, scanline ball
//! extraction and tone command detection. Tasks own the structs and feed
//! them sensor snapshots each cycle.
pub mod charge;
pub mod pi;
pub mod rotation;
pub mod scanline;
pub mod sound;
