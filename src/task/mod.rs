pub mod distance_measure;
pub mod drive;
pub mod line_scan;
pub mod regulate;
pub mod rgb_led_indicate;
pub mod sound_remote;
