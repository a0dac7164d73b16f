//! Core system components for robot operation
pub mod ball_bearing;
pub mod phase;
pub mod proximity;
pub mod resources;
pub mod wheel_command;
