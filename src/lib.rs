//! Touch-driven virtual gamepad
//!
//! A layout grid names the controls. Each control turns touches or device
//! motion into a state that is packed into a byte buffer and pushed to the
//! host, while a haptic scheduler gives vibration feedback.

pub mod config;
pub mod controls;
pub mod geometry;
pub mod haptics;
pub mod joypad;
pub mod layout;
pub mod protocol;
pub mod replay;
