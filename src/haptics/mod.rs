//! Haptic feedback: actuators and the recurring-vibration scheduler

pub mod actuator;
pub mod scheduler;

pub use actuator::{HapticActuator, LogActuator, MemoryActuator};
pub use scheduler::{HapticScheduler, RequestPhase, VibrationPattern, VibrationRequest};
