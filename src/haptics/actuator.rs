//! Haptic output devices

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

/// Something that can vibrate for a given duration.
///
/// A new call replaces any vibration still in progress, like the browser
/// vibration API does.
pub trait HapticActuator: Send {
    fn vibrate(&mut self, duration: Duration);
}

/// Actuator for hosts without a vibration motor; pulses only show up in the logs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogActuator;

impl HapticActuator for LogActuator {
    fn vibrate(&mut self, duration: Duration) {
        debug!("Vibrate {}ms", duration.as_millis());
    }
}

/// Records every pulse; clones share the same record
#[derive(Debug, Default, Clone)]
pub struct MemoryActuator {
    pulses: Arc<Mutex<Vec<Duration>>>,
}

impl MemoryActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pulses(&self) -> Vec<Duration> {
        match self.pulses.lock() {
            Ok(pulses) => pulses.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn clear(&self) {
        if let Ok(mut pulses) = self.pulses.lock() {
            pulses.clear();
        }
    }
}

impl HapticActuator for MemoryActuator {
    fn vibrate(&mut self, duration: Duration) {
        if let Ok(mut pulses) = self.pulses.lock() {
            pulses.push(duration);
        }
    }
}
