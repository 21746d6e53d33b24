//! Force calibration: does this touchscreen report usable pressure?
//!
//! While probing, the user presses the screen lightly and firmly; every force
//! strictly between 0 and 1 widens the observed range. Screens without
//! pressure report 0 or 1 only, so nothing is recorded and confirming falls
//! back to geometry sensing. The decision is made once, before the pad is
//! built.

use crate::controls::{ForceRange, SensingMode, Touch};
use statum::{machine, state};
use tracing::{debug, info};

#[state]
#[derive(Debug, Clone)]
pub enum CalibrationState {
    Probing,
    Decided(SensingMode),
}

#[machine]
#[derive(Debug)]
pub struct ForceCalibration<S: CalibrationState> {
    min: f32,
    max: f32,
    samples: usize,
}

impl<S: CalibrationState> ForceCalibration<S> {
    /// Observed force span, if at least one usable sample was seen
    pub fn observed(&self) -> Option<(f32, f32)> {
        (self.samples > 0).then_some((self.min, self.max))
    }
}

impl ForceCalibration<Probing> {
    pub fn start() -> Self {
        debug!("Starting force calibration");
        Self::new(f32::INFINITY, f32::NEG_INFINITY, 0)
    }

    pub fn record_pressure(&mut self, force: f32) {
        if force > 0.0 && force < 1.0 {
            self.min = self.min.min(force);
            self.max = self.max.max(force);
            self.samples += 1;
        }
    }

    pub fn record_touch(&mut self, touch: &Touch) {
        if let Some(force) = touch.force {
            self.record_pressure(force);
        }
    }

    /// The user confirmed that light and firm presses felt different
    pub fn confirm(self) -> ForceCalibration<Decided> {
        let mode = if self.samples > 0 && self.min < self.max {
            SensingMode::Pressure(ForceRange::new(self.min, self.max))
        } else {
            SensingMode::Geometry
        };
        info!("Force calibration confirmed: {:?}", mode);
        self.transition_with(mode)
    }

    pub fn decline(self) -> ForceCalibration<Decided> {
        info!("Force calibration declined, using geometry sensing");
        self.transition_with(SensingMode::Geometry)
    }
}

impl ForceCalibration<Decided> {
    pub fn sensing_mode(&self) -> SensingMode {
        self.get_state_data().copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pressure_screen_yields_range() {
        let mut calibration = ForceCalibration::start();
        for force in [0.0, 0.3, 0.7, 0.5, 1.0] {
            calibration.record_pressure(force);
        }
        let range = match calibration.confirm().sensing_mode() {
            SensingMode::Pressure(range) => range,
            other => panic!("expected pressure mode, got {:?}", other),
        };
        assert_relative_eq!(range.min, 0.3);
        assert_relative_eq!(range.max, 0.7);
        assert_relative_eq!(range.mid, 0.5);
    }

    #[test]
    fn binary_screen_falls_back_to_geometry() {
        let mut calibration = ForceCalibration::start();
        calibration.record_pressure(0.0);
        calibration.record_pressure(1.0);
        assert_eq!(calibration.observed(), None);
        assert_eq!(calibration.confirm().sensing_mode(), SensingMode::Geometry);
    }

    #[test]
    fn constant_force_falls_back_to_geometry() {
        let mut calibration = ForceCalibration::start();
        calibration.record_pressure(0.5);
        calibration.record_pressure(0.5);
        assert_eq!(calibration.confirm().sensing_mode(), SensingMode::Geometry);
    }

    #[test]
    fn decline_ignores_samples() {
        let mut calibration = ForceCalibration::start();
        calibration.record_touch(&Touch {
            id: 1,
            x: 0.0,
            y: 0.0,
            force: Some(0.2),
        });
        calibration.record_pressure(0.8);
        assert_eq!(calibration.observed(), Some((0.2, 0.8)));
        assert_eq!(calibration.decline().sensing_mode(), SensingMode::Geometry);
    }
}
