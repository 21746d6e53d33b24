//! How a touch turns into pressure

/// Calibrated span of the reported touch force
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceRange {
    pub min: f32,
    pub max: f32,
    pub mid: f32,
}

impl ForceRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self {
            min,
            max,
            mid: (min + max) / 2.0,
        }
    }

    /// Maps `force` linearly so that `min` reads 0 and `max` reads 1. Not clamped.
    pub fn normalize(&self, force: f32) -> f32 {
        let span = self.max - self.min;
        if span > 0.0 {
            (force - self.min) / span
        } else {
            0.0
        }
    }
}

/// Decided once per pad, before any control sees a touch
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SensingMode {
    /// Pressure is simulated from where the finger is
    #[default]
    Geometry,
    /// The touchscreen reports usable force values
    Pressure(ForceRange),
}

impl SensingMode {
    pub fn force_range(&self) -> Option<ForceRange> {
        match self {
            Self::Geometry => None,
            Self::Pressure(range) => Some(*range),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normalize_spans_calibrated_range() {
        let range = ForceRange::new(0.2, 0.6);
        assert_relative_eq!(range.mid, 0.4);
        assert_relative_eq!(range.normalize(0.2), 0.0);
        assert_relative_eq!(range.normalize(0.6), 1.0);
        assert_relative_eq!(range.normalize(0.8), 1.5, epsilon = 1e-6);
    }

    #[test]
    fn empty_range_reads_zero() {
        assert_eq!(ForceRange::new(0.5, 0.5).normalize(0.9), 0.0);
    }
}
