//! Device motion controls (`mx my mz`, `ma mb mg`) and their shared fan-out

use crate::layout::{MotionAxis, MotionSource};
use crate::protocol::{encode_unidirectional, put_u16};
use serde::{Deserialize, Serialize};

/// Acceleration including gravity, in m/s²
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Device orientation, in degrees
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrientationSample {
    /// Compass heading, `[0, 360)`
    pub alpha: f32,
    /// Front-back tilt, `[-180, 180)`
    pub beta: f32,
    /// Left-right tilt, `[-90, 90)`
    pub gamma: f32,
}

/// CSS transform applied to the on-screen indicator of an orientation axis
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Trinket {
    RotateX(f32),
    RotateY(f32),
    RotateZ(f32),
}

#[derive(Clone, Debug)]
pub struct Motion {
    id: String,
    axis: MotionAxis,
    /// `[0, 1]`, 0.5 is neutral
    value: f32,
}

impl Motion {
    pub fn new(id: &str, axis: MotionAxis) -> Self {
        Self {
            id: id.to_string(),
            axis,
            value: 0.5,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn axis(&self) -> MotionAxis {
        self.axis
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Takes a reading centered on zero
    pub fn update(&mut self, centered: f32) {
        let centered = if centered.is_nan() { 0.0 } else { centered };
        self.value = centered.clamp(-0.5, 0.5) + 0.5;
    }

    pub fn trinket(&self) -> Option<Trinket> {
        let s = self.value;
        match self.axis {
            MotionAxis::X | MotionAxis::Y | MotionAxis::Z => None,
            MotionAxis::Alpha => Some(Trinket::RotateY(-360.0 * s)),
            MotionAxis::Beta => Some(Trinket::RotateZ((0.5 - s) * 360.0)),
            MotionAxis::Gamma => Some(Trinket::RotateX((0.5 - s) * 180.0)),
        }
    }

    pub fn pack(&self, slot: &mut [u8]) {
        put_u16(slot, 0, encode_unidirectional(self.value));
    }
}

/// Latest centered reading of all six axes, plus which controls watch
/// which sensor. One per pad.
#[derive(Clone, Debug, Default)]
pub struct MotionHub {
    values: [f32; 6],
    acceleration: Vec<usize>,
    orientation: Vec<usize>,
}

impl MotionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the control at `index` as a watcher of `axis`
    pub fn register(&mut self, index: usize, axis: MotionAxis) {
        match axis.source() {
            MotionSource::Acceleration => self.acceleration.push(index),
            MotionSource::Orientation => self.orientation.push(index),
        }
    }

    pub fn clear(&mut self) {
        self.acceleration.clear();
        self.orientation.clear();
    }

    pub fn watchers(&self, source: MotionSource) -> &[usize] {
        match source {
            MotionSource::Acceleration => &self.acceleration,
            MotionSource::Orientation => &self.orientation,
        }
    }

    /// Centered reading of `axis`, roughly `[-0.5, 0.5]` before clamping
    pub fn value(&self, axis: MotionAxis) -> f32 {
        self.values[axis.index()]
    }

    pub fn record_motion(&mut self, sample: MotionSample, acceleration_constant: f32) {
        let scale = acceleration_constant / 2.0;
        self.values[MotionAxis::X.index()] = sample.x * scale;
        self.values[MotionAxis::Y.index()] = sample.y * scale;
        self.values[MotionAxis::Z.index()] = sample.z * scale;
    }

    pub fn record_orientation(&mut self, sample: OrientationSample) {
        self.values[MotionAxis::Alpha.index()] = sample.alpha / 360.0 - 0.5;
        self.values[MotionAxis::Beta.index()] = sample.beta / 360.0;
        self.values[MotionAxis::Gamma.index()] = sample.gamma / 180.0;
    }
}
