//! Digital (`b`) and analog (`a`) buttons
//!
//! Buttons are not handled one at a time. Fingers slide between neighbouring
//! buttons and press two at once, so every event on a button re-evaluates all
//! of its overlapping neighbours against every finger on the screen.

use super::{SensingMode, Touch};
use crate::config::{GeometrySettings, PadConfig};
use crate::geometry::{Hitbox, HitboxShape, Overshoot, Rect};
use crate::protocol::{encode_unidirectional, put_flag, put_u16};

#[derive(Clone, Debug)]
pub struct Button {
    id: String,
    analog: bool,
    hitbox: Hitbox,
    /// `[0, 1]`; a digital button only ever reads 0 or 1
    value: f32,
    was_pressed: bool,
    /// Indices of overlapping buttons in the pad, this one included
    neighbors: Vec<usize>,
}

impl Button {
    pub fn analog(id: &str) -> Self {
        Self::new(id, true)
    }

    pub fn digital(id: &str) -> Self {
        Self::new(id, false)
    }

    fn new(id: &str, analog: bool) -> Self {
        Self {
            id: id.to_string(),
            analog,
            hitbox: Hitbox::default(),
            value: 0.0,
            was_pressed: false,
            neighbors: Vec::new(),
        }
    }

    pub fn attach(&mut self, rect: Rect, geometry: &GeometrySettings) {
        let overshoot = Overshoot {
            width: geometry.button_overshoot_width,
            height: geometry.button_overshoot_height,
        };
        self.hitbox = Hitbox::from_rect(rect, HitboxShape::Overshoot, overshoot);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_analog(&self) -> bool {
        self.analog
    }

    pub fn hitbox(&self) -> Hitbox {
        self.hitbox
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_pressed(&self) -> bool {
        self.value > 0.0
    }

    pub fn neighbors(&self) -> &[usize] {
        &self.neighbors
    }

    pub fn set_neighbors(&mut self, neighbors: Vec<usize>) {
        self.neighbors = neighbors;
    }

    /// A new press on this button always counts as a change
    pub fn forget_press(&mut self) {
        self.was_pressed = false;
    }

    /// Recomputes the value from all fingers. Returns true when the button
    /// went from released to pressed or back.
    pub fn evaluate(&mut self, touches: &[Touch], config: &PadConfig, sensing: SensingMode) -> bool {
        let value = if self.analog {
            self.analog_value(touches, config, sensing)
        } else if touches.iter().any(|t| self.hitbox.contains(t.x, t.y)) {
            1.0
        } else {
            0.0
        };
        self.value = value;

        let pressed = self.is_pressed();
        let changed = pressed != self.was_pressed;
        self.was_pressed = pressed;
        changed
    }

    fn analog_value(&self, touches: &[Touch], config: &PadConfig, sensing: SensingMode) -> f32 {
        let hitbox = &self.hitbox;
        let value = match sensing {
            SensingMode::Geometry => {
                let k = config.sensing.analog_deadzone_constant;
                touches
                    .iter()
                    .map(|t| {
                        let (dx, dy) = hitbox.normalized_offset(t.x, t.y);
                        k * (1.0 - dy.abs()).min(1.0 - dx.abs())
                    })
                    .fold(0.0, f32::max)
            }
            SensingMode::Pressure(range) => touches
                .iter()
                .filter(|t| hitbox.contains(t.x, t.y))
                .filter_map(|t| t.force.map(|force| range.normalize(force)))
                .fold(0.0, f32::max),
        };
        value.clamp(0.0, 1.0)
    }

    pub fn pack(&self, slot: &mut [u8]) {
        if self.analog {
            put_u16(slot, 0, encode_unidirectional(self.value));
        } else {
            put_flag(slot, 0, self.is_pressed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::testing::{pressed, touch};
    use crate::controls::ForceRange;
    use approx::assert_relative_eq;

    /// 100x100 visible area at (100, 100); the hitbox adds 7px each way
    fn attached(mut button: Button) -> Button {
        button.attach(Rect::new(100.0, 100.0, 100.0, 100.0), &GeometrySettings::default());
        button
    }

    #[test]
    fn overshoot_hitbox_catches_near_misses() {
        let config = PadConfig::default();
        let mut button = attached(Button::digital("b1"));
        assert!(button.evaluate(&[touch(1, 96.0, 150.0)], &config, SensingMode::Geometry));
        assert!(button.is_pressed());
        let mut slot = [0u8; 1];
        button.pack(&mut slot);
        assert_eq!(slot, [1]);

        assert!(button.evaluate(&[touch(1, 90.0, 150.0)], &config, SensingMode::Geometry));
        assert!(!button.is_pressed());
    }

    #[test]
    fn unchanged_press_is_not_a_change() {
        let config = PadConfig::default();
        let mut button = attached(Button::digital("b1"));
        assert!(button.evaluate(&[touch(1, 150.0, 150.0)], &config, SensingMode::Geometry));
        assert!(!button.evaluate(&[touch(1, 160.0, 150.0)], &config, SensingMode::Geometry));
        button.forget_press();
        assert!(button.evaluate(&[touch(1, 160.0, 150.0)], &config, SensingMode::Geometry));
    }

    #[test]
    fn analog_center_saturates_and_edge_fades() {
        let config = PadConfig::default();
        let mut button = attached(Button::analog("a1"));
        button.evaluate(&[touch(1, 150.0, 150.0)], &config, SensingMode::Geometry);
        assert_relative_eq!(button.value(), 1.0);

        // half way from center to the hitbox edge: 1.1 * 0.5
        button.evaluate(&[touch(1, 150.0 + 57.0 / 2.0, 150.0)], &config, SensingMode::Geometry);
        assert_relative_eq!(button.value(), 0.55, epsilon = 1e-5);

        button.evaluate(&[touch(1, 400.0, 150.0)], &config, SensingMode::Geometry);
        assert_eq!(button.value(), 0.0);
    }

    #[test]
    fn analog_takes_strongest_finger() {
        let config = PadConfig::default();
        let mut button = attached(Button::analog("a1"));
        let touches = [touch(1, 400.0, 400.0), touch(2, 150.0 + 57.0 / 2.0, 150.0)];
        button.evaluate(&touches, &config, SensingMode::Geometry);
        assert_relative_eq!(button.value(), 0.55, epsilon = 1e-5);
    }

    #[test]
    fn analog_pressure_ignores_fingers_outside() {
        let config = PadConfig::default();
        let sensing = SensingMode::Pressure(ForceRange::new(0.2, 0.6));
        let mut button = attached(Button::analog("a1"));
        let touches = [pressed(1, 500.0, 500.0, 0.6), pressed(2, 150.0, 150.0, 0.3)];
        button.evaluate(&touches, &config, sensing);
        assert_relative_eq!(button.value(), 0.25, epsilon = 1e-5);
    }
}
