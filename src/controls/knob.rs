//! Rotary knob (`k`)
//!
//! The knob turns by the angle the finger sweeps around its center, not to
//! the angle where the finger is, so grabbing it anywhere never makes it jump.

use super::{ControlContext, TouchPhase, TouchView};
use crate::geometry::{phase_sector, Hitbox, HitboxShape, Overshoot, Rect, SectorTracker};
use crate::protocol::{encode_unidirectional, put_u16};
use std::f32::consts::TAU;

const INITIAL_PHASE: f32 = 0.5;

#[derive(Clone, Debug)]
pub struct Knob {
    id: String,
    hitbox: Hitbox,
    /// `[0, 1)`, one unit per revolution
    phase: f32,
    /// Phase minus finger angle at touch start, offset by one turn
    grab: f32,
    sectors: SectorTracker<u16>,
    /// Unwrapped drawing angle in degrees
    rotation: f32,
}

impl Knob {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            hitbox: Hitbox::default(),
            phase: INITIAL_PHASE,
            grab: INITIAL_PHASE,
            sectors: SectorTracker::new(),
            rotation: Self::base_rotation(INITIAL_PHASE),
        }
    }

    fn base_rotation(phase: f32) -> f32 {
        (phase + 0.25) * 360.0
    }

    pub fn attach(&mut self, rect: Rect) {
        self.hitbox = Hitbox::from_rect(rect, HitboxShape::Square, Overshoot::default());
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn hitbox(&self) -> Hitbox {
        self.hitbox
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Drawing angle. Crossing the 0/1 seam continues the rotation the
    /// short way round instead of spinning back almost a full turn.
    pub fn rotation_degrees(&self) -> f32 {
        self.rotation
    }

    fn finger_turns(&self, x: f32, y: f32) -> f32 {
        (y - self.hitbox.y_center).atan2(x - self.hitbox.x_center) / TAU
    }

    pub fn on_touch(&mut self, phase: TouchPhase, view: &TouchView<'_>, ctx: &mut ControlContext<'_>) {
        let Some(touch) = view.primary() else {
            return;
        };
        let sectors = ctx.config.sensing.knob_sectors;
        match phase {
            TouchPhase::Start => {
                self.grab = self.phase - self.finger_turns(touch.x, touch.y) + 1.0;
                self.sectors.reset();
                self.sectors.observe(phase_sector(self.phase, sectors));
                ctx.haptics.pulse(ctx.config.haptics.enter());
            }
            TouchPhase::Move => {
                let next = (self.grab + self.finger_turns(touch.x, touch.y)).rem_euclid(1.0);
                self.turn_to(next);
                let crossed = self.sectors.observe(phase_sector(self.phase, sectors));
                if crossed && ctx.config.haptics.vibrate_on_octant_boundary {
                    ctx.haptics.pulse(ctx.config.haptics.octant());
                }
            }
            TouchPhase::End | TouchPhase::Cancel => {}
        }
    }

    fn turn_to(&mut self, next: f32) {
        let step = next - self.phase;
        self.rotation += (step - step.round()) * 360.0;
        self.phase = next;
    }

    pub fn pack(&self, slot: &mut [u8]) {
        put_u16(slot, 0, encode_unidirectional(self.phase));
    }
}
