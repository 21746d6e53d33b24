//! Pedals: accelerator (`pa`), brake (`pb`) and throttle (`pt`)

use super::{ControlContext, SensingMode, TouchPhase, TouchView};
use crate::geometry::{Hitbox, HitboxShape, Overshoot, Rect};
use crate::haptics::VibrationPattern;
use crate::layout::PedalRole;
use crate::protocol::{encode_unidirectional, put_u16};
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Pedal {
    id: String,
    role: PedalRole,
    hitbox: Hitbox,
    /// `[0, 1]`, 0 is released
    value: f32,
    pressed: bool,
}

impl Pedal {
    pub fn new(id: &str, role: PedalRole) -> Self {
        Self {
            id: id.to_string(),
            role,
            hitbox: Hitbox::default(),
            value: 0.0,
            pressed: false,
        }
    }

    pub fn attach(&mut self, rect: Rect) {
        self.hitbox = Hitbox::from_rect(rect, HitboxShape::Rectangle, Overshoot::default());
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> PedalRole {
        self.role
    }

    pub fn hitbox(&self) -> Hitbox {
        self.hitbox
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn on_touch(&mut self, phase: TouchPhase, view: &TouchView<'_>, ctx: &mut ControlContext<'_>) {
        match phase {
            TouchPhase::Start => {
                ctx.haptics.pulse(ctx.config.haptics.enter());
                self.track(view, ctx);
                self.pressed = true;
            }
            TouchPhase::Move => self.track(view, ctx),
            TouchPhase::End | TouchPhase::Cancel => {
                self.value = 0.0;
                self.pressed = false;
                ctx.haptics.unqueue(&self.id);
            }
        }
    }

    fn track(&mut self, view: &TouchView<'_>, ctx: &mut ControlContext<'_>) {
        let Some(touch) = view.primary() else {
            return;
        };
        let raw = match ctx.sensing {
            SensingMode::Geometry if self.hitbox.height > 0.0 => {
                (self.hitbox.y - touch.y) / self.hitbox.height + 1.0
            }
            SensingMode::Geometry => 0.0,
            SensingMode::Pressure(range) => touch.force.map_or(0.0, |force| range.normalize(force)),
        };

        if raw > 1.0 {
            let settings = &ctx.config.haptics;
            let pattern = VibrationPattern {
                pulse: Duration::from_millis(settings.saturation_pulse_ms),
                pause: settings.saturation_pause(),
            };
            ctx.haptics.queue(&self.id, pattern);
        } else {
            ctx.haptics.unqueue(&self.id);
        }
        self.value = if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) };
    }

    pub fn pack(&self, slot: &mut [u8]) {
        put_u16(slot, 0, encode_unidirectional(self.value));
    }
}
