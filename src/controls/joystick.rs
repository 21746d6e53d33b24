//! Joysticks: non-locking (`j`), locking (`s`) and thumbsticks (`t`)

use super::{ControlContext, SensingMode, TouchPhase, TouchView};
use crate::geometry::{Hitbox, HitboxShape, Octant, Overshoot, Rect, SectorTracker};
use crate::haptics::VibrationPattern;
use crate::layout::JoystickKind;
use crate::protocol::{encode_bidirectional, put_flag, put_u16};

#[derive(Clone, Debug)]
pub struct Joystick {
    id: String,
    kind: JoystickKind,
    hitbox: Hitbox,
    /// Signed, `[-1, 1]` on both axes, y grows downwards
    position: (f32, f32),
    thumb_pressed: bool,
    octants: SectorTracker<Octant>,
    /// Where the stick knob is drawn
    circle: (f32, f32),
}

impl Joystick {
    pub fn new(id: &str, kind: JoystickKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
            hitbox: Hitbox::default(),
            position: (0.0, 0.0),
            thumb_pressed: false,
            octants: SectorTracker::new(),
            circle: (0.0, 0.0),
        }
    }

    pub fn attach(&mut self, rect: Rect) {
        self.hitbox = Hitbox::from_rect(rect, HitboxShape::Rectangle, Overshoot::default());
        if self.position == (0.0, 0.0) {
            self.circle = (self.hitbox.x_center, self.hitbox.y_center);
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> JoystickKind {
        self.kind
    }

    pub fn hitbox(&self) -> Hitbox {
        self.hitbox
    }

    pub fn position(&self) -> (f32, f32) {
        self.position
    }

    pub fn thumb_pressed(&self) -> bool {
        self.thumb_pressed
    }

    /// Last octant, `None` while centered-released or saturated
    pub fn octant(&self) -> Option<Octant> {
        self.octants.current()
    }

    /// Touch position clamped into the hitbox
    pub fn circle_position(&self) -> (f32, f32) {
        self.circle
    }

    pub fn on_touch(&mut self, phase: TouchPhase, view: &TouchView<'_>, ctx: &mut ControlContext<'_>) {
        match phase {
            TouchPhase::Start => {
                self.track(view, ctx);
                ctx.haptics.pulse(ctx.config.haptics.enter());
            }
            TouchPhase::Move => self.track(view, ctx),
            TouchPhase::End | TouchPhase::Cancel => {
                if view.targeted.is_empty() {
                    self.release(ctx);
                } else {
                    self.track(view, ctx);
                }
            }
        }
    }

    fn track(&mut self, view: &TouchView<'_>, ctx: &mut ControlContext<'_>) {
        let Some(touch) = view.primary() else {
            return;
        };
        let config = ctx.config;
        let settings = &config.haptics;
        let (x, y) = self.hitbox.normalized_offset(touch.x, touch.y);
        self.check_thumb_button(view, ctx);

        let distance = x.abs().max(y.abs());
        if distance < 1.0 {
            ctx.haptics.unqueue(&self.id);
            let crossed = self.octants.observe(Octant::from_inequalities(x, y));
            if crossed && settings.vibrate_on_octant_boundary {
                ctx.haptics.pulse(settings.octant());
            }
        } else {
            if settings.vibrate_on_pad_boundary {
                ctx.haptics.queue(
                    &self.id,
                    VibrationPattern {
                        pulse: settings.saturation_pulse(distance),
                        pause: settings.saturation_pause(),
                    },
                );
            }
            self.octants.reset();
        }

        self.position = (x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0));
        self.circle = self.hitbox.clamp_point(touch.x, touch.y);
    }

    fn check_thumb_button(&mut self, view: &TouchView<'_>, ctx: &mut ControlContext<'_>) {
        if self.kind != JoystickKind::Thumbstick {
            return;
        }
        let pressed = match ctx.sensing {
            SensingMode::Geometry => view.targeted.len() > 1,
            SensingMode::Pressure(range) => view
                .primary()
                .and_then(|touch| touch.force)
                .is_some_and(|force| force > range.mid),
        };
        if pressed != self.thumb_pressed {
            self.thumb_pressed = pressed;
            ctx.haptics.pulse(ctx.config.haptics.thumb());
        }
    }

    fn release(&mut self, ctx: &mut ControlContext<'_>) {
        if self.kind != JoystickKind::Locking {
            self.position = (0.0, 0.0);
            self.circle = (self.hitbox.x_center, self.hitbox.y_center);
        }
        self.thumb_pressed = false;
        self.octants.reset();
        ctx.haptics.unqueue(&self.id);
    }

    pub fn pack(&self, slot: &mut [u8]) {
        put_u16(slot, 0, encode_bidirectional(self.position.0));
        put_u16(slot, 2, encode_bidirectional(self.position.1));
        if self.kind == JoystickKind::Thumbstick {
            put_flag(slot, 4, self.thumb_pressed);
        }
    }
}
