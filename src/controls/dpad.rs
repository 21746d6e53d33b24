//! Directional pad (`dp`)

use super::{ControlContext, TouchPhase, TouchView};
use crate::config::GeometrySettings;
use crate::geometry::{Hitbox, HitboxShape, Overshoot, Rect};
use crate::protocol::put_flag;

const UP: usize = 0;
const LEFT: usize = 1;
const DOWN: usize = 2;
const RIGHT: usize = 3;

/// Inner edges of the four leg hitboxes
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Legs {
    /// Left and right edge of the vertical legs
    x1: f32,
    x2: f32,
    /// Top and bottom edge of the horizontal legs
    y1: f32,
    y2: f32,
    up_y: f32,
    down_y: f32,
    left_x: f32,
    right_x: f32,
}

impl Legs {
    fn new(hitbox: &Hitbox, geometry: &GeometrySettings) -> Self {
        let length = geometry.dpad_leg_length;
        let width = geometry.dpad_leg_width;
        Self {
            x1: hitbox.x_center - width * hitbox.half_width,
            x2: hitbox.x_center + width * hitbox.half_width,
            y1: hitbox.y_center - width * hitbox.half_height,
            y2: hitbox.y_center + width * hitbox.half_height,
            up_y: hitbox.y + length * hitbox.height,
            down_y: hitbox.y_max - length * hitbox.height,
            left_x: hitbox.x + length * hitbox.width,
            right_x: hitbox.x_max - length * hitbox.width,
        }
    }
}

/// Which legs are lit, as drawn
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DPadDirection {
    None,
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
    /// Any other combination, e.g. up and down at once
    All,
}

impl DPadDirection {
    /// From `up << 3 | left << 2 | down << 1 | right`
    pub fn from_packed(packed: u8) -> Self {
        match packed {
            0 => Self::None,
            1 => Self::Right,
            2 => Self::Down,
            4 => Self::Left,
            8 => Self::Up,
            3 => Self::DownRight,
            6 => Self::DownLeft,
            9 => Self::UpRight,
            12 => Self::UpLeft,
            _ => Self::All,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Up => "u",
            Self::Down => "d",
            Self::Left => "l",
            Self::Right => "r",
            Self::UpLeft => "ul",
            Self::UpRight => "ur",
            Self::DownLeft => "dl",
            Self::DownRight => "dr",
            Self::All => "all",
        }
    }
}

#[derive(Clone, Debug)]
pub struct DPad {
    id: String,
    hitbox: Hitbox,
    legs: Legs,
    /// up, left, down, right
    pressed: [bool; 4],
    /// Last packed value; `None` until the first touch
    last: Option<u8>,
}

impl DPad {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            hitbox: Hitbox::default(),
            legs: Legs::default(),
            pressed: [false; 4],
            last: None,
        }
    }

    pub fn attach(&mut self, rect: Rect, geometry: &GeometrySettings) {
        self.hitbox = Hitbox::from_rect(rect, HitboxShape::Rectangle, Overshoot::default());
        self.legs = Legs::new(&self.hitbox, geometry);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn hitbox(&self) -> Hitbox {
        self.hitbox
    }

    pub fn packed(&self) -> u8 {
        self.pressed
            .iter()
            .fold(0, |acc, &on| (acc << 1) | u8::from(on))
    }

    pub fn direction(&self) -> DPadDirection {
        DPadDirection::from_packed(self.packed())
    }

    pub fn on_touch(&mut self, phase: TouchPhase, view: &TouchView<'_>, ctx: &mut ControlContext<'_>) {
        if phase.is_release() {
            self.pressed = [false; 4];
            self.last = Some(0);
            return;
        }

        self.pressed = [false; 4];
        let hb = &self.hitbox;
        let legs = &self.legs;
        for touch in view.targeted {
            let (x, y) = (touch.x, touch.y);
            if x > legs.x1 && x < legs.x2 {
                if y < legs.up_y && y > hb.y {
                    self.pressed[UP] = true;
                } else if y > legs.down_y && y < hb.y_max {
                    self.pressed[DOWN] = true;
                }
            }
            if y > legs.y1 && y < legs.y2 {
                if x < legs.left_x && x > hb.x {
                    self.pressed[LEFT] = true;
                } else if x > legs.right_x && x < hb.x_max {
                    self.pressed[RIGHT] = true;
                }
            }
        }

        let packed = self.packed();
        if self.last != Some(packed) {
            self.last = Some(packed);
            ctx.haptics.pulse(ctx.config.haptics.dpad());
        }
    }

    pub fn pack(&self, slot: &mut [u8]) {
        for (offset, on) in self.pressed.iter().enumerate() {
            put_flag(slot, offset, *on);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::testing::{touch, view, Fixture};
    use std::time::Duration;

    /// 100x100 pad at the origin: legs reach 40px in and are 50px wide
    fn dpad() -> DPad {
        let mut dpad = DPad::new("dp");
        dpad.attach(Rect::new(0.0, 0.0, 100.0, 100.0), &GeometrySettings::default());
        dpad
    }

    #[test]
    fn single_legs() {
        let mut fx = Fixture::new();
        let cases = [
            ((50.0, 10.0), DPadDirection::Up),
            ((50.0, 90.0), DPadDirection::Down),
            ((10.0, 50.0), DPadDirection::Left),
            ((90.0, 50.0), DPadDirection::Right),
            ((50.0, 50.0), DPadDirection::None),
        ];
        for ((x, y), direction) in cases {
            let mut dpad = dpad();
            dpad.on_touch(TouchPhase::Start, &view(&[touch(1, x, y)]), &mut fx.ctx());
            assert_eq!(dpad.direction(), direction, "({}, {})", x, y);
        }
    }

    #[test]
    fn up_and_right_then_release() {
        let mut fx = Fixture::new();
        let mut dpad = dpad();
        let fingers = [touch(1, 50.0, 10.0), touch(2, 90.0, 50.0)];
        dpad.on_touch(TouchPhase::Start, &view(&fingers), &mut fx.ctx());
        assert_eq!(dpad.packed(), 0b1001);
        assert_eq!(dpad.direction(), DPadDirection::UpRight);
        assert_eq!(dpad.direction().css_class(), "ur");

        let mut slot = [0u8; 4];
        dpad.pack(&mut slot);
        assert_eq!(slot, [1, 0, 0, 1]);

        dpad.on_touch(TouchPhase::End, &view(&[]), &mut fx.ctx());
        assert_eq!(dpad.packed(), 0);
        dpad.pack(&mut slot);
        assert_eq!(slot, [0, 0, 0, 0]);
        assert_eq!(fx.pulses(), vec![Duration::from_millis(35)]);
    }

    #[test]
    fn pulses_only_on_change() {
        let mut fx = Fixture::new();
        let mut dpad = dpad();
        dpad.on_touch(TouchPhase::Start, &view(&[touch(1, 50.0, 10.0)]), &mut fx.ctx());
        dpad.on_touch(TouchPhase::Move, &view(&[touch(1, 52.0, 12.0)]), &mut fx.ctx());
        dpad.on_touch(TouchPhase::Move, &view(&[touch(1, 10.0, 50.0)]), &mut fx.ctx());
        assert_eq!(fx.pulses().len(), 2);
    }

    #[test]
    fn first_touch_in_the_middle_still_clicks() {
        let mut fx = Fixture::new();
        let mut dpad = dpad();
        dpad.on_touch(TouchPhase::Start, &view(&[touch(1, 50.0, 50.0)]), &mut fx.ctx());
        assert_eq!(fx.pulses().len(), 1);
    }

    #[test]
    fn opposite_legs_fall_back_to_all() {
        assert_eq!(DPadDirection::from_packed(0b1010), DPadDirection::All);
        assert_eq!(DPadDirection::from_packed(0b1111).css_class(), "all");
    }
}
