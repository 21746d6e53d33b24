//! Rectangles and shape-adjusted hitboxes
//!
//! A control's element rectangle comes from the layout geometry. The hitbox
//! used for touch tests is derived from it according to the control's
//! [`HitboxShape`], and caches the values every touch handler needs
//! (center, half extents, far edges).

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in page coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest rectangle covering both `self` and `other`
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let x_max = (self.x + self.width).max(other.x + other.width);
        let y_max = (self.y + self.height).max(other.y + other.height);
        Rect::new(x, y, x_max - x, y_max - y)
    }
}

/// How the hitbox is derived from the element rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HitboxShape {
    /// Hitbox equals the element rectangle
    #[default]
    Rectangle,
    /// Largest centered square inside the element rectangle
    Square,
    /// Element rectangle grown by a fixed margin in each direction
    Overshoot,
}

/// Margins used by [`HitboxShape::Overshoot`], in pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Overshoot {
    pub width: f32,
    pub height: f32,
}

/// Touch-test geometry of an attached control
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Hitbox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub half_width: f32,
    pub half_height: f32,
    pub x_center: f32,
    pub y_center: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl Hitbox {
    pub fn from_rect(rect: Rect, shape: HitboxShape, overshoot: Overshoot) -> Self {
        let Rect {
            mut x,
            mut y,
            mut width,
            mut height,
        } = rect;

        match shape {
            HitboxShape::Rectangle => {}
            HitboxShape::Square => {
                if width < height {
                    y += (height - width) / 2.0;
                    height = width;
                } else {
                    x += (width - height) / 2.0;
                    width = height;
                }
            }
            HitboxShape::Overshoot => {
                x -= overshoot.width;
                y -= overshoot.height;
                width += 2.0 * overshoot.width;
                height += 2.0 * overshoot.height;
            }
        }

        let half_width = width / 2.0;
        let half_height = height / 2.0;
        Self {
            x,
            y,
            width,
            height,
            half_width,
            half_height,
            x_center: x + half_width,
            y_center: y + half_height,
            x_max: x + width,
            y_max: y + height,
        }
    }

    /// Strict containment; points on the border are outside
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x > self.x && x < self.x_max && y > self.y && y < self.y_max
    }

    /// Inclusive overlap test, touching edges count as overlapping
    pub fn overlaps(&self, other: &Hitbox) -> bool {
        !(self.x > other.x_max
            || self.x_max < other.x
            || self.y > other.y_max
            || self.y_max < other.y)
    }

    /// Clamp a point into the hitbox. An inverted or NaN extent never
    /// panics; the far edge wins and NaN bounds are ignored.
    pub fn clamp_point(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x.max(self.x).min(self.x_max),
            y.max(self.y).min(self.y_max),
        )
    }

    /// Offset of a point from the center, divided by the half extents.
    /// A degenerate (zero sized) hitbox reads as centered.
    pub fn normalized_offset(&self, x: f32, y: f32) -> (f32, f32) {
        let nx = if self.half_width > 0.0 {
            (x - self.x_center) / self.half_width
        } else {
            0.0
        };
        let ny = if self.half_height > 0.0 {
            (y - self.y_center) / self.half_height
        } else {
            0.0
        };
        (nx, ny)
    }
}
