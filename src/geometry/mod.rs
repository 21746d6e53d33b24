//! Coordinate helpers shared by all controls

pub mod rect;
pub mod sector;

pub use rect::{Hitbox, HitboxShape, Overshoot, Rect};
pub use sector::{phase_sector, Octant, SectorTracker};
