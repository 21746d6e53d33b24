//! Angular sectors for directional haptic feedback
//!
//! Joysticks split their area into 8 octants centered on the compass
//! directions; knobs split their phase into a configurable number of equal
//! sectors. Crossing from one sector into another is what the user feels as
//! a click.

use std::f32::consts::{PI, TAU};

/// Distance in octants under which an angle counts as lying on a cut
const CUT_TOLERANCE: f32 = 1e-4;

/// Compass octant of a joystick vector, in screen coordinates (y grows down)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Octant {
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
    North,
    NorthEast,
}

impl Octant {
    const ALL: [Octant; 8] = [
        Octant::East,
        Octant::SouthEast,
        Octant::South,
        Octant::SouthWest,
        Octant::West,
        Octant::NorthWest,
        Octant::North,
        Octant::NorthEast,
    ];

    pub fn from_index(index: u8) -> Self {
        Self::ALL[(index % 8) as usize]
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Closed form: `atan2` normalized to `[0, 8)`, sectors centered on the
    /// axes. A vector on a cut line belongs to the compass axis octant.
    pub fn from_angle(x: f32, y: f32) -> Self {
        let turns = y.atan2(x) / TAU;
        let scaled = turns * 8.0 + 0.5;
        let cut = scaled.round();
        let index = if (scaled - cut).abs() < CUT_TOLERANCE {
            // axis octants have even indices
            if cut.rem_euclid(2.0) == 0.0 {
                cut
            } else {
                cut - 1.0
            }
        } else {
            scaled.floor()
        };
        Self::from_index(index.rem_euclid(8.0) as u8)
    }

    /// Same cut lines and tie rule as [`Octant::from_angle`], tested with
    /// `tan(π/8)` inequalities instead of a trig call per sample
    pub fn from_inequalities(x: f32, y: f32) -> Self {
        let t = (PI / 8.0).tan();
        let (ax, ay) = (x.abs(), y.abs());

        if ay <= ax * t {
            if x >= 0.0 {
                Octant::East
            } else {
                Octant::West
            }
        } else if ax <= ay * t {
            if y > 0.0 {
                Octant::South
            } else {
                Octant::North
            }
        } else {
            match (x > 0.0, y > 0.0) {
                (true, true) => Octant::SouthEast,
                (false, true) => Octant::SouthWest,
                (false, false) => Octant::NorthWest,
                (true, false) => Octant::NorthEast,
            }
        }
    }
}

/// Sector index of a phase in `[0, 1)` split into `sectors` equal parts
pub fn phase_sector(phase: f32, sectors: u16) -> u16 {
    let sectors = sectors.max(1);
    let index = (phase.rem_euclid(1.0) * sectors as f32).floor() as u16;
    index.min(sectors - 1)
}

/// Remembers the last sector and reports boundary crossings.
///
/// `None` is the undefined sentinel: the first observation after a reset
/// never counts as a crossing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SectorTracker<T: Copy + PartialEq> {
    last: Option<T>,
}

impl<T: Copy + PartialEq> SectorTracker<T> {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Records `sector`, returns true when it differs from a defined previous one
    pub fn observe(&mut self, sector: T) -> bool {
        let crossed = matches!(self.last, Some(previous) if previous != sector);
        self.last = Some(sector);
        crossed
    }

    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn current(&self) -> Option<T> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compass_points() {
        assert_eq!(Octant::from_angle(1.0, 0.0), Octant::East);
        assert_eq!(Octant::from_angle(0.0, 1.0), Octant::South);
        assert_eq!(Octant::from_angle(-1.0, 0.0), Octant::West);
        assert_eq!(Octant::from_angle(0.0, -1.0), Octant::North);
        assert_eq!(Octant::from_angle(1.0, -1.0), Octant::NorthEast);
        assert_eq!(Octant::from_angle(-1.0, 1.0), Octant::SouthWest);
    }

    #[test]
    fn both_detectors_agree_away_from_cuts() {
        // Sweep the circle, skipping a small window around each cut line
        for step in 0..3600 {
            let angle = step as f32 * TAU / 3600.0;
            let from_cut = ((angle / (PI / 4.0)) - 0.5).rem_euclid(1.0);
            if !(0.01..=0.99).contains(&from_cut) {
                continue;
            }
            let (x, y) = (angle.cos() * 0.7, angle.sin() * 0.7);
            assert_eq!(
                Octant::from_angle(x, y),
                Octant::from_inequalities(x, y),
                "angle {}",
                angle
            );
        }
    }

    #[test]
    fn cut_lines_go_to_the_axis_octant() {
        let t = (PI / 8.0).tan();
        let cuts = [
            ((1.0, t), Octant::East),
            ((1.0, -t), Octant::East),
            ((t, 1.0), Octant::South),
            ((-t, 1.0), Octant::South),
            ((-1.0, t), Octant::West),
            ((-1.0, -t), Octant::West),
            ((-t, -1.0), Octant::North),
            ((t, -1.0), Octant::North),
        ];
        for ((x, y), expected) in cuts {
            for scale in [0.3, 1.0, 40.0] {
                let (x, y) = (x * scale, y * scale);
                assert_eq!(Octant::from_angle(x, y), expected, "({}, {})", x, y);
                assert_eq!(Octant::from_inequalities(x, y), expected, "({}, {})", x, y);
            }
        }
    }

    #[test]
    fn center_is_east_for_both() {
        assert_eq!(Octant::from_angle(0.0, 0.0), Octant::East);
        assert_eq!(Octant::from_inequalities(0.0, 0.0), Octant::East);
    }

    #[test]
    fn tracker_ignores_first_sample() {
        let mut tracker = SectorTracker::new();
        assert!(!tracker.observe(Octant::East));
        assert!(!tracker.observe(Octant::East));
        assert!(tracker.observe(Octant::South));
        tracker.reset();
        assert_eq!(tracker.current(), None);
        assert!(!tracker.observe(Octant::North));
    }

    #[test]
    fn phase_sectors_wrap() {
        assert_eq!(phase_sector(0.0, 16), 0);
        assert_eq!(phase_sector(0.999, 16), 15);
        assert_eq!(phase_sector(1.0, 16), 0);
        assert_eq!(phase_sector(-0.01, 8), 7);
    }
}
