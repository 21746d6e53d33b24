//! Mnemonic codes: ordering and resolution to control kinds
//!
//! A code is one category letter followed by one or two discriminator
//! characters (`j1`, `mx`, `pa`, `b10`, `dp`). The order defined here decides
//! the attach sequence and therefore the slot layout of the state buffer, so
//! it has to be a strict total order.

use super::error::MnemonicError;
use std::cmp::Ordering;
use std::fmt;

/// Token reserved for the debug label
pub const DEBUG_LABEL: &str = "dbg";
/// Token reserved for the D-pad
pub const DPAD_CODE: &str = "dp";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JoystickKind {
    /// `j`: springs back to center on release
    NonLocking,
    /// `s`: stays where it was released
    Locking,
    /// `t`: non-locking, with a push button
    Thumbstick,
}

/// Which device sensor a motion control reads
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MotionSource {
    Acceleration,
    Orientation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MotionAxis {
    X,
    Y,
    Z,
    /// Compass heading
    Alpha,
    /// Pitch
    Beta,
    /// Roll
    Gamma,
}

impl MotionAxis {
    pub const LABELS: &'static str = "xyzabg";

    pub fn from_label(label: char) -> Option<Self> {
        match label {
            'x' => Some(Self::X),
            'y' => Some(Self::Y),
            'z' => Some(Self::Z),
            'a' => Some(Self::Alpha),
            'b' => Some(Self::Beta),
            'g' => Some(Self::Gamma),
            _ => None,
        }
    }

    /// Position in the shared six-value motion sample
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn source(self) -> MotionSource {
        match self {
            Self::X | Self::Y | Self::Z => MotionSource::Acceleration,
            Self::Alpha | Self::Beta | Self::Gamma => MotionSource::Orientation,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PedalRole {
    Accelerator,
    Brake,
    Throttle,
}

/// Control archetype a code resolves to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Joystick(JoystickKind),
    Motion(MotionAxis),
    Pedal(PedalRole),
    Knob,
    AnalogButton,
    Button,
    DPad,
    Debug,
}

/// A layout label, ordered for attaching
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Mnemonic(String);

impl Mnemonic {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower ranks attach earlier
    pub fn category_rank(&self) -> u8 {
        if self.0 == DEBUG_LABEL {
            return 8;
        }
        match self.0.chars().next() {
            Some('j' | 's' | 't') => 1,
            Some('m') => 2,
            Some('p') => 3,
            Some('k') => 4,
            Some('a') => 5,
            Some('b') => 6,
            Some('d') => 7,
            _ => 9,
        }
    }

    fn discriminator(&self) -> &str {
        let mut chars = self.0.chars();
        chars.next();
        chars.as_str()
    }

    /// Numeric value of the trailing ASCII digits of the discriminator
    fn trailing_number(&self) -> Option<u64> {
        let disc = self.discriminator();
        let digits = disc.len() - disc.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        if digits == 0 {
            return None;
        }
        disc[disc.len() - digits..].parse().ok()
    }

    /// Big-endian comparison of the discriminator's character codes: a
    /// longer discriminator is the bigger number, equal lengths compare
    /// code by code
    fn compare_big_endian(&self, other: &Self) -> Ordering {
        let a = self.discriminator();
        let b = other.discriminator();
        a.chars()
            .count()
            .cmp(&b.chars().count())
            .then_with(|| a.chars().map(u32::from).cmp(b.chars().map(u32::from)))
    }

    /// Resolves the code to a control kind, or explains why it cannot be one
    pub fn resolve(&self) -> Result<ControlKind, MnemonicError> {
        let code = self.as_str();
        if code == DEBUG_LABEL {
            return Ok(ControlKind::Debug);
        }

        let chars: Vec<char> = code.chars().collect();
        if chars.len() < 2 || chars.len() > 3 {
            return Err(MnemonicError::InvalidLength(code.to_string()));
        }

        match chars[0] {
            'j' => Ok(ControlKind::Joystick(JoystickKind::NonLocking)),
            's' => Ok(ControlKind::Joystick(JoystickKind::Locking)),
            't' => Ok(ControlKind::Joystick(JoystickKind::Thumbstick)),
            'm' => {
                let axis = MotionAxis::from_label(chars[1])
                    .ok_or(MnemonicError::UnknownMotionAxis(chars[1]))?;
                if chars.len() != 2 {
                    return Err(MnemonicError::MotionAxisCount(code.to_string()));
                }
                Ok(ControlKind::Motion(axis))
            }
            'p' => match chars[1] {
                'a' => Ok(ControlKind::Pedal(PedalRole::Accelerator)),
                'b' => Ok(ControlKind::Pedal(PedalRole::Brake)),
                't' => Ok(ControlKind::Pedal(PedalRole::Throttle)),
                _ => Err(MnemonicError::UnknownPedal(code.to_string())),
            },
            'k' => Ok(ControlKind::Knob),
            'a' => Ok(ControlKind::AnalogButton),
            'b' => Ok(ControlKind::Button),
            'd' if code == DPAD_CODE => Ok(ControlKind::DPad),
            'd' => Err(MnemonicError::LegacyDPad(code.to_string())),
            _ => Err(MnemonicError::UnknownControl(code.to_string())),
        }
    }
}

/// Category rank, then trailing number (ids without one first), then the
/// discriminator's character codes
impl Ord for Mnemonic {
    fn cmp(&self, other: &Self) -> Ordering {
        self.category_rank()
            .cmp(&other.category_rank())
            .then_with(|| self.trailing_number().cmp(&other.trailing_number()))
            .then_with(|| self.compare_big_endian(other))
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Mnemonic {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Mnemonic {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}
