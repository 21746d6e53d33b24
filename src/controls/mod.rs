//! Touch and motion driven control widgets
//!
//! Each archetype is a plain struct holding its hitbox and state. [`Control`]
//! wraps them for the pad, which owns every control and dispatches events by
//! `match`. A control writes only into the slot slice it is handed when the
//! pad packs the state buffer.

pub mod button;
pub mod dpad;
pub mod joystick;
pub mod knob;
pub mod motion;
pub mod pedal;
pub mod sensing;

pub use button::Button;
pub use dpad::{DPad, DPadDirection};
pub use joystick::Joystick;
pub use knob::Knob;
pub use motion::{Motion, MotionHub, MotionSample, OrientationSample, Trinket};
pub use pedal::Pedal;
pub use sensing::{ForceRange, SensingMode};

use crate::config::PadConfig;
use crate::geometry::{Hitbox, Rect};
use crate::haptics::HapticScheduler;
use crate::layout::{ControlKind, Mnemonic};
use serde::{Deserialize, Serialize};

/// One finger on the screen, in page coordinates
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Touch {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    /// Reported pressure, when the screen has any
    #[serde(default)]
    pub force: Option<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

impl TouchPhase {
    pub fn is_release(self) -> bool {
        matches!(self, Self::End | Self::Cancel)
    }
}

/// A touch event as delivered to the element named `target`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub target: String,
    /// Fingers that started, moved or lifted with this event
    pub changed: Vec<Touch>,
}

/// Active fingers as one control sees them
#[derive(Clone, Copy, Debug)]
pub struct TouchView<'a> {
    /// Every finger on the screen
    pub touches: &'a [Touch],
    /// Fingers that started on this control and are still down
    pub targeted: &'a [Touch],
}

impl<'a> TouchView<'a> {
    pub fn primary(&self) -> Option<&'a Touch> {
        self.targeted.first()
    }
}

/// Shared services a control may use while handling an event
pub struct ControlContext<'a> {
    pub haptics: &'a mut HapticScheduler,
    pub config: &'a PadConfig,
    pub sensing: SensingMode,
}

#[derive(Clone, Debug)]
pub enum Control {
    Joystick(Joystick),
    Pedal(Pedal),
    AnalogButton(Button),
    Button(Button),
    Knob(Knob),
    DPad(DPad),
    Motion(Motion),
}

impl Control {
    /// Builds the widget for a resolved label. The debug label has no widget.
    pub fn create(code: &Mnemonic, kind: ControlKind) -> Option<Self> {
        let id = code.as_str();
        let control = match kind {
            ControlKind::Joystick(kind) => Self::Joystick(Joystick::new(id, kind)),
            ControlKind::Pedal(role) => Self::Pedal(Pedal::new(id, role)),
            ControlKind::AnalogButton => Self::AnalogButton(Button::analog(id)),
            ControlKind::Button => Self::Button(Button::digital(id)),
            ControlKind::Knob => Self::Knob(Knob::new(id)),
            ControlKind::DPad => Self::DPad(DPad::new(id)),
            ControlKind::Motion(axis) => Self::Motion(Motion::new(id, axis)),
            ControlKind::Debug => return None,
        };
        Some(control)
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Joystick(c) => c.id(),
            Self::Pedal(c) => c.id(),
            Self::AnalogButton(c) | Self::Button(c) => c.id(),
            Self::Knob(c) => c.id(),
            Self::DPad(c) => c.id(),
            Self::Motion(c) => c.id(),
        }
    }

    pub fn kind(&self) -> ControlKind {
        match self {
            Self::Joystick(c) => ControlKind::Joystick(c.kind()),
            Self::Pedal(c) => ControlKind::Pedal(c.role()),
            Self::AnalogButton(_) => ControlKind::AnalogButton,
            Self::Button(_) => ControlKind::Button,
            Self::Knob(_) => ControlKind::Knob,
            Self::DPad(_) => ControlKind::DPad,
            Self::Motion(c) => ControlKind::Motion(c.axis()),
        }
    }

    /// Recomputes the hitbox from the element rectangle
    pub fn attach(&mut self, rect: Rect, config: &PadConfig) {
        match self {
            Self::Joystick(c) => c.attach(rect),
            Self::Pedal(c) => c.attach(rect),
            Self::AnalogButton(c) | Self::Button(c) => c.attach(rect, &config.geometry),
            Self::Knob(c) => c.attach(rect),
            Self::DPad(c) => c.attach(rect, &config.geometry),
            Self::Motion(_) => {}
        }
    }

    pub fn hitbox(&self) -> Option<Hitbox> {
        match self {
            Self::Joystick(c) => Some(c.hitbox()),
            Self::Pedal(c) => Some(c.hitbox()),
            Self::AnalogButton(c) | Self::Button(c) => Some(c.hitbox()),
            Self::Knob(c) => Some(c.hitbox()),
            Self::DPad(c) => Some(c.hitbox()),
            Self::Motion(_) => None,
        }
    }

    /// Touch handling for single-target controls. Buttons are evaluated by
    /// the pad together with their neighbors and ignore this call.
    pub fn on_touch(&mut self, phase: TouchPhase, view: &TouchView<'_>, ctx: &mut ControlContext<'_>) {
        match self {
            Self::Joystick(c) => c.on_touch(phase, view, ctx),
            Self::Pedal(c) => c.on_touch(phase, view, ctx),
            Self::Knob(c) => c.on_touch(phase, view, ctx),
            Self::DPad(c) => c.on_touch(phase, view, ctx),
            Self::AnalogButton(_) | Self::Button(_) | Self::Motion(_) => {}
        }
    }

    pub fn as_button(&self) -> Option<&Button> {
        match self {
            Self::AnalogButton(c) | Self::Button(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_button_mut(&mut self) -> Option<&mut Button> {
        match self {
            Self::AnalogButton(c) | Self::Button(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_motion_mut(&mut self) -> Option<&mut Motion> {
        match self {
            Self::Motion(c) => Some(c),
            _ => None,
        }
    }

    /// Writes the current state into this control's own slot
    pub fn pack(&self, slot: &mut [u8]) {
        match self {
            Self::Joystick(c) => c.pack(slot),
            Self::Pedal(c) => c.pack(slot),
            Self::AnalogButton(c) | Self::Button(c) => c.pack(slot),
            Self::Knob(c) => c.pack(slot),
            Self::DPad(c) => c.pack(slot),
            Self::Motion(c) => c.pack(slot),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::haptics::MemoryActuator;
    use std::time::Duration;

    /// Scheduler, recording actuator and config for driving a single control
    pub struct Fixture {
        pub haptics: HapticScheduler,
        pub actuator: MemoryActuator,
        pub config: PadConfig,
        pub sensing: SensingMode,
    }

    impl Fixture {
        pub fn new() -> Self {
            let actuator = MemoryActuator::new();
            Self {
                haptics: HapticScheduler::new(Box::new(actuator.clone())),
                actuator,
                config: PadConfig::default(),
                sensing: SensingMode::Geometry,
            }
        }

        pub fn with_sensing(sensing: SensingMode) -> Self {
            Self {
                sensing,
                ..Self::new()
            }
        }

        pub fn ctx(&mut self) -> ControlContext<'_> {
            ControlContext {
                haptics: &mut self.haptics,
                config: &self.config,
                sensing: self.sensing,
            }
        }

        pub fn pulses(&self) -> Vec<Duration> {
            self.actuator.pulses()
        }
    }

    pub fn touch(id: u64, x: f32, y: f32) -> Touch {
        Touch {
            id,
            x,
            y,
            force: None,
        }
    }

    pub fn pressed(id: u64, x: f32, y: f32, force: f32) -> Touch {
        Touch {
            id,
            x,
            y,
            force: Some(force),
        }
    }

    /// View where every touch targets the control under test
    pub fn view(touches: &[Touch]) -> TouchView<'_> {
        TouchView {
            touches,
            targeted: touches,
        }
    }
}
