//! Recorded input scripts
//!
//! A script is a TOML file with one `[[events]]` table per input, each with a
//! millisecond offset from the start of playback:
//!
//! ```toml
//! [[events]]
//! kind = "touch"
//! at_ms = 0
//! phase = "start"
//! target = "j1"
//! touches = [{ id = 1, x = 120.0, y = 300.0 }]
//!
//! [[events]]
//! kind = "orientation"
//! at_ms = 50
//! alpha = 0.0
//! beta = 45.0
//! gamma = 0.0
//! ```

use crate::controls::{MotionSample, OrientationSample, Touch, TouchEvent, TouchPhase};
use crate::geometry::Rect;
use crate::joypad::{PadError, PadHandle, PadInput};
use crate::layout::GridLayout;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Failed to read replay script: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse replay script: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Event {index} at {at_ms}ms comes before the event preceding it")]
    OutOfOrder { index: usize, at_ms: u64 },

    #[error(transparent)]
    Pad(#[from] PadError),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReplayEvent {
    Touch {
        at_ms: u64,
        phase: TouchPhase,
        target: String,
        touches: Vec<Touch>,
    },
    Motion {
        at_ms: u64,
        x: f32,
        y: f32,
        z: f32,
    },
    Orientation {
        at_ms: u64,
        alpha: f32,
        beta: f32,
        gamma: f32,
    },
    /// New viewport size for the same layout
    Resize { at_ms: u64, width: f32, height: f32 },
}

impl ReplayEvent {
    pub fn at(&self) -> Duration {
        let at_ms = match self {
            Self::Touch { at_ms, .. }
            | Self::Motion { at_ms, .. }
            | Self::Orientation { at_ms, .. }
            | Self::Resize { at_ms, .. } => *at_ms,
        };
        Duration::from_millis(at_ms)
    }

    pub fn to_input(&self, layout: &GridLayout) -> PadInput {
        match self {
            Self::Touch {
                phase,
                target,
                touches,
                ..
            } => PadInput::Touch(TouchEvent {
                phase: *phase,
                target: target.clone(),
                changed: touches.clone(),
            }),
            Self::Motion { x, y, z, .. } => PadInput::Motion(MotionSample {
                x: *x,
                y: *y,
                z: *z,
            }),
            Self::Orientation {
                alpha, beta, gamma, ..
            } => PadInput::Orientation(OrientationSample {
                alpha: *alpha,
                beta: *beta,
                gamma: *gamma,
            }),
            Self::Resize { width, height, .. } => {
                let viewport = layout.viewport();
                PadInput::Resize(layout.with_viewport(Rect::new(
                    viewport.x,
                    viewport.y,
                    *width,
                    *height,
                )))
            }
        }
    }

    pub fn touches(&self) -> &[Touch] {
        match self {
            Self::Touch { touches, .. } => touches,
            _ => &[],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub events: Vec<ReplayEvent>,
}

impl ReplayScript {
    pub fn from_toml_str(content: &str) -> Result<Self, ReplayError> {
        let script: Self = toml::from_str(content)?;
        script.validate()?;
        Ok(script)
    }

    pub async fn load(path: &Path) -> Result<Self, ReplayError> {
        let content = tokio::fs::read_to_string(path).await?;
        let script = Self::from_toml_str(&content)?;
        info!(
            "Loaded replay script {} with {} events",
            path.display(),
            script.events.len()
        );
        Ok(script)
    }

    fn validate(&self) -> Result<(), ReplayError> {
        for (index, pair) in self.events.windows(2).enumerate() {
            if pair[1].at() < pair[0].at() {
                return Err(ReplayError::OutOfOrder {
                    index: index + 1,
                    at_ms: pair[1].at().as_millis() as u64,
                });
            }
        }
        Ok(())
    }

    /// Offset of the last event
    pub fn duration(&self) -> Duration {
        self.events.last().map(ReplayEvent::at).unwrap_or_default()
    }

    /// Every touch in the script, for calibrating before playback
    pub fn touches(&self) -> impl Iterator<Item = &Touch> {
        self.events.iter().flat_map(ReplayEvent::touches)
    }

    /// Sends every event to the pad at its offset from now
    pub async fn play(&self, handle: &PadHandle, layout: &GridLayout) -> Result<usize, ReplayError> {
        let start = Instant::now();
        for event in &self.events {
            sleep_until(start + event.at()).await;
            debug!("Replaying {:?}", event);
            handle.send(event.to_input(layout)).await?;
        }
        info!("Replayed {} events", self.events.len());
        Ok(self.events.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"
        [[events]]
        kind = "touch"
        at_ms = 0
        phase = "start"
        target = "j1"
        touches = [{ id = 1, x = 10.0, y = 20.0, force = 0.4 }]

        [[events]]
        kind = "motion"
        at_ms = 16
        x = 0.0
        y = 9.81
        z = 0.0

        [[events]]
        kind = "touch"
        at_ms = 32
        phase = "end"
        target = "j1"
        touches = [{ id = 1, x = 10.0, y = 20.0 }]

        [[events]]
        kind = "resize"
        at_ms = 40
        width = 640.0
        height = 480.0
    "#;

    #[test]
    fn parses_every_event_kind() {
        let script = ReplayScript::from_toml_str(SCRIPT).unwrap();
        assert_eq!(script.events.len(), 4);
        assert_eq!(script.duration(), Duration::from_millis(40));
        assert_eq!(script.touches().count(), 2);
        assert_eq!(script.touches().next().and_then(|t| t.force), Some(0.4));

        let layout = GridLayout::parse(r#""j1""#, Rect::new(0.0, 0.0, 100.0, 100.0));
        match script.events[3].to_input(&layout) {
            PadInput::Resize(grid) => assert_eq!(grid.viewport(), Rect::new(0.0, 0.0, 640.0, 480.0)),
            other => panic!("expected resize, got {:?}", other),
        }
    }

    #[test]
    fn out_of_order_events_are_rejected() {
        let script = r#"
            [[events]]
            kind = "motion"
            at_ms = 20
            x = 0.0
            y = 0.0
            z = 0.0

            [[events]]
            kind = "motion"
            at_ms = 10
            x = 0.0
            y = 0.0
            z = 0.0
        "#;
        assert!(matches!(
            ReplayScript::from_toml_str(script),
            Err(ReplayError::OutOfOrder { index: 1, at_ms: 10 })
        ));
    }

    #[test]
    fn unknown_kind_is_a_parse_error() {
        let script = r#"
            [[events]]
            kind = "teleport"
            at_ms = 0
        "#;
        assert!(matches!(
            ReplayScript::from_toml_str(script),
            Err(ReplayError::Parse(_))
        ));
    }
}
