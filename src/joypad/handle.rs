//! Pad task: one Joypad driven by an input channel and a haptic tick
//!
//! ```text
//! PadHandle ─[PadInput]→ run_pad ─ Joypad ─ HostBridge
//!                         ↑ interval tick → HapticScheduler
//! ```
//!
//! Inputs are handled one at a time from a single `select!` loop, so the pad
//! never sees two updates interleave.

use super::aggregator::Joypad;
use crate::controls::{MotionSample, OrientationSample, TouchEvent};
use crate::layout::GridLayout;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

const INPUT_CAPACITY: usize = 256;

#[derive(Clone, Debug)]
pub enum PadInput {
    Touch(TouchEvent),
    Motion(MotionSample),
    Orientation(OrientationSample),
    /// The viewport changed; hitboxes are recomputed from the new geometry
    Resize(GridLayout),
}

#[derive(Debug, Error)]
pub enum PadError {
    #[error("Pad task is not running")]
    Closed,

    #[error("Pad task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Joypad {
    pub fn apply(&mut self, input: PadInput) {
        match input {
            PadInput::Touch(event) => self.handle_touch(&event),
            PadInput::Motion(sample) => self.handle_device_motion(sample),
            PadInput::Orientation(sample) => self.handle_device_orientation(sample),
            PadInput::Resize(layout) => self.attach(&layout),
        }
    }
}

pub struct PadHandle {
    sender: mpsc::Sender<PadInput>,
    cancel: CancellationToken,
    task: JoinHandle<Joypad>,
}

impl PadHandle {
    /// Moves `joypad` into a new task that ticks haptics every `tick`
    pub fn spawn(joypad: Joypad, tick: Duration) -> Self {
        let (sender, receiver) = mpsc::channel(INPUT_CAPACITY);
        let cancel = CancellationToken::new();
        info!("Spawning pad task, haptic tick every {:?}", tick);
        let task = tokio::spawn(run_pad(joypad, receiver, tick, cancel.clone()));
        Self {
            sender,
            cancel,
            task,
        }
    }

    pub fn sender(&self) -> mpsc::Sender<PadInput> {
        self.sender.clone()
    }

    pub async fn send(&self, input: PadInput) -> Result<(), PadError> {
        self.sender.send(input).await.map_err(|e| {
            error!("Failed to send pad input: {}", e);
            PadError::Closed
        })
    }

    /// Stops the task once queued inputs are handled and hands the pad back
    pub async fn shutdown(self) -> Result<Joypad, PadError> {
        self.cancel.cancel();
        let joypad = self.task.await?;
        info!("Pad task stopped");
        Ok(joypad)
    }
}

async fn run_pad(
    mut joypad: Joypad,
    mut receiver: mpsc::Receiver<PadInput>,
    tick: Duration,
    cancel: CancellationToken,
) -> Joypad {
    let mut interval = time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                while let Ok(input) = receiver.try_recv() {
                    joypad.apply(input);
                }
                debug!("Pad task cancelled");
                break;
            }
            input = receiver.recv() => match input {
                Some(input) => joypad.apply(input),
                None => {
                    debug!("Pad input channel closed");
                    break;
                }
            },
            now = interval.tick() => {
                joypad.tick(now.into_std());
            }
        }
    }
    joypad
}
