//! Wire format between the pad and the host
//!
//! Three kinds of packet travel over the bridge:
//!
//! - the layout announcement, the comma separated control ids in attach
//!   order, sent once after the pad is built;
//! - status packets: header byte [`HEADER_STATUS`] followed by one slot per
//!   control in the same order;
//! - the bye pattern: a status-sized packet with header [`HEADER_BYE`] and a
//!   zero body, which the host replays when the pad disconnects.
//!
//! Analog slots are big-endian u16 in `0..=0x7fff`. Bidirectional axes put
//! their center at [`AXIS_CENTER`]. Digital slots are one byte, 0 or 1.

use crate::layout::{ControlKind, JoystickKind, Mnemonic};
use thiserror::Error;

pub const HEADER_STATUS: u8 = 0;
pub const HEADER_BYE: u8 = 255;
pub const AXIS_CENTER: u16 = 0x4000;
pub const AXIS_MAX: u16 = 0x7fff;

/// Saturating float to wire conversion. Never wraps; NaN reads 0.
pub fn truncate(value: f32) -> u16 {
    if value.is_nan() || value < 0.0 {
        0
    } else if value > AXIS_MAX as f32 {
        AXIS_MAX
    } else {
        value.floor() as u16
    }
}

/// Signed `[-1, 1]` value around [`AXIS_CENTER`]
pub fn encode_bidirectional(value: f32) -> u16 {
    truncate(AXIS_CENTER as f32 + value * AXIS_CENTER as f32)
}

/// `[0, 1]` value; 1 saturates at [`AXIS_MAX`]
pub fn encode_unidirectional(value: f32) -> u16 {
    truncate(value * 0x8000 as f32)
}

pub fn put_u16(slot: &mut [u8], offset: usize, value: u16) {
    if let Some(bytes) = slot.get_mut(offset..offset + 2) {
        bytes.copy_from_slice(&value.to_be_bytes());
    }
}

pub fn put_flag(slot: &mut [u8], offset: usize, on: bool) {
    if let Some(byte) = slot.get_mut(offset) {
        *byte = u8::from(on);
    }
}

/// One decoded value of a status packet
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotKind {
    /// Big-endian u16
    Axis,
    /// Single byte
    Button,
}

impl SlotKind {
    pub fn width(self) -> usize {
        match self {
            Self::Axis => 2,
            Self::Button => 1,
        }
    }
}

/// Values a control of `kind` contributes to a status packet, in order
pub fn slot_kinds(kind: ControlKind) -> &'static [SlotKind] {
    use SlotKind::{Axis, Button};
    match kind {
        ControlKind::Joystick(JoystickKind::Thumbstick) => &[Axis, Axis, Button],
        ControlKind::Joystick(_) => &[Axis, Axis],
        ControlKind::Motion(_)
        | ControlKind::Pedal(_)
        | ControlKind::Knob
        | ControlKind::AnalogButton => &[Axis],
        ControlKind::Button => &[Button],
        ControlKind::DPad => &[Button, Button, Button, Button],
        ControlKind::Debug => &[],
    }
}

/// Bytes a control of `kind` occupies in a status packet
pub fn slot_width(kind: ControlKind) -> usize {
    slot_kinds(kind).iter().map(|k| k.width()).sum()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Status packet has {actual} bytes, layout expects {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Layout announcement is not valid UTF-8")]
    InvalidAnnouncement,

    #[error("Announced control `{0}` is not a valid control code")]
    UnknownControl(String),
}

/// Host-side view of a pad's slot layout, rebuilt from its announcement
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlotLayout {
    ids: Vec<String>,
    slots: Vec<SlotKind>,
}

impl SlotLayout {
    pub fn from_ids<S: AsRef<str>>(ids: &[S]) -> Result<Self, ProtocolError> {
        let mut layout = Self::default();
        for id in ids {
            let id = id.as_ref();
            let kind = Mnemonic::new(id)
                .resolve()
                .map_err(|_| ProtocolError::UnknownControl(id.to_string()))?;
            layout.ids.push(id.to_string());
            layout.slots.extend_from_slice(slot_kinds(kind));
        }
        Ok(layout)
    }

    /// Parses the comma separated announcement text
    pub fn from_announcement(text: &str) -> Result<Self, ProtocolError> {
        let ids: Vec<&str> = text.split(',').filter(|id| !id.is_empty()).collect();
        Self::from_ids(&ids)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn slots(&self) -> &[SlotKind] {
        &self.slots
    }

    /// Length of a status packet, header included
    pub fn packet_len(&self) -> usize {
        1 + self.slots.iter().map(|s| s.width()).sum::<usize>()
    }

    /// Decodes the body of a status packet
    pub fn decode_status(&self, packet: &[u8]) -> Result<Vec<u16>, ProtocolError> {
        if packet.len() != self.packet_len() {
            return Err(ProtocolError::LengthMismatch {
                expected: self.packet_len(),
                actual: packet.len(),
            });
        }
        let mut values = Vec::with_capacity(self.slots.len());
        let mut cursor = 1;
        for slot in &self.slots {
            let value = match slot {
                SlotKind::Axis => u16::from_be_bytes([packet[cursor], packet[cursor + 1]]),
                SlotKind::Button => u16::from(packet[cursor]),
            };
            values.push(value);
            cursor += slot.width();
        }
        Ok(values)
    }
}

/// A packet as seen by the host
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Packet {
    Status(Vec<u16>),
    Bye,
    Layout(SlotLayout),
}

/// Classifies and decodes one packet. Status packets need the layout of the
/// announcement that preceded them.
pub fn decode(packet: &[u8], layout: &SlotLayout) -> Result<Packet, ProtocolError> {
    match packet.first() {
        Some(&HEADER_STATUS) => layout.decode_status(packet).map(Packet::Status),
        Some(&HEADER_BYE) => Ok(Packet::Bye),
        _ => {
            let text =
                std::str::from_utf8(packet).map_err(|_| ProtocolError::InvalidAnnouncement)?;
            SlotLayout::from_announcement(text).map(Packet::Layout)
        }
    }
}
