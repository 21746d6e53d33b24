//! Slot table of the state buffer

use crate::layout::ControlKind;
use crate::protocol::{slot_width, HEADER_BYE, HEADER_STATUS};
use std::ops::Range;

/// Byte range of every control in the state buffer, in attach order. The
/// header byte comes first, so the first slot starts at 1.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlotTable {
    ranges: Vec<Range<usize>>,
    len: usize,
}

impl SlotTable {
    pub fn assign(kinds: impl IntoIterator<Item = ControlKind>) -> Self {
        let mut cursor = 1;
        let ranges = kinds
            .into_iter()
            .map(|kind| {
                let start = cursor;
                cursor += slot_width(kind);
                start..cursor
            })
            .collect();
        Self {
            ranges,
            len: cursor,
        }
    }

    pub fn range(&self, index: usize) -> Option<Range<usize>> {
        self.ranges.get(index).cloned()
    }

    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    /// Full buffer length, header included
    pub fn buffer_len(&self) -> usize {
        self.len
    }

    /// Zeroed buffer with the status header
    pub fn empty_buffer(&self) -> Vec<u8> {
        let mut buffer = vec![0; self.len];
        buffer[0] = HEADER_STATUS;
        buffer
    }

    /// Same length as a status packet, bye header, zero body
    pub fn bye_pattern(&self) -> Vec<u8> {
        let mut buffer = vec![0; self.len];
        buffer[0] = HEADER_BYE;
        buffer
    }
}
