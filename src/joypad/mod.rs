//! Pad aggregate, host bridges, calibration and the pad task

pub mod aggregator;
pub mod bridge;
pub mod calibration;
pub mod debug_label;
pub mod handle;
pub mod slots;

pub use aggregator::{Joypad, EMPTY_LAYOUT_ALERT};
pub use bridge::{BridgeCall, BridgeError, HostBridge, MemoryBridge, UdpBridge, UdpLink};
pub use calibration::{CalibrationState, Decided, ForceCalibration, Probing};
pub use debug_label::{hex_dump, DebugLabel};
pub use handle::{PadError, PadHandle, PadInput};
pub use slots::SlotTable;
