//! Diagnostics raised while resolving layout labels

use thiserror::Error;

/// Why a layout label could not become a control.
///
/// The `Display` text is what the user sees through the host's alert channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MnemonicError {
    #[error("`{0}` is not a valid code. Control codes have 2 or 3 characters.")]
    InvalidLength(String),

    #[error("Motion detection error: unrecognised coordinate `{0}`.")]
    UnknownMotionAxis(char),

    #[error("`{0}`: please use only one coordinate per motion sensor.")]
    MotionAxisCount(String),

    #[error("`{0}` is not a valid pedal. Please use `pa` or `pt` for accelerator and `pb` for brakes.")]
    UnknownPedal(String),

    #[error("`{0}`: D-pads are produced with the code `dp`. Please update your layout.")]
    LegacyDPad(String),

    #[error("Unrecognised control `{0}` in the layout.")]
    UnknownControl(String),
}
