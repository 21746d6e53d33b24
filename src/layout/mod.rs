//! Layout text to an ordered list of control kinds

pub mod error;
pub mod grid;
pub mod mnemonic;

pub use error::MnemonicError;
pub use grid::{cell_labels, normalize_grid_areas, GridLayout, LayoutSource};
pub use mnemonic::{
    ControlKind, JoystickKind, Mnemonic, MotionAxis, MotionSource, PedalRole, DEBUG_LABEL,
    DPAD_CODE,
};

/// A label together with what it resolved to
pub type ResolvedLabel = (Mnemonic, Result<ControlKind, MnemonicError>);

/// Every distinct label of the template in attach order, each with its
/// resolution. Malformed labels stay in the list with their diagnostic.
pub fn resolve_layout(raw: &str) -> Vec<ResolvedLabel> {
    let mut codes: Vec<Mnemonic> = cell_labels(raw).into_iter().map(Mnemonic::new).collect();
    codes.sort();
    codes.dedup();
    codes
        .into_iter()
        .map(|code| {
            let kind = code.resolve();
            (code, kind)
        })
        .collect()
}
