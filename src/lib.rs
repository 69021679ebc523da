pub mod chart;
pub mod codec;
pub mod config;
pub mod edit;
pub mod error;
pub mod timing;
pub mod validate;

pub use chart::*;
pub use codec::{bpm_to_wire, decode, decode_tree, decode_unchecked, encode, XmlMap, XmlValue};
pub use config::{EditorConfig, SnapConfig};
pub use edit::{apply_drag, ContainerGeometry, DragOutcome, DragSession, PixelDelta, RejectReason};
pub use error::*;
pub use timing::*;
pub use validate::validate;

/// Decode, validate and re-encode a chart.
/// This is the main entry point for normalizing chart files.
pub fn normalize(xml: &str) -> Result<String, ChartError> {
    let doc = decode(xml)?;
    Ok(encode(&doc))
}

/// Normalize without validation (useful for charts that are still being authored)
pub fn normalize_unchecked(xml: &str) -> Result<String, ChartError> {
    let doc = decode_unchecked(xml)?;
    Ok(encode(&doc))
}
