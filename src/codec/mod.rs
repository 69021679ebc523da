//! # XML Codec
//!
//! Reads and writes seq9 chart XML.
//!
//! ## Wire format
//! ```text
//! data
//!   ├── seq_version
//!   ├── info
//!   │     ├── time_unit, end_tick
//!   │     ├── bpm_info/bpm*          (tick, bpm × 100)
//!   │     └── measure_info/measure*  (tick, num, denomi)
//!   ├── sequence_data/step*          (start_tick, end_tick, left_pos, right_pos,
//!   │                                 kind, player_id, long_point/point*?)
//!   ├── extend_data/extend*          (type, tick, param/{time, kind, layer_name,
//!   │                                 id, lane, speed, color?})
//!   └── rec_data
//!         ├── clip                   (start_time, end_time)
//!         └── effect*                (tick, time, command)
//! ```
//! Every leaf carries `__type="s32"` (base-10 integer) or `__type="str"`.
//!
//! ## Sub-modules
//! - `xml` - owned element tree built from quick-xml events
//! - `schema` - schema-aware decoder into [`Document`]
//! - `tree` - generic decoder into [`XmlValue`]
//! - `writer` - deterministic encoder
//!
//! ## Example
//! ```rust
//! use seq9::{decode, encode};
//!
//! let xml = r#"<?xml version="1.0" encoding="utf-8"?>
//! <data>
//!   <seq_version __type="s32">9</seq_version>
//!   <info>
//!     <time_unit __type="s32">480</time_unit>
//!     <end_tick __type="s32">1920</end_tick>
//!     <bpm_info><bpm><tick __type="s32">0</tick><bpm __type="s32">12000</bpm></bpm></bpm_info>
//!     <measure_info><measure><tick __type="s32">0</tick><num __type="s32">4</num><denomi __type="s32">4</denomi></measure></measure_info>
//!   </info>
//!   <sequence_data/>
//!   <extend_data/>
//!   <rec_data><clip><start_time __type="s32">0</start_time><end_time __type="s32">0</end_time></clip></rec_data>
//! </data>"#;
//!
//! let doc = decode(xml).unwrap();
//! assert_eq!(doc.info.tempo_map[0].bpm, 120.0);
//! assert_eq!(decode(&encode(&doc)).unwrap(), doc);
//! ```

mod schema;
mod tree;
mod writer;
mod xml;

pub use writer::bpm_to_wire;
pub use tree::{XmlMap, XmlValue};

use crate::chart::Document;
use crate::error::ChartError;
use crate::validate::validate;

/// The only `extend/type` value the format defines.
pub(crate) const EXTEND_TYPE: &str = "Vfx";

/// Decode and validate a seq9 chart.
///
/// # Errors
/// Returns a malformed-document [`ChartError`] when the XML is not
/// well-formed, a required element is missing, a value does not decode, or
/// the chart breaks a data-model invariant.
pub fn decode(xml: &str) -> Result<Document, ChartError> {
    let doc = decode_unchecked(xml)?;
    validate(&doc)?;
    Ok(doc)
}

/// Decode without invariant validation (useful for partial or broken charts).
pub fn decode_unchecked(xml: &str) -> Result<Document, ChartError> {
    let root = xml::parse_element_tree(xml)?;
    let doc = schema::decode_document(&root)?;
    log::debug!(
        "decoded seq9 v{}: {} tempo points, {} measure points, {} notes, {} effect cues, {} recorded effects",
        doc.version,
        doc.info.tempo_map.len(),
        doc.info.measure_map.len(),
        doc.notes.len(),
        doc.effects.len(),
        doc.recorded_effects.len()
    );
    Ok(doc)
}

/// Decode any typed-leaf XML document into a generic value tree rooted at
/// the children of the document element.
pub fn decode_tree(xml: &str) -> Result<XmlMap, ChartError> {
    let root = xml::parse_element_tree(xml)?;
    tree::element_to_map(&root)
}

/// Serialize a chart to seq9 XML with a UTF-8 declaration header.
pub fn encode(doc: &Document) -> String {
    let xml = writer::encode_document(doc);
    log::debug!("encoded {} notes into {} bytes", doc.notes.len(), xml.len());
    xml
}
