//! CycloneDX codec.
//!
//! Decodes JSON and XML documents into [`BomDocument`](crate::model::BomDocument)
//! and encodes them back. Format selection follows the file extension on
//! import and a caller-supplied flag on export.

mod format;
mod reader;
mod writer;

pub use format::BomFormat;
pub use reader::{read_bom, CycloneDxReader};
pub use writer::write_bom;
