//! KML document model: an owned element tree with parse and serialize.

mod element;
mod parser;
mod writer;

pub use element::{Element, Node};
pub use parser::parse_kml;
pub use writer::write_kml;
