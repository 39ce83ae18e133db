//! Response decoder module
//!
//! Supports: JSON, XML (as a mutable element tree), opaque text
//!
//! # Overview
//!
//! The decode module turns response bodies into one of the shapes the
//! transport layer hands back to callers. XML is kept as an [`XmlElement`]
//! tree rather than converted to JSON, so paginated rows can be appended to
//! the first page and the result serialized again.

mod media;
mod tree;

pub use media::{decode_body, MediaKind};
pub use tree::{XmlAttribute, XmlElement, XmlName};
