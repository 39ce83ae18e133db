//! Media type classification and body decoding
//!
//! The shape of a decoded response is decided once, from the `Content-Type`
//! header, and never re-inspected downstream.

use super::tree::XmlElement;
use crate::error::Result;
use crate::http::Response;
use serde_json::Value;

/// Encoding family of a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// `application/json`
    Json,
    /// `application/xml` or `text/xml`
    Xml,
    /// Anything else, kept as opaque text
    Other,
}

impl MediaKind {
    /// Classify a `Content-Type` header value.
    ///
    /// Returns `None` when the header carries no media type at all.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let media = content_type.split(';').next()?.trim().to_ascii_lowercase();
        if media.is_empty() || !media.contains('/') {
            return None;
        }
        Some(match media.as_str() {
            "application/json" => Self::Json,
            "application/xml" | "text/xml" => Self::Xml,
            _ => Self::Other,
        })
    }
}

/// Decode a body according to its media kind
pub fn decode_body(kind: MediaKind, body: &str) -> Result<Response> {
    Ok(match kind {
        MediaKind::Json => Response::Json(serde_json::from_str::<Value>(body)?),
        MediaKind::Xml => Response::Xml(XmlElement::parse(body)?),
        MediaKind::Other => Response::Text(body.to_string()),
    })
}
