//! HTTP transport module
//!
//! Provides the single-request layer every sub-client goes through.
//!
//! # Features
//!
//! - **Format negotiation**: `format` query parameter defaulted from config
//! - **Shape detection**: JSON, XML tree, or opaque text by `Content-Type`
//! - **Error normalization**: Alma error envelopes become [`crate::Error::Alma`]
//! - **Raw passthrough**: untouched status, headers and body on request

mod client;
mod response;

pub use client::{AlmaClient, RequestBody, DEFAULT_TIMEOUT};
pub use response::{
    json_error_message, normalize, xml_error_message, RawResponse, Response, TOTAL_RECORD_COUNT,
};
