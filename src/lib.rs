// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Alma Client
//!
//! An async client for the Ex Libris Alma library-services REST APIs.
//!
//! ## Features
//!
//! - **Regional hosts**: America, Europe, Asia Pacific, Canada and China
//! - **JSON or XML**: per-connection default, overridable per request
//! - **Normalized errors**: Alma error envelopes become [`Error::Alma`]
//! - **Exhaustive reads**: offset/limit lists and Analytics resumption tokens
//! - **Brief search**: `field~value AND field~value` query building
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use alma_client::{AlmaCnxn, DataFormat, ListOptions, Region, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let alma = AlmaCnxn::new("l8xx...", Region::America, DataFormat::Json)?;
//!
//!     // Every vendor whose name matches, all pages
//!     let opts = ListOptions::new().query("name", "AMAZON").all_records(true);
//!     let vendors = alma.acquisitions.vendors.get(None, "ALL", "ALL", &opts).await?;
//!
//!     // An Analytics report as flat records
//!     let rows = alma
//!         .analytics
//!         .reports
//!         .get_records("/shared/Reports/Loans", &Default::default())
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           AlmaCnxn                              │
//! │  users   acquisitions   bibs   conf   courses   electronic      │
//! │  partners   task_lists   analytics   primo                      │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌───────────────┬──────────────┴──────┬─────────────┬────────────┐
//! │     HTTP      │     Pagination      │    Query    │   Decode   │
//! ├───────────────┼─────────────────────┼─────────────┼────────────┤
//! │ GET / POST    │ Offset / limit      │ Brief search│ JSON       │
//! │ Format param  │ Resumption token    │             │ XML tree   │
//! │ Error envelope│ Raw page lists      │             │ Text       │
//! └───────────────┴─────────────────────┴─────────────┴────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the client
pub mod error;

/// Common types and type aliases
pub mod types;

/// Regions, formats, connection parameters and settings
pub mod config;

/// Response body decoding (JSON, XML tree, text)
pub mod decode;

/// HTTP transport and response normalization
pub mod http;

/// Brief-search query formatting
pub mod query;

/// Exhaustive reads across pages
pub mod pagination;

/// Sub-clients for each API family
pub mod api;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use api::{AlmaCnxn, BibIds, ListOptions, ReadOptions, ReportOptions, SearchOptions};
pub use config::{ConnectionParams, DataFormat, Region, Settings};
pub use decode::XmlElement;
pub use http::{AlmaClient, RawResponse, RequestBody, Response};
pub use query::{format_query, format_query_value};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
