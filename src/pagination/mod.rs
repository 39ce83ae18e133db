//! Pagination module
//!
//! Supports: offset/limit with a declared total, analytics resumption tokens
//!
//! # Overview
//!
//! Alma list endpoints return one page at a time. The paginators here take
//! the first page a caller already fetched and own every follow-up request
//! until the query is exhausted. Pages are fetched strictly one after
//! another and merged according to the first page's shape: record lists
//! are concatenated for JSON, record elements appended for XML, and raw
//! transport responses collected in request order.

mod offset;
mod resumption;
mod types;

pub use offset::OffsetPaginator;
pub use resumption::{report_to_records, ReportPaginator};
pub use types::{Accumulator, PageSource, PagedQuery, PaginationState, MAX_PAGE_SIZE};

#[cfg(test)]
mod tests;
