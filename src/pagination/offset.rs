//! Offset/limit exhaustive read
//!
//! Given the first page of a list query, requests further pages until the
//! declared `total_record_count` is reached and merges them into one
//! aggregate of the first page's shape.
//!
//! Progress advances by the number of records each page actually carried,
//! not by the requested page size, so a short page never ends the read
//! early. An empty page before the total is reached stops the read.

use super::types::{Accumulator, PageSource, PagedQuery, PaginationState};
use crate::error::{Error, Result};
use crate::http::Response;
use tracing::{debug, warn};

/// Drives offset/limit pagination for one query
#[derive(Debug, Clone)]
pub struct OffsetPaginator {
    query: PagedQuery,
}

impl OffsetPaginator {
    pub fn new(query: PagedQuery) -> Self {
        Self { query }
    }

    /// Fetch every remaining page after `first` and return the aggregate.
    ///
    /// Any failure on a continuation page aborts the whole read; pages
    /// already merged are discarded.
    pub async fn read_all<S>(&self, source: &S, first: Response) -> Result<Response>
    where
        S: PageSource + ?Sized,
    {
        let key = self.query.container_key.as_str();
        let start = self.query.start_offset()?;

        let (mut acc, first_count, declared_total) = match first {
            Response::Raw(raw) => {
                let decoded = raw.decode().ok();
                let count = decoded.as_ref().map_or(0, |d| d.record_count(key));
                let total = decoded.as_ref().and_then(Response::total_record_count);
                (Accumulator::Raw(vec![raw]), count, total)
            }
            Response::RawPages(_) => {
                return Err(Error::arg("first page must be a single response"));
            }
            decoded => {
                let count = decoded.record_count(key);
                let total = decoded.total_record_count();
                (Accumulator::Merged(decoded), count, total)
            }
        };

        let mut state = PaginationState::new(start + first_count as u64, 0);
        // Without a declared total, assume the first page was everything
        state.total = declared_total.unwrap_or(state.offset);

        let mut params = self.query.params.clone();
        params.insert("limit".to_string(), self.query.max_page_size.to_string());

        while state.has_more() {
            params.insert("offset".to_string(), state.offset.to_string());
            debug!(
                "Fetching {} page {} (offset {}, total {})",
                key,
                state.pages + 1,
                state.offset,
                state.total
            );

            let page = source.fetch_page(&self.query.url, &params, self.query.raw).await?;
            let received = acc.merge(page, key)?;
            if received == 0 {
                warn!(
                    "Empty {} page at offset {} of {}, stopping",
                    key, state.offset, state.total
                );
                break;
            }
            state.advance(received);
        }

        debug!(
            "Retrieved {} {} records in {} pages",
            state.offset - start,
            key,
            state.pages
        );
        Ok(acc.into_response())
    }
}
