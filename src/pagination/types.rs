//! Pagination types and traits
//!
//! Defines the page source abstraction and the accumulator that merges
//! pages of one response shape into a single aggregate.

use crate::decode::XmlElement;
use crate::error::{Error, Result};
use crate::http::{AlmaClient, RawResponse, Response};
use crate::types::Params;
use async_trait::async_trait;
use serde_json::Value;

/// Provider's documented upper bound on page size
pub const MAX_PAGE_SIZE: u32 = 100;

/// Anything that can fetch one page of a list endpoint
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the page described by `params`
    async fn fetch_page(&self, url: &str, params: &Params, raw: bool) -> Result<Response>;
}

#[async_trait]
impl PageSource for AlmaClient {
    async fn fetch_page(&self, url: &str, params: &Params, raw: bool) -> Result<Response> {
        self.read(url, params, raw).await
    }
}

/// Description of an exhaustive offset/limit read
#[derive(Debug, Clone)]
pub struct PagedQuery {
    /// Endpoint URL
    pub url: String,
    /// Parameters of the first request (filters, `limit`, `offset`)
    pub params: Params,
    /// Field (or element) name holding the record list
    pub container_key: String,
    /// Whether pages are raw transport responses
    pub raw: bool,
    /// Page size for continuation requests
    pub max_page_size: u32,
}

impl PagedQuery {
    pub fn new(url: impl Into<String>, params: Params, container_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            params,
            container_key: container_key.into(),
            raw: false,
            max_page_size: MAX_PAGE_SIZE,
        }
    }

    /// Request raw transport responses
    #[must_use]
    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    /// Override the continuation page size
    #[must_use]
    pub fn max_page_size(mut self, size: u32) -> Self {
        self.max_page_size = size;
        self
    }

    /// Offset the first request started at
    pub fn start_offset(&self) -> Result<u64> {
        match self.params.get("offset") {
            Some(offset) => offset
                .trim()
                .parse()
                .map_err(|_| Error::arg(format!("offset must be a non-negative integer, got '{offset}'"))),
            None => Ok(0),
        }
    }
}

/// Tracks progress through a paged read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationState {
    /// Offset of the next record to request
    pub offset: u64,
    /// Declared total for the query
    pub total: u64,
    /// Pages fetched so far, the first page included
    pub pages: u32,
}

impl PaginationState {
    pub fn new(offset: u64, total: u64) -> Self {
        Self {
            offset,
            total,
            pages: 1,
        }
    }

    /// Whether records remain past the current offset
    pub fn has_more(&self) -> bool {
        self.offset < self.total
    }

    /// Record a fetched page
    pub fn advance(&mut self, received: usize) {
        self.offset += received as u64;
        self.pages += 1;
    }
}

/// Aggregate of all pages fetched so far
#[derive(Debug)]
pub enum Accumulator {
    /// Pages merged into the first decoded response
    Merged(Response),
    /// Raw pages kept whole, in request order
    Raw(Vec<RawResponse>),
}

impl Accumulator {
    /// Merge a page and return the number of records it carried
    pub fn merge(&mut self, page: Response, container_key: &str) -> Result<usize> {
        match (self, page) {
            (Self::Merged(Response::Json(acc)), Response::Json(page)) => {
                merge_json(acc, page, container_key)
            }
            (Self::Merged(Response::Xml(acc)), Response::Xml(page)) => {
                Ok(merge_xml(acc, page, container_key))
            }
            (Self::Raw(pages), Response::Raw(page)) => {
                let received = page
                    .decode()
                    .map(|decoded| decoded.record_count(container_key))
                    .unwrap_or(0);
                pages.push(page);
                Ok(received)
            }
            (_, page) => Err(Error::extraction(
                container_key,
                format!("page shape {} does not match the first page", shape_name(&page)),
            )),
        }
    }

    pub fn into_response(self) -> Response {
        match self {
            Self::Merged(response) => response,
            Self::Raw(pages) => Response::RawPages(pages),
        }
    }
}

fn merge_json(acc: &mut Value, page: Value, container_key: &str) -> Result<usize> {
    let Value::Object(mut page) = page else {
        return Ok(0);
    };
    let records = match page.remove(container_key) {
        Some(Value::Array(records)) => records,
        Some(Value::Null) | None => Vec::new(),
        Some(single) => vec![single],
    };
    let received = records.len();

    let Value::Object(acc) = acc else {
        return Err(Error::extraction(container_key, "first page is not an object"));
    };
    let slot = acc
        .entry(container_key.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    match slot {
        Value::Array(existing) => existing.extend(records),
        other => {
            let mut merged = match other.take() {
                Value::Null => Vec::new(),
                single => vec![single],
            };
            merged.extend(records);
            *other = Value::Array(merged);
        }
    }
    Ok(received)
}

fn merge_xml(acc: &mut XmlElement, page: XmlElement, container_key: &str) -> usize {
    let mut received = 0;
    for child in page.children {
        if child.name.local == container_key {
            acc.push_child(child);
            received += 1;
        }
    }
    received
}

fn shape_name(response: &Response) -> &'static str {
    match response {
        Response::Json(_) => "json",
        Response::Xml(_) => "xml",
        Response::Text(_) => "text",
        Response::Raw(_) => "raw",
        Response::RawPages(_) => "raw pages",
    }
}
