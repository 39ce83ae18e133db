//! Alma API families
//!
//! [`AlmaCnxn`] is the entry point. Each public field is a sub-client for
//! one API family, rooted at its own endpoint path and sharing the root's
//! connection pool.
//!
//! ```rust,ignore
//! use alma_client::{AlmaCnxn, DataFormat, ListOptions, Region};
//!
//! let alma = AlmaCnxn::new("l8xx...", Region::Europe, DataFormat::Json)?;
//! let users = alma
//!     .users
//!     .get(None, &ListOptions::new().query("last_name", "Archer").all_records(true))
//!     .await?;
//! ```

mod acquisitions;
mod analytics;
mod bibs;
mod conf;
mod courses;
mod electronic;
mod partners;
mod primo;
mod task_lists;
mod users;

pub use acquisitions::{
    Acquisitions, Funds, Invoices, Licenses, PoLines, Vendors, LICENSE_STATUSES, VENDOR_STATUSES,
    VENDOR_TYPES,
};
pub use analytics::{Analytics, Paths, ReportOptions, Reports};
pub use bibs::{BibIds, Bibs, Catalog, Collections, MAX_BIB_IDS};
pub use conf::{
    Conf, DepositProfiles, General, ImportProfiles, Jobs, Reminders, Sets, Units, SET_TYPES,
};
pub use courses::{Citations, Courses, Owners, ReadingLists, Tags};
pub use electronic::{ECollections, EPortfolios, EServices, Electronic};
pub use partners::{PartnerLendingRequests, Partners};
pub use primo::{Primo, SearchOptions};
pub use task_lists::{LendingTasks, RequestedResources, TaskLists};
pub use users::{Deposits, Fees, Loans, UserRequests, Users};

use crate::config::{ConnectionParams, DataFormat, Region};
use crate::error::{Error, Result};
use crate::http::{AlmaClient, Response, DEFAULT_TIMEOUT};
use crate::pagination::{OffsetPaginator, PagedQuery, MAX_PAGE_SIZE};
use crate::query::format_query;
use crate::types::Params;
use std::time::Duration;
use tracing::debug;

/// Default page size of list endpoints
pub const DEFAULT_LIMIT: u32 = 10;

// ============================================================================
// Request options
// ============================================================================

/// Options for single-resource reads
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Additional query parameters passed through unchanged
    pub q_params: Params,
    /// Return the raw transport response
    pub raw: bool,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.q_params.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }
}

/// Options for list endpoints
#[derive(Debug, Clone)]
pub struct ListOptions {
    /// Page size of the first request, clamped to `1..=100`
    pub limit: u32,
    /// Row number to start with
    pub offset: u64,
    /// Keep requesting pages until the declared total is reached
    pub all_records: bool,
    /// Brief-search filters, in order
    pub query: Vec<(String, String)>,
    /// Additional query parameters passed through unchanged
    pub q_params: Params,
    /// Return raw transport responses
    pub raw: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
            all_records: false,
            query: Vec::new(),
            q_params: Params::new(),
            raw: false,
        }
    }
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn all_records(mut self, all_records: bool) -> Self {
        self.all_records = all_records;
        self
    }

    /// Add a brief-search filter
    #[must_use]
    pub fn query(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((field.into(), value.into()));
        self
    }

    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.q_params.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    /// Limit actually sent to the service
    pub fn effective_limit(&self) -> u32 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }

    /// Options for the single-resource form of a list endpoint
    pub fn read_options(&self) -> ReadOptions {
        ReadOptions {
            q_params: self.q_params.clone(),
            raw: self.raw,
        }
    }
}

// ============================================================================
// Shared request helpers
// ============================================================================

/// GET a single resource
pub(crate) async fn read_one(client: &AlmaClient, url: &str, opts: &ReadOptions) -> Result<Response> {
    let args = client.args(&opts.q_params);
    client.read(url, &args, opts.raw).await
}

/// GET a list endpoint, following pages when `all_records` is set.
///
/// `extra` holds endpoint-specific parameters such as vendor status.
pub(crate) async fn read_list(
    client: &AlmaClient,
    url: &str,
    extra: Params,
    opts: &ListOptions,
    container_key: &str,
) -> Result<Response> {
    let mut args = client.args(&opts.q_params);
    args.extend(extra);
    args.insert("limit".to_string(), opts.effective_limit().to_string());
    args.insert("offset".to_string(), opts.offset.to_string());
    if !opts.query.is_empty() {
        args.insert("q".to_string(), format_query(opts.query.iter().map(|(f, v)| (f, v))));
    }

    let first = client.read(url, &args, opts.raw).await?;
    if !opts.all_records {
        return Ok(first);
    }

    debug!("Reading all {} records from {}", container_key, url);
    let query = PagedQuery::new(url, args, container_key).raw(opts.raw);
    OffsetPaginator::new(query).read_all(client, first).await
}

/// Single resource at `{base}/{id}`, or the list at `{base}`
pub(crate) async fn get_or_list(
    client: &AlmaClient,
    id: Option<&str>,
    extra: Params,
    opts: &ListOptions,
    container_key: &str,
) -> Result<Response> {
    let base = client.params().api_uri_full();
    match id {
        Some(id) => read_one(client, &format!("{base}/{id}"), &opts.read_options()).await,
        None => read_list(client, base, extra, opts, container_key).await,
    }
}

/// Reject a filter value outside its documented set
pub(crate) fn check_choice(name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(Error::arg(format!(
            "Valid {name} arguments are {}",
            allowed.join(", ")
        )))
    }
}

// ============================================================================
// AlmaCnxn
// ============================================================================

/// Connection to the Alma APIs
#[derive(Debug, Clone)]
pub struct AlmaCnxn {
    client: AlmaClient,

    /// Users, loans, requests, fees and deposits
    pub users: Users,
    /// Funds, PO lines, vendors, invoices and licenses
    pub acquisitions: Acquisitions,
    /// Bibliographic records and collections
    pub bibs: Bibs,
    /// Libraries, code tables, jobs, sets and profiles
    pub conf: Conf,
    /// Courses, reading lists and citations
    pub courses: Courses,
    /// Electronic collections, services and portfolios
    pub electronic: Electronic,
    /// Resource sharing partners
    pub partners: Partners,
    /// Requested resources and lending tasks
    pub task_lists: TaskLists,
    /// Analytics reports and folders
    pub analytics: Analytics,
    /// Primo discovery search
    pub primo: Primo,
}

impl AlmaCnxn {
    /// Connect to a region's hosted API
    pub fn new(api_key: impl Into<String>, region: Region, format: DataFormat) -> Result<Self> {
        Self::from_params(ConnectionParams::new(api_key, region, format))
    }

    pub fn from_params(params: ConnectionParams) -> Result<Self> {
        Self::with_timeout(params, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(params: ConnectionParams, timeout: Duration) -> Result<Self> {
        let client = AlmaClient::with_timeout(params, timeout)?;
        Ok(Self {
            users: Users::new(&client),
            acquisitions: Acquisitions::new(&client),
            bibs: Bibs::new(&client),
            conf: Conf::new(&client),
            courses: Courses::new(&client),
            electronic: Electronic::new(&client),
            partners: Partners::new(&client),
            task_lists: TaskLists::new(&client),
            analytics: Analytics::new(&client),
            primo: Primo::new(&client),
            client,
        })
    }

    pub fn params(&self) -> &ConnectionParams {
        self.client.params()
    }

    /// Root transport, for endpoints without a dedicated sub-client
    pub fn client(&self) -> &AlmaClient {
        &self.client
    }

    /// Absolute URL of a path relative to the regional origin
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.params().base_uri(), path.trim_start_matches('/'))
    }

    /// GET any resource by path
    pub async fn read(&self, path: &str, opts: &ReadOptions) -> Result<Response> {
        read_one(&self.client, &self.url(path), opts).await
    }

    /// GET any list endpoint by path
    pub async fn list(&self, path: &str, opts: &ListOptions, container_key: &str) -> Result<Response> {
        read_list(&self.client, &self.url(path), Params::new(), opts, container_key).await
    }
}
