//! Analytics API (`/almaws/v1/analytics`)
//!
//! Reports are only served as XML. Large reports are delivered in chunks
//! linked by a resumption token rather than by offset.

use super::{read_one, ReadOptions};
use crate::config::ROWSET_NAMESPACE;
use crate::error::{Error, Result};
use crate::http::{AlmaClient, Response};
use crate::pagination::{report_to_records, ReportPaginator};
use crate::types::{JsonObject, Params};

const API_URI: &str = "/almaws/v1/analytics";
const WEB_DOC: &str = "https://developers.exlibrisgroup.com/alma/apis/analytics";
const WADL_URL: &str =
    "https://developers.exlibrisgroup.com/resources/wadl/10788916-19f6-4f19-aaf1-c18fa0c31ccd.wadl";

#[derive(Debug, Clone)]
pub struct Analytics {
    pub paths: Paths,
    pub reports: Reports,
}

impl Analytics {
    pub(crate) fn new(root: &AlmaClient) -> Self {
        let params = root
            .params()
            .for_api(API_URI, WEB_DOC, WADL_URL)
            .with_namespace("report", ROWSET_NAMESPACE);
        Self {
            paths: Paths {
                client: root.derive(params.nested("/paths")),
            },
            reports: Reports {
                client: root.derive(params.nested("/reports")),
            },
        }
    }
}

/// Report folder listing
#[derive(Debug, Clone)]
pub struct Paths {
    client: AlmaClient,
}

impl Paths {
    /// Contents of a report folder, or of the root when `path` is `None`
    pub async fn get(&self, path: Option<&str>, opts: &ReadOptions) -> Result<Response> {
        let base = self.client.params().api_uri_full();
        let url = match path {
            Some(path) => format!("{base}/{}", path.trim_start_matches('/')),
            None => base.to_string(),
        };
        read_one(&self.client, &url, opts).await
    }
}

/// Options for a report request
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// OBI filter expression (XML)
    pub filter: Option<String>,
    /// Rows per chunk, a multiple of 25 between 25 and 1000
    pub limit: u32,
    /// Include column headings in the schema
    pub col_names: bool,
    /// Follow resumption tokens until the report is finished
    pub all_records: bool,
    pub q_params: Params,
    pub raw: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            filter: None,
            limit: 25,
            col_names: true,
            all_records: false,
            q_params: Params::new(),
            raw: false,
        }
    }
}

impl ReportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn col_names(mut self, col_names: bool) -> Self {
        self.col_names = col_names;
        self
    }

    #[must_use]
    pub fn all_records(mut self, all_records: bool) -> Self {
        self.all_records = all_records;
        self
    }

    #[must_use]
    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    fn validate(&self) -> Result<()> {
        if (25..=1000).contains(&self.limit) && self.limit % 25 == 0 {
            Ok(())
        } else {
            Err(Error::arg(format!(
                "report limit must be a multiple of 25 between 25 and 1000, got {}",
                self.limit
            )))
        }
    }
}

/// Report execution
#[derive(Debug, Clone)]
pub struct Reports {
    client: AlmaClient,
}

impl Reports {
    /// Run the report at `path` and return it as an XML tree.
    ///
    /// With `all_records`, every chunk's rows are appended to the first
    /// chunk's rowset. With `raw`, the transport responses are returned
    /// instead, one per request.
    pub async fn get(&self, path: &str, opts: &ReportOptions) -> Result<Response> {
        opts.validate()?;

        let url = self.client.params().api_uri_full();
        let mut args = self.client.args(&opts.q_params);
        args.insert("path".to_string(), path.to_string());
        args.insert("format".to_string(), "xml".to_string());
        args.insert("limit".to_string(), opts.limit.to_string());
        args.insert("col_names".to_string(), opts.col_names.to_string());
        if let Some(filter) = &opts.filter {
            args.insert("filter".to_string(), filter.clone());
        }

        let first = self.client.read(url, &args, opts.raw).await?;
        if !opts.all_records {
            return Ok(first);
        }

        ReportPaginator::new(url, self.client.params().api_key())
            .rowset_namespace(self.rowset_ns())
            .read_all(&self.client, first, opts.raw)
            .await
    }

    /// Run the report and flatten its rows into records keyed by column heading
    pub async fn get_records(&self, path: &str, opts: &ReportOptions) -> Result<Vec<JsonObject>> {
        let opts = opts.clone().raw(false);
        let report = self.get(path, &opts).await?;
        let tree = report
            .as_xml()
            .ok_or_else(|| Error::extraction("rowset", "report response is not XML"))?;
        Ok(report_to_records(tree, self.rowset_ns()))
    }

    /// Namespace bound to the `report` prefix for this connection
    fn rowset_ns(&self) -> &str {
        self.client.params().xml_ns().get("report").unwrap_or(ROWSET_NAMESPACE)
    }
}
