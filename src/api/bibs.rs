//! Bibs API (`/almaws/v1/bibs`)
//!
//! Single holding and portfolio records come back as MARC XML; pass
//! `format=xml` in the query parameters when the default format is JSON.

use super::{read_one, ReadOptions};
use crate::error::{Error, Result};
use crate::http::{AlmaClient, RequestBody, Response};

const API_URI: &str = "/almaws/v1/bibs";
const WEB_DOC: &str = "https://developers.exlibrisgroup.com/alma/apis/bibs";
const WADL_URL: &str =
    "https://developers.exlibrisgroup.com/resources/wadl/af2fb69d-64f4-42bc-bb05-d8a0ae56936e.wadl";

/// Most MMS ids one catalog request may carry
pub const MAX_BIB_IDS: usize = 100;

/// One bib record id, or a batch of them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BibIds {
    /// Fetched by path, `/bibs/{mms_id}`
    Single(String),
    /// Fetched by the `mms_id` parameter
    Many(Vec<String>),
}

impl From<&str> for BibIds {
    fn from(id: &str) -> Self {
        Self::Single(id.to_string())
    }
}

impl From<String> for BibIds {
    fn from(id: String) -> Self {
        Self::Single(id)
    }
}

impl From<Vec<String>> for BibIds {
    fn from(ids: Vec<String>) -> Self {
        Self::Many(ids)
    }
}

impl From<&[&str]> for BibIds {
    fn from(ids: &[&str]) -> Self {
        Self::Many(ids.iter().map(|id| (*id).to_string()).collect())
    }
}

/// Catalog records and collections
#[derive(Debug, Clone)]
pub struct Bibs {
    pub catalog: Catalog,
    pub collections: Collections,
}

impl Bibs {
    pub(crate) fn new(root: &AlmaClient) -> Self {
        let params = root.params().for_api(API_URI, WEB_DOC, WADL_URL);
        Self {
            catalog: Catalog {
                client: root.derive(params.clone()),
            },
            collections: Collections {
                client: root.derive(params.nested("/collections")),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    client: AlmaClient,
}

impl Catalog {
    /// Bib records by MMS id
    pub async fn get(&self, bib_ids: impl Into<BibIds>, opts: &ReadOptions) -> Result<Response> {
        let base = self.client.params().api_uri_full();
        match bib_ids.into() {
            BibIds::Single(id) if id.trim().is_empty() => Err(Error::arg("bib id must not be empty")),
            BibIds::Single(id) => read_one(&self.client, &format!("{base}/{id}"), opts).await,
            BibIds::Many(ids) => {
                if ids.is_empty() || ids.len() > MAX_BIB_IDS {
                    return Err(Error::arg(format!(
                        "bib_ids must contain between 1 and {MAX_BIB_IDS} ids, got {}",
                        ids.len()
                    )));
                }
                let opts = opts.clone().param("mms_id", ids.join(","));
                read_one(&self.client, base, &opts).await
            }
        }
    }

    /// Holding list of a bib, or one holding record
    pub async fn get_holdings(
        &self,
        bib_id: &str,
        holding_id: Option<&str>,
        opts: &ReadOptions,
    ) -> Result<Response> {
        let url = self.child_url(&format!("{bib_id}/holdings"), holding_id);
        read_one(&self.client, &url, opts).await
    }

    /// Items of a holding, or one item
    pub async fn get_holding_items(
        &self,
        bib_id: &str,
        holding_id: &str,
        item_id: Option<&str>,
        opts: &ReadOptions,
    ) -> Result<Response> {
        let url = self.child_url(&format!("{bib_id}/holdings/{holding_id}/items"), item_id);
        read_one(&self.client, &url, opts).await
    }

    /// Electronic portfolios of a bib, or one portfolio
    pub async fn get_portfolios(
        &self,
        bib_id: &str,
        portfolio_id: Option<&str>,
        opts: &ReadOptions,
    ) -> Result<Response> {
        let url = self.child_url(&format!("{bib_id}/portfolios"), portfolio_id);
        read_one(&self.client, &url, opts).await
    }

    /// Create a bib record.
    ///
    /// The record is usually an XML `<bib>` tree; its encoding follows the
    /// `format` parameter, then the body type, then the configured default.
    pub async fn create(&self, record: impl Into<RequestBody>, opts: &ReadOptions) -> Result<Response> {
        let args = self.client.args(&opts.q_params);
        self.client
            .create(self.client.params().api_uri_full(), record, &args, "bib", opts.raw)
            .await
    }

    fn child_url(&self, path: &str, id: Option<&str>) -> String {
        let base = self.client.params().api_uri_full();
        match id {
            Some(id) => format!("{base}/{path}/{id}"),
            None => format!("{base}/{path}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Collections {
    client: AlmaClient,
}

impl Collections {
    /// Top-level collections, or one collection by pid
    pub async fn get(&self, pid: Option<&str>, opts: &ReadOptions) -> Result<Response> {
        let base = self.client.params().api_uri_full();
        let url = match pid {
            Some(pid) => format!("{base}/{pid}"),
            None => base.to_string(),
        };
        read_one(&self.client, &url, opts).await
    }

    /// Bibliographic titles in a collection
    pub async fn get_bibs(&self, pid: &str, opts: &ReadOptions) -> Result<Response> {
        let url = format!("{}/{pid}/bibs", self.client.params().api_uri_full());
        read_one(&self.client, &url, opts).await
    }
}
