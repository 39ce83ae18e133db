//! Primo search API (`/primo/v1/search`)

use super::{read_one, ReadOptions};
use crate::error::Result;
use crate::http::{AlmaClient, Response};

const API_URI: &str = "/primo/v1/search";
const WEB_DOC: &str = "https://developers.exlibrisgroup.com/primo/apis/search";
const WADL_URL: &str =
    "https://developers.exlibrisgroup.com/resources/wadl/f5643222-bb88-4f3d-b2d6-5029e527c515.wadl";

/// Discovery search options
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub tab: String,
    pub scope: String,
    pub read: ReadOptions,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            tab: "default_tab".to_string(),
            scope: "everything_scope".to_string(),
            read: ReadOptions::default(),
        }
    }
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn tab(mut self, tab: impl Into<String>) -> Self {
        self.tab = tab.into();
        self
    }

    #[must_use]
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct Primo {
    client: AlmaClient,
}

impl Primo {
    pub(crate) fn new(root: &AlmaClient) -> Self {
        Self {
            client: root.derive(root.params().for_api(API_URI, WEB_DOC, WADL_URL)),
        }
    }

    /// Search a Primo view. `query` is passed as-is, e.g. `any,contains,dune`.
    pub async fn search(&self, query: &str, view_id: &str, opts: &SearchOptions) -> Result<Response> {
        let read = opts
            .read
            .clone()
            .param("vid", view_id)
            .param("tab", opts.tab.as_str())
            .param("scope", opts.scope.as_str())
            .param("q", query);
        read_one(&self.client, self.client.params().api_uri_full(), &read).await
    }
}
