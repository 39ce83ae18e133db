//! Resource sharing partners API (`/almaws/v1/partners`)

use super::{get_or_list, read_one, ListOptions, ReadOptions};
use crate::error::Result;
use crate::http::{AlmaClient, Response};
use crate::types::Params;

const API_URI: &str = "/almaws/v1/partners";
const WEB_DOC: &str = "https://developers.exlibrisgroup.com/alma/apis/partners";
const WADL_URL: &str =
    "https://developers.exlibrisgroup.com/resources/wadl/8883ef41-c3b8-4792-9ff8-cb6b729d6e07.wadl";

#[derive(Debug, Clone)]
pub struct Partners {
    client: AlmaClient,
    pub lending_requests: PartnerLendingRequests,
}

impl Partners {
    pub(crate) fn new(root: &AlmaClient) -> Self {
        let client = root.derive(root.params().for_api(API_URI, WEB_DOC, WADL_URL));
        Self {
            lending_requests: PartnerLendingRequests {
                client: client.clone(),
            },
            client,
        }
    }

    /// A single partner by `partner_code`, or the partner list
    pub async fn get(&self, partner_id: Option<&str>, opts: &ListOptions) -> Result<Response> {
        get_or_list(&self.client, partner_id, Params::new(), opts, "partner").await
    }
}

#[derive(Debug, Clone)]
pub struct PartnerLendingRequests {
    client: AlmaClient,
}

impl PartnerLendingRequests {
    /// One lending request placed by a partner
    pub async fn get(&self, partner_id: &str, request_id: &str, opts: &ReadOptions) -> Result<Response> {
        let url = format!(
            "{}/{partner_id}/lending-requests/{request_id}",
            self.client.params().api_uri_full()
        );
        read_one(&self.client, &url, opts).await
    }
}
