//! Electronic resources API (`/almaws/v1/electronic`)

use super::{get_or_list, read_one, ListOptions, ReadOptions};
use crate::error::Result;
use crate::http::{AlmaClient, Response};
use crate::types::Params;

const API_URI: &str = "/almaws/v1/electronic";
const WEB_DOC: &str = "https://developers.exlibrisgroup.com/alma/apis/electronic";
const WADL_URL: &str =
    "https://developers.exlibrisgroup.com/resources/wadl/e7cf39e9-adce-4be1-aeb9-a31f452960da.wadl";

/// E-collections with their services and portfolios
#[derive(Debug, Clone)]
pub struct Electronic {
    pub collections: ECollections,
    pub services: EServices,
    pub portfolios: EPortfolios,
}

impl Electronic {
    pub(crate) fn new(root: &AlmaClient) -> Self {
        let client = root.derive(
            root.params()
                .for_api(API_URI, WEB_DOC, WADL_URL)
                .nested("/e-collections"),
        );
        Self {
            collections: ECollections {
                client: client.clone(),
            },
            services: EServices {
                client: client.clone(),
            },
            portfolios: EPortfolios { client },
        }
    }
}

#[derive(Debug, Clone)]
pub struct ECollections {
    client: AlmaClient,
}

impl ECollections {
    /// A single electronic collection, or the collection list.
    ///
    /// Brief search covers `interface_name`, `keywords`, `name` and
    /// `po_line_id`.
    pub async fn get(&self, collection_id: Option<&str>, opts: &ListOptions) -> Result<Response> {
        get_or_list(&self.client, collection_id, Params::new(), opts, "electronic_collection").await
    }
}

#[derive(Debug, Clone)]
pub struct EServices {
    client: AlmaClient,
}

impl EServices {
    /// Services of a collection, or one service
    pub async fn get(
        &self,
        collection_id: &str,
        service_id: Option<&str>,
        opts: &ReadOptions,
    ) -> Result<Response> {
        let mut url = format!("{}/{collection_id}/e-services", self.client.params().api_uri_full());
        if let Some(id) = service_id {
            url.push('/');
            url.push_str(id);
        }
        read_one(&self.client, &url, opts).await
    }
}

#[derive(Debug, Clone)]
pub struct EPortfolios {
    client: AlmaClient,
}

impl EPortfolios {
    /// Portfolios of a service, or one portfolio
    pub async fn get(
        &self,
        collection_id: &str,
        service_id: &str,
        portfolio_id: Option<&str>,
        opts: &ReadOptions,
    ) -> Result<Response> {
        let mut url = format!(
            "{}/{collection_id}/e-services/{service_id}/portfolios",
            self.client.params().api_uri_full()
        );
        if let Some(id) = portfolio_id {
            url.push('/');
            url.push_str(id);
        }
        read_one(&self.client, &url, opts).await
    }
}
