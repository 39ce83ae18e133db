//! Task lists API (`/almaws/v1/task-lists`)

use super::{read_list, read_one, ListOptions, ReadOptions};
use crate::error::Result;
use crate::http::{AlmaClient, Response};
use crate::types::params;

const API_URI: &str = "/almaws/v1/task-lists";
const WEB_DOC: &str = "https://developers.exlibrisgroup.com/alma/apis/taskslists";
const WADL_URL: &str =
    "https://developers.exlibrisgroup.com/resources/wadl/d48a1a58-d90c-4eb2-b69f-c17f7a016fd3.wadl";

#[derive(Debug, Clone)]
pub struct TaskLists {
    pub resources: RequestedResources,
    pub lending: LendingTasks,
}

impl TaskLists {
    pub(crate) fn new(root: &AlmaClient) -> Self {
        let params = root.params().for_api(API_URI, WEB_DOC, WADL_URL);
        Self {
            resources: RequestedResources {
                client: root.derive(params.nested("/requested-resources")),
            },
            lending: LendingTasks {
                client: root.derive(params.nested("/rs/lending-requests")),
            },
        }
    }
}

/// Resources waiting to be picked from the shelf
#[derive(Debug, Clone)]
pub struct RequestedResources {
    client: AlmaClient,
}

impl RequestedResources {
    /// Requested resources for one library and circulation desk
    pub async fn get(&self, library_id: &str, circ_desk: &str, opts: &ListOptions) -> Result<Response> {
        let extra = params([("library", library_id), ("circ_desk", circ_desk)]);
        let url = self.client.params().api_uri_full();
        read_list(&self.client, url, extra, opts, "requested_resource").await
    }
}

/// Lending requests awaiting action in a library
#[derive(Debug, Clone)]
pub struct LendingTasks {
    client: AlmaClient,
}

impl LendingTasks {
    pub async fn get(&self, library_id: &str, opts: &ReadOptions) -> Result<Response> {
        let opts = opts.clone().param("library", library_id);
        read_one(&self.client, self.client.params().api_uri_full(), &opts).await
    }
}
