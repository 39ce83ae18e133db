//! Users API (`/almaws/v1/users`)

use super::{read_list, read_one, ListOptions, ReadOptions};
use crate::error::Result;
use crate::http::{AlmaClient, Response};
use crate::types::Params;

const API_URI: &str = "/almaws/v1/users";
const WEB_DOC: &str = "https://developers.exlibrisgroup.com/alma/apis/users";
const WADL_URL: &str =
    "https://developers.exlibrisgroup.com/resources/wadl/0aa8d36f-53d6-48ff-8996-485b90b103e4.wadl";

/// User records and the per-user loan, request, fee and deposit lists
#[derive(Debug, Clone)]
pub struct Users {
    client: AlmaClient,
    pub loans: Loans,
    pub requests: UserRequests,
    pub fees: Fees,
    pub deposits: Deposits,
}

impl Users {
    pub(crate) fn new(root: &AlmaClient) -> Self {
        let client = root.derive(root.params().for_api(API_URI, WEB_DOC, WADL_URL));
        Self {
            loans: Loans {
                client: client.clone(),
            },
            requests: UserRequests {
                client: client.clone(),
            },
            fees: Fees {
                client: client.clone(),
            },
            deposits: Deposits {
                client: client.clone(),
            },
            client,
        }
    }

    /// A single user, or the user list when `user_id` is `None`.
    ///
    /// Searchable fields include `primary_id`, `first_name`, `last_name`,
    /// `email`, `job_category`, `identifiers` and `ALL`.
    pub async fn get(&self, user_id: Option<&str>, opts: &ListOptions) -> Result<Response> {
        let base = self.client.params().api_uri_full();
        match user_id {
            Some(id) => read_one(&self.client, &format!("{base}/{id}"), &opts.read_options()).await,
            None => read_list(&self.client, base, Params::new(), opts, "user").await,
        }
    }
}

/// `/users/{user_id}/{collection}[/{item_id}]`
async fn user_collection(
    client: &AlmaClient,
    user_id: &str,
    collection: &str,
    item_id: Option<&str>,
    opts: &ListOptions,
    container_key: &str,
) -> Result<Response> {
    let url = format!("{}/{user_id}/{collection}", client.params().api_uri_full());
    match item_id {
        Some(id) => read_one(client, &format!("{url}/{id}"), &opts.read_options()).await,
        None => read_list(client, &url, Params::new(), opts, container_key).await,
    }
}

/// Loans of a user
#[derive(Debug, Clone)]
pub struct Loans {
    client: AlmaClient,
}

impl Loans {
    pub async fn get(&self, user_id: &str, loan_id: Option<&str>, opts: &ListOptions) -> Result<Response> {
        user_collection(&self.client, user_id, "loans", loan_id, opts, "item_loan").await
    }
}

/// Requests placed by a user
#[derive(Debug, Clone)]
pub struct UserRequests {
    client: AlmaClient,
}

impl UserRequests {
    pub async fn get(&self, user_id: &str, request_id: Option<&str>, opts: &ListOptions) -> Result<Response> {
        user_collection(&self.client, user_id, "requests", request_id, opts, "user_request").await
    }
}

/// Deposits of a user
#[derive(Debug, Clone)]
pub struct Deposits {
    client: AlmaClient,
}

impl Deposits {
    pub async fn get(&self, user_id: &str, deposit_id: Option<&str>, opts: &ListOptions) -> Result<Response> {
        user_collection(&self.client, user_id, "deposits", deposit_id, opts, "user_deposit").await
    }
}

/// Fines and fees of a user. Not paginated.
#[derive(Debug, Clone)]
pub struct Fees {
    client: AlmaClient,
}

impl Fees {
    pub async fn get(&self, user_id: &str, fee_id: Option<&str>, opts: &ReadOptions) -> Result<Response> {
        let mut url = format!("{}/{user_id}/fees", self.client.params().api_uri_full());
        if let Some(id) = fee_id {
            url.push('/');
            url.push_str(id);
        }
        read_one(&self.client, &url, opts).await
    }
}
