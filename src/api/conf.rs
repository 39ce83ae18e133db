//! Configuration API (`/almaws/v1/conf`)
//!
//! Read-only institution setup: libraries and locations, code tables, jobs,
//! sets and the import/deposit profiles.

use super::{check_choice, get_or_list, read_list, read_one, ListOptions, ReadOptions};
use crate::error::Result;
use crate::http::{AlmaClient, Response};
use crate::types::Params;

const API_URI: &str = "/almaws/v1/conf";
const WEB_DOC: &str = "https://developers.exlibrisgroup.com/alma/apis/conf";
const WADL_URL: &str =
    "https://developers.exlibrisgroup.com/resources/wadl/37088dc9-c685-4641-bc7f-60b5ca7cabed.wadl";

/// Accepted set `set_type` filters
pub const SET_TYPES: [&str; 2] = ["ITEMIZED", "LOGICAL"];

#[derive(Debug, Clone)]
pub struct Conf {
    pub units: Units,
    pub general: General,
    pub jobs: Jobs,
    pub sets: Sets,
    pub deposit_profiles: DepositProfiles,
    pub import_profiles: ImportProfiles,
    pub reminders: Reminders,
}

impl Conf {
    pub(crate) fn new(root: &AlmaClient) -> Self {
        let params = root.params().for_api(API_URI, WEB_DOC, WADL_URL);
        Self {
            units: Units {
                client: root.derive(params.clone()),
            },
            general: General {
                client: root.derive(params.clone()),
            },
            jobs: Jobs {
                client: root.derive(params.nested("/jobs")),
            },
            sets: Sets {
                client: root.derive(params.nested("/sets")),
            },
            deposit_profiles: DepositProfiles {
                client: root.derive(params.nested("/deposit-profiles")),
            },
            import_profiles: ImportProfiles {
                client: root.derive(params.nested("/md-import-profiles")),
            },
            reminders: Reminders {
                client: root.derive(params.nested("/reminders")),
            },
        }
    }
}

/// Organization units: libraries, locations and departments
#[derive(Debug, Clone)]
pub struct Units {
    client: AlmaClient,
}

impl Units {
    /// All libraries, or one library by code
    pub async fn get_libraries(&self, library_id: Option<&str>, opts: &ReadOptions) -> Result<Response> {
        let mut url = format!("{}/libraries", self.client.params().api_uri_full());
        if let Some(id) = library_id {
            url.push('/');
            url.push_str(id);
        }
        read_one(&self.client, &url, opts).await
    }

    /// Locations of a library, or one location by code
    pub async fn get_locations(
        &self,
        library_id: &str,
        location_id: Option<&str>,
        opts: &ReadOptions,
    ) -> Result<Response> {
        let mut url = format!(
            "{}/libraries/{library_id}/locations",
            self.client.params().api_uri_full()
        );
        if let Some(id) = location_id {
            url.push('/');
            url.push_str(id);
        }
        read_one(&self.client, &url, opts).await
    }

    pub async fn get_departments(&self, opts: &ReadOptions) -> Result<Response> {
        let url = format!("{}/departments", self.client.params().api_uri_full());
        read_one(&self.client, &url, opts).await
    }
}

#[derive(Debug, Clone)]
pub struct General {
    client: AlmaClient,
}

impl General {
    /// General configuration of the institution
    pub async fn get(&self, opts: &ReadOptions) -> Result<Response> {
        let url = format!("{}/general", self.client.params().api_uri_full());
        read_one(&self.client, &url, opts).await
    }

    /// Opening hours of the institution, or of one library.
    ///
    /// The service answers for at most one month per request.
    pub async fn get_hours(&self, library_id: Option<&str>, opts: &ReadOptions) -> Result<Response> {
        let base = self.client.params().api_uri_full();
        let url = match library_id {
            Some(id) => format!("{base}/libraries/{id}/open-hours"),
            None => format!("{base}/open-hours"),
        };
        read_one(&self.client, &url, opts).await
    }

    /// Every row of a code table
    pub async fn get_code_table(&self, table_name: &str, opts: &ReadOptions) -> Result<Response> {
        let url = format!("{}/code-tables/{table_name}", self.client.params().api_uri_full());
        read_one(&self.client, &url, opts).await
    }
}

#[derive(Debug, Clone)]
pub struct Jobs {
    client: AlmaClient,
}

impl Jobs {
    /// A single job, or the list of jobs that can be submitted
    pub async fn get(&self, job_id: Option<&str>, opts: &ListOptions) -> Result<Response> {
        get_or_list(&self.client, job_id, Params::new(), opts, "job").await
    }

    /// Runs of a job, or one run
    pub async fn get_instances(
        &self,
        job_id: &str,
        instance_id: Option<&str>,
        opts: &ListOptions,
    ) -> Result<Response> {
        let base = format!("{}/{job_id}/instances", self.client.params().api_uri_full());
        match instance_id {
            Some(id) => read_one(&self.client, &format!("{base}/{id}"), &opts.read_options()).await,
            None => read_list(&self.client, &base, Params::new(), opts, "job_instance").await,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sets {
    client: AlmaClient,
}

impl Sets {
    /// A single set, or the set list.
    ///
    /// `content_type` takes values from the SetContentType code table.
    /// Brief search covers `name` and `created_by`.
    pub async fn get(
        &self,
        set_id: Option<&str>,
        content_type: Option<&str>,
        set_type: Option<&str>,
        opts: &ListOptions,
    ) -> Result<Response> {
        let mut extra = Params::new();
        if let Some(content_type) = content_type {
            extra.insert("content_type".to_string(), content_type.to_string());
        }
        if let Some(set_type) = set_type {
            check_choice("set_type", set_type, &SET_TYPES)?;
            extra.insert("set_type".to_string(), set_type.to_string());
        }
        get_or_list(&self.client, set_id, extra, opts, "set").await
    }

    pub async fn get_members(&self, set_id: &str, opts: &ListOptions) -> Result<Response> {
        let url = format!("{}/{set_id}/members", self.client.params().api_uri_full());
        read_list(&self.client, &url, Params::new(), opts, "member").await
    }
}

#[derive(Debug, Clone)]
pub struct DepositProfiles {
    client: AlmaClient,
}

impl DepositProfiles {
    pub async fn get(&self, profile_id: Option<&str>, opts: &ListOptions) -> Result<Response> {
        get_or_list(&self.client, profile_id, Params::new(), opts, "deposit_profile").await
    }
}

/// Metadata import profiles
#[derive(Debug, Clone)]
pub struct ImportProfiles {
    client: AlmaClient,
}

impl ImportProfiles {
    pub async fn get(&self, profile_id: Option<&str>, opts: &ListOptions) -> Result<Response> {
        get_or_list(&self.client, profile_id, Params::new(), opts, "import_profile").await
    }
}

#[derive(Debug, Clone)]
pub struct Reminders {
    client: AlmaClient,
}

impl Reminders {
    pub async fn get(&self, reminder_id: Option<&str>, opts: &ListOptions) -> Result<Response> {
        get_or_list(&self.client, reminder_id, Params::new(), opts, "reminder").await
    }
}
