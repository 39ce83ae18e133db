//! Courses API (`/almaws/v1/courses`)

use super::{get_or_list, read_one, ListOptions, ReadOptions};
use crate::error::{Error, Result};
use crate::http::{AlmaClient, Response};
use crate::types::Params;

const API_URI: &str = "/almaws/v1/courses";
const WEB_DOC: &str = "https://developers.exlibrisgroup.com/alma/apis/courses";
const WADL_URL: &str =
    "https://developers.exlibrisgroup.com/resources/wadl/25ede018-da5d-4780-8fda-a8e5d103faba.wadl";

#[derive(Debug, Clone)]
pub struct Courses {
    client: AlmaClient,
    pub reading_lists: ReadingLists,
    pub citations: Citations,
    pub owners: Owners,
    pub tags: Tags,
}

impl Courses {
    pub(crate) fn new(root: &AlmaClient) -> Self {
        let client = root.derive(root.params().for_api(API_URI, WEB_DOC, WADL_URL));
        Self {
            reading_lists: ReadingLists {
                client: client.clone(),
            },
            citations: Citations {
                client: client.clone(),
            },
            owners: Owners {
                client: client.clone(),
            },
            tags: Tags {
                client: client.clone(),
            },
            client,
        }
    }

    /// A single course, or the course list.
    ///
    /// Searchable fields include `code`, `section`, `name`, `instructors`,
    /// `year` and `academic_department`.
    pub async fn get(&self, course_id: Option<&str>, opts: &ListOptions) -> Result<Response> {
        get_or_list(&self.client, course_id, Params::new(), opts, "course").await
    }
}

#[derive(Debug, Clone)]
pub struct ReadingLists {
    client: AlmaClient,
}

impl ReadingLists {
    /// Reading lists of a course, or one list in `brief` or `full` view
    pub async fn get(
        &self,
        course_id: &str,
        reading_list_id: Option<&str>,
        view: &str,
        opts: &ReadOptions,
    ) -> Result<Response> {
        let mut url = format!("{}/{course_id}/reading-lists", self.client.params().api_uri_full());
        let mut opts = opts.clone();
        if let Some(id) = reading_list_id {
            if view != "brief" && view != "full" {
                return Err(Error::arg("Valid view arguments are 'brief' or 'full'"));
            }
            url.push('/');
            url.push_str(id);
            opts = opts.param("view", view);
        }
        read_one(&self.client, &url, &opts).await
    }
}

/// `{course}/reading-lists/{list}` prefix shared by the reading-list children
fn reading_list_url(client: &AlmaClient, course_id: &str, reading_list_id: &str) -> String {
    format!(
        "{}/{course_id}/reading-lists/{reading_list_id}",
        client.params().api_uri_full()
    )
}

#[derive(Debug, Clone)]
pub struct Citations {
    client: AlmaClient,
}

impl Citations {
    /// Citations of a reading list, or one citation
    pub async fn get(
        &self,
        course_id: &str,
        reading_list_id: &str,
        citation_id: Option<&str>,
        opts: &ReadOptions,
    ) -> Result<Response> {
        let mut url = format!("{}/citations", reading_list_url(&self.client, course_id, reading_list_id));
        if let Some(id) = citation_id {
            url.push('/');
            url.push_str(id);
        }
        read_one(&self.client, &url, opts).await
    }
}

#[derive(Debug, Clone)]
pub struct Owners {
    client: AlmaClient,
}

impl Owners {
    /// Owners of a reading list, or one owner
    pub async fn get(
        &self,
        course_id: &str,
        reading_list_id: &str,
        owner_id: Option<&str>,
        opts: &ReadOptions,
    ) -> Result<Response> {
        let mut url = format!("{}/owners", reading_list_url(&self.client, course_id, reading_list_id));
        if let Some(id) = owner_id {
            url.push('/');
            url.push_str(id);
        }
        read_one(&self.client, &url, opts).await
    }
}

#[derive(Debug, Clone)]
pub struct Tags {
    client: AlmaClient,
}

impl Tags {
    /// Tags attached to one citation
    pub async fn get(
        &self,
        course_id: &str,
        reading_list_id: &str,
        citation_id: &str,
        opts: &ReadOptions,
    ) -> Result<Response> {
        let url = format!(
            "{}/citations/{citation_id}/tags",
            reading_list_url(&self.client, course_id, reading_list_id)
        );
        read_one(&self.client, &url, opts).await
    }
}
