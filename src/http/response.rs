//! Response shapes and service-error classification
//!
//! Every call returns one [`Response`] variant, decided once from the
//! response's `Content-Type`. Error payloads are extracted with plain
//! `Option` chains and fall back to a generic message when absent.

use crate::config::XmlNamespaces;
use crate::decode::{decode_body, MediaKind, XmlElement};
use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use serde_json::Value;

const DOCS_SUFFIX: &str = ". See Alma documentation for more information.";

/// Field carrying the declared total of a list response
pub const TOTAL_RECORD_COUNT: &str = "total_record_count";

// ============================================================================
// RawResponse
// ============================================================================

/// Untouched transport response: status, headers, and body text
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub url: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    /// Capture a reqwest response, consuming its body
    pub async fn capture(response: reqwest::Response) -> Result<Self> {
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let headers = response.headers().clone();
        let body = response.text().await?;
        Ok(Self {
            status,
            url,
            headers,
            body,
        })
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Whether the status code's leading digit is 4 or 5
    pub fn is_error(&self) -> bool {
        is_error_status(self.status)
    }

    /// Parse the body as JSON regardless of content type
    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Decode the body by its content type, without inspecting the status
    pub fn decode(&self) -> Result<Response> {
        let kind = self
            .content_type()
            .and_then(MediaKind::from_content_type)
            .unwrap_or(MediaKind::Other);
        decode_body(kind, &self.body)
    }
}

// ============================================================================
// Response
// ============================================================================

/// A decoded (or deliberately undecoded) API response
#[derive(Debug, Clone)]
pub enum Response {
    /// Structured document decoded from JSON
    Json(Value),
    /// Hierarchical document decoded from XML
    Xml(XmlElement),
    /// Body of any other media type
    Text(String),
    /// Transport response returned as-is
    Raw(RawResponse),
    /// One raw transport response per page, in request order
    RawPages(Vec<RawResponse>),
}

impl Response {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_xml(&self) -> Option<&XmlElement> {
        match self {
            Self::Xml(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> Option<&RawResponse> {
        match self {
            Self::Raw(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_xml(self) -> Option<XmlElement> {
        match self {
            Self::Xml(e) => Some(e),
            _ => None,
        }
    }

    /// Raw pages of an exhaustive raw read; a single raw response is one page
    pub fn into_raw_pages(self) -> Option<Vec<RawResponse>> {
        match self {
            Self::RawPages(pages) => Some(pages),
            Self::Raw(raw) => Some(vec![raw]),
            _ => None,
        }
    }

    /// Declared total record count of a list response
    pub fn total_record_count(&self) -> Option<u64> {
        match self {
            Self::Json(v) => v.get(TOTAL_RECORD_COUNT).and_then(value_as_u64),
            Self::Xml(e) => e
                .attribute(TOTAL_RECORD_COUNT)
                .and_then(|s| s.trim().parse().ok()),
            _ => None,
        }
    }

    /// Number of records held under the container key
    pub fn record_count(&self, container_key: &str) -> usize {
        match self {
            Self::Json(v) => match v.get(container_key) {
                Some(Value::Array(records)) => records.len(),
                Some(Value::Null) | None => 0,
                Some(_) => 1,
            },
            Self::Xml(e) => e.children_named(None, container_key).count(),
            _ => 0,
        }
    }
}

// ============================================================================
// Classification
// ============================================================================

pub(crate) fn is_error_status(status: u16) -> bool {
    matches!(status / 100, 4 | 5)
}

/// Turn a completed HTTP exchange into a response or a service error
pub fn normalize(
    status: u16,
    content_type: Option<&str>,
    body: &str,
    url: &str,
    namespaces: &XmlNamespaces,
) -> Result<Response> {
    let Some(kind) = content_type.and_then(MediaKind::from_content_type) else {
        return Err(Error::unknown(status, url));
    };
    let is_error = is_error_status(status);

    match kind {
        MediaKind::Xml => match XmlElement::parse(body) {
            Ok(tree) if is_error => Err(service_error(
                xml_error_message(&tree, namespaces),
                status,
                url,
            )),
            Ok(tree) => Ok(Response::Xml(tree)),
            Err(_) if is_error => Err(Error::unknown(status, url)),
            Err(e) => Err(e),
        },
        MediaKind::Json => match serde_json::from_str::<Value>(body) {
            Ok(value) if is_error => Err(service_error(json_error_message(&value), status, url)),
            Ok(value) => Ok(Response::Json(value)),
            Err(_) if is_error => Err(Error::unknown(status, url)),
            Err(e) => Err(e.into()),
        },
        MediaKind::Other if is_error => Err(Error::alma(format!("{status} - {body}"), status, url)),
        MediaKind::Other => Ok(Response::Text(body.to_string())),
    }
}

fn service_error(message: Option<String>, status: u16, url: &str) -> Error {
    match message {
        Some(message) => Error::alma(message, status, url),
        None => Error::unknown(status, url),
    }
}

fn compose(code: &str, message: &str) -> String {
    format!("{code} - {message}{DOCS_SUFFIX}")
}

/// First error of a JSON error envelope.
///
/// Alma sends the list either at the top level or wrapped in
/// `web_service_result`, and `error` as either an array or a single object.
pub fn json_error_message(value: &Value) -> Option<String> {
    let list = value
        .get("errorList")
        .or_else(|| value.get("web_service_result")?.get("errorList"))?;
    let first = match list.get("error")? {
        Value::Array(errors) => errors.first()?,
        single @ Value::Object(_) => single,
        _ => return None,
    };
    let code = value_as_text(first.get("errorCode")?)?;
    let message = value_as_text(first.get("errorMessage")?)?;
    Some(compose(&code, &message))
}

/// First error of an XML error envelope in the `header` namespace
pub fn xml_error_message(root: &XmlElement, namespaces: &XmlNamespaces) -> Option<String> {
    let ns = namespaces.header();
    let list = if root.name.matches(ns, "errorList") {
        root
    } else {
        root.find(ns, "errorList")?
    };
    let first = list.children.first()?;
    let code = first.find_text(ns, "errorCode")?;
    let message = first.find_text(ns, "errorMessage")?;
    Some(compose(code, message))
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
