//! Alma HTTP transport
//!
//! Issues exactly one request per call and returns a normalized response:
//! - `read` performs a GET, `create` a POST with a serialized body
//! - `raw` calls skip decoding and error inspection entirely
//! - 4xx/5xx responses become [`Error::Alma`]; nothing is retried here

use super::response::{normalize, RawResponse, Response};
use crate::config::{ConnectionParams, DataFormat};
use crate::decode::XmlElement;
use crate::error::{Error, Result};
use crate::types::Params;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Body of a POST request
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// Sent unchanged
    Text(String),
    /// Serialized as JSON
    Json(Value),
    /// Serialized as markup
    Xml(XmlElement),
}

impl From<String> for RequestBody {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for RequestBody {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Value> for RequestBody {
    fn from(v: Value) -> Self {
        Self::Json(v)
    }
}

impl From<XmlElement> for RequestBody {
    fn from(e: XmlElement) -> Self {
        Self::Xml(e)
    }
}

impl RequestBody {
    /// Encoding to send: explicit `format` parameter, then the body's own
    /// type, then the configured default
    pub fn encoding(&self, params: &Params, default: DataFormat) -> Result<DataFormat> {
        if let Some(format) = params.get("format") {
            return format.parse();
        }
        Ok(match self {
            Self::Json(_) => DataFormat::Json,
            Self::Xml(_) => DataFormat::Xml,
            Self::Text(_) => default,
        })
    }

    /// Serialize for the chosen encoding
    pub fn serialize(&self, encoding: DataFormat, object_type: &str) -> Result<String> {
        match (self, encoding) {
            (Self::Text(text), _) => Ok(text.clone()),
            (Self::Json(value), DataFormat::Json) if value.is_object() => {
                Ok(serde_json::to_string(value)?)
            }
            (Self::Json(_), DataFormat::Json) => Err(Error::arg(format!(
                "{object_type} must be a JSON object or a string when format is json"
            ))),
            (Self::Xml(tree), DataFormat::Xml) => tree.to_xml_string(),
            (Self::Json(_), DataFormat::Xml) => Err(Error::arg(format!(
                "{object_type} must be an XML element or a string when format is xml"
            ))),
            (Self::Xml(_), DataFormat::Json) => Err(Error::arg(format!(
                "{object_type} must be a JSON object or a string when format is json"
            ))),
        }
    }
}

/// Transport bound to one set of connection parameters
///
/// Cloning is cheap: the underlying connection pool is shared, the
/// parameters are copied.
#[derive(Debug, Clone)]
pub struct AlmaClient {
    http: Client,
    params: ConnectionParams,
}

impl AlmaClient {
    /// Create a client with the default timeout
    pub fn new(params: ConnectionParams) -> Result<Self> {
        Self::with_timeout(params, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom timeout
    pub fn with_timeout(params: ConnectionParams, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(format!("alma-client/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, params })
    }

    /// Same connection pool, different parameters
    #[must_use]
    pub fn derive(&self, params: ConnectionParams) -> Self {
        Self {
            http: self.http.clone(),
            params,
        }
    }

    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    /// Copy of `q_params` with the API key attached
    pub fn args(&self, q_params: &Params) -> Params {
        let mut args = q_params.clone();
        args.insert("apikey".to_string(), self.params.api_key().to_string());
        args
    }

    /// GET `url` and normalize the response
    pub async fn read(&self, url: &str, params: &Params, raw: bool) -> Result<Response> {
        let mut args = params.clone();
        let format = match args.get("format") {
            Some(format) => format.parse()?,
            None => {
                let format = self.params.format();
                args.insert("format".to_string(), format.as_str().to_string());
                format
            }
        };

        let request = self
            .http
            .request(Method::GET, Url::parse(url)?)
            .header(ACCEPT, format.media_type())
            .query(&args);

        let response = request.send().await?;
        self.finish(Method::GET, url, response, raw).await
    }

    /// POST `body` to `url` and normalize the response
    pub async fn create(
        &self,
        url: &str,
        body: impl Into<RequestBody>,
        params: &Params,
        object_type: &str,
        raw: bool,
    ) -> Result<Response> {
        let body = body.into();
        let encoding = body.encoding(params, self.params.format())?;
        let payload = body.serialize(encoding, object_type)?;

        let mut args = params.clone();
        args.entry("format".to_string())
            .or_insert_with(|| encoding.as_str().to_string());

        debug!("Creating {} ({})", object_type, encoding);
        let request = self
            .http
            .request(Method::POST, Url::parse(url)?)
            .header(CONTENT_TYPE, encoding.media_type())
            .header(ACCEPT, encoding.media_type())
            .query(&args)
            .body(payload);

        let response = request.send().await?;
        self.finish(Method::POST, url, response, raw).await
    }

    async fn finish(
        &self,
        method: Method,
        url: &str,
        response: reqwest::Response,
        raw: bool,
    ) -> Result<Response> {
        let raw_response = RawResponse::capture(response).await?;
        debug!("{} {} -> {}", method, url, raw_response.status);

        if raw {
            return Ok(Response::Raw(raw_response));
        }

        normalize(
            raw_response.status,
            raw_response.content_type(),
            &raw_response.body,
            url,
            self.params.xml_ns(),
        )
    }
}
