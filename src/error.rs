//! Error types for the Alma client
//!
//! All public APIs return `Result<T, Error>` where Error is defined here.
//! Two variants carry the library's own classification: [`Error::Alma`] for
//! failures reported by the remote service and [`Error::Arg`] for caller
//! arguments rejected before any request is sent.

use thiserror::Error;

/// The main error type for the Alma client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Service Errors
    // ============================================================================
    /// The service answered with a 4xx/5xx status or an unclassifiable response
    #[error("{message}")]
    Alma {
        message: String,
        status: u16,
        url: String,
    },

    // ============================================================================
    // Argument Errors
    // ============================================================================
    #[error("Invalid Argument: {message}")]
    Arg { message: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    /// Transport failure; the request URL is stripped since it carries the API key
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Decoding Errors
    // ============================================================================
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("XML parsing error: {message}")]
    XmlParse { message: String },

    #[error("Failed to extract records from '{path}': {message}")]
    RecordExtraction { path: String, message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a service error
    pub fn alma(message: impl Into<String>, status: u16, url: impl Into<String>) -> Self {
        Self::Alma {
            message: message.into(),
            status,
            url: url.into(),
        }
    }

    /// Create an argument error
    pub fn arg(message: impl Into<String>) -> Self {
        Self::Arg {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an XML parse error
    pub fn xml(message: impl Into<String>) -> Self {
        Self::XmlParse {
            message: message.into(),
        }
    }

    /// Create a record extraction error
    pub fn extraction(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RecordExtraction {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Generic fallback used when the service's error payload can't be read
    pub fn unknown(status: u16, url: impl Into<String>) -> Self {
        Self::alma(format!("{status} - Unknown Error"), status, url)
    }

    pub fn is_alma(&self) -> bool {
        matches!(self, Self::Alma { .. })
    }

    pub fn is_arg(&self) -> bool {
        matches!(self, Self::Arg { .. })
    }

    /// HTTP status reported by the service, if this is a service error
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Alma { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Request URL, if this is a service error
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Alma { url, .. } => Some(url),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.without_url())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Self {
        Self::xml(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Self::xml(e.to_string())
    }
}

/// Result type alias for the Alma client
pub type Result<T> = std::result::Result<T, Error>;
