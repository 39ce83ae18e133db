//! Connection configuration
//!
//! [`ConnectionParams`] is the immutable record every sub-client carries.
//! Each level of the API tree derives its own copy with an amended path, so
//! a child never observes changes made to its parent and vice versa.
//!
//! [`Settings`] is the file/environment form used by the CLI.

use crate::api::AlmaCnxn;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Namespace of the Alma general web-service envelope (errors, totals)
pub const HEADER_NAMESPACE: &str = "http://com/exlibris/urm/general/xmlbeans";

/// Namespace of analytics report rowsets
pub const ROWSET_NAMESPACE: &str = "urn:schemas-microsoft-com:xml-analysis:rowset";

// ============================================================================
// Region
// ============================================================================

/// Geographic routing host for the Alma API
///
/// Settings files accept the same spellings as [`FromStr`](std::str::FromStr).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Region {
    #[default]
    America,
    Europe,
    #[serde(rename = "Asia Pacific")]
    AsiaPacific,
    Canada,
    China,
}

impl Region {
    /// All regions, in documentation order
    pub const ALL: [Region; 5] = [
        Region::America,
        Region::Europe,
        Region::AsiaPacific,
        Region::Canada,
        Region::China,
    ];

    /// Display name as used in the Alma documentation
    pub fn name(self) -> &'static str {
        match self {
            Region::America => "America",
            Region::Europe => "Europe",
            Region::AsiaPacific => "Asia Pacific",
            Region::Canada => "Canada",
            Region::China => "China",
        }
    }

    /// Origin of the regional API gateway
    pub fn base_uri(self) -> &'static str {
        match self {
            Region::America => "https://api-na.hosted.exlibrisgroup.com",
            Region::Europe => "https://api-eu.hosted.exlibrisgroup.com",
            Region::AsiaPacific => "https://api-ap.hosted.exlibrisgroup.com",
            Region::Canada => "https://api-ca.hosted.exlibrisgroup.com",
            Region::China => "https://api-cn.hosted.exlibrisgroup.com",
        }
    }
}

impl std::str::FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "america" | "na" => Ok(Region::America),
            "europe" | "eu" => Ok(Region::Europe),
            "asia pacific" | "asia-pacific" | "ap" => Ok(Region::AsiaPacific),
            "canada" | "ca" => Ok(Region::Canada),
            "china" | "cn" => Ok(Region::China),
            _ => {
                let names: Vec<&str> = Region::ALL.iter().map(|r| r.name()).collect();
                Err(Error::arg(format!(
                    "Valid location arguments are {}",
                    names.join(", ")
                )))
            }
        }
    }
}

impl TryFrom<String> for Region {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// DataFormat
// ============================================================================

/// Preferred response encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum DataFormat {
    #[default]
    Json,
    Xml,
}

impl DataFormat {
    /// Value of the `format` query parameter
    pub fn as_str(self) -> &'static str {
        match self {
            DataFormat::Json => "json",
            DataFormat::Xml => "xml",
        }
    }

    /// Media type sent in `Content-Type`/`Accept`
    pub fn media_type(self) -> &'static str {
        match self {
            DataFormat::Json => "application/json",
            DataFormat::Xml => "application/xml",
        }
    }
}

impl std::str::FromStr for DataFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(DataFormat::Json),
            "xml" => Ok(DataFormat::Xml),
            _ => Err(Error::arg("Format argument must be either 'json' or 'xml'")),
        }
    }
}

impl TryFrom<String> for DataFormat {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl std::fmt::Display for DataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// XmlNamespaces
// ============================================================================

/// Prefix → namespace URI map used when reading hierarchical responses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNamespaces(BTreeMap<String, String>);

impl Default for XmlNamespaces {
    fn default() -> Self {
        let mut map = BTreeMap::new();
        map.insert("header".to_string(), HEADER_NAMESPACE.to_string());
        Self(map)
    }
}

impl XmlNamespaces {
    /// Look up the URI bound to a prefix
    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.0.get(prefix).map(String::as_str)
    }

    /// Copy with an additional binding
    #[must_use]
    pub fn with(&self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        let mut map = self.0.clone();
        map.insert(prefix.into(), uri.into());
        Self(map)
    }

    /// Namespace of the error envelope
    pub fn header(&self) -> Option<&str> {
        self.get("header")
    }
}

// ============================================================================
// ConnectionParams
// ============================================================================

/// Immutable connection configuration shared by value across sub-clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    region: Region,
    base_uri: String,
    api_key: String,
    format: DataFormat,
    xml_ns: XmlNamespaces,
    api_uri: String,
    api_uri_full: String,
    web_doc: Option<String>,
    wadl_url: Option<String>,
}

impl ConnectionParams {
    /// Root configuration for a region
    pub fn new(api_key: impl Into<String>, region: Region, format: DataFormat) -> Self {
        let base_uri = region.base_uri().to_string();
        Self {
            region,
            api_uri_full: base_uri.clone(),
            base_uri,
            api_key: api_key.into(),
            format,
            xml_ns: XmlNamespaces::default(),
            api_uri: String::new(),
            web_doc: None,
            wadl_url: None,
        }
    }

    /// Copy pointing at a different origin (proxies, test servers)
    #[must_use]
    pub fn with_base_uri(&self, base_uri: impl Into<String>) -> Self {
        let base_uri = base_uri.into().trim_end_matches('/').to_string();
        Self {
            api_uri_full: format!("{base_uri}{}", self.api_uri),
            base_uri,
            ..self.clone()
        }
    }

    /// Copy rooted at an API family, e.g. `/almaws/v1/users`
    #[must_use]
    pub fn for_api(
        &self,
        api_uri: impl Into<String>,
        web_doc: impl Into<String>,
        wadl_url: impl Into<String>,
    ) -> Self {
        let api_uri = api_uri.into();
        Self {
            api_uri_full: format!("{}{api_uri}", self.base_uri),
            api_uri,
            web_doc: Some(web_doc.into()),
            wadl_url: Some(wadl_url.into()),
            ..self.clone()
        }
    }

    /// Copy with a path segment appended to the API path
    #[must_use]
    pub fn nested(&self, segment: &str) -> Self {
        Self {
            api_uri: format!("{}{segment}", self.api_uri),
            api_uri_full: format!("{}{segment}", self.api_uri_full),
            ..self.clone()
        }
    }

    /// Copy with an additional XML namespace binding
    #[must_use]
    pub fn with_namespace(&self, prefix: &str, uri: &str) -> Self {
        Self {
            xml_ns: self.xml_ns.with(prefix, uri),
            ..self.clone()
        }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn format(&self) -> DataFormat {
        self.format
    }

    pub fn xml_ns(&self) -> &XmlNamespaces {
        &self.xml_ns
    }

    /// API path relative to the origin
    pub fn api_uri(&self) -> &str {
        &self.api_uri
    }

    /// Absolute URL of this sub-client's endpoint family
    pub fn api_uri_full(&self) -> &str {
        &self.api_uri_full
    }

    /// Developer documentation page
    pub fn web_doc(&self) -> Option<&str> {
        self.web_doc.as_deref()
    }

    /// WADL descriptor URL
    pub fn wadl_url(&self) -> Option<&str> {
        self.wadl_url.as_deref()
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Client settings loaded from YAML and/or the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub region: Region,

    #[serde(default)]
    pub format: DataFormat,

    /// Overrides the regional origin
    #[serde(default)]
    pub base_uri: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            region: Region::default(),
            format: DataFormat::default(),
            base_uri: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Settings {
    /// Parse settings from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load settings from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Apply `ALMA_API_KEY`, `ALMA_REGION`, `ALMA_FORMAT` and `ALMA_BASE_URI`
    pub fn apply_env(self) -> Result<Self> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    fn apply_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(key) = lookup("ALMA_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(region) = lookup("ALMA_REGION") {
            self.region = region.parse()?;
        }
        if let Some(format) = lookup("ALMA_FORMAT") {
            self.format = format.parse()?;
        }
        if let Some(base_uri) = lookup("ALMA_BASE_URI") {
            self.base_uri = Some(base_uri);
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build root connection parameters
    pub fn connection_params(&self) -> Result<ConnectionParams> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::config("an API key is required (ALMA_API_KEY or api_key)"))?;

        let params = ConnectionParams::new(api_key, self.region, self.format);
        Ok(match &self.base_uri {
            Some(base_uri) => params.with_base_uri(base_uri),
            None => params,
        })
    }

    /// Build a connected API root
    pub fn connect(&self) -> Result<AlmaCnxn> {
        AlmaCnxn::with_timeout(self.connection_params()?, self.timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use test_case::test_case;

    #[test_case("America", Region::America ; "america")]
    #[test_case("europe", Region::Europe ; "europe lowercase")]
    #[test_case("Asia Pacific", Region::AsiaPacific ; "asia pacific")]
    #[test_case("ca", Region::Canada ; "canada short")]
    #[test_case("CN", Region::China ; "china short")]
    fn test_region_parse(input: &str, expected: Region) {
        assert_eq!(input.parse::<Region>().unwrap(), expected);
    }

    #[test]
    fn test_region_parse_invalid() {
        let err = "Mars".parse::<Region>().unwrap_err();
        assert!(err.is_arg());
        assert!(err.to_string().contains("America, Europe, Asia Pacific, Canada, China"));
    }

    #[test]
    fn test_region_hosts() {
        assert_eq!(
            Region::default().base_uri(),
            "https://api-na.hosted.exlibrisgroup.com"
        );
        assert_eq!(
            Region::AsiaPacific.base_uri(),
            "https://api-ap.hosted.exlibrisgroup.com"
        );
    }

    #[test]
    fn test_data_format_parse() {
        assert_eq!("XML".parse::<DataFormat>().unwrap(), DataFormat::Xml);
        assert_eq!("json".parse::<DataFormat>().unwrap(), DataFormat::Json);
        assert!("csv".parse::<DataFormat>().unwrap_err().is_arg());
    }

    #[test]
    fn test_for_api_and_nested() {
        let root = ConnectionParams::new("key", Region::Europe, DataFormat::Json);
        let users = root.for_api("/almaws/v1/users", "doc", "wadl");
        let loans = users.nested("/");

        assert_eq!(users.api_uri(), "/almaws/v1/users");
        assert_eq!(
            users.api_uri_full(),
            "https://api-eu.hosted.exlibrisgroup.com/almaws/v1/users"
        );
        assert_eq!(loans.api_uri(), "/almaws/v1/users/");
        assert_eq!(users.web_doc(), Some("doc"));
        assert_eq!(loans.wadl_url(), Some("wadl"));
    }

    #[test]
    fn test_clones_are_isolated() {
        let parent = ConnectionParams::new("key", Region::America, DataFormat::Json)
            .for_api("/almaws/v1/acq", "doc", "wadl");
        let funds = parent.nested("/funds");
        let vendors = parent.nested("/vendors");

        assert_eq!(parent.api_uri(), "/almaws/v1/acq");
        assert_eq!(funds.api_uri(), "/almaws/v1/acq/funds");
        assert_eq!(vendors.api_uri(), "/almaws/v1/acq/vendors");

        let rebased = funds.with_base_uri("http://localhost:9999/");
        assert_eq!(
            rebased.api_uri_full(),
            "http://localhost:9999/almaws/v1/acq/funds"
        );
        assert_eq!(
            funds.api_uri_full(),
            "https://api-na.hosted.exlibrisgroup.com/almaws/v1/acq/funds"
        );
    }

    #[test]
    fn test_namespaces_copy_on_compose() {
        let parent = ConnectionParams::new("key", Region::America, DataFormat::Xml);
        let analytics = parent.with_namespace("report", ROWSET_NAMESPACE);

        assert_eq!(analytics.xml_ns().get("report"), Some(ROWSET_NAMESPACE));
        assert_eq!(parent.xml_ns().get("report"), None);
        assert_eq!(parent.xml_ns().header(), Some(HEADER_NAMESPACE));
    }

    #[test]
    fn test_settings_from_yaml() {
        let settings = Settings::from_yaml(
            "api_key: l7xx-test\nregion: Asia Pacific\nformat: xml\ntimeout_secs: 5\n",
        )
        .unwrap();

        assert_eq!(settings.api_key.as_deref(), Some("l7xx-test"));
        assert_eq!(settings.region, Region::AsiaPacific);
        assert_eq!(settings.format, DataFormat::Xml);
        assert_eq!(settings.timeout(), Duration::from_secs(5));
    }

    #[test_case("region: EU\n", Region::Europe, DataFormat::Json ; "region short uppercase")]
    #[test_case("region: asia-pacific\n", Region::AsiaPacific, DataFormat::Json ; "region hyphenated")]
    #[test_case("region: cn\nformat: XML\n", Region::China, DataFormat::Xml ; "format uppercase")]
    fn test_settings_yaml_matches_env_spelling(yaml: &str, region: Region, format: DataFormat) {
        let settings = Settings::from_yaml(&format!("api_key: k\n{yaml}")).unwrap();
        assert_eq!(settings.region, region);
        assert_eq!(settings.format, format);
    }

    #[test]
    fn test_settings_yaml_bad_region() {
        let err = Settings::from_yaml("api_key: k\nregion: Mars\n").unwrap_err();
        assert!(matches!(err, Error::YamlParse(_)));
        assert!(err.to_string().contains("Valid location arguments"));
    }

    #[test]
    fn test_region_serializes_display_name() {
        let yaml = serde_yaml::to_string(&Region::AsiaPacific).unwrap();
        assert_eq!(yaml.trim(), "Asia Pacific");
        assert_eq!(serde_yaml::to_string(&DataFormat::Xml).unwrap().trim(), "xml");
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::from_yaml("api_key: k\n").unwrap();
        assert_eq!(settings.region, Region::America);
        assert_eq!(settings.format, DataFormat::Json);
        assert_eq!(settings.timeout_secs, 30);
        assert_eq!(Settings::default().timeout(), settings.timeout());
    }

    #[test]
    fn test_settings_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alma.yaml");
        std::fs::write(&path, "api_key: from-file\nregion: eu\n").unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.api_key.as_deref(), Some("from-file"));
        assert_eq!(settings.region, Region::Europe);
    }

    #[test]
    fn test_settings_env_overrides() {
        let vars: HashMap<&str, &str> = [("ALMA_API_KEY", "env-key"), ("ALMA_FORMAT", "xml")]
            .into_iter()
            .collect();
        let settings = Settings::from_yaml("api_key: file-key\n")
            .unwrap()
            .apply_vars(|name| vars.get(name).map(|v| (*v).to_string()))
            .unwrap();

        assert_eq!(settings.api_key.as_deref(), Some("env-key"));
        assert_eq!(settings.format, DataFormat::Xml);
    }

    #[test]
    fn test_settings_require_api_key() {
        let err = Settings::default().connection_params().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_settings_base_uri_override() {
        let settings = Settings::from_yaml("api_key: k\nbase_uri: http://127.0.0.1:8080\n").unwrap();
        let params = settings.connection_params().unwrap();
        assert_eq!(params.base_uri(), "http://127.0.0.1:8080");
    }
}
