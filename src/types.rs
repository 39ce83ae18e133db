//! Common types used throughout the Alma client

use std::collections::HashMap;

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Query-string parameters of a single request
pub type Params = HashMap<String, String>;

/// Build [`Params`] from key/value pairs
pub fn params<K, V, I>(pairs: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
