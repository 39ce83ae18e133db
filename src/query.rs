//! Brief-search query formatting
//!
//! Alma list endpoints accept a `q` parameter of the form
//! `field~value AND field~value`. Only AND is supported; spaces inside a
//! value become underscores and the `~` delimiter is not escaped.

use crate::error::{Error, Result};
use serde_json::Value;

/// Format ordered field/value pairs as a brief-search query
pub fn format_query<I, K, V>(pairs: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    pairs
        .into_iter()
        .map(|(field, value)| format!("{}~{}", field.as_ref(), value.as_ref().replace(' ', "_")))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Format a JSON object as a brief-search query, in key order.
///
/// Anything other than an object is rejected. Scalar values are rendered
/// as text; nested arrays or objects are rejected.
pub fn format_query_value(query: &Value) -> Result<String> {
    let Value::Object(map) = query else {
        return Err(Error::arg("query must be a mapping of field to value"));
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (field, value) in map {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => {
                return Err(Error::arg(format!(
                    "query value for '{field}' must be a string or number"
                )))
            }
        };
        pairs.push((field.as_str(), text));
    }
    Ok(format_query(pairs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_query_pairs() {
        let q = format_query([("name", "AMAZON"), ("library", "MAIN LIB")]);
        assert_eq!(q, "name~AMAZON AND library~MAIN_LIB");
    }

    #[test]
    fn test_format_query_single_and_empty() {
        assert_eq!(format_query([("code", "ECN")]), "code~ECN");
        assert_eq!(format_query(Vec::<(String, String)>::new()), "");
    }

    #[test]
    fn test_format_query_value_keeps_order() {
        let q = format_query_value(&json!({"name": "AMAZON", "library": "MAIN LIB"})).unwrap();
        assert_eq!(q, "name~AMAZON AND library~MAIN_LIB");

        let q = format_query_value(&json!({"year": 2019, "last_name": "van der Berg"})).unwrap();
        assert_eq!(q, "year~2019 AND last_name~van_der_Berg");
    }

    #[test]
    fn test_format_query_value_rejects_non_mapping() {
        assert!(format_query_value(&json!("name~x")).unwrap_err().is_arg());
        assert!(format_query_value(&json!([["name", "x"]])).unwrap_err().is_arg());
        assert!(format_query_value(&json!({"name": ["x"]})).unwrap_err().is_arg());
    }
}
