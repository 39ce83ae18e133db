//! Resumption-token pagination for analytics reports
//!
//! Reports don't page by offset. The first response carries `IsFinished`
//! and a `ResumptionToken`; while unfinished, the same URL is requested
//! again with only the token and API key, and the returned rows are
//! appended to the first report's rowset.

use super::types::PageSource;
use crate::config::ROWSET_NAMESPACE;
use crate::decode::XmlElement;
use crate::error::{Error, Result};
use crate::http::{RawResponse, Response};
use crate::types::{JsonObject, Params};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";
const SAW_SQL_NAMESPACE: &str = "urn:saw-sql";

/// Drives resumption-token pagination for one report URL
#[derive(Debug, Clone)]
pub struct ReportPaginator {
    url: String,
    api_key: String,
    rowset_ns: String,
}

impl ReportPaginator {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            rowset_ns: ROWSET_NAMESPACE.to_string(),
        }
    }

    /// Namespace URI that `rowset` and `Row` elements are bound to
    #[must_use]
    pub fn rowset_namespace(mut self, uri: impl Into<String>) -> Self {
        self.rowset_ns = uri.into();
        self
    }

    /// Fetch the remaining report chunks after `first`.
    ///
    /// Returns the first report with every row appended, or one raw
    /// response per request when `raw` is set.
    pub async fn read_all<S>(&self, source: &S, first: Response, raw: bool) -> Result<Response>
    where
        S: PageSource + ?Sized,
    {
        let (mut report, mut raw_pages) = match first {
            Response::Raw(response) => (XmlElement::parse(&response.body)?, vec![response]),
            Response::Xml(report) => (report, Vec::new()),
            other => return Ok(other),
        };

        if is_finished(&report) {
            return Ok(finish(report, raw_pages, raw));
        }
        let Some(token) = resumption_token(&report) else {
            warn!("Report is unfinished but carries no resumption token");
            return Ok(finish(report, raw_pages, raw));
        };

        let mut params = Params::new();
        params.insert("apikey".to_string(), self.api_key.clone());
        params.insert("token".to_string(), token);
        params.insert("format".to_string(), "xml".to_string());

        let mut chunks = 1;
        loop {
            let chunk = source.fetch_page(&self.url, &params, raw).await?;
            chunks += 1;

            let chunk = match chunk {
                Response::Raw(response) => {
                    let tree = XmlElement::parse(&response.body)?;
                    raw_pages.push(response);
                    tree
                }
                Response::Xml(tree) => tree,
                other => {
                    return Err(Error::extraction(
                        "rowset",
                        format!("expected an XML report chunk, got {other:?}"),
                    ))
                }
            };

            let appended = if raw {
                count_rows(&chunk, &self.rowset_ns)
            } else {
                append_rows(&mut report, &chunk, &self.rowset_ns)?
            };
            debug!("Report chunk {} carried {} rows", chunks, appended);

            if is_finished(&chunk) {
                break;
            }
            if appended == 0 {
                warn!("Unfinished report chunk carried no rows, stopping");
                break;
            }
        }

        Ok(finish(report, raw_pages, raw))
    }
}

fn finish(report: XmlElement, raw_pages: Vec<RawResponse>, raw: bool) -> Response {
    if raw {
        Response::RawPages(raw_pages)
    } else {
        Response::Xml(report)
    }
}

/// `QueryResult` is the first child of the report root
fn query_result(report: &XmlElement) -> Option<&XmlElement> {
    report.children.first()
}

fn is_finished(report: &XmlElement) -> bool {
    query_result(report)
        .and_then(|qr| qr.find_text(None, "IsFinished"))
        .map_or(true, |flag| flag.trim() != "false")
}

fn resumption_token(report: &XmlElement) -> Option<String> {
    query_result(report)
        .and_then(|qr| qr.find_text(None, "ResumptionToken"))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn count_rows(chunk: &XmlElement, rowset_ns: &str) -> usize {
    chunk
        .descendants()
        .into_iter()
        .filter(|e| e.name.matches(Some(rowset_ns), "Row"))
        .count()
}

fn append_rows(report: &mut XmlElement, chunk: &XmlElement, rowset_ns: &str) -> Result<usize> {
    let rows: Vec<XmlElement> = chunk
        .descendants()
        .into_iter()
        .filter(|e| e.name.matches(Some(rowset_ns), "Row"))
        .cloned()
        .collect();
    if rows.is_empty() {
        return Ok(0);
    }

    let rowset = report
        .find_descendant_mut(Some(rowset_ns), "rowset")
        .ok_or_else(|| Error::extraction("rowset", "first report chunk has no rowset"))?;
    let appended = rows.len();
    for row in rows {
        rowset.push_child(row);
    }
    Ok(appended)
}

/// Translate a report into plain records.
///
/// Keys come from the column definitions in the report schema: the
/// `columnHeading` attribute when present, else the column name,
/// lowercased with spaces replaced by underscores. Empty cells are `null`.
/// Rows are the `Row` elements bound to `rowset_ns`.
pub fn report_to_records(report: &XmlElement, rowset_ns: &str) -> Vec<JsonObject> {
    let headers: HashMap<&str, String> = report
        .descendants()
        .into_iter()
        .filter(|e| e.name.matches(Some(XSD_NAMESPACE), "element"))
        .filter_map(|column| {
            let name = column.attribute("name")?;
            let heading = column
                .attribute_ns(Some(SAW_SQL_NAMESPACE), "columnHeading")
                .unwrap_or(name);
            Some((name, heading.to_lowercase().replace(' ', "_")))
        })
        .collect();

    report
        .descendants()
        .into_iter()
        .filter(|e| e.name.matches(Some(rowset_ns), "Row"))
        .map(|row| {
            row.children
                .iter()
                .map(|cell| {
                    let key = headers
                        .get(cell.local_name())
                        .cloned()
                        .unwrap_or_else(|| cell.local_name().to_string());
                    let value = cell
                        .text()
                        .map_or(Value::Null, |t| Value::String(t.to_string()));
                    (key, value)
                })
                .collect()
        })
        .collect()
}
