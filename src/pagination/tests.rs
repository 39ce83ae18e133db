//! Tests for pagination module

use super::*;
use crate::config::{ConnectionParams, DataFormat, Region, ROWSET_NAMESPACE};
use crate::decode::XmlElement;
use crate::error::{Error, Result};
use crate::http::{AlmaClient, RawResponse, Response};
use crate::types::{params, Params};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

/// Replays canned pages and records the parameters of every request
struct ScriptedSource {
    pages: Mutex<VecDeque<Result<Response>>>,
    requests: Mutex<Vec<Params>>,
}

impl ScriptedSource {
    fn new(pages: Vec<Result<Response>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<Params> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for ScriptedSource {
    async fn fetch_page(&self, _url: &str, params: &Params, _raw: bool) -> Result<Response> {
        self.requests.lock().unwrap().push(params.clone());
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .expect("no more scripted pages")
    }
}

fn users(total: u64, ids: std::ops::Range<u32>) -> Value {
    let records: Vec<Value> = ids.map(|i| json!({"primary_id": format!("u{i}")})).collect();
    json!({"total_record_count": total, "user": records})
}

fn raw_json(body: Value) -> RawResponse {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json;charset=UTF-8"));
    RawResponse {
        status: 200,
        url: "https://example.org/almaws/v1/users".to_string(),
        headers,
        body: body.to_string(),
    }
}

fn user_query(limit: u32) -> PagedQuery {
    PagedQuery::new(
        "https://example.org/almaws/v1/users",
        params([("apikey", "k"), ("limit", limit.to_string().as_str()), ("offset", "0")]),
        "user",
    )
}

// ============================================================================
// PagedQuery / PaginationState Tests
// ============================================================================

#[test]
fn test_paged_query_defaults() {
    let query = user_query(10);
    assert_eq!(query.max_page_size, MAX_PAGE_SIZE);
    assert!(!query.raw);
    assert_eq!(query.start_offset().unwrap(), 0);

    let query = query.raw(true).max_page_size(50);
    assert!(query.raw);
    assert_eq!(query.max_page_size, 50);
}

#[test]
fn test_paged_query_bad_offset() {
    let query = PagedQuery::new("https://x", params([("offset", "ten")]), "user");
    assert!(query.start_offset().unwrap_err().is_arg());
}

#[test]
fn test_pagination_state() {
    let mut state = PaginationState::new(10, 25);
    assert!(state.has_more());
    state.advance(15);
    assert_eq!(state.offset, 25);
    assert_eq!(state.pages, 2);
    assert!(!state.has_more());
}

// ============================================================================
// Accumulator Tests
// ============================================================================

#[test]
fn test_merge_json_pages() {
    let mut acc = Accumulator::Merged(Response::Json(json!({"total_record_count": 2, "user": ["A"]})));
    let received = acc.merge(Response::Json(json!({"user": ["B"]})), "user").unwrap();

    assert_eq!(received, 1);
    assert_eq!(
        acc.into_response().into_json().unwrap(),
        json!({"total_record_count": 2, "user": ["A", "B"]})
    );
}

#[test]
fn test_merge_json_single_object_page() {
    let mut acc = Accumulator::Merged(Response::Json(json!({"total_record_count": 2, "fund": {"code": "A"}})));
    acc.merge(Response::Json(json!({"fund": {"code": "B"}})), "fund").unwrap();

    assert_eq!(
        acc.into_response().into_json().unwrap()["fund"],
        json!([{"code": "A"}, {"code": "B"}])
    );
}

#[test]
fn test_merge_xml_pages() {
    let first = XmlElement::parse(r#"<users total_record_count="2"><user>A</user></users>"#).unwrap();
    let page = XmlElement::parse(r#"<users total_record_count="2"><user>B</user></users>"#).unwrap();

    let mut acc = Accumulator::Merged(Response::Xml(first));
    assert_eq!(acc.merge(Response::Xml(page), "user").unwrap(), 1);

    let tree = acc.into_response().into_xml().unwrap();
    let texts: Vec<_> = tree.children_named(None, "user").map(|u| u.text().unwrap()).collect();
    assert_eq!(texts, vec!["A", "B"]);
    assert_eq!(tree.attribute("total_record_count"), Some("2"));
}

#[test]
fn test_merge_shape_mismatch() {
    let mut acc = Accumulator::Merged(Response::Json(json!({"user": []})));
    let err = acc
        .merge(Response::Xml(XmlElement::parse("<users/>").unwrap()), "user")
        .unwrap_err();
    assert!(matches!(err, Error::RecordExtraction { .. }));
}

// ============================================================================
// OffsetPaginator Tests
// ============================================================================

#[tokio::test]
async fn test_read_all_json_advances_offset() {
    let source = ScriptedSource::new(vec![
        Ok(Response::Json(users(250, 50..150))),
        Ok(Response::Json(users(250, 150..250))),
    ]);
    let first = Response::Json(users(250, 0..50));

    let result = OffsetPaginator::new(user_query(50))
        .read_all(&source, first)
        .await
        .unwrap();

    let value = result.into_json().unwrap();
    let records = value["user"].as_array().unwrap();
    assert_eq!(records.len(), 250);
    assert_eq!(records[249]["primary_id"], "u249");

    let requests = source.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0]["offset"], "50");
    assert_eq!(requests[0]["limit"], "100");
    assert_eq!(requests[1]["offset"], "150");
    assert_eq!(requests[0]["apikey"], "k");
}

#[tokio::test]
async fn test_read_all_counts_short_pages() {
    let source = ScriptedSource::new(vec![
        Ok(Response::Json(users(25, 10..15))),
        Ok(Response::Json(users(25, 15..25))),
    ]);
    let first = Response::Json(users(25, 0..10));

    let result = OffsetPaginator::new(user_query(10))
        .read_all(&source, first)
        .await
        .unwrap();

    assert_eq!(result.record_count("user"), 25);
    let offsets: Vec<_> = source.requests().iter().map(|p| p["offset"].clone()).collect();
    assert_eq!(offsets, vec!["10", "15"]);
}

#[tokio::test]
async fn test_read_all_single_page_makes_no_requests() {
    let source = ScriptedSource::new(vec![]);
    let first = Response::Json(users(3, 0..3));

    let result = OffsetPaginator::new(user_query(10))
        .read_all(&source, first)
        .await
        .unwrap();

    assert_eq!(result.record_count("user"), 3);
    assert!(source.requests().is_empty());
}

#[tokio::test]
async fn test_read_all_without_total_assumes_one_page() {
    let source = ScriptedSource::new(vec![]);
    let result = OffsetPaginator::new(user_query(10))
        .read_all(&source, Response::Text("not a list".into()))
        .await
        .unwrap();

    assert_eq!(result.as_text(), Some("not a list"));
    assert!(source.requests().is_empty());
}

#[tokio::test]
async fn test_read_all_stops_on_empty_page() {
    let source = ScriptedSource::new(vec![Ok(Response::Json(json!({"total_record_count": 40})))]);
    let first = Response::Json(users(40, 0..10));

    let result = OffsetPaginator::new(user_query(10))
        .read_all(&source, first)
        .await
        .unwrap();

    assert_eq!(result.record_count("user"), 10);
    assert_eq!(source.requests().len(), 1);
}

#[tokio::test]
async fn test_read_all_honors_start_offset() {
    let source = ScriptedSource::new(vec![Ok(Response::Json(users(30, 20..30)))]);
    let query = PagedQuery::new(
        "https://example.org/almaws/v1/users",
        params([("limit", "10"), ("offset", "10")]),
        "user",
    );

    let result = OffsetPaginator::new(query)
        .read_all(&source, Response::Json(users(30, 10..20)))
        .await
        .unwrap();

    assert_eq!(result.record_count("user"), 20);
    assert_eq!(source.requests()[0]["offset"], "20");
}

#[tokio::test]
async fn test_read_all_error_discards_pages() {
    let source = ScriptedSource::new(vec![
        Ok(Response::Json(users(300, 100..200))),
        Err(Error::alma("500 - Unknown Error", 500, "https://example.org")),
    ]);

    let err = OffsetPaginator::new(user_query(100))
        .read_all(&source, Response::Json(users(300, 0..100)))
        .await
        .unwrap_err();

    assert!(err.is_alma());
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_read_all_xml() {
    let first = XmlElement::parse(r#"<users total_record_count="3"><user>A</user></users>"#).unwrap();
    let second = XmlElement::parse(r#"<users total_record_count="3"><user>B</user><user>C</user></users>"#).unwrap();
    let source = ScriptedSource::new(vec![Ok(Response::Xml(second))]);

    let result = OffsetPaginator::new(user_query(1))
        .read_all(&source, Response::Xml(first))
        .await
        .unwrap();

    let tree = result.into_xml().unwrap();
    let texts: Vec<_> = tree.children_named(None, "user").map(|u| u.text().unwrap()).collect();
    assert_eq!(texts, vec!["A", "B", "C"]);
}

#[tokio::test]
async fn test_read_all_raw_collects_pages() {
    let source = ScriptedSource::new(vec![
        Ok(Response::Raw(raw_json(users(30, 10..20)))),
        Ok(Response::Raw(raw_json(users(30, 20..30)))),
    ]);

    let result = OffsetPaginator::new(user_query(10).raw(true))
        .read_all(&source, Response::Raw(raw_json(users(30, 0..10))))
        .await
        .unwrap();

    let pages = result.into_raw_pages().unwrap();
    assert_eq!(pages.len(), 3);
    let first_ids: Vec<_> = pages
        .iter()
        .map(|p| p.json().unwrap()["user"][0]["primary_id"].clone())
        .collect();
    assert_eq!(first_ids, vec![json!("u0"), json!("u10"), json!("u20")]);
}

#[tokio::test]
async fn test_read_all_against_server() {
    let server = MockServer::start().await;
    let url = format!("{}/almaws/v1/users", server.uri());

    for (offset, limit, range) in [("0", "50", 0..50), ("50", "100", 50..150), ("150", "100", 150..250)] {
        Mock::given(method("GET"))
            .and(path("/almaws/v1/users"))
            .and(query_param("offset", offset))
            .and(query_param("limit", limit))
            .respond_with(ResponseTemplate::new(200).set_body_json(users(250, range)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let conn = ConnectionParams::new("key", Region::America, DataFormat::Json).with_base_uri(server.uri());
    let client = AlmaClient::new(conn).unwrap();
    let args = client.args(&params([("limit", "50"), ("offset", "0")]));

    let first = client.read(&url, &args, false).await.unwrap();
    let result = OffsetPaginator::new(PagedQuery::new(&url, args, "user"))
        .read_all(&client, first)
        .await
        .unwrap();

    assert_eq!(result.record_count("user"), 250);
    server.verify().await;
}

// ============================================================================
// ReportPaginator Tests
// ============================================================================

fn report_chunk(finished: bool, token: Option<&str>, rows: &[(&str, &str)], with_schema: bool) -> String {
    let token = token
        .map(|t| format!("<ResumptionToken>{t}</ResumptionToken>"))
        .unwrap_or_default();
    let schema = if with_schema {
        r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:saw-sql="urn:saw-sql">
            <xsd:complexType name="Row"><xsd:sequence>
                <xsd:element name="Column0" type="xsd:int"/>
                <xsd:element name="Column1" type="xsd:string" saw-sql:columnHeading="Title Name"/>
            </xsd:sequence></xsd:complexType>
        </xsd:schema>"#
    } else {
        ""
    };
    let rows: String = rows
        .iter()
        .map(|(id, title)| format!("<Row><Column0>{id}</Column0><Column1>{title}</Column1></Row>"))
        .collect();
    format!(
        r#"<report><QueryResult>{token}<IsFinished>{finished}</IsFinished><ResultXml>
            <rowset xmlns="{ROWSET_NAMESPACE}">{schema}{rows}</rowset>
        </ResultXml></QueryResult></report>"#
    )
}

#[tokio::test]
async fn test_report_follows_resumption_token() {
    let first = XmlElement::parse(&report_chunk(false, Some("TOK"), &[("1", "Dune")], true)).unwrap();
    let source = ScriptedSource::new(vec![
        Ok(Response::Xml(
            XmlElement::parse(&report_chunk(false, None, &[("2", "Emma")], false)).unwrap(),
        )),
        Ok(Response::Xml(
            XmlElement::parse(&report_chunk(true, None, &[("3", "Ulysses")], false)).unwrap(),
        )),
    ]);

    let result = ReportPaginator::new("https://example.org/almaws/v1/analytics/reports", "k")
        .read_all(&source, Response::Xml(first), false)
        .await
        .unwrap();

    let records = report_to_records(result.as_xml().unwrap(), ROWSET_NAMESPACE);
    assert_eq!(records.len(), 3);
    assert_eq!(records[2]["title_name"], "Ulysses");
    assert_eq!(records[0]["column0"], "1");

    let requests = source.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0], params([("apikey", "k"), ("token", "TOK"), ("format", "xml")]));
}

#[tokio::test]
async fn test_report_finished_first_chunk() {
    let first = XmlElement::parse(&report_chunk(true, None, &[("1", "Dune")], true)).unwrap();
    let source = ScriptedSource::new(vec![]);

    let result = ReportPaginator::new("https://example.org/r", "k")
        .read_all(&source, Response::Xml(first), false)
        .await
        .unwrap();

    assert_eq!(report_to_records(result.as_xml().unwrap(), ROWSET_NAMESPACE).len(), 1);
    assert!(source.requests().is_empty());
}

#[test]
fn test_report_to_records_empty_cell() {
    let xml = format!(
        r#"<report><QueryResult><IsFinished>true</IsFinished><ResultXml>
            <rowset xmlns="{ROWSET_NAMESPACE}"><Row><Column0>1</Column0><Column1/></Row></rowset>
        </ResultXml></QueryResult></report>"#
    );
    let records = report_to_records(&XmlElement::parse(&xml).unwrap(), ROWSET_NAMESPACE);
    assert_eq!(records[0]["Column0"], "1");
    assert_eq!(records[0]["Column1"], Value::Null);
}

#[tokio::test]
async fn test_report_rows_follow_configured_namespace() {
    let custom = "urn:example:rowset";
    let chunk = |finished, token, id: &str| {
        report_chunk(finished, token, &[(id, "Dune")], false).replace(ROWSET_NAMESPACE, custom)
    };
    let first = XmlElement::parse(&chunk(false, Some("TOK"), "1")).unwrap();
    let source = ScriptedSource::new(vec![Ok(Response::Xml(
        XmlElement::parse(&chunk(true, None, "2")).unwrap(),
    ))]);

    let result = ReportPaginator::new("https://example.org/r", "k")
        .rowset_namespace(custom)
        .read_all(&source, Response::Xml(first), false)
        .await
        .unwrap();
    let tree = result.as_xml().unwrap();

    assert_eq!(report_to_records(tree, custom).len(), 2);
    assert!(report_to_records(tree, ROWSET_NAMESPACE).is_empty());
}
