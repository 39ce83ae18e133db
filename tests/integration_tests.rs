//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: settings → sub-client → HTTP requests →
//! normalized and paginated results

use alma_client::{
    AlmaCnxn, ConnectionParams, DataFormat, Error, ListOptions, ReadOptions, Region, ReportOptions,
    Response, Settings, XmlElement,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::io::Write;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ROWSET: &str = "urn:schemas-microsoft-com:xml-analysis:rowset";

fn connect(server: &MockServer, format: DataFormat) -> AlmaCnxn {
    let params = ConnectionParams::new("test-key", Region::America, format).with_base_uri(server.uri());
    AlmaCnxn::from_params(params).unwrap()
}

fn json_page(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "application/json;charset=UTF-8")
}

fn xml_page(status: u16, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_raw(body.to_string(), "application/xml;charset=UTF-8")
}

fn users(total: u64, ids: std::ops::Range<u32>) -> Value {
    let records: Vec<Value> = ids.map(|i| json!({"primary_id": format!("u{i}")})).collect();
    json!({"total_record_count": total, "user": records})
}

fn report_chunk(finished: bool, token: Option<&str>, rows: &[&str], schema: bool) -> String {
    let token = token
        .map(|t| format!("<ResumptionToken>{t}</ResumptionToken>"))
        .unwrap_or_default();
    let schema = if schema {
        r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:saw-sql="urn:saw-sql">
             <xsd:complexType name="Row"><xsd:sequence>
               <xsd:element name="Column0" saw-sql:columnHeading="Loan Date"/>
             </xsd:sequence></xsd:complexType>
           </xsd:schema>"#
    } else {
        ""
    };
    let rows: String = rows
        .iter()
        .map(|value| format!("<Row><Column0>{value}</Column0></Row>"))
        .collect();
    format!(
        r#"<report><QueryResult>{token}<IsFinished>{finished}</IsFinished>
             <ResultXml><rowset xmlns="{ROWSET}">{schema}{rows}</rowset></ResultXml>
           </QueryResult></report>"#
    )
}

// ============================================================================
// Settings → Connection
// ============================================================================

#[tokio::test]
async fn test_settings_file_connects_to_base_uri() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/almaws/v1/courses/C1"))
        .and(query_param("apikey", "from-file"))
        .and(query_param("format", "xml"))
        .respond_with(xml_page(200, "<course><code>ECN-101</code></course>"))
        .expect(1)
        .mount(&server)
        .await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "api_key: from-file\nformat: xml\nbase_uri: {}", server.uri()).unwrap();

    let alma = Settings::from_file(file.path()).unwrap().connect().unwrap();
    let course = alma.courses.get(Some("C1"), &ListOptions::new()).await.unwrap();

    assert_eq!(course.as_xml().unwrap().find_text(None, "code"), Some("ECN-101"));
}

#[test]
fn test_settings_require_api_key() {
    let err = Settings::from_yaml("region: Europe\n").unwrap().connect().unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

// ============================================================================
// Offset pagination
// ============================================================================

#[tokio::test]
async fn test_users_all_records_three_calls() {
    let server = MockServer::start().await;
    for (offset, limit, range) in [("0", "50", 0..50), ("50", "100", 50..150), ("150", "100", 150..250)] {
        Mock::given(method("GET"))
            .and(path("/almaws/v1/users"))
            .and(query_param("offset", offset))
            .and(query_param("limit", limit))
            .and(query_param("apikey", "test-key"))
            .respond_with(json_page(users(250, range)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let opts = ListOptions::new().limit(50).all_records(true);
    let result = connect(&server, DataFormat::Json)
        .users
        .get(None, &opts)
        .await
        .unwrap();

    let value = result.into_json().unwrap();
    let records = value["user"].as_array().unwrap();
    assert_eq!(records.len(), 250);
    assert_eq!(records[0]["primary_id"], "u0");
    assert_eq!(records[249]["primary_id"], "u249");
    assert_eq!(value["total_record_count"], 250);
}

#[tokio::test]
async fn test_vendor_invoices_xml_merge() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/almaws/v1/acq/vendors/AMAZON/invoices"))
        .and(query_param("offset", "0"))
        .respond_with(xml_page(
            200,
            r#"<invoices total_record_count="2"><invoice><id>A</id></invoice></invoices>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/almaws/v1/acq/vendors/AMAZON/invoices"))
        .and(query_param("offset", "1"))
        .respond_with(xml_page(
            200,
            r#"<invoices total_record_count="2"><invoice><id>B</id></invoice></invoices>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let opts = ListOptions::new().limit(1).all_records(true);
    let invoices = connect(&server, DataFormat::Xml)
        .acquisitions
        .vendors
        .get_invoices("AMAZON", &opts)
        .await
        .unwrap();

    let tree = invoices.into_xml().unwrap();
    let ids: Vec<_> = tree
        .children_named(None, "invoice")
        .filter_map(|i| i.find_text(None, "id"))
        .collect();
    assert_eq!(ids, vec!["A", "B"]);
}

#[tokio::test]
async fn test_raw_pages_in_request_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/almaws/v1/acq/funds"))
        .and(query_param("offset", "0"))
        .respond_with(json_page(json!({"total_record_count": 2, "fund": [{"code": "F1"}]})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/almaws/v1/acq/funds"))
        .and(query_param("offset", "1"))
        .respond_with(json_page(json!({"total_record_count": 2, "fund": [{"code": "F2"}]})))
        .mount(&server)
        .await;

    let opts = ListOptions::new().limit(1).all_records(true).raw(true);
    let pages = connect(&server, DataFormat::Json)
        .acquisitions
        .funds
        .get(None, &opts)
        .await
        .unwrap()
        .into_raw_pages()
        .unwrap();

    let codes: Vec<Value> = pages
        .iter()
        .map(|p| p.json().unwrap()["fund"][0]["code"].clone())
        .collect();
    assert_eq!(codes, vec![json!("F1"), json!("F2")]);
    assert!(pages.iter().all(|p| p.status == 200));
}

#[tokio::test]
async fn test_failed_page_fails_whole_read() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/almaws/v1/courses"))
        .and(query_param("offset", "0"))
        .respond_with(json_page(json!({"total_record_count": 20, "course": [{"id": "1"}]})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/almaws/v1/courses"))
        .and(query_param("offset", "1"))
        .respond_with(ResponseTemplate::new(503).set_body_raw("Service Unavailable", "text/plain"))
        .mount(&server)
        .await;

    let err = connect(&server, DataFormat::Json)
        .courses
        .get(None, &ListOptions::new().limit(1).all_records(true))
        .await
        .unwrap_err();

    assert!(err.is_alma());
    assert_eq!(err.to_string(), "503 - Service Unavailable");
}

// ============================================================================
// Error normalization
// ============================================================================

#[tokio::test]
async fn test_json_error_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/almaws/v1/users/nobody"))
        .respond_with(ResponseTemplate::new(400).set_body_raw(
            json!({
                "errorsExist": true,
                "errorList": {"error": [{"errorCode": "401861", "errorMessage": "User with identifier nobody was not found."}]}
            })
            .to_string(),
            "application/json",
        ))
        .mount(&server)
        .await;

    let err = connect(&server, DataFormat::Json)
        .users
        .get(Some("nobody"), &ListOptions::new())
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "401861 - User with identifier nobody was not found.. See Alma documentation for more information."
    );
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_xml_error_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/almaws/v1/bibs/123"))
        .respond_with(xml_page(
            400,
            r#"<web_service_result xmlns="http://com/exlibris/urm/general/xmlbeans">
                 <errorsExist>true</errorsExist>
                 <errorList><error><errorCode>402203</errorCode><errorMessage>Input parameters mmsId 123 is not valid</errorMessage></error></errorList>
               </web_service_result>"#,
        ))
        .mount(&server)
        .await;

    let err = connect(&server, DataFormat::Xml)
        .bibs
        .catalog
        .get("123", &ReadOptions::new())
        .await
        .unwrap_err();

    assert!(err.to_string().starts_with("402203 - Input parameters mmsId 123 is not valid"));
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_bib_from_tree() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/almaws/v1/bibs"))
        .and(header("content-type", "application/xml"))
        .and(query_param("format", "xml"))
        .and(body_string_contains("<record><leader>"))
        .respond_with(xml_page(200, "<bib><mms_id>991</mms_id></bib>"))
        .expect(1)
        .mount(&server)
        .await;

    let record = XmlElement::parse("<bib><record><leader>00000nam</leader></record></bib>").unwrap();
    let created = connect(&server, DataFormat::Json)
        .bibs
        .catalog
        .create(record, &ReadOptions::new())
        .await
        .unwrap();

    assert_eq!(created.as_xml().unwrap().find_text(None, "mms_id"), Some("991"));
}

// ============================================================================
// Analytics
// ============================================================================

#[tokio::test]
async fn test_report_records_across_chunks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/almaws/v1/analytics/reports"))
        .and(query_param("path", "/shared/Reports/Loans"))
        .and(query_param("limit", "25"))
        .and(query_param("col_names", "true"))
        .respond_with(xml_page(200, &report_chunk(false, Some("T1"), &["2024-01-01"], true)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/almaws/v1/analytics/reports"))
        .and(query_param("token", "T1"))
        .respond_with(xml_page(200, &report_chunk(true, None, &["2024-01-02", "2024-01-03"], false)))
        .expect(1)
        .mount(&server)
        .await;

    let rows = connect(&server, DataFormat::Json)
        .analytics
        .reports
        .get_records("/shared/Reports/Loans", &ReportOptions::new().all_records(true))
        .await
        .unwrap();

    let dates: Vec<_> = rows.iter().map(|r| r["loan_date"].clone()).collect();
    assert_eq!(
        dates,
        vec![json!("2024-01-01"), json!("2024-01-02"), json!("2024-01-03")]
    );
}

#[tokio::test]
async fn test_report_raw_chunks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/almaws/v1/analytics/reports"))
        .and(query_param("path", "/shared/Reports/Loans"))
        .respond_with(xml_page(200, &report_chunk(false, Some("T1"), &["a"], true)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/almaws/v1/analytics/reports"))
        .and(query_param("token", "T1"))
        .respond_with(xml_page(200, &report_chunk(true, None, &["b"], false)))
        .mount(&server)
        .await;

    let report = connect(&server, DataFormat::Json)
        .analytics
        .reports
        .get("/shared/Reports/Loans", &ReportOptions::new().all_records(true).raw(true))
        .await
        .unwrap();

    let Response::RawPages(pages) = report else {
        panic!("expected raw pages");
    };
    assert_eq!(pages.len(), 2);
    assert!(pages[1].body.contains("<Column0>b</Column0>"));
}
