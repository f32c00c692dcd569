// Integration tests for `AdmonClient` and `XmlRequest` using wiremock.
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use admon_api::{AdmonClient, Error, LogService, NodeCategory, NodeListOptions, XmlRequest};

// ── Helpers ─────────────────────────────────────────────────────────

const NODE_LIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<data>
  <mgmtd><node group="Default" nodeNumID="1">mgmt01</node></mgmtd>
  <meta>
    <node group="Default" nodeNumID="1">meta01</node>
    <node group="rack-b" nodeNumID="2">meta02</node>
  </meta>
  <storage>
    <node group="Default" nodeNumID="1">stor01</node>
  </storage>
</data>"#;

async fn setup() -> (MockServer, AdmonClient) {
    let server = MockServer::start().await;
    let client = AdmonClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

fn xml(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/xml")
        .set_body_string(body)
}

// ── Node list ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_meta_nodes() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/XML_NodeList"))
        .respond_with(xml(NODE_LIST))
        .mount(&server)
        .await;

    let rows = client.list_nodes(NodeCategory::Meta).await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["value"], "meta01");
    assert_eq!(rows[0]["nodeNumID"], "1");
    assert_eq!(rows[1]["group"], "rack-b");
}

#[tokio::test]
async fn test_node_list_exposes_all_sections() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/XML_NodeList"))
        .respond_with(xml(NODE_LIST))
        .mount(&server)
        .await;

    let doc = client.node_list(NodeListOptions::default()).await.unwrap();

    assert_eq!(doc.rows("mgmtd").unwrap().len(), 1);
    assert_eq!(doc.rows("storage").unwrap()[0]["value"], "stor01");
}

#[tokio::test]
async fn test_client_category_requests_client_section() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/XML_NodeList"))
        .and(query_param("clients", "true"))
        .respond_with(xml(
            r#"<data><meta/><storage/><client><node group="" nodeNumID="7">cl01</node></client></data>"#,
        ))
        .mount(&server)
        .await;

    let rows = client.list_nodes(NodeCategory::Client).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["value"], "cl01");
}

// ── Error paths ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_section_is_not_an_empty_list() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/XML_NodeList"))
        .respond_with(xml("<data><meta/></data>"))
        .mount(&server)
        .await;

    let result = client.list_nodes(NodeCategory::Storage).await;
    assert!(matches!(result, Err(Error::MissingElement { ref name }) if name == "storage"));
}

#[tokio::test]
async fn test_error_document() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/XML_NodeList"))
        .respond_with(xml("<data><error>management daemon unreachable</error></data>"))
        .mount(&server)
        .await;

    let result = client.list_nodes(NodeCategory::Meta).await;
    match result {
        Err(Error::Server { message }) => assert_eq!(message, "management daemon unreachable"),
        other => panic!("expected Server error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_status_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/XML_NodeList"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client.list_nodes(NodeCategory::Meta).await.unwrap_err();
    assert!(matches!(err, Error::Status { status: 503, .. }));
    assert!(err.is_transient());
    assert!(err.is_communication());
}

#[tokio::test]
async fn test_malformed_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/XML_NodeList"))
        .respond_with(xml("<data><meta>"))
        .mount(&server)
        .await;

    let result = client.list_nodes(NodeCategory::Meta).await;
    assert!(matches!(result, Err(Error::Xml { .. })));
}

#[tokio::test]
async fn test_connection_refused() {
    let client =
        AdmonClient::from_reqwest("http://127.0.0.1:1", reqwest::Client::new()).unwrap();

    let err = client.list_nodes(NodeCategory::Meta).await.unwrap_err();
    assert!(err.is_transport());
}

// ── Logs ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_remote_log_file_query() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/XML_RemoteLogFile"))
        .and(query_param("service", "storage"))
        .and(query_param("node", "stor01"))
        .and(query_param("nodeNumID", "3"))
        .and(query_param("lines", "50"))
        .respond_with(xml("<data><log>started\nlistening</log></data>"))
        .expect(1)
        .mount(&server)
        .await;

    let log = client
        .remote_log_file(LogService::Storage, "stor01", 3, 50)
        .await
        .unwrap();
    assert_eq!(log, "started\nlistening");
}

#[tokio::test]
async fn test_admon_log_file() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/XML_LogFile"))
        .respond_with(xml("<data><success>true</success><log>admon up</log></data>"))
        .mount(&server)
        .await;

    assert_eq!(client.admon_log_file().await.unwrap(), "admon up");
}

// ── XmlRequest ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_request_pending_until_update() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/XML_LogFile"))
        .respond_with(xml("<data><success>true</success><log>x</log></data>"))
        .mount(&server)
        .await;

    let url = client.endpoint_url("/XML_LogFile", &[]).unwrap();
    let request = XmlRequest::new(client, url);

    assert!(!request.is_ready());
    assert!(matches!(request.value("log"), Err(Error::Pending)));

    request.update().await.unwrap();

    assert!(request.is_ready());
    assert_eq!(request.value("success").unwrap(), "true");
    assert_eq!(request.value("absent").unwrap(), "");
}

#[tokio::test]
async fn test_request_failure_is_stored() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/XML_NodeList"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let url = client.endpoint_url("/XML_NodeList", &[]).unwrap();
    let request = XmlRequest::new(client, url);

    assert!(request.update().await.is_err());
    assert!(matches!(request.rows("meta"), Err(Error::Communication { .. })));
}

#[tokio::test]
async fn test_background_one_shot() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/XML_NodeList"))
        .respond_with(xml(NODE_LIST))
        .expect(1)
        .mount(&server)
        .await;

    let url = client.endpoint_url("/XML_NodeList", &[]).unwrap();
    let request = XmlRequest::new(client, url);
    let mut completed = request.subscribe();

    request.start();
    completed.changed().await.unwrap();

    assert_eq!(request.rows("meta").unwrap().len(), 2);
    request.stop().await;
}

#[tokio::test]
async fn test_background_repeat_until_stopped() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/XML_NodeList"))
        .respond_with(xml(NODE_LIST))
        .mount(&server)
        .await;

    let url = client.endpoint_url("/XML_NodeList", &[]).unwrap();
    let request = XmlRequest::new(client, url).repeating(Duration::from_millis(20));
    let mut completed = request.subscribe();

    request.start();
    completed.wait_for(|n| *n >= 3).await.unwrap();
    request.stop().await;

    let after_stop = *completed.borrow();
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(*completed.borrow(), after_stop);
}
