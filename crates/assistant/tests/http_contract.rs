// HTTP contract tests against a mock assistant backend.

use std::time::Duration;

use corep_assistant::{Assistant, AssistantError, HttpAssistant};
use httpmock::prelude::*;
use serde_json::json;

fn client(server: &MockServer) -> HttpAssistant {
    HttpAssistant::new(server.base_url(), Duration::from_secs(5)).unwrap()
}

#[test]
fn analyze_sends_query_and_parses_update() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/analyze")
            .query_param("user_query", "We invested 10m in UK Gilts");
        then.status(200).json_body(json!({
            "response_text": "UK gilts are sovereign exposures at 0%.",
            "data_update": {
                "field_id": "row_sovereign_exposure",
                "value": 10.0,
                "rule_ref": "Article 114(4)",
                "reasoning": "Domestic-currency central government exposure."
            }
        }));
    });

    let response = client(&server).analyze("We invested 10m in UK Gilts").unwrap();
    mock.assert();

    assert_eq!(response.response_text, "UK gilts are sovereign exposures at 0%.");
    let update = response.data_update.unwrap();
    assert_eq!(update.field_id.as_deref(), Some("row_sovereign_exposure"));
    assert_eq!(update.value.and_then(|v| v.as_f64()), Some(10.0));
}

#[test]
fn analyze_prose_only() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/analyze");
        then.status(200).json_body(json!({ "response_text": "Could you say which book?", "data_update": null }));
    });

    let response = client(&server).analyze("hello").unwrap();
    assert!(response.data_update.is_none());
}

#[test]
fn server_error_is_http_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/analyze");
        then.status(500).body("model unavailable");
    });

    match client(&server).analyze("x").unwrap_err() {
        AssistantError::Http(code, body) => {
            assert_eq!(code, 500);
            assert_eq!(body, "model unavailable");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[test]
fn garbage_body_is_parse_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/analyze");
        then.status(200).body("<html>not json</html>");
    });

    assert!(matches!(client(&server).analyze("x").unwrap_err(), AssistantError::Parse(_)));
}

#[test]
fn upload_posts_document() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/upload");
        then.status(200).json_body(json!({
            "response_text": "Found a retail book on page 3.",
            "data_update": {
                "field_id": "row_retail_exposure",
                "value": 75,
                "rule_ref": "Article 123",
                "reasoning": "Retail mortgage book",
                "source_page": "3"
            }
        }));
    });

    let dir = tempfile::tempdir().unwrap();
    let doc = dir.path().join("book.pdf");
    std::fs::write(&doc, b"%PDF-1.4 retail mortgage book").unwrap();

    let response = client(&server).upload(&doc).unwrap();
    mock.assert();
    assert_eq!(response.data_update.unwrap().source_page.as_deref(), Some("3"));
}

#[test]
fn unreachable_backend_is_network_failure() {
    // Port 9 (discard) is almost never listening locally
    let client = HttpAssistant::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    assert!(matches!(client.analyze("x").unwrap_err(), AssistantError::Network(_)));
}
