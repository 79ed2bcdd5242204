use super::*;

use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> DecodoClient {
    DecodoClient::new("user", "pass", 5)
        .expect("client construction failed")
        .with_endpoint(server.uri())
}

#[test]
fn detail_url_without_locale() {
    assert_eq!(
        DecodoClient::detail_url("123", "com", None),
        "https://www.google.com/maps?cid=123"
    );
}

#[test]
fn detail_url_with_locale_sets_hl_and_gl() {
    assert_eq!(
        DecodoClient::detail_url("123", "ca", Some("en-CA")),
        "https://www.google.ca/maps?cid=123&hl=en-CA&gl=CA"
    );
}

#[test]
fn detail_url_empty_domain_falls_back_to_com() {
    assert_eq!(
        DecodoClient::detail_url("9", "", None),
        "https://www.google.com/maps?cid=9"
    );
}

#[test]
fn auth_detail_prefers_json_message() {
    assert_eq!(
        auth_detail(r#"{"message": "bad credentials"}"#),
        "bad credentials"
    );
}

#[test]
fn auth_detail_falls_back_to_plain_text() {
    assert_eq!(auth_detail("  Unauthorized  "), "Unauthorized");
}

#[test]
fn auth_detail_truncates_long_messages() {
    let long = "x".repeat(300);
    let detail = auth_detail(&long);
    assert_eq!(detail.chars().count(), 200);
    assert!(detail.ends_with("..."));
}

#[test]
fn auth_detail_handles_empty_body() {
    assert_eq!(auth_detail(""), "no detail supplied");
}

#[tokio::test]
async fn fetch_listing_page_sends_google_maps_task() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(serde_json::json!({
            "target": "google_maps",
            "query": "dentist Toronto",
            "geo": "Toronto, Canada",
            "page_from": "2",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{"content": "<html></html>"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = test_client(&server)
        .fetch_listing_page("dentist Toronto", "Toronto, Canada", 2, 50, "en-CA", "ca")
        .await
        .expect("listing fetch failed");
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.first_content(), Some("<html></html>"));
}

#[tokio::test]
async fn fetch_detail_page_targets_the_maps_deep_link() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "target": "google",
            "url": "https://www.google.com/maps?cid=42&hl=en-US&gl=US",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{"content": "<html>detail</html>"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = test_client(&server)
        .fetch_detail_page("42", "com", Some("en-US"))
        .await
        .expect("detail fetch failed");
    assert_eq!(response.first_content(), Some("<html>detail</html>"));
}

#[tokio::test]
async fn unauthorized_becomes_auth_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"message": "invalid token"})),
        )
        .mount(&server)
        .await;

    let err = test_client(&server)
        .fetch_listing_page("dentist", "Toronto", 1, 10, "en-US", "com")
        .await
        .unwrap_err();
    assert!(err.is_auth_error());
    assert!(
        matches!(err, ScraperError::AuthRejected { detail } if detail == "invalid token"),
    );
}

#[tokio::test]
async fn server_error_becomes_unexpected_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .fetch_listing_page("dentist", "Toronto", 1, 10, "en-US", "com")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ScraperError::UnexpectedStatus { status: 502, .. }
    ));
    assert!(!err.is_auth_error());
}

#[tokio::test]
async fn invalid_json_becomes_deserialize_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .fetch_listing_page("dentist", "Toronto", 1, 10, "en-US", "com")
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::Deserialize { .. }));
}

#[tokio::test]
async fn first_content_skips_empty_entries() {
    let response = ScrapeResponse {
        results: vec![
            ResultEntry { content: None },
            ResultEntry {
                content: Some(String::new()),
            },
            ResultEntry {
                content: Some("<html>page</html>".to_string()),
            },
        ],
    };
    assert_eq!(response.first_content(), Some("<html>page</html>"));
}
