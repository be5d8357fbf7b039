use threadview::core::message::{Role, parse_timestamp};
use threadview::source::{FetchError, HttpMessageSource, MessageSource, load};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

// ============================================================================
// Helper Functions
// ============================================================================

const MESSAGES_PATH: &str = "/api/messages";

fn source_for(mock_server: &MockServer) -> HttpMessageSource {
    HttpMessageSource::new(format!("{}{}", mock_server.uri(), MESSAGES_PATH))
}

async fn mount(mock_server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(MESSAGES_PATH))
        .respond_with(response)
        .expect(1)
        .mount(mock_server)
        .await;
}

// ============================================================================
// Success
// ============================================================================

#[tokio::test]
async fn test_successful_fetch_is_grouped_by_date() {
    let mock_server = MockServer::start().await;

    // Out of order, one record from yesterday, one with a broken date
    let body = r#"[
        {"business_id": 1, "message_text": "hello! how can I help?", "message_date": "2024-01-05T10:05:00Z", "platform": "web", "bot_sender": true},
        {"business_id": 1, "message_text": "are you there?", "message_date": "2024-01-04T09:00:00Z", "platform": "web", "bot_sender": false},
        {"business_id": 1, "message_text": "hi", "message_date": "2024-01-05T10:00:00Z", "platform": "web", "bot_sender": false},
        {"business_id": 1, "message_text": "lost", "message_date": "yesterday-ish", "platform": "web", "bot_sender": false}
    ]"#;
    mount(
        &mock_server,
        ResponseTemplate::new(200).set_body_raw(body, "application/json"),
    )
    .await;

    let source = source_for(&mock_server);
    let now = parse_timestamp("2024-01-05T12:00:00Z").unwrap();
    let grouped = load(&source, || now).await.unwrap();

    assert_eq!(grouped.labels().collect::<Vec<_>>(), vec!["Yesterday", "Today"]);
    assert_eq!(grouped.message_count(), 3);

    let today = grouped.get("Today").unwrap();
    assert_eq!(today[0].content, "hi");
    assert_eq!(today[0].role, Role::User);
    assert_eq!(today[1].role, Role::Assistant);
}

#[tokio::test]
async fn test_empty_array_is_an_empty_thread() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        ResponseTemplate::new(200).set_body_raw("[]", "application/json"),
    )
    .await;

    let source = source_for(&mock_server);
    let records = source.fetch().await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_missing_fields_use_defaults() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        ResponseTemplate::new(200).set_body_raw(
            r#"[{"message_text": "bare", "message_date": "2024-01-05T10:00:00Z"}]"#,
            "application/json",
        ),
    )
    .await;

    let source = source_for(&mock_server);
    let records = source.fetch().await.unwrap();
    assert_eq!(records.len(), 1);
    assert!(!records[0].bot_sender);
    assert!(records[0].business_id.is_none());
}

#[tokio::test]
async fn test_mistyped_record_does_not_fail_the_load() {
    let mock_server = MockServer::start().await;
    let body = r#"[
        {"message_text": "hi", "message_date": "2024-01-05T10:00:00Z", "bot_sender": false},
        {"message_text": null, "message_date": 1704448800, "bot_sender": null},
        {"message_text": "hello", "message_date": "2024-01-05T10:01:00Z", "bot_sender": true}
    ]"#;
    mount(
        &mock_server,
        ResponseTemplate::new(200).set_body_raw(body, "application/json"),
    )
    .await;

    let source = source_for(&mock_server);
    let now = parse_timestamp("2024-01-05T12:00:00Z").unwrap();
    let grouped = load(&source, || now).await.unwrap();

    assert_eq!(grouped.message_count(), 2);
    let today = grouped.get("Today").unwrap();
    assert_eq!(today[0].content, "hi");
    assert_eq!(today[1].content, "hello");
    assert_eq!(today[1].role, Role::Assistant);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_service_unavailable_is_api_error() {
    let mock_server = MockServer::start().await;
    mount(&mock_server, ResponseTemplate::new(503)).await;

    let source = source_for(&mock_server);
    let err = source.fetch().await.unwrap_err();
    assert_eq!(
        err,
        FetchError::Api {
            status: 503,
            message: "Service Unavailable".to_string(),
        }
    );
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_relay_error_message_is_surfaced() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        ResponseTemplate::new(500).set_body_raw(
            r#"{"message":"Failed to fetch messages"}"#,
            "application/json",
        ),
    )
    .await;

    let source = source_for(&mock_server);
    let now = parse_timestamp("2024-01-05T12:00:00Z").unwrap();
    let err = load(&source, || now).await.unwrap_err();
    match err {
        FetchError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Failed to fetch messages");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        ResponseTemplate::new(200).set_body_raw(r#"{"not": "an array"}"#, "application/json"),
    )
    .await;

    let source = source_for(&mock_server);
    let err = source.fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::Parse(_)));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Nothing listens on port 1
    let source = HttpMessageSource::new(format!("http://127.0.0.1:1{}", MESSAGES_PATH));
    let err = source.fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::Network(_)));
}
