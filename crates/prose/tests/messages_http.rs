use serde_json::json;
use std::time::Duration;
use stride_matching::{BulletPrompt, BulletWriter};
use stride_prose::{parse_base_url, MessagesWriter, ProseConfig};
use stride_test_utils::ShoeBuilder;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn writer_for(server: &MockServer, timeout: Duration) -> MessagesWriter {
    MessagesWriter::with_config(ProseConfig {
        api_key: "test-key".into(),
        base_url: parse_base_url(&format!("{}/v1", server.uri())).unwrap(),
        model: "small-model".into(),
        timeout,
        max_tokens: 200,
    })
    .unwrap()
}

fn prompt() -> BulletPrompt {
    let shoe = ShoeBuilder::new("cloud-daily").daily().brand("Cloud").build();
    BulletPrompt::new(&shoe, "closest match", &["Lightest pick".to_string()], &[])
}

#[tokio::test]
async fn writes_three_bullets_from_messages_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({ "model": "small-model", "max_tokens": 200 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{
                "type": "text",
                "text": "Three reasons:\n- Soft but not mushy\n- Lightest of the three\n- Easy on long runs"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let bullets = writer_for(&server, Duration::from_secs(5))
        .write_bullets(&prompt())
        .await
        .unwrap();
    assert_eq!(
        bullets,
        vec![
            "Soft but not mushy",
            "Lightest of the three",
            "Easy on long runs"
        ]
    );
}

#[tokio::test]
async fn surfaces_api_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(529).set_body_json(json!({
            "type": "error",
            "error": { "type": "overloaded_error", "message": "Overloaded" }
        })))
        .mount(&server)
        .await;

    let err = writer_for(&server, Duration::from_secs(5))
        .write_bullets(&prompt())
        .await
        .unwrap_err()
        .to_string();
    assert!(err.contains("Overloaded"));
    assert!(err.contains("529"));
}

#[tokio::test]
async fn rejects_wrong_bullet_count() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{ "type": "text", "text": "- only\n- two" }]
        })))
        .mount(&server)
        .await;

    let err = writer_for(&server, Duration::from_secs(5))
        .write_bullets(&prompt())
        .await
        .unwrap_err()
        .to_string();
    assert!(err.contains("expected 3 bullets"));
}

#[tokio::test]
async fn slow_responses_time_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(500))
                .set_body_json(json!({ "content": "- a\n- b\n- c" })),
        )
        .mount(&server)
        .await;

    let result = writer_for(&server, Duration::from_millis(50))
        .write_bullets(&prompt())
        .await;
    assert!(result.is_err());
}
