// tests/notify_webhooks.rs
use job_alert_bot::notify::{DiscordNotifier, SlackNotifier};
use job_alert_bot::{JobAlert, Notifier};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn alert() -> JobAlert {
    JobAlert {
        posting_id: "4100".into(),
        title: "DevOps Engineer".into(),
        company: "Acme".into(),
        location: "Chennai".into(),
        url: "https://www.adzuna.in/details/4100".into(),
        matched: vec!["aws".into(), "terraform".into()],
    }
}

#[tokio::test]
async fn discord_posts_one_embed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(body_partial_json(json!({
            "embeds": [{
                "title": "🚀 New Job: DevOps Engineer",
                "url": "https://www.adzuna.in/details/4100",
                "color": 5814783
            }]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let n = DiscordNotifier::new(format!("{}/hook", server.uri()));
    n.send(&alert()).await.expect("delivered");
    server.verify().await;
}

#[tokio::test]
async fn discord_retries_then_gives_up() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let n = DiscordNotifier::new(format!("{}/hook", server.uri()))
        .with_retries(3)
        .with_backoff_ms(1);
    let err = n.send(&alert()).await.unwrap_err();
    assert!(err.to_string().contains("Discord webhook HTTP error"));
    server.verify().await;
}

#[tokio::test]
async fn discord_recovers_after_transient_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let n = DiscordNotifier::new(format!("{}/hook", server.uri())).with_backoff_ms(1);
    n.send(&alert()).await.expect("second attempt succeeds");
    server.verify().await;
}

#[tokio::test]
async fn discord_does_not_retry_client_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Unknown Webhook"))
        .expect(1)
        .mount(&server)
        .await;

    let n = DiscordNotifier::new(format!("{}/hook", server.uri()))
        .with_retries(3)
        .with_backoff_ms(1);
    let err = n.send(&alert()).await.unwrap_err();
    assert!(err.to_string().contains("404"));
    server.verify().await;
}

#[tokio::test]
async fn discord_waits_out_rate_limit_then_delivers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    // a large backoff would stall the test if Retry-After were ignored
    let n = DiscordNotifier::new(format!("{}/hook", server.uri())).with_backoff_ms(60_000);
    tokio::time::timeout(Duration::from_secs(10), n.send(&alert()))
        .await
        .expect("Retry-After honoured")
        .expect("delivered after rate limit");
    server.verify().await;
}

#[tokio::test]
async fn discord_timeout_is_a_request_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let n = DiscordNotifier::new(format!("{}/hook", server.uri()))
        .with_timeout(1)
        .with_retries(1);
    let err = n.send(&alert()).await.unwrap_err();
    assert!(err.to_string().contains("Discord webhook request failed"));
}

#[tokio::test]
async fn slack_timeout_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let n = SlackNotifier::new(server.uri()).with_timeout(1);
    let err = n.send(&alert()).await.unwrap_err();
    assert!(err.to_string().contains("slack post"));
}

#[tokio::test]
async fn slack_posts_text_with_link() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/x"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let n = SlackNotifier::new(format!("{}/services/x", server.uri()));
    n.send(&alert()).await.expect("delivered");

    let reqs = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&reqs[0].body).unwrap();
    let text = body["text"].as_str().unwrap();
    assert!(text.contains("<https://www.adzuna.in/details/4100|DevOps Engineer>"));
    assert!(text.contains("aws, terraform"));
}

#[tokio::test]
async fn slack_non_2xx_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let n = SlackNotifier::new(server.uri());
    assert!(n.send(&alert()).await.is_err());
}
