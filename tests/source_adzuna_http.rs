// tests/source_adzuna_http.rs
use job_alert_bot::config::{AdzunaCredentials, BotConfig, NotifierKind, SearchSettings};
use job_alert_bot::source::adzuna::AdzunaSource;
use job_alert_bot::{FetchError, FetchOutcome, ListingSource, MarkSeenPolicy};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cfg() -> BotConfig {
    BotConfig {
        adzuna: AdzunaCredentials {
            app_id: "test-id".into(),
            app_key: "test-key".into(),
        },
        search: SearchSettings::default(),
        notifier: NotifierKind::Log,
        mark_seen: MarkSeenPolicy::AfterDelivery,
    }
}

#[tokio::test]
async fn query_carries_role_scope_and_page_size() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/api/jobs/in/search/1"))
        .and(query_param("app_id", "test-id"))
        .and(query_param("app_key", "test-key"))
        .and(query_param("what", "devops"))
        .and(query_param("where", "chennai"))
        .and(query_param("results_per_page", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "results": [
                {
                    "id": "4100",
                    "title": "DevOps Engineer",
                    "description": "AWS, Terraform",
                    "redirect_url": "https://www.adzuna.in/details/4100",
                    "company": { "display_name": "Acme" },
                    "location": { "display_name": "Chennai, Tamil Nadu" }
                },
                { "id": 4101, "title": "SRE" },
                { "title": "no id at all" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let src = AdzunaSource::from_config(&cfg()).with_base_url(server.uri());
    let (postings, dropped) = match src.fetch("chennai").await {
        FetchOutcome::Fetched { postings, dropped } => (postings, dropped),
        FetchOutcome::Failed(e) => panic!("unexpected failure: {e}"),
    };

    assert_eq!(dropped, 1);
    assert_eq!(postings.len(), 2);
    assert_eq!(postings[0].id, "4100");
    assert_eq!(postings[0].company_name, "Acme");
    assert_eq!(postings[1].id, "4101");
    assert_eq!(postings[1].description, "");
    server.verify().await;
}

#[tokio::test]
async fn non_success_status_is_a_failed_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let src = AdzunaSource::from_config(&cfg()).with_base_url(server.uri());
    let out = src.fetch("remote").await;
    assert!(matches!(
        out,
        FetchOutcome::Failed(FetchError::Status { status: 401 })
    ));
}

#[tokio::test]
async fn malformed_body_is_a_failed_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let src = AdzunaSource::from_config(&cfg()).with_base_url(server.uri());
    let out = src.fetch("remote").await;
    assert!(matches!(out, FetchOutcome::Failed(FetchError::Decode(_))));
    assert!(out.into_postings().is_empty());
}

#[tokio::test]
async fn slow_provider_times_out_as_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "results": [] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let src = AdzunaSource::from_config(&cfg())
        .with_base_url(server.uri())
        .with_timeout(1);
    let out = src.fetch("remote").await;
    match out {
        FetchOutcome::Failed(FetchError::Transport(msg)) => {
            assert!(!msg.contains("test-key"), "app key leaked into error: {msg}");
        }
        other => panic!("expected transport failure, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_host_is_a_failed_outcome() {
    // Nothing listens on port 9 locally.
    let src = AdzunaSource::from_config(&cfg()).with_base_url("http://127.0.0.1:9");
    assert!(src.fetch("remote").await.is_failed());
}
