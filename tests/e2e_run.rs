// tests/e2e_run.rs
// Full invocation against mock Adzuna + Discord servers and a temp ledger file.
use job_alert_bot::config::{AdzunaCredentials, BotConfig, NotifierKind, SearchSettings};
use job_alert_bot::MarkSeenPolicy;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(adzuna: &MockServer, discord: &MockServer, ledger: std::path::PathBuf) -> BotConfig {
    let search = SearchSettings {
        api_base_url: adzuna.uri(),
        scopes: vec!["remote".into(), "chennai".into()],
        keywords: vec!["aws".into(), "kubernetes".into(), "terraform".into()],
        ledger_path: ledger,
        ..Default::default()
    }
    .sanitize()
    .unwrap();

    BotConfig {
        adzuna: AdzunaCredentials {
            app_id: "id".into(),
            app_key: "key".into(),
        },
        search,
        notifier: NotifierKind::Discord {
            webhook: format!("{}/webhook", discord.uri()),
        },
        mark_seen: MarkSeenPolicy::AfterDelivery,
    }
}

#[tokio::test]
async fn one_failing_scope_and_rerun_is_silent() {
    let adzuna = MockServer::start().await;
    let discord = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/api/jobs/in/search/1"))
        .and(query_param("where", "remote"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&adzuna)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/api/jobs/in/search/1"))
        .and(query_param("where", "chennai"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "id": "900",
                    "title": "Senior DevOps Engineer",
                    "description": "must know AWS and Terraform",
                    "redirect_url": "https://www.adzuna.in/details/900",
                    "company": { "display_name": "Acme" },
                    "location": { "display_name": "Chennai" }
                },
                {
                    "id": "901",
                    "title": "Accountant",
                    "description": "Tally"
                },
                { "title": "Cloud Engineer", "description": "AWS" }
            ]
        })))
        .mount(&adzuna)
        .await;
    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&discord)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let ledger_path = dir.path().join("seen_jobs.txt");
    let cfg = config(&adzuna, &discord, ledger_path.clone());

    let first = job_alert_bot::run(&cfg).await.expect("first run");
    assert_eq!(first.scopes_failed, 1);
    assert_eq!(first.notified, 1);
    assert_eq!(first.unmatched, 1);
    assert_eq!(first.invalid, 1);
    assert_eq!(std::fs::read_to_string(&ledger_path).unwrap(), "900\n");
    assert_eq!(discord.received_requests().await.unwrap().len(), 1);

    let second = job_alert_bot::run(&cfg).await.expect("second run");
    assert_eq!(second.notified, 0);
    assert_eq!(second.skipped_seen, 1);
    assert_eq!(second.invalid, 1);
    assert_eq!(discord.received_requests().await.unwrap().len(), 1);
    assert_eq!(std::fs::read_to_string(&ledger_path).unwrap(), "900\n");
}
