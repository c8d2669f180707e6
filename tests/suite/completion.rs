//! Narrative requests against a mock completion service.

use std::time::Duration;

use executive_engine::App;
use executive_providers::{CompletionClient, CompletionError};
use executive_types::{AnalysisCore, CompletionRequest, CoreSet, Narrative, Phase, ScenarioId};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{COMPLETION_PATH, brief, completion_client, mount_narratives};

fn request(scenario: u32, input: &str, cores: &[AnalysisCore]) -> CompletionRequest {
    CompletionRequest {
        scenario: ScenarioId::new(scenario).unwrap(),
        user_input: input.to_string(),
        cores: cores.iter().copied().collect::<CoreSet>(),
    }
}

#[tokio::test]
async fn request_body_matches_wire_format() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETION_PATH))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "scenario": 6,
            "user_input": "halt trading",
            "cores": ["alpha", "charlie"],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "alpha": "Circuit breakers engaged.",
            "charlie": "Liquidity restored.",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = completion_client(&server, 0);
    let narratives = client
        .fetch_or_placeholder(&request(6, "halt trading", &[AnalysisCore::Charlie, AnalysisCore::Alpha]))
        .await;

    assert_eq!(narratives.generated_count(), 2);
    let order: Vec<_> = narratives.iter().map(|(core, _)| core).collect();
    assert_eq!(order, vec![AnalysisCore::Alpha, AnalysisCore::Charlie]);
}

#[tokio::test]
async fn missing_and_extra_cores_are_reconciled() {
    let server = MockServer::start().await;
    mount_narratives(
        &server,
        json!({ "beta": "People first.", "delta": "Not selected.", "omega": 4 }),
    )
    .await;

    let client = completion_client(&server, 0).with_placeholder("Standing by.");
    let narratives = client
        .fetch_or_placeholder(&request(1, "keep hospitals powered", &[AnalysisCore::Alpha, AnalysisCore::Beta]))
        .await;

    assert_eq!(narratives.len(), 2);
    assert_eq!(
        narratives.get(AnalysisCore::Beta),
        Some(&Narrative::Generated("People first.".to_string()))
    );
    assert_eq!(
        narratives.get(AnalysisCore::Alpha),
        Some(&Narrative::Placeholder("Standing by.".to_string()))
    );
    assert!(narratives.get(AnalysisCore::Delta).is_none());
}

#[tokio::test]
async fn server_error_is_retried_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_narratives(&server, json!({ "delta": "Scrambling interceptors." })).await;

    let client = completion_client(&server, 1);
    let responses = client
        .request(&request(7, "intercept", &[AnalysisCore::Delta]))
        .await
        .unwrap();
    assert_eq!(responses.get(AnalysisCore::Delta), Some("Scrambling interceptors."));
}

#[tokio::test]
async fn client_errors_surface_status_and_degrade() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad scenario"))
        .expect(2)
        .mount(&server)
        .await;

    let client = completion_client(&server, 3);
    let req = request(3, "cool the city", &[AnalysisCore::Beta]);
    match client.request(&req).await {
        Err(CompletionError::Status { status, body }) => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(body, "bad scenario");
        }
        other => panic!("expected status error, got {other:?}"),
    }

    let narratives = client.fetch_or_placeholder(&req).await;
    assert_eq!(narratives.generated_count(), 0);
}

#[tokio::test]
async fn unreachable_service_degrades_to_placeholders() {
    // Port 9 (discard) is not listening in test environments.
    let endpoint = Url::parse("http://127.0.0.1:9/api/generate-responses").unwrap();
    let client = CompletionClient::new(endpoint)
        .with_http(reqwest::Client::new())
        .with_timeout(Duration::from_secs(5));

    let narratives = client
        .fetch_or_placeholder(&request(10, "say hello", &[AnalysisCore::Alpha]))
        .await;
    assert_eq!(
        narratives.get(AnalysisCore::Alpha),
        Some(&Narrative::Placeholder("Analyzing...".to_string()))
    );
}

#[tokio::test]
async fn app_shows_badge_before_slow_narratives() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "charlie": "Markets calm." }))
                .set_delay(Duration::from_millis(250)),
        )
        .mount(&server)
        .await;

    let mut app = App::new(Some(completion_client(&server, 0)));
    brief(&mut app, 6, "charlie");
    app.handle_input("maximize profit");

    assert_eq!(app.phase(), Phase::Resolved);
    assert_eq!(app.snapshot().badge.as_deref(), Some("THE OPPORTUNIST"));
    assert!(app.narratives_pending());

    let narratives = app.wait_for_responses().await.unwrap();
    assert_eq!(
        narratives.get(AnalysisCore::Charlie).map(Narrative::text),
        Some("Markets calm.")
    );
}

#[tokio::test]
async fn app_times_out_and_uses_placeholders() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "alpha": "too late" }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = completion_client(&server, 0)
        .with_timeout(Duration::from_millis(200))
        .with_placeholder("No signal.");
    let mut app = App::new(Some(client));
    brief(&mut app, 2, "alpha");
    app.handle_input("run the calculation");
    assert_eq!(app.snapshot().badge.as_deref(), Some("THE GLASS HOUSE"));

    let narratives = app.wait_for_responses().await.unwrap();
    assert_eq!(
        narratives.get(AnalysisCore::Alpha).map(Narrative::text),
        Some("No signal.")
    );
}
