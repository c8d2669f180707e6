//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::time::Duration;

use executive_engine::{App, CompletionClient};
use executive_providers::retry::RetryConfig;
use executive_types::Phase;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const COMPLETION_PATH: &str = "/api/generate-responses";

pub fn endpoint_for(server: &MockServer) -> Url {
    Url::parse(&format!("{}{COMPLETION_PATH}", server.uri())).expect("mock server uri is a valid url")
}

/// Client against `server` with a per-test HTTP client and fast backoff.
pub fn completion_client(server: &MockServer, max_retries: u32) -> CompletionClient {
    CompletionClient::new(endpoint_for(server))
        .with_http(reqwest::Client::new())
        .with_timeout(Duration::from_secs(5))
        .with_retry(RetryConfig {
            max_retries,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(50),
            ..RetryConfig::default()
        })
}

/// Answer every completion request with `body`.
pub async fn mount_narratives(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(COMPLETION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Sign in as `role` using the PIN shown on the challenge screen.
pub fn sign_in(app: &mut App, role: &str) {
    app.handle_input(role);
    let pin = app
        .snapshot()
        .challenge
        .expect("challenge is open after choosing a role");
    app.handle_input(&pin);
    assert_eq!(app.phase(), Phase::ScenarioSelect);
}

/// Sign in and confirm `cores` on `scenario`, ending at DecisionInput.
pub fn brief(app: &mut App, scenario: u32, cores: &str) {
    sign_in(app, "Commander");
    app.handle_input(&scenario.to_string());
    app.handle_input(cores);
    app.handle_input("/confirm");
    assert_eq!(
        app.phase(),
        Phase::DecisionInput,
        "status: {:?}",
        app.status_message()
    );
}
