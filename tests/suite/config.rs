//! Config files through to a working completion client.

use std::fs;
use std::time::Duration;

use executive_config::{ConfigError, ENDPOINT_ENV, ExecutiveConfig};
use executive_providers::CompletionClient;
use executive_types::{AnalysisCore, CompletionRequest, CoreSet, ScenarioId};
use serde_json::json;
use wiremock::MockServer;

use crate::common::{COMPLETION_PATH, mount_narratives};

fn write_config(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn missing_file_means_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = ExecutiveConfig::load_from(&dir.path().join("config.toml")).unwrap();
    assert!(loaded.is_none());

    let config = loaded.unwrap_or_default();
    assert!(!config.ascii_only());
}

#[test]
fn malformed_file_reports_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[completion\nenabled = ");
    let err = ExecutiveConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert_eq!(err.path(), Some(path.as_path()));
}

#[test]
fn env_override_beats_file_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
[completion]
endpoint = "http://file.invalid/api"
"#,
    );
    let config = ExecutiveConfig::load_from(&path).unwrap().unwrap();
    let completion = config.completion.unwrap();
    let settings = completion
        .resolve_with(|name| (name == ENDPOINT_ENV).then(|| "http://env.invalid/api".to_string()))
        .unwrap();
    assert_eq!(settings.endpoint.as_str(), "http://env.invalid/api");
}

#[tokio::test]
async fn file_settings_drive_the_client() {
    let server = MockServer::start().await;
    mount_narratives(&server, json!({ "alpha": "Grid rerouted." })).await;

    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
[app]
ascii_only = true

[completion]
endpoint = "${MOCK_BASE}/api/generate-responses"
timeout_secs = 4
max_retries = 0
placeholder = "Core offline."
"#,
    );
    let config = ExecutiveConfig::load_from(&path).unwrap().unwrap();
    assert!(config.ascii_only());

    let base = server.uri();
    let settings = config
        .completion
        .as_ref()
        .unwrap()
        .resolve_with(|name| (name == "MOCK_BASE").then(|| base.clone()))
        .unwrap();
    assert_eq!(settings.endpoint.path(), COMPLETION_PATH);
    assert_eq!(settings.timeout, Duration::from_secs(4));
    assert_eq!(settings.max_retries, 0);

    let client = CompletionClient::new(settings.endpoint)
        .with_http(reqwest::Client::new())
        .with_timeout(settings.timeout)
        .with_placeholder(settings.placeholder);
    let request = CompletionRequest {
        scenario: ScenarioId::new(1).unwrap(),
        user_input: "reroute the grid".to_string(),
        cores: [AnalysisCore::Alpha, AnalysisCore::Beta]
            .into_iter()
            .collect::<CoreSet>(),
    };
    let narratives = client.fetch_or_placeholder(&request).await;
    assert_eq!(
        narratives.get(AnalysisCore::Alpha).map(|n| n.text()),
        Some("Grid rerouted.")
    );
    assert_eq!(
        narratives.get(AnalysisCore::Beta).map(|n| n.text()),
        Some("Core offline.")
    );
}

#[test]
fn disabled_completion_is_respected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[completion]\nenabled = false\n");
    let config = ExecutiveConfig::load_from(&path).unwrap().unwrap();
    let settings = config
        .completion
        .as_ref()
        .unwrap()
        .resolve_with(|_| None)
        .unwrap();
    assert!(!settings.enabled);
}
