//! Client for the narrative completion service.
//!
//! The service takes a scenario id, the player's decision, and the selected
//! analysis cores, and answers with one narrative per core:
//!
//! ```text
//! POST <endpoint>
//! { "scenario": 4, "user_input": "...", "cores": ["alpha", "delta"] }
//!
//! 200 OK
//! { "alpha": "...", "delta": "..." }
//! ```
//!
//! The service is optional. [`CompletionClient::fetch_or_placeholder`] never
//! fails: anything that goes wrong is logged and every core without text
//! gets the placeholder instead.

pub mod retry;

use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

use executive_types::{
    AnalysisCore, CompletionRequest, CoreNarratives, sanitize_terminal_text,
};

pub use executive_types;

use crate::retry::{RetryConfig, RetryOutcome, send_with_retry};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_PLACEHOLDER: &str = "Analyzing...";

const CONNECT_TIMEOUT_SECS: u64 = 5;
const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_MAX_IDLE_PER_HOST: usize = 4;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

const MAX_RESPONSE_BYTES: usize = 1024 * 1024;
const MAX_ERROR_BODY_BYTES: usize = 4 * 1024;

/// Process-wide HTTP client.
pub fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        base_client_builder().build().unwrap_or_else(|e| {
            tracing::error!("Failed to build HTTP client: {e}. Falling back to defaults.");
            reqwest::Client::new()
        })
    })
}

fn base_client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .user_agent(concat!("executive/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),
    #[error("completion service unreachable after {attempts} attempt(s): {source}")]
    Connection {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },
    #[error("completion request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("completion service returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("completion response exceeded {limit} bytes")]
    TooLarge { limit: usize },
    #[error("completion response was not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("completion response was not a JSON object")]
    NotAnObject,
}

/// Narrative text per core, as returned by the service and sanitized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreResponses(BTreeMap<AnalysisCore, String>);

impl CoreResponses {
    /// Parse a JSON object of `core name -> text`.
    ///
    /// Unknown keys and non-string values are skipped.
    pub fn from_json(bytes: &[u8]) -> Result<Self, CompletionError> {
        let value: serde_json::Value =
            serde_json::from_slice(bytes).map_err(CompletionError::Decode)?;
        let serde_json::Value::Object(map) = value else {
            return Err(CompletionError::NotAnObject);
        };

        let mut responses = BTreeMap::new();
        for (key, value) in map {
            let Ok(core) = AnalysisCore::parse(&key) else {
                tracing::debug!(key = %key, "Ignoring unknown core in completion response");
                continue;
            };
            let Some(text) = value.as_str() else {
                tracing::debug!(core = %core, "Ignoring non-string narrative");
                continue;
            };
            responses.insert(core, sanitize_terminal_text(text).into_owned());
        }
        Ok(Self(responses))
    }

    #[must_use]
    pub fn get(&self, core: AnalysisCore) -> Option<&str> {
        self.0.get(&core).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
    retry: RetryConfig,
    placeholder: String,
}

impl CompletionClient {
    /// Client for `endpoint` using the shared HTTP client and default policy.
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: http_client().clone(),
            endpoint,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryConfig::default(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }

    #[must_use]
    pub fn with_http(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Upper bound on the whole exchange, retries and body included.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Ask the service for narratives.
    pub async fn request(
        &self,
        request: &CompletionRequest,
    ) -> Result<CoreResponses, CompletionError> {
        match tokio::time::timeout(self.timeout, self.exchange(request)).await {
            Ok(result) => result,
            Err(_) => Err(CompletionError::Timeout(self.timeout)),
        }
    }

    async fn exchange(&self, request: &CompletionRequest) -> Result<CoreResponses, CompletionError> {
        let outcome = send_with_retry(
            || self.http.post(self.endpoint.clone()).json(request),
            &self.retry,
        )
        .await;

        let response = match outcome {
            RetryOutcome::Success(response) => response,
            RetryOutcome::HttpError(response) => {
                let status = response.status();
                let body = read_capped_error_body(response).await;
                return Err(CompletionError::Status { status, body });
            }
            RetryOutcome::ConnectionError { attempts, source } => {
                return Err(CompletionError::Connection { attempts, source });
            }
            RetryOutcome::NonRetryable(source) => return Err(CompletionError::Request(source)),
        };

        let body = read_capped_body(response, MAX_RESPONSE_BYTES)
            .await?
            .ok_or(CompletionError::TooLarge {
                limit: MAX_RESPONSE_BYTES,
            })?;
        CoreResponses::from_json(&body)
    }

    /// Narratives for every selected core, substituting the placeholder for
    /// anything the service did not supply. Never fails.
    pub async fn fetch_or_placeholder(&self, request: &CompletionRequest) -> CoreNarratives {
        match self.request(request).await {
            Ok(responses) => {
                let merged = CoreNarratives::merge(
                    &request.cores,
                    |core| responses.get(core),
                    &self.placeholder,
                );
                tracing::debug!(
                    scenario = request.scenario.value(),
                    generated = merged.generated_count(),
                    cores = merged.len(),
                    "Completion narratives received"
                );
                merged
            }
            Err(err) => {
                tracing::warn!(
                    scenario = request.scenario.value(),
                    endpoint = %self.endpoint,
                    error = %err,
                    "Completion request failed; using placeholders"
                );
                CoreNarratives::placeholders(&request.cores, &self.placeholder)
            }
        }
    }
}

/// Read at most `limit` bytes. `Ok(None)` if the body is longer.
async fn read_capped_body(
    response: reqwest::Response,
    limit: usize,
) -> Result<Option<Vec<u8>>, CompletionError> {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(CompletionError::Request)?;
        if body.len() + chunk.len() > limit {
            return Ok(None);
        }
        body.extend_from_slice(&chunk);
    }
    Ok(Some(body))
}

/// Error bodies are for logs only: truncated, lossy, sanitized.
async fn read_capped_error_body(response: reqwest::Response) -> String {
    let mut body = Vec::new();
    let mut truncated = false;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            truncated = true;
            break;
        }
    }
    let text = String::from_utf8_lossy(&body);
    let text = sanitize_terminal_text(text.trim());
    if truncated {
        format!("{text}...(truncated)")
    } else {
        text.into_owned()
    }
}
