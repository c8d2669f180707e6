//! Retry policy for completion requests.
//!
//! - Retries on connection errors, timeouts, and HTTP 408, 409, 429, 5xx.
//! - Exponential backoff from `initial_delay`, capped at `max_delay`, with
//!   down-jitter (multiplier in `[1 - jitter_factor, 1.0]`).
//! - A valid `Retry-After` / `Retry-After-Ms` replaces the computed delay,
//!   still capped at `max_delay`.
//! - `x-should-retry: true|false` from the server overrides the status rule.
//!
//! Every attempt carries `X-Request-Id` (one UUID shared by all attempts)
//! and `X-Attempt` (0 for the first send).

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{RequestBuilder, Response, StatusCode};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";
pub const ATTEMPT_HEADER: &str = "X-Attempt";

const RETRY_AFTER_CEILING: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// 0.25 means a delay may shrink by up to 25%.
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(2),
            jitter_factor: 0.25,
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Server-requested delay from `Retry-After-Ms` (float millis) or
/// `Retry-After` (integer seconds). Only values in `(0, 60s)` count.
#[must_use]
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let header = |name: &str| headers.get(name).and_then(|value| value.to_str().ok());

    let from_ms = header("retry-after-ms")
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|ms| ms.is_finite() && *ms > 0.0)
        .map(|ms| Duration::from_secs_f64(ms / 1000.0));
    let from_secs = || {
        header("retry-after")
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    };

    from_ms
        .or_else(from_secs)
        .filter(|delay| *delay > Duration::ZERO && *delay < RETRY_AFTER_CEILING)
}

/// Whether a non-success response should be retried.
#[must_use]
pub fn should_retry(status: StatusCode, headers: &HeaderMap) -> bool {
    let forced = headers
        .get("x-should-retry")
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        });
    if let Some(forced) = forced {
        return forced;
    }

    status.is_server_error()
        || matches!(
            status,
            StatusCode::REQUEST_TIMEOUT | StatusCode::CONFLICT | StatusCode::TOO_MANY_REQUESTS
        )
}

/// Delay before retry number `backoff_step + 1`.
#[must_use]
pub fn calculate_retry_delay(
    backoff_step: u32,
    config: &RetryConfig,
    headers: Option<&HeaderMap>,
) -> Duration {
    if let Some(requested) = headers.and_then(parse_retry_after) {
        return requested.min(config.max_delay);
    }

    let exponent = backoff_step.min(16) as i32;
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(exponent);
    let capped = base.min(config.max_delay.as_secs_f64());
    let jitter = 1.0 - rand::random::<f64>() * config.jitter_factor.clamp(0.0, 1.0);
    Duration::from_secs_f64(capped * jitter)
}

#[must_use]
pub fn new_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// How a retried send ended.
#[derive(Debug)]
pub enum RetryOutcome {
    /// 2xx.
    Success(Response),
    /// Non-2xx, either not retryable or out of attempts.
    HttpError(Response),
    /// Transport failure on the last permitted attempt.
    ConnectionError {
        attempts: u32,
        source: reqwest::Error,
    },
    /// Transport failure that retrying would not fix.
    NonRetryable(reqwest::Error),
}

impl RetryOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Send the request built by `build_request`, retrying per `config`.
///
/// `build_request` is called once per attempt.
pub async fn send_with_retry<F>(build_request: F, config: &RetryConfig) -> RetryOutcome
where
    F: Fn() -> RequestBuilder,
{
    let request_id = new_request_id();
    let last = config.max_retries;

    let mut attempt = 0;
    loop {
        let is_last = attempt >= last;
        let request = build_request()
            .header(REQUEST_ID_HEADER, &request_id)
            .header(ATTEMPT_HEADER, attempt.to_string());

        let delay = match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return RetryOutcome::Success(response);
                }
                if is_last || !should_retry(status, response.headers()) {
                    return RetryOutcome::HttpError(response);
                }
                let delay = calculate_retry_delay(attempt, config, Some(response.headers()));
                tracing::debug!(
                    status = %status,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis(),
                    "Retrying completion request after error status"
                );
                delay
            }
            Err(err) => {
                if !is_retryable_error(&err) {
                    return RetryOutcome::NonRetryable(err);
                }
                if is_last {
                    return RetryOutcome::ConnectionError {
                        attempts: attempt + 1,
                        source: err,
                    };
                }
                let delay = calculate_retry_delay(attempt, config, None);
                tracing::debug!(
                    error = %err,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis(),
                    "Retrying completion request after transport error"
                );
                delay
            }
        };

        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for &(name, value) in pairs {
            map.insert(name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn retry_after_ms_preferred() {
        let map = headers(&[("retry-after-ms", "1500"), ("retry-after", "5")]);
        assert_eq!(parse_retry_after(&map), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn retry_after_seconds() {
        let map = headers(&[("retry-after", "5")]);
        assert_eq!(parse_retry_after(&map), Some(Duration::from_secs(5)));
    }

    #[test]
    fn retry_after_out_of_range_ignored() {
        assert_eq!(parse_retry_after(&headers(&[("retry-after", "120")])), None);
        assert_eq!(parse_retry_after(&headers(&[("retry-after", "0")])), None);
        assert_eq!(
            parse_retry_after(&headers(&[("retry-after", "Wed, 21 Oct 2015 07:28:00 GMT")])),
            None
        );
    }

    #[test]
    fn retryable_statuses() {
        let none = HeaderMap::new();
        for status in [408, 409, 429, 500, 502, 503, 504, 599] {
            let status = StatusCode::from_u16(status).unwrap();
            assert!(should_retry(status, &none), "{status}");
        }
        for status in [400, 401, 404, 422] {
            let status = StatusCode::from_u16(status).unwrap();
            assert!(!should_retry(status, &none), "{status}");
        }
    }

    #[test]
    fn server_override_wins() {
        assert!(should_retry(
            StatusCode::BAD_REQUEST,
            &headers(&[("x-should-retry", "TRUE")])
        ));
        assert!(!should_retry(
            StatusCode::SERVICE_UNAVAILABLE,
            &headers(&[("x-should-retry", "false")])
        ));
    }

    #[test]
    fn backoff_doubles_within_jitter_band() {
        let config = RetryConfig::default();
        for _ in 0..100 {
            let first = calculate_retry_delay(0, &config, None);
            assert!(first >= Duration::from_micros(187_500));
            assert!(first <= Duration::from_millis(250));

            let second = calculate_retry_delay(1, &config, None);
            assert!(second >= Duration::from_millis(375));
            assert!(second <= Duration::from_millis(500));
        }
    }

    #[test]
    fn backoff_capped_at_max_delay() {
        let config = RetryConfig {
            jitter_factor: 0.0,
            ..RetryConfig::default()
        };
        assert_eq!(calculate_retry_delay(10, &config, None), config.max_delay);
        assert_eq!(calculate_retry_delay(u32::MAX, &config, None), config.max_delay);
    }

    #[test]
    fn retry_after_capped_at_max_delay() {
        let config = RetryConfig::default();
        let map = headers(&[("retry-after", "30")]);
        assert_eq!(calculate_retry_delay(0, &config, Some(&map)), config.max_delay);

        let short = headers(&[("retry-after-ms", "40")]);
        assert_eq!(
            calculate_retry_delay(0, &config, Some(&short)),
            Duration::from_millis(40)
        );
    }

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(new_request_id(), new_request_id());
    }
}
