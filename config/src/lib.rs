//! Configuration for Executive.
//!
//! Read from `~/.executive/config.toml`. Every section and key is optional;
//! a missing file means defaults everywhere.
//!
//! ```toml
//! [completion]
//! enabled = true
//! endpoint = "${EXECUTIVE_HOST}/api/generate-responses"
//! timeout_secs = 15
//! max_retries = 1
//! placeholder = "Analyzing..."
//!
//! [app]
//! ascii_only = false
//! ```

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/api/generate-responses";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_MAX_RETRIES: u32 = 1;
pub const DEFAULT_PLACEHOLDER: &str = "Analyzing...";
/// Overrides `completion.endpoint` when set and non-empty.
pub const ENDPOINT_ENV: &str = "EXECUTIVE_COMPLETION_URL";

const MAX_RETRIES_CAP: u32 = 5;

const fn default_true() -> bool {
    true
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid completion endpoint {value:?}: {source}")]
    InvalidEndpoint {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

impl ConfigError {
    /// File the error came from, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => Some(path),
            ConfigError::InvalidEndpoint { .. } => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ExecutiveConfig {
    pub app: Option<AppConfig>,
    pub completion: Option<CompletionConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Plain ASCII output only (no box-drawing or em-dashes).
    #[serde(default)]
    pub ascii_only: bool,
}

/// Raw `[completion]` table.
#[derive(Debug, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub placeholder: Option<String>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: None,
            timeout_secs: None,
            max_retries: None,
            placeholder: None,
        }
    }
}

/// `[completion]` with defaults filled in and the endpoint validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSettings {
    pub enabled: bool,
    pub endpoint: Url,
    pub timeout: Duration,
    pub max_retries: u32,
    pub placeholder: String,
}

impl CompletionSettings {
    /// Defaults with no file and no environment.
    pub fn defaults() -> Result<Self, ConfigError> {
        CompletionConfig::default().resolve_with(|_| None)
    }
}

impl CompletionConfig {
    /// Resolve against the process environment.
    pub fn resolve(&self) -> Result<CompletionSettings, ConfigError> {
        self.resolve_with(|name| env::var(name).ok())
    }

    /// Resolve using `lookup` for `${VAR}` expansion and the endpoint override.
    pub fn resolve_with<F>(&self, lookup: F) -> Result<CompletionSettings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = lookup(ENDPOINT_ENV).filter(|value| !value.trim().is_empty());
        let raw = match (&from_env, &self.endpoint) {
            (Some(value), _) => value.trim().to_string(),
            (None, Some(value)) => expand_with(value, &lookup).trim().to_string(),
            (None, None) => DEFAULT_ENDPOINT.to_string(),
        };
        let endpoint = Url::parse(&raw).map_err(|source| ConfigError::InvalidEndpoint {
            value: raw.clone(),
            source,
        })?;

        let timeout_secs = match self.timeout_secs {
            Some(0) | None => DEFAULT_TIMEOUT_SECS,
            Some(secs) => secs,
        };

        let max_retries = self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES);
        if max_retries > MAX_RETRIES_CAP {
            tracing::warn!(
                configured = max_retries,
                cap = MAX_RETRIES_CAP,
                "completion.max_retries capped"
            );
        }

        let placeholder = self
            .placeholder
            .as_deref()
            .map(|value| expand_with(value, &lookup))
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_string());

        Ok(CompletionSettings {
            enabled: self.enabled,
            endpoint,
            timeout: Duration::from_secs(timeout_secs),
            max_retries: max_retries.min(MAX_RETRIES_CAP),
            placeholder,
        })
    }
}

/// Replace `${NAME}` with the value of environment variable `NAME`.
///
/// Unset variables expand to the empty string. An unterminated `${` is kept
/// verbatim.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    expand_with(value, |name| env::var(name).ok())
}

fn expand_with<F>(value: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(open) = rest.find("${") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let name = &after[..close];
        if !name.is_empty()
            && let Some(found) = lookup(name)
        {
            out.push_str(&found);
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

impl ExecutiveConfig {
    /// Load from the default location. `Ok(None)` when there is no file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    /// Load from `path`. `Ok(None)` when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                tracing::warn!(path = %path.display(), error = %source, "Failed to read config");
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        toml::from_str(&content).map(Some).map_err(|source| {
            tracing::warn!(path = %path.display(), error = %source, "Failed to parse config");
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    #[must_use]
    pub fn ascii_only(&self) -> bool {
        self.app.as_ref().is_some_and(|app| app.ascii_only)
    }

    pub fn completion_settings(&self) -> Result<CompletionSettings, ConfigError> {
        match &self.completion {
            Some(completion) => completion.resolve(),
            None => CompletionConfig::default().resolve(),
        }
    }
}

/// `~/.executive`, the root for the config file and logs.
#[must_use]
pub fn executive_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".executive"))
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    executive_dir().map(|dir| dir.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    fn no_env() -> impl Fn(&str) -> Option<String> {
        env_of(&[])
    }

    #[test]
    fn expand_plain_text_unchanged() {
        assert_eq!(expand_with("hello world", no_env()), "hello world");
    }

    #[test]
    fn expand_single_and_adjacent_vars() {
        let env = env_of(&[("HOST", "10.0.0.2"), ("PORT", "5000")]);
        assert_eq!(
            expand_with("http://${HOST}:${PORT}/api", &env),
            "http://10.0.0.2:5000/api"
        );
        assert_eq!(expand_with("${HOST}${PORT}", &env), "10.0.0.25000");
    }

    #[test]
    fn expand_missing_var_is_empty() {
        assert_eq!(expand_with("a ${NOPE} b", no_env()), "a  b");
    }

    #[test]
    fn expand_env_vars_reads_process_env() {
        assert_eq!(
            expand_env_vars("[${EXECUTIVE_TEST_SURELY_UNSET_VAR}]"),
            "[]"
        );
    }

    #[test]
    fn expand_unclosed_brace_kept() {
        assert_eq!(expand_with("test ${UNCLOSED", no_env()), "test ${UNCLOSED");
    }

    #[test]
    fn expand_empty_name_dropped() {
        assert_eq!(expand_with("x ${} y", no_env()), "x  y");
    }

    #[test]
    fn expand_keeps_multibyte_text() {
        let env = env_of(&[("SIGIL", "\u{1f980}")]);
        assert_eq!(expand_with("\u{e9}t\u{e9} ${SIGIL}!", &env), "\u{e9}t\u{e9} \u{1f980}!");
    }

    #[test]
    fn defaults_when_section_missing() {
        let settings = CompletionSettings::defaults().unwrap();
        assert!(settings.enabled);
        assert_eq!(settings.endpoint.as_str(), DEFAULT_ENDPOINT);
        assert_eq!(settings.timeout, Duration::from_secs(15));
        assert_eq!(settings.max_retries, 1);
        assert_eq!(settings.placeholder, "Analyzing...");
    }

    #[test]
    fn file_values_override_defaults() {
        let config: ExecutiveConfig = toml::from_str(
            r#"
            [completion]
            enabled = false
            endpoint = "http://${HOST}/generate"
            timeout_secs = 3
            max_retries = 0
            placeholder = "Standing by."

            [app]
            ascii_only = true
            "#,
        )
        .unwrap();
        assert!(config.ascii_only());

        let settings = config
            .completion
            .unwrap()
            .resolve_with(env_of(&[("HOST", "sim.local:8080")]))
            .unwrap();
        assert!(!settings.enabled);
        assert_eq!(settings.endpoint.as_str(), "http://sim.local:8080/generate");
        assert_eq!(settings.timeout, Duration::from_secs(3));
        assert_eq!(settings.max_retries, 0);
        assert_eq!(settings.placeholder, "Standing by.");
    }

    #[test]
    fn env_endpoint_wins_over_file() {
        let completion = CompletionConfig {
            endpoint: Some("http://from-file/api".to_string()),
            ..CompletionConfig::default()
        };
        let settings = completion
            .resolve_with(env_of(&[(ENDPOINT_ENV, " http://from-env:9000/api ")]))
            .unwrap();
        assert_eq!(settings.endpoint.as_str(), "http://from-env:9000/api");

        let blank = completion
            .resolve_with(env_of(&[(ENDPOINT_ENV, "  ")]))
            .unwrap();
        assert_eq!(blank.endpoint.as_str(), "http://from-file/api");
    }

    #[test]
    fn zero_timeout_and_blank_placeholder_use_defaults() {
        let completion = CompletionConfig {
            timeout_secs: Some(0),
            placeholder: Some("   ".to_string()),
            max_retries: Some(50),
            ..CompletionConfig::default()
        };
        let settings = completion.resolve_with(no_env()).unwrap();
        assert_eq!(settings.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(settings.placeholder, DEFAULT_PLACEHOLDER);
        assert_eq!(settings.max_retries, MAX_RETRIES_CAP);
    }

    #[test]
    fn invalid_endpoint_is_reported() {
        let completion = CompletionConfig {
            endpoint: Some("not a url".to_string()),
            ..CompletionConfig::default()
        };
        let err = completion.resolve_with(no_env()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
        assert!(err.path().is_none());
    }

    #[test]
    fn load_from_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = ExecutiveConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[app]\nascii_only = true\n").unwrap();

        let config = ExecutiveConfig::load_from(&path).unwrap().unwrap();
        assert!(config.ascii_only());
        assert!(config.completion.is_none());
    }

    #[test]
    fn load_from_bad_toml_carries_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[completion\nenabled = ").unwrap();

        let err = ExecutiveConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.path(), Some(path.as_path()));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn load_from_directory_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ExecutiveConfig::load_from(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
