use std::env;
use std::path::PathBuf;

use thiserror::Error;

pub const ENV_BACKEND: &str = "SERVICEDESK_BACKEND";
pub const ENV_API_BASE_URL: &str = "SERVICEDESK_API_BASE_URL";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "SERVICEDESK_REQUEST_TIMEOUT_MS";
pub const ENV_DATA_DIR: &str = "SERVICEDESK_DATA_DIR";
pub const ENV_SEED_PATH: &str = "SERVICEDESK_SEED_PATH";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

/// Floor for the request timeout so a typo cannot make every call fail
/// instantly.
const MIN_REQUEST_TIMEOUT_MS: u64 = 250;

/// Which persistence backend the desk talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    Remote,
    Local,
}

impl BackendMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Local => "local",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid SERVICEDESK_BACKEND: {0}")]
    InvalidBackendMode(String),
    #[error("invalid SERVICEDESK_API_BASE_URL: {0}")]
    InvalidApiBaseUrl(String),
    #[error("invalid SERVICEDESK_REQUEST_TIMEOUT_MS: {0}")]
    InvalidRequestTimeoutMs(String),
}

/// Runtime configuration for the desk, read from the environment with
/// sensible defaults for local development.
#[derive(Debug, Clone)]
pub struct DeskConfig {
    pub mode: BackendMode,
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    /// Directory for the local snapshot file; platform default when unset.
    pub data_dir: Option<PathBuf>,
    /// Seed document consulted on the first local load.
    pub seed_path: Option<PathBuf>,
}

impl DeskConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Self::from_env`] but with an injectable lookup, so tests
    /// never have to mutate process state.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mode = parse_with_lookup(&lookup, ENV_BACKEND, BackendMode::Remote, |raw| {
            parse_backend_mode(&raw)
        })?;
        let api_base_url = parse_with_lookup(
            &lookup,
            ENV_API_BASE_URL,
            DEFAULT_API_BASE_URL.to_string(),
            |raw| normalize_base_url(&raw),
        )?;
        let request_timeout_ms = parse_with_lookup(
            &lookup,
            ENV_REQUEST_TIMEOUT_MS,
            DEFAULT_REQUEST_TIMEOUT_MS,
            |raw| {
                raw.trim()
                    .parse::<u64>()
                    .map_err(|error| ConfigError::InvalidRequestTimeoutMs(error.to_string()))
                    .map(|value| value.max(MIN_REQUEST_TIMEOUT_MS))
            },
        )?;
        let data_dir = non_empty_path(lookup(ENV_DATA_DIR));
        let seed_path = non_empty_path(lookup(ENV_SEED_PATH));
        Ok(Self {
            mode,
            api_base_url,
            request_timeout_ms,
            data_dir,
            seed_path,
        })
    }
}

fn parse_with_lookup<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    parser: impl FnOnce(String) -> Result<T, ConfigError>,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => parser(raw),
        None => Ok(default),
    }
}

fn parse_backend_mode(raw: &str) -> Result<BackendMode, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "remote" | "api" => Ok(BackendMode::Remote),
        "local" | "fallback" => Ok(BackendMode::Local),
        other => Err(ConfigError::InvalidBackendMode(other.to_string())),
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidApiBaseUrl(
            "must not be empty".to_string(),
        ));
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidApiBaseUrl(format!(
            "must start with http:// or https://, got: {trimmed}"
        )));
    }
    let Some((_, host)) = trimmed.split_once("://") else {
        return Err(ConfigError::InvalidApiBaseUrl(trimmed.to_string()));
    };
    if host.trim().is_empty() || host.starts_with('/') {
        return Err(ConfigError::InvalidApiBaseUrl(format!(
            "missing host: {trimmed}"
        )));
    }
    Ok(trimmed.to_string())
}

fn non_empty_path(value: Option<String>) -> Option<PathBuf> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    // `use<>`: the closure owns its map, so the opaque type must not capture
    // the `pairs` borrow (callers hand in temporary arrays).
    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn lookup_outlives_the_pairs_it_was_built_from() {
        let lookup = {
            let pairs = [(ENV_BACKEND, "local")];
            lookup_from(&pairs)
        };
        assert_eq!(lookup(ENV_BACKEND), Some("local".to_string()));
        assert_eq!(lookup(ENV_API_BASE_URL), None);
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = DeskConfig::from_lookup(|_| None).expect("defaults should parse");
        assert_eq!(config.mode, BackendMode::Remote);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
        assert_eq!(config.data_dir, None);
        assert_eq!(config.seed_path, None);
    }

    #[test]
    fn overrides_are_parsed_and_normalized() {
        let lookup = lookup_from(&[
            (ENV_BACKEND, "Local"),
            (ENV_API_BASE_URL, "https://desk.example.com/api/"),
            (ENV_REQUEST_TIMEOUT_MS, "9000"),
            (ENV_DATA_DIR, "/tmp/desk-data"),
            (ENV_SEED_PATH, "/tmp/seed.json"),
        ]);
        let config = DeskConfig::from_lookup(lookup).expect("overrides should parse");
        assert_eq!(config.mode, BackendMode::Local);
        assert_eq!(config.api_base_url, "https://desk.example.com/api");
        assert_eq!(config.request_timeout_ms, 9000);
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/desk-data")));
        assert_eq!(config.seed_path, Some(PathBuf::from("/tmp/seed.json")));
    }

    #[test]
    fn timeout_is_clamped_to_the_floor() {
        let lookup = lookup_from(&[(ENV_REQUEST_TIMEOUT_MS, "1")]);
        let config = DeskConfig::from_lookup(lookup).expect("timeout should parse");
        assert_eq!(config.request_timeout_ms, 250);
    }

    #[test]
    fn unknown_backend_mode_is_rejected() {
        let lookup = lookup_from(&[(ENV_BACKEND, "paper")]);
        match DeskConfig::from_lookup(lookup) {
            Err(ConfigError::InvalidBackendMode(raw)) => assert_eq!(raw, "paper"),
            other => panic!("expected InvalidBackendMode, got {other:?}"),
        }
    }

    #[test]
    fn backend_mode_aliases_are_accepted() {
        for (raw, expected) in [
            ("remote", BackendMode::Remote),
            ("API", BackendMode::Remote),
            ("local", BackendMode::Local),
            ("fallback", BackendMode::Local),
        ] {
            let lookup = lookup_from(&[(ENV_BACKEND, raw)]);
            let config = DeskConfig::from_lookup(lookup).expect("mode should parse");
            assert_eq!(config.mode, expected, "raw mode {raw}");
        }
    }

    #[test]
    fn base_url_without_scheme_or_host_is_rejected() {
        for raw in ["desk.example.com", "ftp://desk.example.com", "http://", "http:///path", "   "] {
            let lookup = lookup_from(&[(ENV_API_BASE_URL, raw)]);
            match DeskConfig::from_lookup(lookup) {
                Err(ConfigError::InvalidApiBaseUrl(_)) => {}
                other => panic!("expected InvalidApiBaseUrl for {raw}, got {other:?}"),
            }
        }
    }

    #[test]
    fn non_numeric_timeout_is_rejected() {
        let lookup = lookup_from(&[(ENV_REQUEST_TIMEOUT_MS, "fast")]);
        match DeskConfig::from_lookup(lookup) {
            Err(ConfigError::InvalidRequestTimeoutMs(_)) => {}
            other => panic!("expected InvalidRequestTimeoutMs, got {other:?}"),
        }
    }

    #[test]
    fn blank_paths_collapse_to_none() {
        let lookup = lookup_from(&[(ENV_DATA_DIR, "   "), (ENV_SEED_PATH, "")]);
        let config = DeskConfig::from_lookup(lookup).expect("blank paths are fine");
        assert_eq!(config.data_dir, None);
        assert_eq!(config.seed_path, None);
    }
}
