//! Server configuration
//!
//! Read once at startup from the process environment (after `.env` has been
//! loaded). A missing completion credential is fatal.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use meowchat::{DomainError, RetryPolicy};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 1;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// Catalog file; `None` uses the embedded catalog
    pub personas_path: Option<PathBuf>,
    pub bind_addr: SocketAddr,
    pub request_timeout: Duration,
    pub max_retries: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Build from an explicit variable map (used by `from_env` and tests)
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, DomainError> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get("OPENAI_API_KEY").ok_or_else(|| {
            DomainError::Configuration(
                "OPENAI_API_KEY must be set in the environment or .env file".to_string(),
            )
        })?;

        let base_url = get("OPENAI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let model = get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let personas_path = get("MEOWCHAT_PERSONAS").map(PathBuf::from);

        let bind_addr = get("MEOWCHAT_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| DomainError::Configuration(format!("MEOWCHAT_BIND_ADDR: {e}")))?;

        let timeout_secs = match get("MEOWCHAT_REQUEST_TIMEOUT_SECS") {
            Some(v) => v.parse::<u64>().map_err(|e| {
                DomainError::Configuration(format!("MEOWCHAT_REQUEST_TIMEOUT_SECS: {e}"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(DomainError::Configuration(
                "MEOWCHAT_REQUEST_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        let max_retries = match get("MEOWCHAT_MAX_RETRIES") {
            Some(v) => v
                .parse::<u32>()
                .map_err(|e| DomainError::Configuration(format!("MEOWCHAT_MAX_RETRIES: {e}")))?,
            None => DEFAULT_MAX_RETRIES,
        };

        Ok(Self {
            api_key,
            base_url,
            model,
            personas_path,
            bind_addr,
            request_timeout: Duration::from_secs(timeout_secs),
            max_retries,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, RETRY_BASE_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        // Config is not Debug: it holds the API key
        for env in [vars(&[]), vars(&[("OPENAI_API_KEY", "   ")])] {
            match Config::from_vars(env) {
                Err(DomainError::Configuration(_)) => {}
                _ => panic!("expected a configuration error"),
            }
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(vars(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert!(config.personas_path.is_none());
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 1);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(vars(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1/"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("MEOWCHAT_PERSONAS", "/etc/meowchat/personas.toml"),
            ("MEOWCHAT_BIND_ADDR", "0.0.0.0:8000"),
            ("MEOWCHAT_REQUEST_TIMEOUT_SECS", "5"),
            ("MEOWCHAT_MAX_RETRIES", "0"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(
            config.personas_path,
            Some(PathBuf::from("/etc/meowchat/personas.toml"))
        );
        assert_eq!(config.bind_addr.port(), 8000);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.retry_policy(), RetryPolicy::new(0, RETRY_BASE_DELAY));
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        for (key, value) in [
            ("MEOWCHAT_REQUEST_TIMEOUT_SECS", "soon"),
            ("MEOWCHAT_REQUEST_TIMEOUT_SECS", "0"),
            ("MEOWCHAT_MAX_RETRIES", "-1"),
            ("MEOWCHAT_BIND_ADDR", "not-an-addr"),
        ] {
            let result = Config::from_vars(vars(&[("OPENAI_API_KEY", "sk-test"), (key, value)]));
            assert!(result.is_err(), "{key}={value} should be rejected");
        }
    }
}
