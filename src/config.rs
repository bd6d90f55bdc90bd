//! read client configuration from a file, the environment, or explicit values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::errors::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";
pub const DEFAULT_USER_AGENT: &str = "blog-client-rust/0.1.0";

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    /// Where the token pair is persisted between runs. `None` keeps it in memory.
    #[serde(default)]
    pub session_file: Option<PathBuf>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_refresh_path() -> String {
    DEFAULT_REFRESH_PATH.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl Config {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            refresh_path: default_refresh_path(),
            session_file: None,
            user_agent: default_user_agent(),
        }
    }

    /// Build a config from explicit values, mostly for tests and embedding.
    pub fn from_values(
        base_url: impl Into<String>,
        timeout_secs: Option<u64>,
        refresh_path: Option<String>,
        session_file: Option<PathBuf>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            refresh_path: refresh_path.unwrap_or_else(default_refresh_path),
            session_file,
            user_agent: default_user_agent(),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// # ENV Vars
    /// * `BLOG_API_BASE_URL` - API root, defaults to `http://localhost:8080/api`
    /// * `BLOG_API_TIMEOUT_SECS` - per-call timeout, defaults to 10
    /// * `BLOG_API_SESSION_FILE` - optional path for persisted tokens
    pub fn from_env() -> Result<Self, Error> {
        let base_url =
            std::env::var("BLOG_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout_secs = match std::env::var("BLOG_API_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse().map_err(|_| {
                Error::Config(format!("Invalid BLOG_API_TIMEOUT_SECS value '{}'", raw))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        let session_file = std::env::var("BLOG_API_SESSION_FILE").ok().map(PathBuf::from);
        Ok(Self::from_values(base_url, Some(timeout_secs), None, session_file))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parses and normalizes the base URL so paths can be appended to it.
    pub(crate) fn validated_base_url(&self) -> Result<String, Error> {
        let trimmed = self.base_url.trim_end_matches('/');
        reqwest::Url::parse(trimmed).map_err(|e| {
            Error::Config(format!("Invalid API base URL '{}': {}", self.base_url, e))
        })?;
        Ok(trimmed.to_string())
    }

    /// Refresh endpoint path, without a trailing slash. Must be non-empty and
    /// start with `/` so suffix checks only ever match whole path segments.
    pub(crate) fn validated_refresh_path(&self) -> Result<String, Error> {
        let trimmed = self.refresh_path.trim_end_matches('/');
        if trimmed.is_empty() || !trimmed.starts_with('/') {
            return Err(Error::Config(format!(
                "Invalid refresh path '{}': expected a non-empty path starting with '/'",
                self.refresh_path
            )));
        }
        Ok(trimmed.to_string())
    }
}
