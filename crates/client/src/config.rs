use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the administration panel server.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    pub base_url: String,
    /// Sent as `X-CSRFToken` on every mutation.
    pub csrf_token: Option<String>,
    /// Raw `Cookie` header value of an authenticated admin session.
    pub session_cookie: Option<String>,
    pub search_debounce: Duration,
    pub timeout: Duration,
}

impl PanelConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            csrf_token: None,
            session_cookie: None,
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Reads the environment, with `base_url` taking precedence over `PANEL_BASE_URL`.
    pub fn load(base_url: Option<String>) -> Result<Self> {
        let base_url = match base_url {
            Some(url) => url,
            None => std::env::var("PANEL_BASE_URL")
                .context("Cannot load PANEL_BASE_URL env variable")?,
        };

        let mut config = Self::new(base_url);
        config.csrf_token = non_empty_var("PANEL_CSRF_TOKEN");
        config.session_cookie = non_empty_var("PANEL_SESSION_COOKIE");

        if let Some(ms) = non_empty_var("PANEL_SEARCH_DEBOUNCE_MS") {
            let ms: u64 = ms
                .parse()
                .context("PANEL_SEARCH_DEBOUNCE_MS must be a number of milliseconds")?;
            config.search_debounce = Duration::from_millis(ms);
        }
        if let Some(secs) = non_empty_var("PANEL_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .context("PANEL_TIMEOUT_SECS must be a number of seconds")?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
