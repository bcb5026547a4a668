use domain::dto::action::ActionResponse;
use domain::dto::ranking::UpdateRankingRequest;
use domain::dto::search::parse_candidates;
use domain::models::{Candidate, SearchQuery};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, COOKIE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::PanelConfig;
use crate::error::{PanelError, Result};

const CSRF_HEADER: &str = "X-CSRFToken";
const MAX_ERROR_BODY: usize = 200;

pub struct PanelClient {
    config: PanelConfig,
    client: reqwest::Client,
}

impl PanelClient {
    pub fn new(config: PanelConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(cookie) = &config.session_cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| PanelError::ConfigError(format!("Invalid session cookie: {}", e)))?;
            headers.insert(COOKIE, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("results-panel/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub async fn search_candidates(&self, query: &SearchQuery) -> Result<Vec<Candidate>> {
        let url = self.config.url("/admin/athletes/search");

        let mut params: Vec<(&str, &str)> = vec![("q", query.text.as_str())];
        if let Some(event) = &query.event {
            params.push(("event", event.as_str()));
        }
        if query.guides_only {
            params.push(("guides", "1"));
        }

        let response = self.client.get(&url).query(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(server_error(status, &body));
        }

        let payload = response.json::<Value>().await?;
        Ok(parse_candidates(payload))
    }

    pub async fn update_manual_ranking(
        &self,
        game_id: &str,
        request: &UpdateRankingRequest,
    ) -> Result<ActionResponse> {
        let path = format!("/admin/games/{}/update-manual-ranking", game_id);
        self.post(&path, Some(request)).await
    }

    /// POSTs `body` as JSON and reads the endpoint's `{success, error, ...}` reply.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<ActionResponse> {
        let url = self.config.url(path);
        let mut request = self.client.post(&url);
        if let Some(token) = &self.config.csrf_token {
            request = request.header(CSRF_HEADER, token);
        }
        request = match body {
            Some(body) => request.json(body),
            None => request.json(&serde_json::json!({})),
        };

        debug!("POST {}", url);
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        read_action_response(status, &text)
    }
}

/// Error statuses with a readable body keep the server's `error` string.
/// A 2xx reply that is not JSON (a redirect to an HTML page) leaves the
/// outcome to the caller's implicit-success rule.
fn read_action_response(status: StatusCode, body: &str) -> Result<ActionResponse> {
    match serde_json::from_str::<ActionResponse>(body) {
        Ok(mut response) => {
            if !status.is_success() && response.success.is_none() && response.error.is_none() {
                return Err(server_error(status, body));
            }
            if !status.is_success() {
                response.success = Some(false);
            }
            Ok(response)
        }
        Err(_) if status.is_success() => {
            if !body.trim().is_empty() {
                warn!("Non-JSON reply with status {}", status);
            }
            Ok(ActionResponse::default())
        }
        Err(_) => Err(server_error(status, body)),
    }
}

fn server_error(status: StatusCode, body: &str) -> PanelError {
    let message = match body.trim() {
        "" => status
            .canonical_reason()
            .unwrap_or("Unknown status")
            .to_string(),
        text => text.chars().take(MAX_ERROR_BODY).collect(),
    };
    PanelError::ServerError {
        status: status.as_u16(),
        message,
    }
}
