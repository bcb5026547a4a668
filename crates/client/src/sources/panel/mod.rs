mod client;

pub use client::PanelClient;

use domain::dto::action::ActionResponse;
use domain::dto::ranking::UpdateRankingRequest;
use domain::models::{Candidate, SearchQuery};
use serde_json::Value;
use tracing::debug;

use crate::Result;
use crate::traits::{ActionEndpoint, CandidateSource, RankPersistence};

#[async_trait::async_trait]
impl CandidateSource for PanelClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Candidate>> {
        let candidates = self.search_candidates(query).await?;
        debug!("Search '{}' returned {} candidates", query.text, candidates.len());
        Ok(candidates)
    }
}

#[async_trait::async_trait]
impl RankPersistence for PanelClient {
    async fn persist_ranking(
        &self,
        context_id: &str,
        request: &UpdateRankingRequest,
    ) -> Result<ActionResponse> {
        self.update_manual_ranking(context_id, request).await
    }
}

#[async_trait::async_trait]
impl ActionEndpoint for PanelClient {
    async fn post_action(&self, path: &str, body: Option<Value>) -> Result<ActionResponse> {
        self.post(path, body.as_ref()).await
    }
}
