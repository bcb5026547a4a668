//! Collaborators the panel components talk to.
//!
//! [`sources::panel::PanelClient`](crate::sources::panel::PanelClient) implements
//! the remote ones over HTTP; tests substitute in-memory fakes.

use domain::dto::action::ActionResponse;
use domain::dto::ranking::UpdateRankingRequest;
use domain::models::{Candidate, SearchQuery};
use serde_json::Value;

use crate::Result;
use crate::notify::Notification;

#[async_trait::async_trait]
pub trait CandidateSource: Send + Sync {
    /// Candidates for `query`, in whatever order the server chooses.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Candidate>>;
}

#[async_trait::async_trait]
pub trait RankPersistence: Send + Sync {
    async fn persist_ranking(
        &self,
        context_id: &str,
        request: &UpdateRankingRequest,
    ) -> Result<ActionResponse>;
}

#[async_trait::async_trait]
pub trait ActionEndpoint: Send + Sync {
    async fn post_action(&self, path: &str, body: Option<Value>) -> Result<ActionResponse>;
}

/// Surface for transient success/error messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Asks the operator to confirm a destructive or bulk action.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Named fields of the page hosting the components.
///
/// Components only rely on "a field with this name exists or does not".
pub trait HostForm: Send + Sync {
    fn field(&self, name: &str) -> Option<String>;

    /// Returns `false` when the form has no field called `name`.
    fn set_field(&self, name: &str, value: &str) -> bool;
}

/// Answers every prompt the same way.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}
