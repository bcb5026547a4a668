//! "POST, then reload or report" for the panel's mutation endpoints.

use std::sync::Arc;

use domain::dto::action::{ActionResponse, BulkStatusRequest};
use domain::dto::attempts::{AddAttemptRequest, UpdateAttemptsRequest};
use domain::dto::game::EditGameRequest;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::notify::Notification;
use crate::traits::{ActionEndpoint, Confirm, Notifier};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelAction {
    Publish { game_id: String },
    AutoRank { game_id: String },
    /// Picks the finalists of a field event from the qualifying round.
    SelectFinalists { game_id: String },
    RecalculateRaza { game_id: String },
    RecalculateHighJump { game_id: String },
    ToggleOfficial { game_id: String },
    EditGame { game_id: String, request: EditGameRequest },
    UpdateAttempts { result_id: String, request: UpdateAttemptsRequest },
    AddAttempt { result_id: String, request: AddAttemptRequest },
    DeleteResult { result_id: String },
    BulkUpdateStatus(BulkStatusRequest),
}

impl PanelAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Publish { .. } => "publish",
            Self::AutoRank { .. } => "auto-rank",
            Self::SelectFinalists { .. } => "select-finalists",
            Self::RecalculateRaza { .. } => "recalculate-raza",
            Self::RecalculateHighJump { .. } => "recalculate-high-jump",
            Self::ToggleOfficial { .. } => "toggle-official",
            Self::EditGame { .. } => "edit-game",
            Self::UpdateAttempts { .. } => "update-attempts",
            Self::AddAttempt { .. } => "add-attempt",
            Self::DeleteResult { .. } => "delete-result",
            Self::BulkUpdateStatus(_) => "bulk-update-status",
        }
    }

    /// Path relative to the panel base url.
    pub fn path(&self) -> String {
        match self {
            Self::Publish { game_id } => format!("/admin/games/{}/publish", game_id),
            Self::AutoRank { game_id } => format!("/admin/games/{}/auto-rank", game_id),
            Self::SelectFinalists { game_id } => {
                format!("/admin/games/{}/auto-rank-round1", game_id)
            }
            Self::RecalculateRaza { game_id } => {
                format!("/admin/games/{}/recalculate-raza", game_id)
            }
            Self::RecalculateHighJump { game_id } => {
                format!("/admin/games/{}/recalculate-high-jump", game_id)
            }
            Self::ToggleOfficial { game_id } => {
                format!("/admin/games/{}/toggle-official", game_id)
            }
            Self::EditGame { game_id, .. } => format!("/admin/games/{}/edit", game_id),
            Self::UpdateAttempts { result_id, .. } => {
                format!("/admin/results/{}/update-attempts", result_id)
            }
            Self::AddAttempt { result_id, .. } => {
                format!("/admin/results/{}/add-attempt", result_id)
            }
            Self::DeleteResult { result_id } => format!("/admin/results/{}/delete", result_id),
            Self::BulkUpdateStatus(_) => "/admin/results/bulk-update".to_string(),
        }
    }

    pub fn confirmation(&self) -> Option<String> {
        let prompt = match self {
            Self::AutoRank { .. } => "Auto-rank all results? This will update ranks automatically.",
            Self::SelectFinalists { .. } => {
                "Select finalists for final round based on qualifying attempts?"
            }
            Self::RecalculateRaza { .. } => "Recalculate all RAZA scores?",
            Self::RecalculateHighJump { .. } => {
                "Recalculate High Jump ranking with proper tie-breaking rules?"
            }
            Self::ToggleOfficial { .. } => {
                "Are you sure you want to change the official status of this entire game and ALL its results?"
            }
            Self::DeleteResult { .. } => "Delete this result?",
            Self::BulkUpdateStatus(request) => {
                return Some(format!(
                    "Update status to \"{}\" for {} result(s)?",
                    request.status,
                    request.result_ids.len()
                ));
            }
            Self::Publish { .. }
            | Self::EditGame { .. }
            | Self::UpdateAttempts { .. }
            | Self::AddAttempt { .. } => return None,
        };
        Some(prompt.to_string())
    }

    /// Local validation; a failing action is never sent.
    pub fn check(&self) -> Result<()> {
        match self {
            Self::EditGame { request, .. } => request.check()?,
            Self::AddAttempt { request, .. } => request.check()?,
            Self::BulkUpdateStatus(request) => request.check()?,
            _ => {}
        }
        Ok(())
    }

    pub fn body(&self) -> Result<Option<Value>> {
        let body = match self {
            Self::EditGame { request, .. } => Some(serde_json::to_value(request)?),
            Self::UpdateAttempts { request, .. } => Some(serde_json::to_value(request)?),
            Self::AddAttempt { request, .. } => Some(serde_json::to_value(request)?),
            Self::BulkUpdateStatus(request) => Some(serde_json::to_value(request)?),
            _ => None,
        };
        Ok(body)
    }

    /// Endpoints that only report failures treat a reply without `success`
    /// as a success.
    pub fn implicit_success(&self) -> bool {
        matches!(
            self,
            Self::Publish { .. }
                | Self::EditGame { .. }
                | Self::DeleteResult { .. }
                | Self::BulkUpdateStatus(_)
        )
    }

    /// Success toast, preferring the server's own message.
    pub fn success_message(&self, response: &ActionResponse) -> String {
        if let Some(message) = response.message.as_deref().filter(|m| !m.is_empty()) {
            return message.to_string();
        }

        match self {
            Self::Publish { .. } => "Publish status updated".to_string(),
            Self::AutoRank { .. } => "Results auto-ranked successfully!".to_string(),
            Self::SelectFinalists { .. } => "Finalists selected".to_string(),
            Self::RecalculateRaza { .. } => format!(
                "RAZA scores recalculated! Updated {} results.",
                response.updated.unwrap_or(0)
            ),
            Self::RecalculateHighJump { .. } => {
                "High Jump ranking recalculated successfully!".to_string()
            }
            Self::ToggleOfficial { .. } => "Official status updated".to_string(),
            Self::EditGame { .. } => "Game updated successfully!".to_string(),
            Self::UpdateAttempts { .. } => "Attempts updated successfully!".to_string(),
            Self::AddAttempt { .. } => "Attempt added successfully!".to_string(),
            Self::DeleteResult { .. } => "Result deleted successfully".to_string(),
            Self::BulkUpdateStatus(request) => {
                format!("Status updated for {} result(s)", request.result_ids.len())
            }
        }
    }

    /// Shown when the request itself failed.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::Publish { .. } => "Error updating publish status",
            Self::AutoRank { .. } => "Error auto-ranking results",
            Self::SelectFinalists { .. } => "Error selecting finalists",
            Self::RecalculateRaza { .. } => "Error recalculating RAZA scores",
            Self::RecalculateHighJump { .. } => "Error recalculating High Jump ranking",
            Self::ToggleOfficial { .. } => "Error changing official status",
            Self::EditGame { .. } => "Error updating game",
            Self::UpdateAttempts { .. } => "Error updating attempts",
            Self::AddAttempt { .. } => "Error adding attempt",
            Self::DeleteResult { .. } => "Error deleting result",
            Self::BulkUpdateStatus(_) => "Error updating result status",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The page should be reloaded to show the server's new state.
    Reload,
    /// A single row is gone; remove it without reloading.
    Removed(String),
    Cancelled,
    Failed(String),
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Reload | Self::Removed(_))
    }
}

pub struct ActionRunner {
    endpoint: Arc<dyn ActionEndpoint>,
    notifier: Arc<dyn Notifier>,
    confirm: Arc<dyn Confirm>,
}

impl ActionRunner {
    pub fn new(
        endpoint: Arc<dyn ActionEndpoint>,
        notifier: Arc<dyn Notifier>,
        confirm: Arc<dyn Confirm>,
    ) -> Self {
        Self {
            endpoint,
            notifier,
            confirm,
        }
    }

    /// Validates, asks for confirmation, then posts. Nothing is asked or
    /// sent for an invalid action.
    pub async fn run(&self, action: PanelAction) -> ActionOutcome {
        let body = match action.check().and_then(|_| action.body()) {
            Ok(body) => body,
            Err(e) => {
                let message = e.to_string();
                warn!("{} not sent: {}", action.name(), message);
                self.notifier.notify(Notification::error(message.clone()));
                return ActionOutcome::Failed(message);
            }
        };

        if let Some(prompt) = action.confirmation() {
            if !self.confirm.confirm(&prompt) {
                debug!("{} cancelled by operator", action.name());
                return ActionOutcome::Cancelled;
            }
        }

        let path = action.path();
        info!("Running {} ({})", action.name(), path);

        match self.endpoint.post_action(&path, body).await {
            Ok(response) if response.is_success(action.implicit_success()) => {
                self.notifier
                    .notify(Notification::success(action.success_message(&response)));
                match action {
                    PanelAction::DeleteResult { result_id } => ActionOutcome::Removed(result_id),
                    _ => ActionOutcome::Reload,
                }
            }
            Ok(response) => {
                let message = format!("Error: {}", response.error_text());
                warn!("{} rejected: {}", action.name(), message);
                self.notifier.notify(Notification::error(message.clone()));
                ActionOutcome::Failed(message)
            }
            Err(e) => {
                warn!("{} failed: {}", action.name(), e);
                let message = action.failure_message().to_string();
                self.notifier.notify(Notification::error(message.clone()));
                ActionOutcome::Failed(message)
            }
        }
    }
}
