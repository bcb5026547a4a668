//! Manual ranking with optimistic local renumbering.
//!
//! The local order is applied before the server hears about it and is never
//! rolled back: after a failed save the displayed order may differ from the
//! server until the page is reloaded. Callers that need strict consistency
//! reload on [`PersistOutcome::is_success`] being `false`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use domain::dto::action::ActionResponse;
use domain::dto::ranking::UpdateRankingRequest;
use domain::models::{RankedRow, RankingList};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::notify::Notification;
use crate::traits::{Notifier, RankPersistence};
use crate::{PanelError, Result};

#[derive(Debug, Clone)]
pub struct RankEditorConfig {
    /// Game whose results are being ranked.
    pub context_id: String,
    pub success_message: String,
    pub failure_message: String,
}

impl RankEditorConfig {
    pub fn new(context_id: impl Into<String>) -> Self {
        Self {
            context_id: context_id.into(),
            success_message: "Rankings updated".to_string(),
            failure_message: "Error updating rankings".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistState {
    Idle,
    PendingPersist,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Saved { message: Option<String> },
    /// The server answered but refused the ranking.
    Rejected { error: Option<String> },
    /// No usable answer from the server.
    Failed { error: String },
}

impl PersistOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }

    fn from_response(response: Result<ActionResponse>) -> Self {
        match response {
            Ok(response) if response.is_success(false) => Self::Saved {
                message: response.message,
            },
            Ok(response) => Self::Rejected {
                error: response.error.filter(|e| !e.is_empty()),
            },
            Err(e) => Self::Failed {
                error: e.to_string(),
            },
        }
    }
}

struct Inner {
    config: RankEditorConfig,
    persistence: Arc<dyn RankPersistence>,
    notifier: Arc<dyn Notifier>,
    list: Mutex<RankingList>,
    in_flight: AtomicUsize,
    last_outcome: Mutex<Option<PersistOutcome>>,
}

impl Inner {
    fn list(&self) -> MutexGuard<'_, RankingList> {
        self.list.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Controller for one drag-and-drop ranking table.
#[derive(Clone)]
pub struct RankEditor {
    inner: Arc<Inner>,
}

impl RankEditor {
    /// `row_ids` is the table's current top-to-bottom order.
    pub fn new<I, S>(
        config: RankEditorConfig,
        row_ids: I,
        persistence: Arc<dyn RankPersistence>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = RankingList::from_row_ids(row_ids)?;
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                persistence,
                notifier,
                list: Mutex::new(list),
                in_flight: AtomicUsize::new(0),
                last_outcome: Mutex::new(None),
            }),
        })
    }

    pub fn rows(&self) -> Vec<RankedRow> {
        self.inner.list().rows().to_vec()
    }

    pub fn rank_of(&self, row_id: &str) -> Option<u32> {
        self.inner.list().rank_of(row_id)
    }

    pub fn state(&self) -> PersistState {
        if self.inner.in_flight.load(Ordering::SeqCst) > 0 {
            PersistState::PendingPersist
        } else {
            PersistState::Idle
        }
    }

    pub fn last_outcome(&self) -> Option<PersistOutcome> {
        self.inner
            .last_outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Applies `new_order` locally, then saves it in the background.
    ///
    /// The returned handle resolves once the server has answered; the new
    /// ranks are visible through [`rows`](Self::rows) before this returns.
    pub fn on_reorder<S: AsRef<str>>(&self, new_order: &[S]) -> Result<JoinHandle<PersistOutcome>> {
        let rows = {
            let mut list = self.inner.list();
            match list.reorder(new_order) {
                Ok(rows) => rows.to_vec(),
                Err(e) => return Err(self.reject(e.into())),
            }
        };
        Ok(self.persist(rows))
    }

    /// Drag-and-drop variant of [`on_reorder`](Self::on_reorder) taking the
    /// old and new index of the moved row.
    pub fn on_move(&self, from: usize, to: usize) -> Result<JoinHandle<PersistOutcome>> {
        let rows = {
            let mut list = self.inner.list();
            match list.move_row(from, to) {
                Ok(rows) => rows.to_vec(),
                Err(e) => return Err(self.reject(e.into())),
            }
        };
        Ok(self.persist(rows))
    }

    /// Reports a finished save. Never touches the local order.
    pub fn on_persist_result(&self, outcome: &PersistOutcome) {
        let config = &self.inner.config;
        let notification = match outcome {
            PersistOutcome::Saved { message } => Notification::success(
                message
                    .clone()
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| config.success_message.clone()),
            ),
            PersistOutcome::Rejected { error: Some(error) } => {
                Notification::error(format!("Error: {}", error))
            }
            PersistOutcome::Rejected { error: None } | PersistOutcome::Failed { .. } => {
                Notification::error(config.failure_message.clone())
            }
        };

        self.inner.notifier.notify(notification);
        *self
            .inner
            .last_outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(outcome.clone());
    }

    fn reject(&self, error: PanelError) -> PanelError {
        warn!("Rejected reorder for game {}: {}", self.inner.config.context_id, error);
        self.inner
            .notifier
            .notify(Notification::error(error.to_string()));
        error
    }

    fn persist(&self, rows: Vec<RankedRow>) -> JoinHandle<PersistOutcome> {
        let request = UpdateRankingRequest::from(rows.as_slice());
        let editor = self.clone();
        self.inner.in_flight.fetch_add(1, Ordering::SeqCst);

        debug!(
            game = %self.inner.config.context_id,
            rows = request.rankings.len(),
            "Persisting manual ranking"
        );

        tokio::spawn(async move {
            let response = editor
                .inner
                .persistence
                .persist_ranking(&editor.inner.config.context_id, &request)
                .await;
            let outcome = PersistOutcome::from_response(response);

            editor.inner.in_flight.fetch_sub(1, Ordering::SeqCst);
            match &outcome {
                PersistOutcome::Saved { .. } => info!(
                    "Manual ranking saved for game {}",
                    editor.inner.config.context_id
                ),
                other => warn!(
                    "Manual ranking for game {} not saved: {:?}",
                    editor.inner.config.context_id, other
                ),
            }
            editor.on_persist_result(&outcome);
            outcome
        })
    }
}

impl std::fmt::Debug for RankEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankEditor")
            .field("config", &self.inner.config)
            .field("rows", &self.rows())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{MemoryNotifier, NotificationLevel};
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Replies with the queued responses in order, each after `latency`.
    #[derive(Default)]
    struct FakePersistence {
        requests: Mutex<Vec<(String, UpdateRankingRequest)>>,
        replies: Mutex<VecDeque<(Duration, Result<ActionResponse>)>>,
    }

    impl FakePersistence {
        fn replying(replies: Vec<(Duration, Result<ActionResponse>)>) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                replies: Mutex::new(replies.into()),
            })
        }

        fn requests(&self) -> Vec<(String, UpdateRankingRequest)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl RankPersistence for FakePersistence {
        async fn persist_ranking(
            &self,
            context_id: &str,
            request: &UpdateRankingRequest,
        ) -> Result<ActionResponse> {
            self.requests
                .lock()
                .unwrap()
                .push((context_id.to_string(), request.clone()));
            let (latency, reply) = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or((Duration::ZERO, Ok(ActionResponse::default())));
            tokio::time::sleep(latency).await;
            reply
        }
    }

    fn ok() -> Result<ActionResponse> {
        Ok(ActionResponse {
            success: Some(true),
            ..ActionResponse::default()
        })
    }

    fn order(editor: &RankEditor) -> Vec<(String, u32)> {
        editor
            .rows()
            .into_iter()
            .map(|row| (row.row_id, row.rank))
            .collect()
    }

    fn pairs(expected: &[(&str, u32)]) -> Vec<(String, u32)> {
        expected
            .iter()
            .map(|(id, rank)| (id.to_string(), *rank))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_ranks_update_before_server_answers() {
        let persistence = FakePersistence::replying(vec![(Duration::from_secs(1), ok())]);
        let notifier = Arc::new(MemoryNotifier::new());
        let editor = RankEditor::new(
            RankEditorConfig::new("42"),
            ["A", "B", "C"],
            persistence.clone(),
            notifier.clone(),
        )
        .unwrap();

        let handle = editor.on_reorder(&["C", "A", "B"]).unwrap();

        assert_eq!(order(&editor), pairs(&[("C", 1), ("A", 2), ("B", 3)]));
        assert_eq!(editor.state(), PersistState::PendingPersist);
        assert!(notifier.notifications().is_empty());

        let outcome = handle.await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(editor.state(), PersistState::Idle);
        assert_eq!(
            notifier.last(),
            Some(Notification::success("Rankings updated"))
        );

        let requests = persistence.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "42");
        let sent: Vec<(String, u32)> = requests[0]
            .1
            .rankings
            .iter()
            .map(|entry| (entry.result_id.clone(), entry.rank))
            .collect();
        assert_eq!(sent, pairs(&[("C", 1), ("A", 2), ("B", 3)]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_save_keeps_local_order() {
        let persistence = FakePersistence::replying(vec![(
            Duration::from_millis(200),
            Err(PanelError::ServerError {
                status: 502,
                message: "bad gateway".to_string(),
            }),
        )]);
        let notifier = Arc::new(MemoryNotifier::new());
        let editor = RankEditor::new(
            RankEditorConfig::new("42"),
            ["A", "B", "C"],
            persistence,
            notifier.clone(),
        )
        .unwrap();

        let outcome = editor.on_reorder(&["C", "A", "B"]).unwrap().await.unwrap();

        assert!(matches!(outcome, PersistOutcome::Failed { .. }));
        assert_eq!(order(&editor), pairs(&[("C", 1), ("A", 2), ("B", 3)]));
        assert_eq!(
            notifier.last(),
            Some(Notification::error("Error updating rankings"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_error_is_surfaced_verbatim() {
        let persistence = FakePersistence::replying(vec![(
            Duration::ZERO,
            Ok(ActionResponse {
                success: Some(false),
                error: Some("Game is official".to_string()),
                ..ActionResponse::default()
            }),
        )]);
        let notifier = Arc::new(MemoryNotifier::new());
        let editor = RankEditor::new(
            RankEditorConfig::new("7"),
            ["A", "B"],
            persistence,
            notifier.clone(),
        )
        .unwrap();

        editor.on_move(1, 0).unwrap().await.unwrap();

        assert_eq!(editor.rank_of("B"), Some(1));
        assert_eq!(
            notifier.last(),
            Some(Notification::error("Error: Game is official"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_reorder_supersedes_without_cancelling() {
        let persistence = FakePersistence::replying(vec![
            (Duration::from_millis(500), ok()),
            (
                Duration::from_millis(100),
                Ok(ActionResponse {
                    success: Some(true),
                    message: Some("Saved again".to_string()),
                    ..ActionResponse::default()
                }),
            ),
        ]);
        let notifier = Arc::new(MemoryNotifier::new());
        let editor = RankEditor::new(
            RankEditorConfig::new("9"),
            ["A", "B", "C"],
            persistence.clone(),
            notifier.clone(),
        )
        .unwrap();

        let first = editor.on_reorder(&["B", "A", "C"]).unwrap();
        let second = editor.on_reorder(&["C", "B", "A"]).unwrap();
        assert_eq!(order(&editor), pairs(&[("C", 1), ("B", 2), ("A", 3)]));

        second.await.unwrap();
        assert_eq!(editor.state(), PersistState::PendingPersist);
        first.await.unwrap();
        assert_eq!(editor.state(), PersistState::Idle);

        assert_eq!(persistence.requests().len(), 2);
        let messages: Vec<String> = notifier
            .notifications()
            .into_iter()
            .map(|n| n.message)
            .collect();
        assert_eq!(messages, vec!["Saved again", "Rankings updated"]);
        // The earlier save answered last, but the local order stays the newest one.
        assert_eq!(order(&editor), pairs(&[("C", 1), ("B", 2), ("A", 3)]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_reorder_is_not_sent() {
        let persistence = FakePersistence::replying(Vec::new());
        let notifier = Arc::new(MemoryNotifier::new());
        let editor = RankEditor::new(
            RankEditorConfig::new("1"),
            ["A", "B", "C"],
            persistence.clone(),
            notifier.clone(),
        )
        .unwrap();

        assert!(editor.on_reorder(&["A", "B", "X"]).is_err());
        assert!(editor.on_move(0, 9).is_err());

        assert!(persistence.requests().is_empty());
        assert_eq!(order(&editor), pairs(&[("A", 1), ("B", 2), ("C", 3)]));
        let notes = notifier.notifications();
        assert_eq!(notes.len(), 2);
        assert!(notes.iter().all(|n| n.level == NotificationLevel::Error));
    }

    #[tokio::test]
    async fn test_duplicate_rows_rejected_at_construction() {
        let result = RankEditor::new(
            RankEditorConfig::new("1"),
            ["A", "A"],
            FakePersistence::replying(Vec::new()),
            Arc::new(MemoryNotifier::new()),
        );
        assert!(matches!(result, Err(PanelError::DomainError(_))));
    }
}
