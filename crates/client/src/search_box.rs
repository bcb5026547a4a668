//! Debounced remote search bound to one form field.
//!
//! Each [`SearchBox`] owns its own debounce timer and request sequence. Input
//! shorter than [`MIN_QUERY_LEN`](domain::models::MIN_QUERY_LEN) never reaches
//! the server. Every request that does go out is tagged with the generation it
//! was issued in; a reply is only rendered if no newer request was issued (and
//! no selection or short input happened) in the meantime, so a slow stale
//! response can never overwrite a newer one.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use domain::models::search_query::is_searchable;
use domain::models::{Candidate, Compatibility, CompatibilityContext, SearchQuery, Selection};
use domain::services::{Classification, classify};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::Result;
use crate::debounce::Debouncer;
use crate::outside_click::{Dismissable, PointerTarget};
use crate::traits::{CandidateSource, HostForm};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

pub const NO_RESULTS_TEXT: &str = "No athletes found";
pub const SEARCH_FAILED_TEXT: &str = "Search failed";

/// Typed replacement for the element ids and data attributes a search box is bound to.
#[derive(Debug, Clone)]
pub struct SearchBoxConfig {
    pub input_id: String,
    pub results_container_id: String,
    /// Hidden field receiving the selected candidate's id.
    pub target_field: String,
    /// Fields reset whenever a selection is made, e.g. the guide of a newly chosen athlete.
    pub clears_on_select: Vec<String>,
    /// Field receiving the guide id of a start list selection.
    pub guide_field: Option<String>,
    /// Event name sent with every query.
    pub context_filter: Option<String>,
    pub compatibility: CompatibilityContext,
    pub guides_only: bool,
    pub debounce: Duration,
}

impl SearchBoxConfig {
    pub fn new(
        input_id: impl Into<String>,
        results_container_id: impl Into<String>,
        target_field: impl Into<String>,
    ) -> Self {
        Self {
            input_id: input_id.into(),
            results_container_id: results_container_id.into(),
            target_field: target_field.into(),
            clears_on_select: Vec::new(),
            guide_field: None,
            context_filter: None,
            compatibility: CompatibilityContext::default(),
            guides_only: false,
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    /// Primary athlete search; picking an athlete clears any previously chosen guide.
    pub fn athlete() -> Self {
        let mut config = Self::new("athleteSearch", "athleteResults", "selectedSdms");
        config.clears_on_select = vec!["selectedGuideSdms".to_string()];
        config.guide_field = Some("selectedGuideSdms".to_string());
        config
    }

    pub fn guide() -> Self {
        let mut config = Self::new("guideSearch", "guideResults", "selectedGuideSdms");
        config.guides_only = true;
        config
    }

    pub fn with_context_filter(mut self, event: impl Into<String>) -> Self {
        self.context_filter = Some(event.into());
        self
    }

    pub fn with_compatibility(mut self, compatibility: CompatibilityContext) -> Self {
        self.compatibility = compatibility;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

/// What the result panel under the input currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResultPanel {
    #[default]
    Hidden,
    NoResults,
    Results(Classification),
    /// Single error entry; the panel is still revealed.
    Failed(String),
}

impl ResultPanel {
    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::Hidden)
    }

    pub fn classification(&self) -> Option<&Classification> {
        match self {
            Self::Results(classification) => Some(classification),
            _ => None,
        }
    }
}

/// Result of committing a candidate into the target field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selected {
    pub selection: Selection,
    pub compatibility: Compatibility,
    /// Warning shown under the selection, `None` when compatible.
    pub banner: Option<String>,
    /// `false` when the host form has no field with the configured name.
    pub field_written: bool,
}

#[derive(Debug, Default)]
struct SearchState {
    query_text: String,
    /// Bumped on every issued request, selection and short input.
    generation: u64,
    selection: Option<Selection>,
    banner: Option<String>,
}

struct Inner {
    config: SearchBoxConfig,
    source: Arc<dyn CandidateSource>,
    form: Arc<dyn HostForm>,
    state: Mutex<SearchState>,
    panel: watch::Sender<ResultPanel>,
    debouncer: Debouncer,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, SearchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn show(&self, next: ResultPanel) {
        self.panel.send_if_modified(|panel| {
            if *panel == next {
                false
            } else {
                *panel = next;
                true
            }
        });
    }

    /// Runs when the debounce delay elapses.
    fn fire(self: &Arc<Self>, query: SearchQuery) {
        let seq = {
            let mut state = self.state();
            if !is_searchable(&state.query_text) {
                debug!("Input shrank below minimum length before firing, skipping search");
                return;
            }
            state.generation += 1;
            state.generation
        };

        debug!(seq, query = %query.text, "Issuing candidate search");
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            let result = inner.source.search(&query).await;
            inner.apply(seq, &query.text, result);
        });
    }

    fn apply(&self, seq: u64, query: &str, result: Result<Vec<Candidate>>) -> bool {
        let state = self.state();
        if seq != state.generation {
            debug!(seq, latest = state.generation, "Discarding stale search response");
            return false;
        }

        let panel = match result {
            Ok(candidates) => {
                let classification = classify(&candidates, query, &self.config.compatibility);
                if classification.is_empty() {
                    ResultPanel::NoResults
                } else {
                    ResultPanel::Results(classification)
                }
            }
            Err(e) => {
                warn!("Candidate search for '{}' failed: {}", query, e);
                ResultPanel::Failed(SEARCH_FAILED_TEXT.to_string())
            }
        };

        self.show(panel);
        drop(state);
        true
    }
}

/// Controller for one search input and its result panel.
///
/// Cloning is cheap and yields a handle to the same instance.
#[derive(Clone)]
pub struct SearchBox {
    inner: Arc<Inner>,
}

impl SearchBox {
    pub fn new(
        config: SearchBoxConfig,
        source: Arc<dyn CandidateSource>,
        form: Arc<dyn HostForm>,
    ) -> Self {
        let (panel, _) = watch::channel(ResultPanel::Hidden);
        Self {
            inner: Arc::new(Inner {
                config,
                source,
                form,
                state: Mutex::new(SearchState::default()),
                panel,
                debouncer: Debouncer::new(),
            }),
        }
    }

    pub fn config(&self) -> &SearchBoxConfig {
        &self.inner.config
    }

    /// Current result panel.
    pub fn panel(&self) -> ResultPanel {
        self.inner.panel.borrow().clone()
    }

    /// Receives every change of the result panel.
    pub fn subscribe(&self) -> watch::Receiver<ResultPanel> {
        self.inner.panel.subscribe()
    }

    pub fn query_text(&self) -> String {
        self.inner.state().query_text.clone()
    }

    /// The committed selection, as long as the target field still holds it.
    ///
    /// Another component clearing or rewriting the field (the athlete box
    /// resetting the guide, for instance) invalidates it. When the form has no
    /// such field the last selection is returned as is.
    pub fn selection(&self) -> Option<Selection> {
        let selection = self.inner.state().selection.clone()?;
        match self.inner.form.field(&self.inner.config.target_field) {
            Some(value) if value != selection.candidate_id => None,
            _ => Some(selection),
        }
    }

    pub fn banner(&self) -> Option<String> {
        self.inner.state().banner.clone()
    }

    pub fn is_search_pending(&self) -> bool {
        self.inner.debouncer.is_pending()
    }

    pub fn on_input(&self, text: &str) {
        let query = {
            let mut state = self.inner.state();
            state.query_text = text.to_string();

            match SearchQuery::new(text) {
                Some(query) => query,
                None => {
                    // Late replies to earlier queries must not reopen the panel.
                    state.generation += 1;
                    drop(state);
                    self.inner.debouncer.cancel();
                    self.inner.show(ResultPanel::Hidden);
                    return;
                }
            }
        };

        let query = query
            .with_event(self.inner.config.context_filter.clone())
            .guides_only(self.inner.config.guides_only);

        let inner = Arc::downgrade(&self.inner);
        self.inner
            .debouncer
            .schedule(self.inner.config.debounce, move || {
                if let Some(inner) = inner.upgrade() {
                    inner.fire(query);
                }
            });
    }

    /// Renders a fetch result tagged `seq`. Returns `false` when the reply was stale.
    pub fn on_fetch_result(
        &self,
        seq: u64,
        query: &str,
        result: Result<Vec<Candidate>>,
    ) -> bool {
        self.inner.apply(seq, query, result)
    }

    pub fn on_select(&self, candidate: &Candidate) -> Selected {
        let config = &self.inner.config;
        let selection = Selection::from_candidate(&config.target_field, candidate);
        let compatibility = config.compatibility.evaluate(candidate);
        let banner = config.compatibility.banner(candidate);

        let field_written = self.commit(&selection, &candidate.id);
        {
            let mut state = self.inner.state();
            state.banner = banner.clone();
        }

        debug!(
            field = %config.target_field,
            id = %candidate.id,
            %compatibility,
            "Candidate selected"
        );

        Selected {
            selection,
            compatibility,
            banner,
            field_written,
        }
    }

    /// Commits a selection without a search, e.g. from a start list row.
    ///
    /// A start list row may come with its guide: it is written into the guide
    /// field after the dependent fields have been cleared.
    pub fn select_direct(&self, id: &str, name: &str, guide_id: Option<&str>) -> Selection {
        let selection = Selection::direct(&self.inner.config.target_field, id, name);
        self.commit(&selection, id);
        self.inner.state().banner = None;

        if let Some(guide_id) = guide_id.map(str::trim).filter(|g| !g.is_empty()) {
            match &self.inner.config.guide_field {
                Some(field) if self.inner.form.set_field(field, guide_id) => {
                    debug!(%field, guide = %guide_id, "Guide set from start list");
                }
                Some(field) => warn!("Host form has no field named '{}'", field),
                None => warn!(
                    "Guide {} ignored, '{}' has no guide field",
                    guide_id, self.inner.config.target_field
                ),
            }
        }

        selection
    }

    fn commit(&self, selection: &Selection, id: &str) -> bool {
        let config = &self.inner.config;
        let form = &self.inner.form;

        let field_written = form.set_field(&config.target_field, id);
        if !field_written {
            warn!("Host form has no field named '{}'", config.target_field);
        }
        for field in &config.clears_on_select {
            form.set_field(field, "");
        }

        {
            let mut state = self.inner.state();
            state.query_text.clear();
            state.generation += 1;
            state.selection = Some(selection.clone());
        }
        self.inner.debouncer.cancel();
        self.inner.show(ResultPanel::Hidden);

        field_written
    }

    /// Clears the selection and the target field.
    pub fn clear_selection(&self) {
        self.inner.form.set_field(&self.inner.config.target_field, "");
        let mut state = self.inner.state();
        state.selection = None;
        state.banner = None;
    }

    pub fn on_outside_click(&self, target: &PointerTarget) -> bool {
        let config = &self.inner.config;
        if target.is_within(&config.input_id) || target.is_within(&config.results_container_id) {
            return false;
        }
        if !self.inner.panel.borrow().is_visible() {
            return false;
        }

        self.inner.show(ResultPanel::Hidden);
        true
    }
}

impl Dismissable for SearchBox {
    fn dismiss_if_outside(&self, target: &PointerTarget) -> bool {
        self.on_outside_click(target)
    }
}

impl std::fmt::Debug for SearchBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchBox")
            .field("config", &self.inner.config)
            .field("panel", &*self.inner.panel.borrow())
            .finish()
    }
}
