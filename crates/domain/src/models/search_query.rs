/// Queries shorter than this never reach the search endpoint.
pub const MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    /// Event name used by the server to narrow the candidate set.
    pub event: Option<String>,
    pub guides_only: bool,
}

impl SearchQuery {
    /// Trims `raw` and returns `None` when it is too short to search.
    pub fn new(raw: &str) -> Option<Self> {
        let text = raw.trim();
        if !is_searchable(text) {
            return None;
        }

        Some(Self {
            text: text.to_string(),
            event: None,
            guides_only: false,
        })
    }

    pub fn with_event(mut self, event: Option<String>) -> Self {
        self.event = event.filter(|e| !e.trim().is_empty());
        self
    }

    pub fn guides_only(mut self, guides_only: bool) -> Self {
        self.guides_only = guides_only;
        self
    }
}

pub fn is_searchable(raw: &str) -> bool {
    raw.trim().chars().count() >= MIN_QUERY_LEN
}
