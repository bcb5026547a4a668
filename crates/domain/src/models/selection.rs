use super::Candidate;

/// The candidate committed into a host form field.
///
/// A field holds at most one selection; committing a new one replaces the
/// previous value in a single write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub field: String,
    pub candidate_id: String,
    pub display: String,
}

impl Selection {
    pub fn from_candidate(field: impl Into<String>, candidate: &Candidate) -> Self {
        let display = if candidate.tags.is_empty() {
            format!("Selected: {}", candidate.summary())
        } else {
            format!("Selected: {} [{}]", candidate.summary(), candidate.tag_list())
        };

        Self {
            field: field.into(),
            candidate_id: candidate.id.clone(),
            display,
        }
    }

    /// Selection made from a start list row, where only the id and name are known.
    pub fn direct(field: impl Into<String>, id: impl Into<String>, name: &str) -> Self {
        let candidate_id = id.into();
        let display = format!("Selected: {} - {}", candidate_id, name);

        Self {
            field: field.into(),
            candidate_id,
            display,
        }
    }
}
