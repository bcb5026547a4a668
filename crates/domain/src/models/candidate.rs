use serde::Serialize;

/// An athlete or guide returned by the candidate search endpoint.
///
/// Candidates are transient: a fresh set is produced for every search response
/// and dropped once rendered or selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// SDMS identifier. The server sends it as a number or a string.
    pub id: String,
    pub name: String,
    /// NPC code of the athlete's national committee.
    pub affiliation: String,
    /// Sport classes (e.g. `T47`, `F12`).
    pub tags: Vec<String>,
    pub gender: String,
    /// Events the athlete is registered for, when the server includes them.
    pub events: Vec<String>,
    pub is_guide: bool,
}

impl Candidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            affiliation: String::new(),
            tags: Vec::new(),
            gender: String::new(),
            events: Vec::new(),
            is_guide: false,
        }
    }

    pub fn with_affiliation(mut self, affiliation: impl Into<String>) -> Self {
        self.affiliation = affiliation.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = gender.into();
        self
    }

    pub fn with_events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.events = events.into_iter().map(Into::into).collect();
        self
    }

    pub fn as_guide(mut self) -> Self {
        self.is_guide = true;
        self
    }

    /// Whether the identifier, name or affiliation contains `needle`.
    ///
    /// Each field is matched on its own so a query cannot span two of them.
    /// `needle` must already be lowercased.
    pub fn matches_text(&self, needle: &str) -> bool {
        [&self.id, &self.name, &self.affiliation]
            .into_iter()
            .any(|field| field.to_lowercase().contains(needle))
    }

    /// `needle` must already be lowercased.
    pub fn has_tag_containing(&self, needle: &str) -> bool {
        self.tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle))
    }

    pub fn is_registered_for(&self, event: &str) -> bool {
        self.events
            .iter()
            .any(|registered| registered.eq_ignore_ascii_case(event))
    }

    pub fn tag_list(&self) -> String {
        self.tags.join(", ")
    }

    /// One-line summary shown in result rows and selection displays.
    pub fn summary(&self) -> String {
        if self.affiliation.is_empty() {
            format!("{} - {}", self.id, self.name)
        } else {
            format!("{} - {} ({})", self.id, self.name, self.affiliation)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_match_is_case_insensitive() {
        let candidate = Candidate::new("12345", "Jane DOE").with_affiliation("FRA");
        assert!(candidate.matches_text("jane d"));
        assert!(candidate.matches_text("234"));
        assert!(candidate.matches_text("fra"));
        assert!(!candidate.matches_text("jones"));
    }

    #[test]
    fn test_text_match_does_not_span_fields() {
        let candidate = Candidate::new("12345", "Jane Doe").with_affiliation("FRA");
        assert!(!candidate.matches_text("doe fra"));
        assert!(!candidate.matches_text("12345 jane"));
    }

    #[test]
    fn test_tag_containment_is_case_insensitive() {
        let candidate = Candidate::new("1", "A").with_tags(["T47", "F46"]);
        assert!(candidate.has_tag_containing("t4"));
        assert!(candidate.has_tag_containing("f46"));
        assert!(!candidate.has_tag_containing("t12"));
    }

    #[test]
    fn test_summary_without_affiliation() {
        let candidate = Candidate::new("7", "Solo");
        assert_eq!(candidate.summary(), "7 - Solo");
        let candidate = candidate.with_affiliation("KEN");
        assert_eq!(candidate.summary(), "7 - Solo (KEN)");
    }
}
