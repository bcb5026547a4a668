use serde::Serialize;

use super::Candidate;

/// How well a candidate fits the event currently being edited.
///
/// The annotation drives a visual marker only; it never removes a candidate
/// from the result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Compatibility {
    Compatible,
    TagMismatch,
    GenderMismatch,
    FullMismatch,
}

impl Compatibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compatible => "compatible",
            Self::TagMismatch => "tag-mismatch",
            Self::GenderMismatch => "gender-mismatch",
            Self::FullMismatch => "full-mismatch",
        }
    }

    /// 0 for compatible, 2 when both checks fail.
    pub fn severity(&self) -> u8 {
        match self {
            Self::Compatible => 0,
            Self::TagMismatch | Self::GenderMismatch => 1,
            Self::FullMismatch => 2,
        }
    }

    pub fn is_compatible(&self) -> bool {
        matches!(self, Self::Compatible)
    }
}

impl std::fmt::Display for Compatibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classes and gender accepted by the event a result is being entered for.
///
/// An empty tag list or gender disables that half of the check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompatibilityContext {
    pub accepted_tags: Vec<String>,
    pub accepted_gender: String,
}

impl CompatibilityContext {
    pub fn new<I, S>(accepted_tags: I, accepted_gender: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accepted_tags: accepted_tags
                .into_iter()
                .map(Into::into)
                .map(|tag: String| tag.trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect(),
            accepted_gender: accepted_gender.into().trim().to_string(),
        }
    }

    /// Builds a context from an event's comma separated class list, e.g. `"T46, T47"`.
    pub fn from_class_list(classes: &str, accepted_gender: impl Into<String>) -> Self {
        Self::new(classes.split(','), accepted_gender)
    }

    pub fn is_empty(&self) -> bool {
        self.accepted_tags.is_empty() && self.accepted_gender.is_empty()
    }

    fn tags_accepted(&self, candidate: &Candidate) -> bool {
        self.accepted_tags.is_empty()
            || candidate.tags.iter().any(|tag| {
                self.accepted_tags
                    .iter()
                    .any(|accepted| accepted.eq_ignore_ascii_case(tag.trim()))
            })
    }

    fn gender_accepted(&self, candidate: &Candidate) -> bool {
        self.accepted_gender.is_empty()
            || self
                .accepted_gender
                .eq_ignore_ascii_case(candidate.gender.trim())
    }

    pub fn evaluate(&self, candidate: &Candidate) -> Compatibility {
        match (self.tags_accepted(candidate), self.gender_accepted(candidate)) {
            (true, true) => Compatibility::Compatible,
            (false, true) => Compatibility::TagMismatch,
            (true, false) => Compatibility::GenderMismatch,
            (false, false) => Compatibility::FullMismatch,
        }
    }

    /// Warning shown under the selection display, `None` when compatible.
    pub fn banner(&self, candidate: &Candidate) -> Option<String> {
        let class_warning = || {
            format!(
                "class {} not in event classes: {}",
                candidate.tag_list(),
                self.accepted_tags.join(", ")
            )
        };
        let gender_warning = || {
            format!(
                "gender {} does not match event gender {}",
                candidate.gender, self.accepted_gender
            )
        };

        match self.evaluate(candidate) {
            Compatibility::Compatible => None,
            Compatibility::TagMismatch => Some(format!("Warning: Athlete {}", class_warning())),
            Compatibility::GenderMismatch => {
                Some(format!("Warning: Athlete {}", gender_warning()))
            }
            Compatibility::FullMismatch => Some(format!(
                "Warning: Athlete {}; {}",
                class_warning(),
                gender_warning()
            )),
        }
    }
}
