//! Client-side ranking of candidate search results.
//!
//! The search endpoint returns candidates in no particular order. Results are
//! grouped into buckets by how strongly they match the query, and every
//! candidate is annotated with its compatibility against the event being
//! edited. The function is pure: identical inputs give identical output, and
//! candidates keep their input order within a bucket.

use serde::Serialize;

use crate::models::{Candidate, Compatibility, CompatibilityContext};

/// The "other" bucket is only shown when fewer matches than this were found.
pub const OTHER_BUCKET_THRESHOLD: usize = 15;
/// Maximum entries kept in the "other" bucket.
pub const OTHER_BUCKET_CAP: usize = 5;
/// A response needs more candidates than this to be treated as a class browse.
pub const CLASS_BROWSE_MIN_CANDIDATES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BucketKind {
    ExactId,
    DirectText,
    TagMatch,
    Other,
}

impl BucketKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ExactId => "Exact SDMS match",
            Self::DirectText => "Name or NPC matches",
            Self::TagMatch => "Class matches",
            Self::Other => "Other athletes",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedCandidate {
    pub candidate: Candidate,
    pub bucket: BucketKind,
    pub compatibility: Compatibility,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub kind: BucketKind,
    pub label: String,
    pub entries: Vec<ClassifiedCandidate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Non-empty buckets in display order.
    pub buckets: Vec<Bucket>,
    /// Every candidate matched the query as a class; buckets hold a single flat list.
    pub class_browse: bool,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(|b| b.entries.len()).sum()
    }

    pub fn entries(&self) -> impl Iterator<Item = &ClassifiedCandidate> {
        self.buckets.iter().flat_map(|b| b.entries.iter())
    }

    pub fn find(&self, candidate_id: &str) -> Option<&ClassifiedCandidate> {
        self.entries().find(|entry| entry.candidate.id == candidate_id)
    }
}

pub fn classify(
    candidates: &[Candidate],
    query: &str,
    context: &CompatibilityContext,
) -> Classification {
    let needle = query.trim().to_lowercase();

    let annotate = |candidate: &Candidate, bucket: BucketKind| ClassifiedCandidate {
        candidate: candidate.clone(),
        bucket,
        compatibility: context.evaluate(candidate),
    };

    if candidates.len() > CLASS_BROWSE_MIN_CANDIDATES
        && candidates.iter().all(|c| c.has_tag_containing(&needle))
    {
        let entries: Vec<ClassifiedCandidate> = candidates
            .iter()
            .map(|c| annotate(c, BucketKind::TagMatch))
            .collect();
        return Classification {
            buckets: vec![Bucket {
                kind: BucketKind::TagMatch,
                label: format!("Class {} ({} athletes)", query.trim().to_uppercase(), entries.len()),
                entries,
            }],
            class_browse: true,
        };
    }

    let mut exact = Vec::new();
    let mut direct = Vec::new();
    let mut tagged = Vec::new();
    let mut other = Vec::new();

    for candidate in candidates {
        if candidate.id == query {
            exact.push(annotate(candidate, BucketKind::ExactId));
        } else if candidate.matches_text(&needle) {
            direct.push(annotate(candidate, BucketKind::DirectText));
        } else if candidate.has_tag_containing(&needle) {
            tagged.push(annotate(candidate, BucketKind::TagMatch));
        } else {
            other.push(annotate(candidate, BucketKind::Other));
        }
    }

    let matched = exact.len() + direct.len() + tagged.len();
    if matched < OTHER_BUCKET_THRESHOLD {
        other.truncate(OTHER_BUCKET_CAP);
    } else {
        other.clear();
    }

    let buckets = [
        (BucketKind::ExactId, exact),
        (BucketKind::DirectText, direct),
        (BucketKind::TagMatch, tagged),
        (BucketKind::Other, other),
    ]
    .into_iter()
    .filter(|(_, entries)| !entries.is_empty())
    .map(|(kind, entries)| Bucket {
        kind,
        label: kind.label().to_string(),
        entries,
    })
    .collect();

    Classification {
        buckets,
        class_browse: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn athlete(id: &str, name: &str, npc: &str, tags: &[&str], gender: &str) -> Candidate {
        Candidate::new(id, name)
            .with_affiliation(npc)
            .with_tags(tags.iter().copied())
            .with_gender(gender)
    }

    fn ids(bucket: &Bucket) -> Vec<&str> {
        bucket.entries.iter().map(|e| e.candidate.id.as_str()).collect()
    }

    fn sample() -> Vec<Candidate> {
        vec![
            athlete("2001", "Marta Rossi", "ITA", &["T47"], "F"),
            athlete("1047", "Paul T47son", "GBR", &["T12"], "M"),
            athlete("1234", "Jean Dupont", "FRA", &["T47"], "M"),
            athlete("3000", "Ana Silva", "BRA", &["F46"], "F"),
            athlete("47", "Short Id", "USA", &["T11"], "M"),
        ]
    }

    #[test]
    fn test_exact_identifier_comes_first() {
        let result = classify(&sample(), "1234", &CompatibilityContext::default());

        assert_eq!(result.buckets[0].kind, BucketKind::ExactId);
        assert_eq!(ids(&result.buckets[0]), vec!["1234"]);
        assert!(!result.class_browse);
    }

    #[test]
    fn test_bucket_precedence() {
        let result = classify(&sample(), "t47", &CompatibilityContext::default());

        let kinds: Vec<BucketKind> = result.buckets.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![BucketKind::DirectText, BucketKind::TagMatch, BucketKind::Other]
        );
        assert_eq!(ids(&result.buckets[0]), vec!["1047"]);
        assert_eq!(ids(&result.buckets[1]), vec!["2001", "1234"]);
        assert_eq!(ids(&result.buckets[2]), vec!["3000", "47"]);
    }

    #[test]
    fn test_exact_match_is_case_sensitive_raw_query() {
        let candidates = vec![athlete("AB12", "X", "", &[], "M")];
        let result = classify(&candidates, "ab12", &CompatibilityContext::default());
        assert_eq!(result.buckets[0].kind, BucketKind::DirectText);
    }

    #[test]
    fn test_other_bucket_is_capped() {
        let candidates: Vec<Candidate> = (0..9)
            .map(|i| athlete(&format!("90{}", i), "Nobody", "NOR", &["T20"], "M"))
            .collect();
        let result = classify(&candidates, "zzz", &CompatibilityContext::default());

        assert_eq!(result.buckets.len(), 1);
        assert_eq!(result.buckets[0].kind, BucketKind::Other);
        assert_eq!(ids(&result.buckets[0]), vec!["900", "901", "902", "903", "904"]);
    }

    #[test]
    fn test_other_bucket_dropped_when_enough_matches() {
        let mut candidates: Vec<Candidate> = (0..15)
            .map(|i| athlete(&format!("{}", 100 + i), "Smith", "USA", &["T11"], "M"))
            .collect();
        candidates.push(athlete("999", "Jones", "CAN", &["T12"], "F"));

        let result = classify(&candidates, "smith", &CompatibilityContext::default());
        assert_eq!(result.buckets.len(), 1);
        assert_eq!(result.buckets[0].entries.len(), 15);
        assert!(result.find("999").is_none());
    }

    #[test]
    fn test_class_browse_flattens_results() {
        let candidates: Vec<Candidate> = (0..11)
            .map(|i| athlete(&format!("{}", 500 + i), "Sprinter", "JPN", &["T46", "T47"], "M"))
            .collect();
        let result = classify(&candidates, "T47", &CompatibilityContext::default());

        assert!(result.class_browse);
        assert_eq!(result.buckets.len(), 1);
        assert_eq!(result.buckets[0].label, "Class T47 (11 athletes)");
        assert!(result.entries().all(|e| e.bucket == BucketKind::TagMatch));
    }

    #[test]
    fn test_class_browse_needs_more_than_ten() {
        let candidates: Vec<Candidate> = (0..10)
            .map(|i| athlete(&format!("{}", 500 + i), "Sprinter", "JPN", &["T47"], "M"))
            .collect();
        let result = classify(&candidates, "T47", &CompatibilityContext::default());
        assert!(!result.class_browse);
    }

    #[test]
    fn test_compatibility_never_removes_candidates() {
        let context = CompatibilityContext::new(["T47"], "M");
        let result = classify(&sample(), "t47", &context);

        assert_eq!(result.len(), 5);
        assert_eq!(
            result.find("2001").unwrap().compatibility,
            Compatibility::GenderMismatch
        );
        assert_eq!(
            result.find("1047").unwrap().compatibility,
            Compatibility::TagMismatch
        );
        assert_eq!(
            result.find("1234").unwrap().compatibility,
            Compatibility::Compatible
        );
        assert_eq!(
            result.find("3000").unwrap().compatibility,
            Compatibility::FullMismatch
        );
    }

    #[test]
    fn test_classification_is_deterministic() {
        let context = CompatibilityContext::new(["T47"], "M");
        let first = classify(&sample(), "t4", &context);
        let second = classify(&sample(), "t4", &context);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_direct_match_stays_within_one_field() {
        let candidates = vec![athlete("12345", "Jane Doe", "FRA", &["T11"], "F")];
        let result = classify(&candidates, "doe fra", &CompatibilityContext::default());

        assert_eq!(result.buckets.len(), 1);
        assert_eq!(result.buckets[0].kind, BucketKind::Other);
    }

    #[test]
    fn test_empty_input() {
        let result = classify(&[], "anything", &CompatibilityContext::default());
        assert!(result.is_empty());
        assert_eq!(result.len(), 0);
    }
}
