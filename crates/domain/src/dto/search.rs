use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::Candidate;

/// A row of the search endpoint's JSON array, as loosely typed as the server sends it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateRecord {
    #[serde(default)]
    pub sdms: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default, alias = "country")]
    pub npc: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub classes_list: Option<Vec<String>>,
    #[serde(default)]
    pub events: Option<Vec<String>>,
    #[serde(default)]
    pub is_guide: Option<bool>,
}

impl CandidateRecord {
    /// Converts the record, returning `None` when it lacks an id or a name.
    pub fn into_candidate(self) -> Option<Candidate> {
        let id = match self.sdms? {
            Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };

        let name = match self.name.filter(|n| !n.trim().is_empty()) {
            Some(name) => name.trim().to_string(),
            None => {
                let joined = [self.firstname, self.lastname]
                    .into_iter()
                    .flatten()
                    .map(|part| part.trim().to_string())
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                if joined.is_empty() {
                    return None;
                }
                joined
            }
        };

        let tags = match self.classes_list.filter(|list| !list.is_empty()) {
            Some(list) => list
                .into_iter()
                .map(|tag| tag.trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect(),
            None => self
                .class
                .unwrap_or_default()
                .split(',')
                .map(|tag| tag.trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect(),
        };

        Some(Candidate {
            id,
            name,
            affiliation: self.npc.unwrap_or_default().trim().to_string(),
            tags,
            gender: self.gender.unwrap_or_default().trim().to_string(),
            events: self.events.unwrap_or_default(),
            is_guide: self.is_guide.unwrap_or(false),
        })
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Turns a search response body into candidates.
///
/// Never fails: a payload that is not an array yields no candidates, and
/// falsy or unusable rows are skipped.
pub fn parse_candidates(payload: Value) -> Vec<Candidate> {
    let Value::Array(rows) = payload else {
        warn!("Search response is not an array, treating as empty");
        return Vec::new();
    };

    let total = rows.len();
    let candidates: Vec<Candidate> = rows
        .into_iter()
        .filter(|row| !is_falsy(row))
        .filter_map(|row| match serde_json::from_value::<CandidateRecord>(row) {
            Ok(record) => record.into_candidate(),
            Err(e) => {
                debug!("Skipping malformed candidate row: {}", e);
                None
            }
        })
        .collect();

    if candidates.len() < total {
        debug!("Skipped {} of {} candidate rows", total - candidates.len(), total);
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_record() {
        let payload = json!([{
            "sdms": 12345,
            "firstname": "Jane",
            "lastname": "Doe",
            "name": "Jane Doe",
            "npc": "FRA",
            "gender": "F",
            "class": "T47",
            "classes_list": ["T47", "T46"],
            "is_guide": false
        }]);

        let candidates = parse_candidates(payload);
        assert_eq!(candidates.len(), 1);
        let jane = &candidates[0];
        assert_eq!(jane.id, "12345");
        assert_eq!(jane.name, "Jane Doe");
        assert_eq!(jane.affiliation, "FRA");
        assert_eq!(jane.tags, vec!["T47", "T46"]);
        assert_eq!(jane.gender, "F");
        assert!(!jane.is_guide);
    }

    #[test]
    fn test_country_alias_and_class_fallback() {
        let payload = json!([{ "sdms": "999", "name": "Guide One", "country": "KEN", "class": "T11, T12", "is_guide": true }]);
        let candidates = parse_candidates(payload);
        assert_eq!(candidates[0].affiliation, "KEN");
        assert_eq!(candidates[0].tags, vec!["T11", "T12"]);
        assert!(candidates[0].is_guide);
    }

    #[test]
    fn test_name_built_from_parts() {
        let payload = json!([{ "sdms": 1, "firstname": "Ana", "lastname": "Silva" }]);
        assert_eq!(parse_candidates(payload)[0].name, "Ana Silva");
    }

    #[test]
    fn test_non_array_payload_is_empty() {
        assert!(parse_candidates(json!({"error": "boom"})).is_empty());
        assert!(parse_candidates(json!(null)).is_empty());
        assert!(parse_candidates(json!("nope")).is_empty());
    }

    #[test]
    fn test_falsy_and_unusable_rows_are_skipped() {
        let payload = json!([
            null,
            false,
            0,
            "",
            { "sdms": 2 },
            { "name": "No Id" },
            { "sdms": 3, "name": 42 },
            [1, 2],
            { "sdms": 4, "name": "Kept" }
        ]);

        let candidates = parse_candidates(payload);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, "4");
    }
}
