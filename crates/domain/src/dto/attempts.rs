use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use validator::{Validate, ValidationError};

use crate::models::{FieldAttempt, HighJumpAttempt, HighJumpMark};
use crate::{DomainError, Result};

/// Field events record at most this many attempts.
pub const MAX_FIELD_ATTEMPTS: usize = 6;

pub const HIGH_JUMP_EVENT: &str = "High Jump";

/// Which attempt editor an event uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptLayout {
    /// Numbered attempts with optional wind readings.
    Field,
    /// Height/mark pairs, ranked server-side with tie-break rules.
    HighJump,
}

impl AttemptLayout {
    pub fn for_event(event: &str) -> Self {
        if event.trim().eq_ignore_ascii_case(HIGH_JUMP_EVENT) {
            Self::HighJump
        } else {
            Self::Field
        }
    }
}

/// One attempt row of the field event editor, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldAttemptRow {
    pub value: String,
    pub wind: String,
}

/// One height row of the High Jump editor, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighJumpRow {
    pub height: String,
    pub mark: String,
}

impl From<&HighJumpAttempt> for HighJumpRow {
    fn from(attempt: &HighJumpAttempt) -> Self {
        Self {
            height: attempt.height.to_string(),
            mark: attempt.mark.as_str().to_string(),
        }
    }
}

impl From<&FieldAttempt> for FieldAttemptRow {
    fn from(attempt: &FieldAttempt) -> Self {
        Self {
            value: attempt.value.clone(),
            wind: attempt
                .wind_velocity
                .map(|w| w.to_string())
                .unwrap_or_default(),
        }
    }
}

/// Rows shown when the High Jump editor opens: every recorded height plus one
/// blank row for the next attempt.
pub fn high_jump_editor_rows(existing: &[HighJumpAttempt]) -> Vec<HighJumpRow> {
    existing
        .iter()
        .map(HighJumpRow::from)
        .chain(std::iter::once(HighJumpRow::default()))
        .collect()
}

/// Rows shown when the field event editor opens, padded to [`MAX_FIELD_ATTEMPTS`].
pub fn field_editor_rows(existing: &[FieldAttempt]) -> Vec<FieldAttemptRow> {
    let mut rows: Vec<FieldAttemptRow> = existing
        .iter()
        .take(MAX_FIELD_ATTEMPTS)
        .map(FieldAttemptRow::from)
        .collect();
    rows.resize(MAX_FIELD_ATTEMPTS, FieldAttemptRow::default());
    rows
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldAttemptPayload {
    pub value: String,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub wind_velocity: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighJumpAttemptPayload {
    #[serde(with = "rust_decimal::serde::float")]
    pub height: Decimal,
    pub value: HighJumpMark,
}

/// Body of the update-attempts endpoint. Attempts are keyed by 1-based row position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum UpdateAttemptsRequest {
    Field {
        attempts: BTreeMap<u32, FieldAttemptPayload>,
        record: String,
        weight: String,
        guide_sdms: String,
    },
    HighJump {
        high_jump_attempts: BTreeMap<u32, HighJumpAttemptPayload>,
        record: String,
        guide_sdms: String,
    },
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw).ok()
}

impl UpdateAttemptsRequest {
    /// Blank rows are skipped; rows past [`MAX_FIELD_ATTEMPTS`] are ignored.
    /// A wind reading that does not parse is sent as `null`.
    pub fn from_field_rows(
        rows: &[FieldAttemptRow],
        record: &str,
        weight: &str,
        guide_sdms: &str,
    ) -> Self {
        let attempts = rows
            .iter()
            .take(MAX_FIELD_ATTEMPTS)
            .enumerate()
            .filter(|(_, row)| !row.value.trim().is_empty())
            .map(|(index, row)| {
                (
                    index as u32 + 1,
                    FieldAttemptPayload {
                        value: row.value.trim().to_string(),
                        wind_velocity: parse_decimal(&row.wind),
                    },
                )
            })
            .collect();

        Self::Field {
            attempts,
            record: record.to_string(),
            weight: weight.to_string(),
            guide_sdms: guide_sdms.to_string(),
        }
    }

    /// Rows missing a height or a mark are skipped. Keys keep the row position,
    /// so a skipped row leaves a gap.
    pub fn from_high_jump_rows(rows: &[HighJumpRow], record: &str, guide_sdms: &str) -> Self {
        let high_jump_attempts = rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| {
                let height = parse_decimal(&row.height)?;
                let value = HighJumpMark::from_str(&row.mark).ok()?;
                Some((index as u32 + 1, HighJumpAttemptPayload { height, value }))
            })
            .collect();

        Self::HighJump {
            high_jump_attempts,
            record: record.to_string(),
            guide_sdms: guide_sdms.to_string(),
        }
    }

    pub fn attempt_count(&self) -> usize {
        match self {
            Self::Field { attempts, .. } => attempts.len(),
            Self::HighJump {
                high_jump_attempts, ..
            } => high_jump_attempts.len(),
        }
    }
}

fn validate_height(height: &Decimal) -> std::result::Result<(), ValidationError> {
    if height.is_sign_positive() && !height.is_zero() {
        Ok(())
    } else {
        Err(ValidationError::new("height_must_be_positive"))
    }
}

/// Body of the add-attempt endpoint for a single High Jump height.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
pub struct AddAttemptRequest {
    #[serde(with = "rust_decimal::serde::float")]
    #[validate(custom(function = "validate_height"))]
    pub height: Decimal,
    pub result: HighJumpMark,
}

impl AddAttemptRequest {
    pub fn from_form(height: &str, result: &str) -> Result<Self> {
        if height.trim().is_empty() || result.trim().is_empty() {
            return Err(DomainError::Validation(
                "Height and result are required".to_string(),
            ));
        }

        let height = Decimal::from_str(height.trim())
            .map_err(|_| DomainError::Validation(format!("Invalid height: '{}'", height)))?;
        let result = HighJumpMark::from_str(result)?;

        let request = Self { height, result };
        request.check()?;
        Ok(request)
    }

    pub fn check(&self) -> Result<()> {
        self.validate().map_err(DomainError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: &str, wind: &str) -> FieldAttemptRow {
        FieldAttemptRow {
            value: value.to_string(),
            wind: wind.to_string(),
        }
    }

    fn hj(height: &str, mark: &str) -> HighJumpRow {
        HighJumpRow {
            height: height.to_string(),
            mark: mark.to_string(),
        }
    }

    #[test]
    fn test_layout_detection() {
        assert_eq!(AttemptLayout::for_event("High Jump"), AttemptLayout::HighJump);
        assert_eq!(AttemptLayout::for_event(" high jump "), AttemptLayout::HighJump);
        assert_eq!(AttemptLayout::for_event("Long Jump"), AttemptLayout::Field);
    }

    #[test]
    fn test_field_payload_skips_blank_rows() {
        let rows = vec![
            row("6.12", "1.2"),
            row("", ""),
            row("X", ""),
            row(" 6.40 ", "bad"),
        ];
        let request = UpdateAttemptsRequest::from_field_rows(&rows, "PB", "", "");

        assert_eq!(request.attempt_count(), 3);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "attempts": {
                    "1": {"value": "6.12", "wind_velocity": 1.2},
                    "3": {"value": "X", "wind_velocity": null},
                    "4": {"value": "6.40", "wind_velocity": null}
                },
                "record": "PB",
                "weight": "",
                "guide_sdms": ""
            })
        );
    }

    #[test]
    fn test_field_payload_caps_attempts() {
        let rows: Vec<FieldAttemptRow> = (0..8).map(|i| row(&format!("{}.00", i + 1), "")).collect();
        let request = UpdateAttemptsRequest::from_field_rows(&rows, "", "", "");
        assert_eq!(request.attempt_count(), MAX_FIELD_ATTEMPTS);
    }

    #[test]
    fn test_high_jump_payload_keeps_row_positions() {
        let rows = vec![hj("1.80", "O"), hj("1.85", ""), hj("1.90", "xxo"), hj("", "")];
        let request = UpdateAttemptsRequest::from_high_jump_rows(&rows, "", "4421");

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "high_jump_attempts": {
                    "1": {"height": 1.8, "value": "O"},
                    "3": {"height": 1.9, "value": "XXO"}
                },
                "record": "",
                "guide_sdms": "4421"
            })
        );
    }

    #[test]
    fn test_editor_rows_append_blank_row() {
        let existing = vec![HighJumpAttempt {
            height: Decimal::new(175, 2),
            mark: HighJumpMark::ClearedSecond,
        }];
        let rows = high_jump_editor_rows(&existing);
        assert_eq!(rows, vec![hj("1.75", "XO"), HighJumpRow::default()]);

        let field_rows = field_editor_rows(&[FieldAttempt {
            value: "5.10".to_string(),
            wind_velocity: Some(Decimal::new(-4, 1)),
        }]);
        assert_eq!(field_rows.len(), MAX_FIELD_ATTEMPTS);
        assert_eq!(field_rows[0], row("5.10", "-0.4"));
        assert_eq!(field_rows[5], FieldAttemptRow::default());
    }

    #[test]
    fn test_add_attempt_requires_both_fields() {
        assert_eq!(
            AddAttemptRequest::from_form("", "O").unwrap_err(),
            DomainError::Validation("Height and result are required".to_string())
        );
        assert_eq!(
            AddAttemptRequest::from_form("1.85", " ").unwrap_err(),
            DomainError::Validation("Height and result are required".to_string())
        );
    }

    #[test]
    fn test_add_attempt_rejects_bad_values() {
        assert!(AddAttemptRequest::from_form("abc", "O").is_err());
        assert!(AddAttemptRequest::from_form("1.85", "OO").is_err());
        assert_eq!(
            AddAttemptRequest::from_form("0", "O").unwrap_err(),
            DomainError::Validation("height: height_must_be_positive".to_string())
        );
    }

    #[test]
    fn test_add_attempt_payload() {
        let request = AddAttemptRequest::from_form("1.85", "xo").unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"height": 1.85, "result": "XO"})
        );
    }
}
