use lazy_static::lazy_static;
use regex::Regex;

/// Marks accepted in a performance field in place of a measured value.
pub const SPECIAL_VALUES: &[&str] = &["DNS", "DNF", "DQ", "NM", "O", "X", "-"];

lazy_static! {
    static ref FIELD_PERFORMANCE: Regex = Regex::new(r"^[0-9]+(\.[0-9]{1,2})?$").unwrap();
    static ref TRACK_PERFORMANCE: Regex = Regex::new(r"^([0-9]{1,2}:)?[0-9]{1,2}\.[0-9]{2}$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Distances and heights in metres, e.g. `12.45`.
    Field,
    /// Times, e.g. `10.87` or `1:59.03`.
    Track,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceCheck {
    /// Nothing typed yet; neither marked valid nor invalid.
    Empty,
    Valid,
    Invalid,
}

impl PerformanceCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

pub fn is_special_value(value: &str) -> bool {
    let value = value.trim().to_uppercase();
    SPECIAL_VALUES.contains(&value.as_str())
}

pub fn validate_performance(value: &str, kind: EventKind) -> PerformanceCheck {
    let value = value.trim();

    if is_special_value(value) {
        return PerformanceCheck::Valid;
    }

    let matches = match kind {
        EventKind::Field => FIELD_PERFORMANCE.is_match(value),
        EventKind::Track => TRACK_PERFORMANCE.is_match(value),
    };

    if matches {
        PerformanceCheck::Valid
    } else if value.is_empty() {
        PerformanceCheck::Empty
    } else {
        PerformanceCheck::Invalid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_values_are_valid_for_both_kinds() {
        for value in ["DNS", "dnf", " dq ", "NM", "o", "X", "-"] {
            assert_eq!(validate_performance(value, EventKind::Field), PerformanceCheck::Valid);
            assert_eq!(validate_performance(value, EventKind::Track), PerformanceCheck::Valid);
        }
    }

    #[test]
    fn test_field_performances() {
        assert!(validate_performance("12", EventKind::Field).is_valid());
        assert!(validate_performance("12.4", EventKind::Field).is_valid());
        assert!(validate_performance("12.45", EventKind::Field).is_valid());
        assert_eq!(validate_performance("12.456", EventKind::Field), PerformanceCheck::Invalid);
        assert_eq!(validate_performance("12,45", EventKind::Field), PerformanceCheck::Invalid);
    }

    #[test]
    fn test_track_performances() {
        assert!(validate_performance("10.87", EventKind::Track).is_valid());
        assert!(validate_performance("1:59.03", EventKind::Track).is_valid());
        assert!(validate_performance("12:05.00", EventKind::Track).is_valid());
        assert_eq!(validate_performance("10.8", EventKind::Track), PerformanceCheck::Invalid);
        assert_eq!(validate_performance("123:00.00", EventKind::Track), PerformanceCheck::Invalid);
    }

    #[test]
    fn test_non_ascii_digits_are_invalid() {
        assert_eq!(
            validate_performance("\u{661}\u{662}.\u{664}\u{665}", EventKind::Field),
            PerformanceCheck::Invalid
        );
        assert_eq!(
            validate_performance("\u{661}\u{660}.\u{668}\u{667}", EventKind::Track),
            PerformanceCheck::Invalid
        );
        assert_eq!(
            validate_performance("\u{ff11}\u{ff12}", EventKind::Field),
            PerformanceCheck::Invalid
        );
    }

    #[test]
    fn test_empty_value_is_neither() {
        assert_eq!(validate_performance("   ", EventKind::Track), PerformanceCheck::Empty);
    }
}
