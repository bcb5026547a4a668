use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Attempt values that never count towards the best mark.
pub const IGNORED_ATTEMPT_MARKS: &[&str] = &["X", "-", "FOUL"];

/// Outcome recorded for one height in a High Jump series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HighJumpMark {
    #[serde(rename = "O")]
    Cleared,
    #[serde(rename = "X")]
    Failed,
    #[serde(rename = "-")]
    Passed,
    #[serde(rename = "XO")]
    ClearedSecond,
    #[serde(rename = "XXO")]
    ClearedThird,
    #[serde(rename = "XXX")]
    Eliminated,
}

impl HighJumpMark {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cleared => "O",
            Self::Failed => "X",
            Self::Passed => "-",
            Self::ClearedSecond => "XO",
            Self::ClearedThird => "XXO",
            Self::Eliminated => "XXX",
        }
    }

    /// Option label used by the attempt editor.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cleared => "O (Success)",
            Self::Failed => "X (Failure)",
            Self::Passed => "- (Pass)",
            Self::ClearedSecond => "XO",
            Self::ClearedThird => "XXO",
            Self::Eliminated => "XXX (Elimination)",
        }
    }

    pub fn all() -> &'static [HighJumpMark] {
        &[
            Self::Cleared,
            Self::Failed,
            Self::Passed,
            Self::ClearedSecond,
            Self::ClearedThird,
            Self::Eliminated,
        ]
    }

    pub fn is_clearance(&self) -> bool {
        matches!(self, Self::Cleared | Self::ClearedSecond | Self::ClearedThird)
    }
}

impl FromStr for HighJumpMark {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        Self::all()
            .iter()
            .copied()
            .find(|mark| mark.as_str() == normalized)
            .ok_or_else(|| {
                DomainError::Validation(format!(
                    "Unknown High Jump mark '{}'. Expected one of: {}",
                    s,
                    Self::all()
                        .iter()
                        .map(|m| m.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}

impl std::fmt::Display for HighJumpMark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighJumpAttempt {
    pub height: Decimal,
    pub mark: HighJumpMark,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAttempt {
    pub value: String,
    pub wind_velocity: Option<Decimal>,
}

/// Returns the largest numeric attempt, ignoring fouls, passes and anything
/// that does not parse. Ties keep the earliest attempt.
pub fn best_attempt<'a, I>(values: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(Decimal, &'a str)> = None;

    for value in values {
        let value = value.trim();
        if value.is_empty() || IGNORED_ATTEMPT_MARKS.contains(&value.to_uppercase().as_str()) {
            continue;
        }

        let Ok(number) = Decimal::from_str(value) else {
            continue;
        };
        if number <= Decimal::ZERO {
            continue;
        }

        if best.is_none_or(|(current, _)| number > current) {
            best = Some((number, value));
        }
    }

    best.map(|(_, value)| value)
}

/// Value to pre-fill into the performance field, only when it is still empty.
pub fn suggested_performance<'a, I>(current: &str, attempts: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    if !current.trim().is_empty() {
        return None;
    }
    best_attempt(attempts)
}
