use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{DomainError, Result};

/// Fields of the game edit form, sent as JSON to the edit endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct EditGameRequest {
    #[validate(length(min = 1, max = 255, message = "Event is required"))]
    pub event: String,

    #[validate(custom(function = "validate_gender"))]
    pub gender: String,

    /// Comma separated sport classes, e.g. `"T46, T47"`.
    #[validate(length(min = 1, message = "At least one class is required"))]
    pub classes: String,

    #[serde(default)]
    pub phase: String,

    #[serde(default)]
    pub area: String,

    #[validate(range(min = 1, message = "Day must be >= 1"))]
    pub day: u32,

    #[validate(length(min = 1, message = "Time is required"))]
    pub time: String,

    #[validate(range(min = 1, max = 200, message = "Number of athletes must be between 1 and 200"))]
    pub nb_athletes: u32,

    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub published: bool,

    #[serde(default)]
    pub wpa_points: bool,
}

fn validate_gender(gender: &str) -> std::result::Result<(), validator::ValidationError> {
    const VALID_GENDERS: &[&str] = &["Men", "Women", "Mixed", "M", "F", "X"];

    if VALID_GENDERS.contains(&gender) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_gender"))
    }
}

impl EditGameRequest {
    pub fn check(&self) -> Result<()> {
        self.validate().map_err(DomainError::from)
    }

    pub fn validated(self) -> Result<Self> {
        self.check()?;
        Ok(self)
    }
}
