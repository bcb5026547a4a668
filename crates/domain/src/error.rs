use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown row in new order: {0}")]
    UnknownRow(String),

    #[error("Row appears more than once in new order: {0}")]
    DuplicateRow(String),

    #[error("New order has {actual} rows, expected {expected}")]
    RowCountMismatch { expected: usize, actual: usize },

    #[error("Row position out of range: {0}")]
    PositionOutOfRange(usize),

    #[error("{0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;

impl DomainError {
    /// Validation failure listing only the messages, for forms whose messages
    /// already read as full sentences.
    pub fn from_messages(errors: ValidationErrors) -> Self {
        Self::Validation(collect_errors(&errors, false))
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(collect_errors(&errors, true))
    }
}

fn collect_errors(errors: &ValidationErrors, with_field: bool) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                if with_field {
                    format!("{}: {}", field, message)
                } else {
                    message
                }
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}
