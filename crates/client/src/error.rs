use thiserror::Error;

pub type Result<T> = std::result::Result<T, PanelError>;

#[derive(Error, Debug)]
pub enum PanelError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Server returned {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error(transparent)]
    DomainError(#[from] domain::DomainError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl PanelError {
    /// Transport failures: the request never produced a usable reply.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::RequestError(_) | Self::ParseError(_) | Self::ServerError { .. }
        )
    }
}
