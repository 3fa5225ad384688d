use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Mailgun does not support file paths")]
    UnsupportedAttachment,

    #[error("Invalid attachment: {0}")]
    InvalidAttachment(String),

    #[error("Mailgun API error ({status}): {details}")]
    Api { status: u16, details: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl TransportError {
    /// True when the error was raised while building the message,
    /// before any request reached the provider.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            TransportError::UnsupportedAttachment
                | TransportError::InvalidAttachment(_)
                | TransportError::Config(_)
        )
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
