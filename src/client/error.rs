use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unexpected payload: {message}")]
    Shape { message: String },

    #[error("Invalid URL: {message}")]
    Url { message: String },
}

impl ClientError {
    pub fn shape(message: impl Into<String>) -> Self {
        ClientError::Shape {
            message: message.into(),
        }
    }

    pub fn url(message: impl Into<String>) -> Self {
        ClientError::Url {
            message: message.into(),
        }
    }

    /// HTTP status code for [`ClientError::Status`] and transport errors that carry one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
