use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The request never reached the server or the response never arrived.
    #[error("{0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("HTTP error! status: {status}")]
    HttpStatus { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Identity provider is not configured")]
    NotConfigured,

    #[error("No user logged in")]
    NotAuthenticated,

    #[error("Not found")]
    NotFound,

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl CoreError {
    /// The message with the response body appended, when the server sent
    /// one: `HTTP error! status: 500 - ocr crashed`.
    pub fn with_body(&self) -> String {
        match self {
            CoreError::HttpStatus { status, body } if !body.trim().is_empty() => {
                format!("HTTP error! status: {} - {}", status, body.trim())
            }
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for CoreError {
    fn from(error: std::io::Error) -> Self {
        CoreError::Io(error.to_string())
    }
}
