//! Generation service contract.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure of one generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The request never got a response.
    Connection(String),
    Timeout,
    /// The key was rejected.
    Auth(String),
    /// Quota or rate limit exhausted.
    RateLimited,
    /// Any other non-success status.
    Api { status: u16, message: String },
    /// The response body could not be understood or held no text.
    InvalidResponse(String),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection(message) => write!(f, "connection error: {message}"),
            Self::Timeout => write!(f, "request timed out"),
            Self::Auth(message) => write!(f, "authentication failed: {message}"),
            Self::RateLimited => write!(f, "rate limited"),
            Self::Api { status, message } => write!(f, "API error (status {status}): {message}"),
            Self::InvalidResponse(message) => write!(f, "invalid response: {message}"),
        }
    }
}

impl Error for ServiceError {}

/// One capability: turn a prompt into text using the caller's credential.
pub trait GenerationService {
    /// Issues exactly one blocking request.
    fn generate(&self, prompt: &str, credential: &str) -> Result<String, ServiceError>;
}

impl<T: GenerationService + ?Sized> GenerationService for &T {
    fn generate(&self, prompt: &str, credential: &str) -> Result<String, ServiceError> {
        (**self).generate(prompt, credential)
    }
}
