use thiserror::Error;

use crate::provider::Provider;

/// Failures from a gateway round trip.
///
/// `Protocol` means the gateway answered, but not in the shape its provider
/// promises. Every other variant is a network failure.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),
    #[error("invalid response format from {0}")]
    Protocol(Provider),
    /// The task carrying the request ended before it produced a result.
    #[error("request interrupted: {0}")]
    Interrupted(String),
}

impl GatewayError {
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            GatewayError::Transport(_) | GatewayError::HttpStatus(_) | GatewayError::Interrupted(_)
        )
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("stored chat history is unreadable: {0}")]
    CorruptState(#[source] serde_json::Error),
    #[error("could not encode chat history: {0}")]
    Encode(#[source] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A prompt rejected before anything is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("prompt is empty")]
    EmptyPrompt,
    #[error("a reply is still pending")]
    Busy,
}
