use thiserror::Error;

/// Errors produced while decoding client messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid JSON message: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("unsupported websocket payload (expected text)")]
    NonTextPayload,
}
