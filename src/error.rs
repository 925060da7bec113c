//! Bridge error types.
//!
//! Only conditions the caller can act on become errors. Dispatch-path anomalies
//! (routing misses, stale tokens, duplicate responds, handler panics) are
//! recovered locally and surfaced as log diagnostics; see the injector docs.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// The transport delivered a message that is not a valid bridge call.
    #[error("malformed bridge message: {0}")]
    MalformedMessage(#[from] serde_json::Error),
}
