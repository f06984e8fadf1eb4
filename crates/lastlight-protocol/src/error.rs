//! Error types for the protocol layer.

/// Errors from encoding, decoding, or validating shared data shapes.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The bytes weren't valid JSON or didn't match the expected shape.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed but failed shape validation (duplicate slots,
    /// empty ids, zero quantities). Treated as "fall back to defaults"
    /// by the loading path, never as a fatal condition.
    #[error("malformed persisted document: {0}")]
    MalformedDocument(String),
}
