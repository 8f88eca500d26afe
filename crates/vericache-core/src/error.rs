//! Error type shared by the serializer and clock modules.

use thiserror::Error;

/// Errors raised by `vericache-core`'s wire serializer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The payload is shorter than the 5-byte prefix, or the prefix's form
    /// tag is neither `"JSON"` nor `"BIN "`.
    #[error("corrupt payload: {reason}")]
    CorruptPayload {
        /// Human-readable description of what was wrong with the prefix.
        reason: &'static str,
    },

    /// `bincode` failed to encode or decode the structured form.
    #[error("serialization failed: {0}")]
    Encoding(#[from] Box<bincode::ErrorKind>),

    /// `zstd` failed to compress or decompress the payload body.
    #[error("compression failed: {0}")]
    Compression(#[source] std::io::Error),
}
