//! Uniform encode/decode with optional compression (component C2).
//!
//! Two payload forms are supported: `Structured`, for plain records encoded
//! with `bincode`, and `Opaque`, for pre-computed byte blobs the caller
//! already has (e.g. a value fetched from an upstream that returns raw
//! bytes). Values above [`COMPRESSION_THRESHOLD_BYTES`] are compressed with
//! `zstd` when doing so saves at least [`COMPRESSION_MIN_RATIO`]; otherwise
//! the value is stored raw. A 5-byte prefix records `{compressed?, form}` so
//! a decoder never needs an external schema: byte 0 is `1` if compressed,
//! `0` if raw; bytes 1-4 are an ASCII form tag, `b"JSON"` for structured or
//! `b"BIN "` (space-padded) for opaque.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::CoreError;

/// Values larger than this are candidates for compression.
pub const COMPRESSION_THRESHOLD_BYTES: usize = 1024;

/// Compression is only kept if it shrinks the payload by at least this
/// fraction; otherwise the raw bytes are stored instead.
pub const COMPRESSION_MIN_RATIO: f64 = 0.20;

const PREFIX_LEN: usize = 5;
const FORM_TAG_STRUCTURED: &[u8; 4] = b"JSON";
const FORM_TAG_OPAQUE: &[u8; 4] = b"BIN ";

/// Which of the two payload forms a serialized value carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    /// A `bincode`-encoded structured record.
    Structured,
    /// A pre-computed, caller-supplied byte blob stored verbatim.
    Opaque,
}

impl Form {
    fn tag(self) -> &'static [u8; 4] {
        match self {
            Form::Structured => FORM_TAG_STRUCTURED,
            Form::Opaque => FORM_TAG_OPAQUE,
        }
    }

    fn from_tag(tag: &[u8]) -> Result<Self, CoreError> {
        if tag == FORM_TAG_STRUCTURED {
            Ok(Form::Structured)
        } else if tag == FORM_TAG_OPAQUE {
            Ok(Form::Opaque)
        } else {
            Err(CoreError::CorruptPayload {
                reason: "unrecognized form tag",
            })
        }
    }
}

/// A payload ready to be stored, still tagged with its form and compression
/// state so [`decode`] can reverse the process without extra bookkeeping.
#[derive(Debug, Clone)]
pub struct EncodedPayload {
    /// Whether [`EncodedPayload::bytes`] is zstd-compressed.
    pub compressed: bool,
    /// Which form the payload was encoded from.
    pub form: Form,
    /// The 5-byte-prefixed wire bytes.
    pub bytes: Vec<u8>,
}

/// Encodes a `Serialize` value into its structured wire form.
pub fn encode<T: Serialize>(value: &T) -> Result<EncodedPayload, CoreError> {
    let body = bincode::serialize(value).map_err(CoreError::Encoding)?;
    encode_bytes(body, Form::Structured)
}

/// Wraps caller-supplied opaque bytes in the same 5-byte-prefixed envelope,
/// without running them through `bincode`.
pub fn encode_opaque(body: Vec<u8>) -> Result<EncodedPayload, CoreError> {
    encode_bytes(body, Form::Opaque)
}

fn encode_bytes(body: Vec<u8>, form: Form) -> Result<EncodedPayload, CoreError> {
    let (compressed, body) = maybe_compress(body)?;

    let mut bytes = Vec::with_capacity(PREFIX_LEN + body.len());
    bytes.push(compressed as u8);
    bytes.extend_from_slice(form.tag());
    bytes.extend_from_slice(&body);

    Ok(EncodedPayload {
        compressed,
        form,
        bytes,
    })
}

fn maybe_compress(body: Vec<u8>) -> Result<(bool, Vec<u8>), CoreError> {
    if body.len() < COMPRESSION_THRESHOLD_BYTES {
        return Ok((false, body));
    }

    let compressed = zstd::encode_all(body.as_slice(), 0).map_err(CoreError::Compression)?;
    let saved = 1.0 - (compressed.len() as f64 / body.len() as f64);

    if saved >= COMPRESSION_MIN_RATIO {
        Ok((true, compressed))
    } else {
        Ok((false, body))
    }
}

/// Decodes a structured value previously produced by [`encode`].
///
/// Returns [`CoreError::CorruptPayload`] if the prefix is unrecognized, the
/// payload was encoded as [`Form::Opaque`], or decompression fails. Callers
/// treat this as a cache miss and evict the entry, per spec.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CoreError> {
    let (form, body) = decode_body(bytes)?;
    if form != Form::Structured {
        return Err(CoreError::CorruptPayload {
            reason: "expected structured form, found opaque",
        });
    }
    bincode::deserialize(&body).map_err(CoreError::Encoding)
}

/// Decodes an opaque blob previously produced by [`encode_opaque`], returning
/// the caller's original bytes.
pub fn decode_opaque(bytes: &[u8]) -> Result<Vec<u8>, CoreError> {
    let (form, body) = decode_body(bytes)?;
    if form != Form::Opaque {
        return Err(CoreError::CorruptPayload {
            reason: "expected opaque form, found structured",
        });
    }
    Ok(body)
}

fn decode_body(bytes: &[u8]) -> Result<(Form, Vec<u8>), CoreError> {
    if bytes.len() < PREFIX_LEN {
        return Err(CoreError::CorruptPayload {
            reason: "payload shorter than 5-byte prefix",
        });
    }

    let compressed = match bytes[0] {
        0 => false,
        1 => true,
        _ => {
            return Err(CoreError::CorruptPayload {
                reason: "compression flag byte is neither 0 nor 1",
            })
        }
    };
    let form = Form::from_tag(&bytes[1..5])?;
    let body = &bytes[PREFIX_LEN..];

    let body = if compressed {
        zstd::decode_all(body).map_err(CoreError::Compression)?
    } else {
        body.to_vec()
    };

    Ok((form, body))
}
