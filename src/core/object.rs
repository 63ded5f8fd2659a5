//! core::object
//!
//! The on-disk object encoding shared by blobs and commits.
//!
//! # Format
//!
//! ```text
//! <kind> <payload-len>\0<payload>
//! ```
//!
//! `kind` is `blob` or `commit`. The object id is the SHA-256 of these exact
//! bytes, so the tag is part of identity and a reader always knows what it is
//! holding without trying to decode the payload.

use thiserror::Error;

use crate::core::types::ObjectId;

/// Errors decoding an object's header.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ObjectError {
    #[error("object header is missing its NUL terminator")]
    MissingTerminator,

    #[error("malformed object header: {0}")]
    MalformedHeader(String),

    #[error("unknown object kind: {0}")]
    UnknownKind(String),

    #[error("object length mismatch: header says {declared}, payload has {actual}")]
    LengthMismatch { declared: usize, actual: usize },
}

/// The two kinds of stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Blob,
    Commit,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Commit => "commit",
        }
    }

    fn parse(tag: &str) -> Result<Self, ObjectError> {
        match tag {
            "blob" => Ok(ObjectKind::Blob),
            "commit" => Ok(ObjectKind::Commit),
            other => Err(ObjectError::UnknownKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Frame a payload with its kind tag.
pub fn encode(kind: ObjectKind, payload: &[u8]) -> Vec<u8> {
    let header = format!("{} {}\0", kind, payload.len());
    let mut bytes = Vec::with_capacity(header.len() + payload.len());
    bytes.extend_from_slice(header.as_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

/// The id an object of this kind and payload would be stored under.
pub fn id_for(kind: ObjectKind, payload: &[u8]) -> ObjectId {
    ObjectId::of(&encode(kind, payload))
}

/// Parse only the header: kind, declared payload length, payload offset.
pub fn decode_header(bytes: &[u8]) -> Result<(ObjectKind, usize, usize), ObjectError> {
    let nul = bytes
        .iter()
        .position(|&b| b == 0)
        .ok_or(ObjectError::MissingTerminator)?;
    let header = std::str::from_utf8(&bytes[..nul])
        .map_err(|_| ObjectError::MalformedHeader("header is not UTF-8".into()))?;
    let (tag, len) = header
        .split_once(' ')
        .ok_or_else(|| ObjectError::MalformedHeader(header.to_string()))?;
    let kind = ObjectKind::parse(tag)?;
    let declared = len
        .parse::<usize>()
        .map_err(|_| ObjectError::MalformedHeader(header.to_string()))?;
    Ok((kind, declared, nul + 1))
}

/// Split stored bytes into kind and payload, checking the declared length.
pub fn decode(bytes: &[u8]) -> Result<(ObjectKind, &[u8]), ObjectError> {
    let (kind, declared, start) = decode_header(bytes)?;
    let payload = &bytes[start..];
    if payload.len() != declared {
        return Err(ObjectError::LengthMismatch {
            declared,
            actual: payload.len(),
        });
    }
    Ok((kind, payload))
}
