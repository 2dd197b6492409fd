//! Codec error types

use crate::path::WirePath;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Why a decode call failed. Every variant except `InputTooLarge` names
/// the offending element.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Array length mismatch at {path}: expected {expected} elements, got {got}")]
    ArrayLengthMismatch {
        path: WirePath,
        expected: u64,
        got: usize,
    },

    #[error("Invalid variant '{variant}' for enum '{enum_name}' at {path}")]
    InvalidEnumVariant {
        path: WirePath,
        enum_name: String,
        variant: String,
    },

    #[error("Missing field '{field}' of '{type_name}' at {path}")]
    MissingField {
        path: WirePath,
        type_name: String,
        field: String,
    },

    #[error("Malformed wire value at {path}: {reason}")]
    MalformedWireValue { path: WirePath, reason: String },

    #[error("Unknown type reference '{reference}' at {path}")]
    UnknownTypeReference { path: WirePath, reference: String },

    #[error("Nesting deeper than {limit} levels at {path}")]
    DepthLimitExceeded { path: WirePath, limit: usize },

    #[error("Input of {len} bytes exceeds the {limit} byte limit")]
    InputTooLarge { len: usize, limit: usize },
}

impl DecodeError {
    pub(crate) fn malformed(path: &WirePath, reason: impl Into<String>) -> Self {
        DecodeError::MalformedWireValue {
            path: path.clone(),
            reason: reason.into(),
        }
    }
}

/// Why a value could not be encoded under a type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Type mismatch at {path}: expected {expected}, got {got}")]
    TypeMismatch {
        path: WirePath,
        expected: String,
        got: String,
    },

    #[error("Unknown type reference '{reference}' at {path}")]
    UnknownTypeReference { path: WirePath, reference: String },
}

impl EncodeError {
    pub(crate) fn mismatch(path: &WirePath, expected: impl ToString, got: impl Into<String>) -> Self {
        EncodeError::TypeMismatch {
            path: path.clone(),
            expected: expected.to_string(),
            got: got.into(),
        }
    }
}

/// Failures of the call envelope.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("Unknown method '{0}'")]
    UnknownMethod(String),

    #[error("Method '{method}' takes {expected} argument(s), got {got}")]
    ArgumentCountMismatch {
        method: String,
        expected: usize,
        got: usize,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}
