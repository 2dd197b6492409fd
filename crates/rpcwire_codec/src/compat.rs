//! Compatibility between declared types and observed wire shapes.
//!
//! The wire carries no marker distinguishing a fixed-length `Array` from a
//! growable `List`, so the decision is made here, at decode time: a
//! sequence satisfies `Array<T, n>` exactly when it has `n` elements and
//! satisfies `List<T>` at any length. Every other type needs an exact
//! wire-kind match; there is no coercion between kinds.

use ciborium::value::Value as CborValue;
use rpcwire_types::{Address, Type, TypeDef};
use std::fmt;

/// CBOR tag for an unsigned bignum (RFC 8949 §3.4.3).
pub const TAG_POSITIVE_BIGNUM: u64 = 2;

/// Top-level shape of a wire value, without its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireShape {
    Null,
    Bool,
    Integer,
    Float,
    Text,
    Bytes { len: usize },
    Sequence { len: usize },
    Map { len: usize },
    Tag(u64),
    /// Simple values and anything else outside the data model
    Other,
}

impl WireShape {
    pub fn of(value: &CborValue) -> Self {
        match value {
            CborValue::Null => WireShape::Null,
            CborValue::Bool(_) => WireShape::Bool,
            CborValue::Integer(_) => WireShape::Integer,
            CborValue::Float(_) => WireShape::Float,
            CborValue::Text(_) => WireShape::Text,
            CborValue::Bytes(b) => WireShape::Bytes { len: b.len() },
            CborValue::Array(items) => WireShape::Sequence { len: items.len() },
            CborValue::Map(entries) => WireShape::Map { len: entries.len() },
            CborValue::Tag(tag, _) => WireShape::Tag(*tag),
            _ => WireShape::Other,
        }
    }
}

impl fmt::Display for WireShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireShape::Null => write!(f, "null"),
            WireShape::Bool => write!(f, "bool"),
            WireShape::Integer => write!(f, "integer"),
            WireShape::Float => write!(f, "float"),
            WireShape::Text => write!(f, "text"),
            WireShape::Bytes { len } => write!(f, "byte string of {} bytes", len),
            WireShape::Sequence { len } => write!(f, "sequence of {} elements", len),
            WireShape::Map { len } => write!(f, "map of {} entries", len),
            WireShape::Tag(tag) => write!(f, "tag {}", tag),
            WireShape::Other => write!(f, "unsupported value"),
        }
    }
}

/// Whether a wire value of shape `observed` may be decoded as `declared`.
///
/// `Defined` always passes here; the decoder checks the resolved
/// declaration with [`compatible_def`].
pub fn compatible(declared: &Type, observed: &WireShape) -> bool {
    match (declared, observed) {
        (Type::Bool, WireShape::Bool) => true,
        (
            Type::U8
            | Type::I8
            | Type::U16
            | Type::I16
            | Type::U32
            | Type::I32
            | Type::U64
            | Type::I64,
            WireShape::Integer,
        ) => true,
        (Type::F32 | Type::F64, WireShape::Float) => true,
        (Type::String, WireShape::Text) => true,
        (Type::Bytes, WireShape::Bytes { .. }) => true,
        (Type::Address, WireShape::Bytes { len }) => *len == Address::LEN,
        (Type::Balance, WireShape::Integer) => true,
        (Type::Balance, WireShape::Tag(tag)) => *tag == TAG_POSITIVE_BIGNUM,
        (Type::Tuple(items), WireShape::Sequence { len }) => items.len() == *len,
        (Type::Array(_, n), WireShape::Sequence { len }) => *n == *len as u64,
        (Type::List(_) | Type::Set(_), WireShape::Sequence { .. }) => true,
        (Type::Map(..), WireShape::Map { .. }) => true,
        (Type::Optional(_), WireShape::Null) => true,
        (Type::Optional(inner), shape) => compatible(inner, shape),
        (Type::Result(..), WireShape::Map { len }) => *len == 1,
        (Type::Defined { .. }, _) => true,
        _ => false,
    }
}

/// Shape check for a resolved declaration.
pub fn compatible_def(def: &TypeDef, observed: &WireShape) -> bool {
    match def {
        TypeDef::Struct { .. } | TypeDef::Event { .. } => matches!(observed, WireShape::Map { .. }),
        TypeDef::Enum { .. } => matches!(observed, WireShape::Text),
    }
}

/// Type-level form of the Array/List rule.
pub fn convertible(encoded_as: &Type, decoded_as: &Type) -> bool {
    encoded_as.is_convertible_to(decoded_as)
}
