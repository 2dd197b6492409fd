//! The recursive value-shape description.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The shape of a value exchanged through an interface.
///
/// Equality is structural. `Array` and `List` over the same element type
/// are *not* equal, but they are convertible: see [`Type::is_convertible_to`].
///
/// # JSON form
///
/// `{"type": "u32"}`, `{"type": "array", "params": [{"type": "u8"}, 4]}`,
/// `{"type": "defined", "params": {"namespace": "token", "type": "Amount"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "params")]
pub enum Type {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
    String,
    Bytes,
    /// 20-byte account identifier
    Address,
    /// Unsigned integer of unbounded precision
    Balance,
    /// Fixed arity, heterogeneous
    Tuple(Vec<Type>),
    /// Fixed length `n`, homogeneous
    Array(Box<Type>, u64),
    /// Variable length, homogeneous
    List(Box<Type>),
    /// Variable length, no duplicate elements
    Set(Box<Type>),
    /// Key/value pairs, no duplicate keys
    Map(Box<Type>, Box<Type>),
    Optional(Box<Type>),
    /// Exactly one of a success or an error payload
    Result(Box<Type>, Box<Type>),
    /// Reference to a user-declared type.
    ///
    /// `namespace` is `None` for types declared in the current interface
    /// (or reachable through its imports), otherwise it names an import.
    Defined {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        namespace: Option<String>,
        #[serde(rename = "type")]
        name: String,
    },
}

impl Type {
    /// Reference to a type declared in the current interface.
    pub fn defined(name: impl Into<String>) -> Self {
        Type::Defined {
            namespace: None,
            name: name.into(),
        }
    }

    /// Reference to a type declared in the imported interface `namespace`.
    pub fn imported(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Type::Defined {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    pub fn tuple(items: impl IntoIterator<Item = Type>) -> Self {
        Type::Tuple(items.into_iter().collect())
    }

    pub fn array(item: Type, len: u64) -> Self {
        Type::Array(Box::new(item), len)
    }

    pub fn list(item: Type) -> Self {
        Type::List(Box::new(item))
    }

    pub fn set(item: Type) -> Self {
        Type::Set(Box::new(item))
    }

    pub fn map(key: Type, value: Type) -> Self {
        Type::Map(Box::new(key), Box::new(value))
    }

    pub fn optional(inner: Type) -> Self {
        Type::Optional(Box::new(inner))
    }

    pub fn result(ok: Type, err: Type) -> Self {
        Type::Result(Box::new(ok), Box::new(err))
    }

    /// Returns true for the scalar types (no nested types, no references).
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Type::Bool
                | Type::U8
                | Type::I8
                | Type::U16
                | Type::I16
                | Type::U32
                | Type::I32
                | Type::U64
                | Type::I64
                | Type::F32
                | Type::F64
                | Type::String
                | Type::Bytes
                | Type::Address
                | Type::Balance
        )
    }

    /// Direct child types, in declaration order.
    pub fn children(&self) -> Vec<&Type> {
        match self {
            Type::Tuple(items) => items.iter().collect(),
            Type::Array(item, _) | Type::List(item) | Type::Set(item) | Type::Optional(item) => {
                vec![item.as_ref()]
            }
            Type::Map(a, b) | Type::Result(a, b) => vec![a.as_ref(), b.as_ref()],
            _ => Vec::new(),
        }
    }

    /// Pre-order walk over this type and every nested type.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Type)) {
        f(self);
        for child in self.children() {
            child.visit(f);
        }
    }

    /// Whether a value encoded under `self` may be decoded as `target`.
    ///
    /// `Array<T, n>` and `List<T>` convert in both directions (the
    /// List-to-Array direction still requires the observed length to be
    /// `n`, which only the decoder can check). The rule applies through
    /// every composite; all other pairs must be identical.
    pub fn is_convertible_to(&self, target: &Type) -> bool {
        match (self, target) {
            (Type::Array(a, _), Type::List(b)) | (Type::List(a), Type::Array(b, _)) => {
                a.is_convertible_to(b)
            }
            (Type::Array(a, n), Type::Array(b, m)) => n == m && a.is_convertible_to(b),
            (Type::List(a), Type::List(b))
            | (Type::Set(a), Type::Set(b))
            | (Type::Optional(a), Type::Optional(b)) => a.is_convertible_to(b),
            (Type::Map(ka, va), Type::Map(kb, vb)) | (Type::Result(ka, va), Type::Result(kb, vb)) => {
                ka.is_convertible_to(kb) && va.is_convertible_to(vb)
            }
            (Type::Tuple(a), Type::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.is_convertible_to(y))
            }
            _ => self == target,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => write!(f, "bool"),
            Type::U8 => write!(f, "u8"),
            Type::I8 => write!(f, "i8"),
            Type::U16 => write!(f, "u16"),
            Type::I16 => write!(f, "i16"),
            Type::U32 => write!(f, "u32"),
            Type::I32 => write!(f, "i32"),
            Type::U64 => write!(f, "u64"),
            Type::I64 => write!(f, "i64"),
            Type::F32 => write!(f, "f32"),
            Type::F64 => write!(f, "f64"),
            Type::String => write!(f, "string"),
            Type::Bytes => write!(f, "bytes"),
            Type::Address => write!(f, "Address"),
            Type::Balance => write!(f, "Balance"),
            Type::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Type::Array(item, len) => write!(f, "Array<{}, {}>", item, len),
            Type::List(item) => write!(f, "List<{}>", item),
            Type::Set(item) => write!(f, "Set<{}>", item),
            Type::Map(key, value) => write!(f, "Map<{}, {}>", key, value),
            Type::Optional(inner) => write!(f, "Optional<{}>", inner),
            Type::Result(ok, err) => write!(f, "Result<{}, {}>", ok, err),
            Type::Defined {
                namespace: Some(ns),
                name,
            } => write!(f, "{}::{}", ns, name),
            Type::Defined {
                namespace: None,
                name,
            } => write!(f, "{}", name),
        }
    }
}
