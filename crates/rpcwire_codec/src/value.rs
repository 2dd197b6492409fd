//! Typed values.

use rpcwire_types::{Address, Balance};

/// A value as the application sees it, before encoding or after decoding.
///
/// A `Value` only means something together with the [`Type`] it is encoded
/// under: `List` serves both `Array<T, n>` and `List<T>`, and `Struct`
/// serves both struct and event declarations.
///
/// [`Type`]: rpcwire_types::Type
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
    Address(Address),
    Balance(Balance),
    Tuple(Vec<Value>),
    /// Elements of an `Array` or a `List`
    List(Vec<Value>),
    Set(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Optional(Option<Box<Value>>),
    Result(Result<Box<Value>, Box<Value>>),
    /// Variant name of a declared enum
    Enum(String),
    /// Field values of a declared struct or event, by name
    Struct(Vec<(String, Value)>),
}

impl Value {
    pub fn some(value: Value) -> Self {
        Value::Optional(Some(Box::new(value)))
    }

    pub fn none() -> Self {
        Value::Optional(None)
    }

    pub fn ok(value: Value) -> Self {
        Value::Result(Ok(Box::new(value)))
    }

    pub fn err(value: Value) -> Self {
        Value::Result(Err(Box::new(value)))
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().collect())
    }

    pub fn variant(name: impl Into<String>) -> Self {
        Value::Enum(name.into())
    }

    /// Struct or event value from `(field, value)` pairs.
    pub fn record<S: Into<String>>(fields: impl IntoIterator<Item = (S, Value)>) -> Self {
        Value::Struct(
            fields
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }

    /// Field value of a struct, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        match self {
            Value::Struct(fields) => fields.iter().find(|(name, _)| name == field).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Short name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::U8(_) => "u8",
            Value::I8(_) => "i8",
            Value::U16(_) => "u16",
            Value::I16(_) => "i16",
            Value::U32(_) => "u32",
            Value::I32(_) => "i32",
            Value::U64(_) => "u64",
            Value::I64(_) => "i64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Address(_) => "Address",
            Value::Balance(_) => "Balance",
            Value::Tuple(_) => "tuple",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Optional(_) => "optional",
            Value::Result(_) => "result",
            Value::Enum(_) => "enum variant",
            Value::Struct(_) => "struct",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U32(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Address> for Value {
    fn from(v: Address) -> Self {
        Value::Address(v)
    }
}

impl From<Balance> for Value {
    fn from(v: Balance) -> Self {
        Value::Balance(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_lookup() {
        let value = Value::record([("owner", Value::Address(Address::default())), ("n", 3u32.into())]);
        assert_eq!(value.get("n"), Some(&Value::U32(3)));
        assert_eq!(value.get("missing"), None);
        assert_eq!(Value::U8(1).get("n"), None);
    }

    #[test]
    fn test_constructors() {
        assert_eq!(Value::some(true.into()), Value::Optional(Some(Box::new(Value::Bool(true)))));
        assert_eq!(Value::err("bad".into()).kind_name(), "result");
        assert_eq!(Value::list([1u32.into(), 2u32.into()]), Value::List(vec![Value::U32(1), Value::U32(2)]));
    }
}
