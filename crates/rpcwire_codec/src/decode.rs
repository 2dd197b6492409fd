//! Decoder: CBOR bytes to validated typed values.
//!
//! Decoding never trusts the input or the schema. The wire value is first
//! checked against the declared type with [`compat::compatible`], then
//! converted element by element; every failure names the path of the
//! offending element.
//!
//! [`compat::compatible`]: crate::compat::compatible

use crate::compat::{compatible, compatible_def, WireShape, TAG_POSITIVE_BIGNUM};
use crate::config::CodecConfig;
use crate::encode::{write_cbor, Encoder};
use crate::error::{DecodeError, Result};
use crate::path::WirePath;
use crate::value::Value;
use ciborium::value::{Integer, Value as CborValue};
use rpcwire_schema::Registry;
use rpcwire_types::{Address, Balance, Type, TypeDef};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Extra nesting the CBOR reader tolerates beyond `max_depth`.
const WIRE_DEPTH_SLACK: usize = 2;

/// Stateless decoder bound to one registry.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'r> {
    registry: &'r Registry,
    config: CodecConfig,
}

impl<'r> Decoder<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self::with_config(registry, CodecConfig::default())
    }

    pub fn with_config(registry: &'r Registry, config: CodecConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Decode `bytes` as a value of `ty`.
    pub fn decode(&self, ty: &Type, bytes: &[u8]) -> Result<Value> {
        let result = self
            .read_wire(bytes)
            .and_then(|wire| self.decode_wire(ty, &wire));
        if let Err(err) = &result {
            debug!(ty = %ty, len = bytes.len(), error = %err, "Decode failed");
        }
        result
    }

    /// Parse exactly one CBOR item, rejecting oversized input and
    /// trailing bytes.
    pub fn read_wire(&self, bytes: &[u8]) -> Result<CborValue> {
        if bytes.len() > self.config.max_input_len {
            return Err(DecodeError::InputTooLarge {
                len: bytes.len(),
                limit: self.config.max_input_len,
            });
        }

        // The reader's own nesting guard sits just above max_depth: a
        // bignum tag nests one level deeper than the value it encodes.
        let mut reader = bytes;
        let recursion_limit = self.config.max_depth.saturating_add(WIRE_DEPTH_SLACK);
        let wire: CborValue = ciborium::de::from_reader_with_recursion_limit(&mut reader, recursion_limit)
            .map_err(|err| match err {
                ciborium::de::Error::RecursionLimitExceeded => DecodeError::DepthLimitExceeded {
                    path: WirePath::root(),
                    limit: self.config.max_depth,
                },
                other => DecodeError::malformed(&WirePath::root(), format!("invalid CBOR: {:?}", other)),
            })?;

        if !reader.is_empty() {
            return Err(DecodeError::malformed(
                &WirePath::root(),
                format!("{} trailing byte(s) after the value", reader.len()),
            ));
        }
        Ok(wire)
    }

    /// Decode an already parsed wire value.
    pub fn decode_wire(&self, ty: &Type, wire: &CborValue) -> Result<Value> {
        self.decode_at(ty, wire, &WirePath::root())
    }

    pub(crate) fn decode_at(&self, ty: &Type, wire: &CborValue, path: &WirePath) -> Result<Value> {
        self.walk(self.registry, ty, wire, path)
    }

    fn walk(&self, scope: &Registry, ty: &Type, wire: &CborValue, path: &WirePath) -> Result<Value> {
        if path.depth() > self.config.max_depth {
            return Err(DecodeError::DepthLimitExceeded {
                path: path.clone(),
                limit: self.config.max_depth,
            });
        }

        let shape = WireShape::of(wire);
        if !compatible(ty, &shape) {
            return Err(shape_error(ty, &shape, path));
        }

        match (ty, wire) {
            (Type::Bool, CborValue::Bool(v)) => Ok(Value::Bool(*v)),
            (Type::U8, CborValue::Integer(i)) => int(*i, ty, path).map(Value::U8),
            (Type::I8, CborValue::Integer(i)) => int(*i, ty, path).map(Value::I8),
            (Type::U16, CborValue::Integer(i)) => int(*i, ty, path).map(Value::U16),
            (Type::I16, CborValue::Integer(i)) => int(*i, ty, path).map(Value::I16),
            (Type::U32, CborValue::Integer(i)) => int(*i, ty, path).map(Value::U32),
            (Type::I32, CborValue::Integer(i)) => int(*i, ty, path).map(Value::I32),
            (Type::U64, CborValue::Integer(i)) => int(*i, ty, path).map(Value::U64),
            (Type::I64, CborValue::Integer(i)) => int(*i, ty, path).map(Value::I64),
            (Type::F32, CborValue::Float(f)) => narrow_f32(*f, path).map(Value::F32),
            (Type::F64, CborValue::Float(f)) => Ok(Value::F64(*f)),
            (Type::String, CborValue::Text(s)) => Ok(Value::String(s.clone())),
            (Type::Bytes, CborValue::Bytes(b)) => Ok(Value::Bytes(b.clone())),
            (Type::Address, CborValue::Bytes(b)) => Address::from_slice(b)
                .map(Value::Address)
                .ok_or_else(|| shape_error(ty, &shape, path)),
            (Type::Balance, wire) => decode_balance(wire, path).map(Value::Balance),

            (Type::Tuple(types), CborValue::Array(items)) => types
                .iter()
                .zip(items)
                .enumerate()
                .map(|(i, (item_ty, item))| self.walk(scope, item_ty, item, &path.index(i)))
                .collect::<Result<Vec<_>>>()
                .map(Value::Tuple),
            (Type::Array(item_ty, _) | Type::List(item_ty), CborValue::Array(items)) => {
                self.sequence(scope, item_ty, items, path).map(Value::List)
            }
            (Type::Set(item_ty), CborValue::Array(items)) => {
                let mut seen = HashSet::new();
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let item_path = path.index(i);
                    let decoded = self.walk(scope, item_ty, item, &item_path)?;
                    if !seen.insert(canonical(scope, item_ty, &decoded, &item_path)?) {
                        return Err(DecodeError::malformed(&item_path, "duplicate set element"));
                    }
                    out.push(decoded);
                }
                Ok(Value::Set(out))
            }
            (Type::Map(key_ty, value_ty), CborValue::Map(entries)) => {
                let mut seen = HashSet::new();
                let mut out = Vec::with_capacity(entries.len());
                for (i, (k, v)) in entries.iter().enumerate() {
                    let key_path = path.key(i);
                    let key = self.walk(scope, key_ty, k, &key_path)?;
                    if !seen.insert(canonical(scope, key_ty, &key, &key_path)?) {
                        return Err(DecodeError::malformed(&key_path, "duplicate map key"));
                    }
                    out.push((key, self.walk(scope, value_ty, v, &path.index(i))?));
                }
                Ok(Value::Map(out))
            }

            (Type::Optional(_), CborValue::Null) => Ok(Value::none()),
            (Type::Optional(inner), wire) => self.walk(scope, inner, wire, path).map(Value::some),

            (Type::Result(ok_ty, err_ty), CborValue::Map(entries)) => match entries.as_slice() {
                [(CborValue::Text(key), v)] if key == "Ok" => self
                    .walk(scope, ok_ty, v, &path.field("Ok"))
                    .map(Value::ok),
                [(CborValue::Text(key), v)] if key == "Err" => self
                    .walk(scope, err_ty, v, &path.field("Err"))
                    .map(Value::err),
                [(key, _)] => Err(DecodeError::malformed(
                    path,
                    format!("result key must be \"Ok\" or \"Err\", got {}", describe_key(key)),
                )),
                _ => Err(shape_error(ty, &shape, path)),
            },

            (Type::Defined { namespace, name }, wire) => {
                let resolved = scope.resolve_scoped(namespace.as_deref(), name).map_err(|_| {
                    DecodeError::UnknownTypeReference {
                        path: path.clone(),
                        reference: ty.to_string(),
                    }
                })?;
                self.walk_def(resolved.registry, resolved.def, wire, path)
            }

            _ => Err(shape_error(ty, &shape, path)),
        }
    }

    fn sequence(
        &self,
        scope: &Registry,
        item_ty: &Type,
        items: &[CborValue],
        path: &WirePath,
    ) -> Result<Vec<Value>> {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.walk(scope, item_ty, item, &path.index(i)))
            .collect()
    }

    fn walk_def(
        &self,
        scope: &Registry,
        def: &TypeDef,
        wire: &CborValue,
        path: &WirePath,
    ) -> Result<Value> {
        let shape = WireShape::of(wire);
        if !compatible_def(def, &shape) {
            return Err(DecodeError::malformed(
                path,
                format!("expected {} '{}', got {}", def.kind(), def.name(), shape),
            ));
        }

        match (def, wire) {
            (TypeDef::Enum { name, variants }, CborValue::Text(variant)) => {
                if variants.contains(variant) {
                    Ok(Value::Enum(variant.clone()))
                } else {
                    Err(DecodeError::InvalidEnumVariant {
                        path: path.clone(),
                        enum_name: name.clone(),
                        variant: variant.clone(),
                    })
                }
            }
            (
                TypeDef::Struct { name, fields } | TypeDef::Event { name, fields, .. },
                CborValue::Map(entries),
            ) => {
                let mut by_name = HashMap::with_capacity(entries.len());
                for (i, (key, value)) in entries.iter().enumerate() {
                    let CborValue::Text(key) = key else {
                        return Err(DecodeError::malformed(
                            &path.key(i),
                            format!("field names must be text, got {}", WireShape::of(key)),
                        ));
                    };
                    if by_name.insert(key.as_str(), value).is_some() {
                        return Err(DecodeError::malformed(
                            &path.key(i),
                            format!("field '{}' appears more than once", key),
                        ));
                    }
                }

                let mut out = Vec::with_capacity(fields.len());
                for field in fields {
                    let Some(value) = by_name.get(field.name.as_str()) else {
                        return Err(DecodeError::MissingField {
                            path: path.clone(),
                            type_name: name.clone(),
                            field: field.name.clone(),
                        });
                    };
                    let decoded = self.walk(scope, &field.ty, value, &path.field(&field.name))?;
                    out.push((field.name.clone(), decoded));
                }
                Ok(Value::Struct(out))
            }
            _ => Err(DecodeError::malformed(
                path,
                format!("expected {} '{}', got {}", def.kind(), def.name(), shape),
            )),
        }
    }
}

/// Canonical bytes of a decoded value. Equal values have equal bytes even
/// when they arrived in different wire forms.
fn canonical(scope: &Registry, ty: &Type, value: &Value, path: &WirePath) -> Result<Vec<u8>> {
    Encoder::new(scope)
        .to_wire(ty, value)
        .map(|wire| write_cbor(&wire))
        .map_err(|err| DecodeError::malformed(path, err.to_string()))
}

/// Classify a failed shape check.
fn shape_error(ty: &Type, shape: &WireShape, path: &WirePath) -> DecodeError {
    match (ty, shape) {
        (Type::Array(_, expected), WireShape::Sequence { len }) => DecodeError::ArrayLengthMismatch {
            path: path.clone(),
            expected: *expected,
            got: *len,
        },
        (Type::Optional(inner), _) => shape_error(inner, shape, path),
        (Type::Result(..), WireShape::Map { len }) => DecodeError::malformed(
            path,
            format!("result must have exactly one key, got {}", len),
        ),
        _ => DecodeError::malformed(path, format!("expected {}, got {}", ty, shape)),
    }
}

fn int<T: TryFrom<Integer>>(raw: Integer, ty: &Type, path: &WirePath) -> Result<T> {
    T::try_from(raw).map_err(|_| {
        DecodeError::malformed(
            path,
            format!("integer {} out of range for {}", i128::from(raw), ty),
        )
    })
}

fn narrow_f32(raw: f64, path: &WirePath) -> Result<f32> {
    let narrowed = raw as f32;
    if raw.is_nan() || f64::from(narrowed) == raw {
        Ok(narrowed)
    } else {
        Err(DecodeError::malformed(
            path,
            format!("float {} is not representable as f32", raw),
        ))
    }
}

/// Accepts a plain unsigned integer or a positive bignum; the CBOR reader
/// may already have folded a short bignum into an integer.
fn decode_balance(wire: &CborValue, path: &WirePath) -> Result<Balance> {
    match wire {
        CborValue::Integer(raw) => u128::try_from(*raw)
            .map(Balance::from)
            .map_err(|_| DecodeError::malformed(path, "balance must not be negative")),
        CborValue::Tag(TAG_POSITIVE_BIGNUM, inner) => match inner.as_ref() {
            CborValue::Bytes(magnitude) => Ok(Balance::from_be_bytes(magnitude)),
            other => Err(DecodeError::malformed(
                path,
                format!("bignum must wrap a byte string, got {}", WireShape::of(other)),
            )),
        },
        other => Err(DecodeError::malformed(
            path,
            format!("expected Balance, got {}", WireShape::of(other)),
        )),
    }
}

fn describe_key(key: &CborValue) -> String {
    match key {
        CborValue::Text(text) => format!("\"{}\"", text),
        other => WireShape::of(other).to_string(),
    }
}
