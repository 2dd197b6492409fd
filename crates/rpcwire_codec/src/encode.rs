//! Encoder: typed values to canonical CBOR.
//!
//! # Canonical form
//!
//! | Type | Wire |
//! |------|------|
//! | bool, integers, f32/f64, string, bytes | CBOR native (floats in shortest lossless width) |
//! | `Address` | byte string, exactly 20 bytes |
//! | `Balance` | unsigned integer if it fits in 64 bits, else tag 2 + minimal big-endian magnitude |
//! | `Tuple`, `Array`, `List` | array in element order |
//! | `Set` | array sorted by encoded element bytes |
//! | `Map` | map sorted by encoded key bytes |
//! | `Optional` | null, or the inner encoding unwrapped |
//! | `Result` | one-entry map `{"Ok": v}` or `{"Err": e}` |
//! | enum | text of the variant |
//! | struct, event | map of field name to value, declared order |

use crate::compat::TAG_POSITIVE_BIGNUM;
use crate::error::EncodeError;
use crate::path::WirePath;
use crate::value::Value;
use ciborium::value::Value as CborValue;
use rpcwire_schema::Registry;
use rpcwire_types::{Balance, Type, TypeDef};
use std::collections::HashSet;
use tracing::debug;

type Result<T> = std::result::Result<T, EncodeError>;

/// Stateless encoder bound to one registry.
#[derive(Debug, Clone, Copy)]
pub struct Encoder<'r> {
    registry: &'r Registry,
}

impl<'r> Encoder<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Encode a value that is known to be well-typed.
    ///
    /// # Panics
    ///
    /// Panics if `value` does not match `ty`. Values from an untrusted
    /// source go through [`Encoder::try_encode`] instead.
    pub fn encode(&self, ty: &Type, value: &Value) -> Vec<u8> {
        match self.try_encode(ty, value) {
            Ok(bytes) => bytes,
            Err(err) => panic!("encode called with an ill-typed value: {}", err),
        }
    }

    /// Encode, reporting a type mismatch instead of panicking.
    pub fn try_encode(&self, ty: &Type, value: &Value) -> Result<Vec<u8>> {
        let wire = self.to_wire(ty, value)?;
        let bytes = write_cbor(&wire);
        debug!(ty = %ty, len = bytes.len(), "Encoded value");
        Ok(bytes)
    }

    /// The wire value `value` encodes to, before serialization.
    pub fn to_wire(&self, ty: &Type, value: &Value) -> Result<CborValue> {
        self.to_wire_at(ty, value, &WirePath::root())
    }

    pub(crate) fn to_wire_at(&self, ty: &Type, value: &Value, path: &WirePath) -> Result<CborValue> {
        self.walk(self.registry, ty, value, path)
    }

    fn walk(&self, scope: &Registry, ty: &Type, value: &Value, path: &WirePath) -> Result<CborValue> {
        let wire = match (ty, value) {
            (Type::Bool, Value::Bool(v)) => CborValue::Bool(*v),
            (Type::U8, Value::U8(v)) => CborValue::Integer((*v).into()),
            (Type::I8, Value::I8(v)) => CborValue::Integer((*v).into()),
            (Type::U16, Value::U16(v)) => CborValue::Integer((*v).into()),
            (Type::I16, Value::I16(v)) => CborValue::Integer((*v).into()),
            (Type::U32, Value::U32(v)) => CborValue::Integer((*v).into()),
            (Type::I32, Value::I32(v)) => CborValue::Integer((*v).into()),
            (Type::U64, Value::U64(v)) => CborValue::Integer((*v).into()),
            (Type::I64, Value::I64(v)) => CborValue::Integer((*v).into()),
            (Type::F32, Value::F32(v)) => CborValue::Float(f64::from(*v)),
            (Type::F64, Value::F64(v)) => CborValue::Float(*v),
            (Type::String, Value::String(v)) => CborValue::Text(v.clone()),
            (Type::Bytes, Value::Bytes(v)) => CborValue::Bytes(v.clone()),
            (Type::Address, Value::Address(v)) => CborValue::Bytes(v.to_vec()),
            (Type::Balance, Value::Balance(v)) => balance_to_wire(v),

            (Type::Tuple(types), Value::Tuple(items)) => {
                if types.len() != items.len() {
                    return Err(EncodeError::mismatch(
                        path,
                        ty,
                        format!("tuple of {} elements", items.len()),
                    ));
                }
                let mut out = Vec::with_capacity(items.len());
                for (i, (item_ty, item)) in types.iter().zip(items).enumerate() {
                    out.push(self.walk(scope, item_ty, item, &path.index(i))?);
                }
                CborValue::Array(out)
            }
            (Type::Array(item_ty, n), Value::List(items)) => {
                if items.len() as u64 != *n {
                    return Err(EncodeError::mismatch(
                        path,
                        ty,
                        format!("list of {} elements", items.len()),
                    ));
                }
                CborValue::Array(self.sequence(scope, item_ty, items, path)?)
            }
            (Type::List(item_ty), Value::List(items)) => {
                CborValue::Array(self.sequence(scope, item_ty, items, path)?)
            }
            (Type::Set(item_ty), Value::Set(items)) => {
                let mut encoded = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let wire = self.walk(scope, item_ty, item, &path.index(i))?;
                    encoded.push((write_cbor(&wire), wire));
                }
                encoded.sort_by(|a, b| a.0.cmp(&b.0));
                if encoded.windows(2).any(|pair| pair[0].0 == pair[1].0) {
                    return Err(EncodeError::mismatch(path, ty, "set with duplicate elements"));
                }
                CborValue::Array(encoded.into_iter().map(|(_, wire)| wire).collect())
            }
            (Type::Map(key_ty, value_ty), Value::Map(entries)) => {
                let mut encoded = Vec::with_capacity(entries.len());
                for (i, (k, v)) in entries.iter().enumerate() {
                    let key = self.walk(scope, key_ty, k, &path.key(i))?;
                    let value = self.walk(scope, value_ty, v, &path.index(i))?;
                    encoded.push((write_cbor(&key), key, value));
                }
                encoded.sort_by(|a, b| a.0.cmp(&b.0));
                if encoded.windows(2).any(|pair| pair[0].0 == pair[1].0) {
                    return Err(EncodeError::mismatch(path, ty, "map with duplicate keys"));
                }
                CborValue::Map(encoded.into_iter().map(|(_, k, v)| (k, v)).collect())
            }

            (Type::Optional(_), Value::Optional(None)) => CborValue::Null,
            (Type::Optional(inner), Value::Optional(Some(v))) => self.walk(scope, inner, v, path)?,

            (Type::Result(ok_ty, _), Value::Result(Ok(v))) => CborValue::Map(vec![(
                CborValue::Text("Ok".into()),
                self.walk(scope, ok_ty, v, &path.field("Ok"))?,
            )]),
            (Type::Result(_, err_ty), Value::Result(Err(e))) => CborValue::Map(vec![(
                CborValue::Text("Err".into()),
                self.walk(scope, err_ty, e, &path.field("Err"))?,
            )]),

            (Type::Defined { namespace, name }, _) => {
                let resolved = scope.resolve_scoped(namespace.as_deref(), name).map_err(|_| {
                    EncodeError::UnknownTypeReference {
                        path: path.clone(),
                        reference: ty.to_string(),
                    }
                })?;
                self.walk_def(resolved.registry, resolved.def, value, path)?
            }

            _ => return Err(EncodeError::mismatch(path, ty, value.kind_name())),
        };
        Ok(wire)
    }

    fn sequence(
        &self,
        scope: &Registry,
        item_ty: &Type,
        items: &[Value],
        path: &WirePath,
    ) -> Result<Vec<CborValue>> {
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
        value: &Value,
        path: &WirePath,
    ) -> Result<CborValue> {
        match (def, value) {
            (TypeDef::Enum { name, variants }, Value::Enum(variant)) => {
                if variants.contains(variant) {
                    Ok(CborValue::Text(variant.clone()))
                } else {
                    Err(EncodeError::mismatch(
                        path,
                        format!("variant of enum '{}'", name),
                        format!("'{}'", variant),
                    ))
                }
            }
            (
                TypeDef::Struct { name, fields } | TypeDef::Event { name, fields, .. },
                Value::Struct(supplied),
            ) => {
                let mut seen = HashSet::new();
                for (field, _) in supplied {
                    if !fields.iter().any(|f| &f.name == field) {
                        return Err(EncodeError::mismatch(
                            path,
                            name,
                            format!("unknown field '{}'", field),
                        ));
                    }
                    if !seen.insert(field.as_str()) {
                        return Err(EncodeError::mismatch(
                            path,
                            name,
                            format!("repeated field '{}'", field),
                        ));
                    }
                }

                let mut entries = Vec::with_capacity(fields.len());
                for field in fields {
                    let field_path = path.field(&field.name);
                    let Some((_, v)) = supplied.iter().find(|(n, _)| *n == field.name) else {
                        return Err(EncodeError::mismatch(&field_path, &field.ty, "missing field"));
                    };
                    entries.push((
                        CborValue::Text(field.name.clone()),
                        self.walk(scope, &field.ty, v, &field_path)?,
                    ));
                }
                Ok(CborValue::Map(entries))
            }
            _ => Err(EncodeError::mismatch(
                path,
                format!("{} '{}'", def.kind(), def.name()),
                value.kind_name(),
            )),
        }
    }
}

/// Canonical wire form of a balance.
pub(crate) fn balance_to_wire(balance: &Balance) -> CborValue {
    match balance.to_u64() {
        Some(small) => CborValue::Integer(small.into()),
        None => CborValue::Tag(
            TAG_POSITIVE_BIGNUM,
            Box::new(CborValue::Bytes(balance.to_be_bytes())),
        ),
    }
}

pub(crate) fn write_cbor(wire: &CborValue) -> Vec<u8> {
    let mut buf = Vec::new();
    ciborium::into_writer(wire, &mut buf).expect("writing CBOR into a Vec<u8> cannot fail");
    buf
}
