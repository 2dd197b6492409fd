//! JSON rendering of typed values for the command line
//!
//! | Type | JSON |
//! |------|------|
//! | integers, floats, bool, string | native JSON |
//! | bytes | hex string, `0x` optional on input |
//! | Address | `"0x"` + 40 hex digits |
//! | Balance | decimal string (plain numbers accepted on input) |
//! | tuple, array, list, set | array |
//! | map | array of `[key, value]` pairs |
//! | optional | `null` or the inner value |
//! | result | `{"Ok": v}` or `{"Err": e}` |
//! | enum | variant name |
//! | struct, event | object keyed by field name |
//!
//! Reading JSON needs the type; writing it does not.

use anyhow::{anyhow, bail, Result};
use rpcwire_codec::{Value, WirePath};
use rpcwire_schema::Registry;
use rpcwire_types::{Address, Balance, Field, Type, TypeDef};
use serde_json::{json, Map, Value as JsonValue};

pub fn value_from_json(registry: &Registry, ty: &Type, json: &JsonValue) -> Result<Value> {
    from_json(registry, ty, json, &WirePath::root())
}

fn from_json(scope: &Registry, ty: &Type, json: &JsonValue, path: &WirePath) -> Result<Value> {
    let value = match ty {
        Type::Bool => Value::Bool(json.as_bool().ok_or_else(|| expected(path, ty, json))?),
        Type::U8 => Value::U8(unsigned(json, ty, path)?),
        Type::U16 => Value::U16(unsigned(json, ty, path)?),
        Type::U32 => Value::U32(unsigned(json, ty, path)?),
        Type::U64 => Value::U64(unsigned(json, ty, path)?),
        Type::I8 => Value::I8(signed(json, ty, path)?),
        Type::I16 => Value::I16(signed(json, ty, path)?),
        Type::I32 => Value::I32(signed(json, ty, path)?),
        Type::I64 => Value::I64(signed(json, ty, path)?),
        Type::F32 => Value::F32(json.as_f64().ok_or_else(|| expected(path, ty, json))? as f32),
        Type::F64 => Value::F64(json.as_f64().ok_or_else(|| expected(path, ty, json))?),
        Type::String => Value::String(text(json, ty, path)?.to_string()),
        Type::Bytes => {
            let digits = text(json, ty, path)?;
            let bytes = hex::decode(digits.strip_prefix("0x").unwrap_or(digits))
                .map_err(|e| anyhow!("Invalid bytes at {}: {}", path, e))?;
            Value::Bytes(bytes)
        }
        Type::Address => {
            let address: Address = text(json, ty, path)?
                .parse()
                .map_err(|e| anyhow!("At {}: {}", path, e))?;
            Value::Address(address)
        }
        Type::Balance => match json {
            JsonValue::Number(n) => match n.as_u64() {
                Some(v) => Value::Balance(Balance::from(v)),
                None => bail!("Invalid balance at {}: {} (use a decimal string)", path, n),
            },
            JsonValue::String(s) => {
                Value::Balance(s.parse().map_err(|e| anyhow!("At {}: {}", path, e))?)
            }
            other => return Err(expected(path, ty, other)),
        },
        Type::Tuple(types) => {
            let items = array(json, ty, path)?;
            if items.len() != types.len() {
                bail!(
                    "Tuple arity mismatch at {}: expected {} elements, got {}",
                    path,
                    types.len(),
                    items.len()
                );
            }
            Value::Tuple(
                types
                    .iter()
                    .zip(items)
                    .enumerate()
                    .map(|(i, (ty, item))| from_json(scope, ty, item, &path.index(i)))
                    .collect::<Result<_>>()?,
            )
        }
        Type::Array(item, len) => {
            let items = array(json, ty, path)?;
            if items.len() as u64 != *len {
                bail!(
                    "Array length mismatch at {}: expected {} elements, got {}",
                    path,
                    len,
                    items.len()
                );
            }
            Value::List(elements(scope, item, items, path)?)
        }
        Type::List(item) => Value::List(elements(scope, item, array(json, ty, path)?, path)?),
        Type::Set(item) => Value::Set(elements(scope, item, array(json, ty, path)?, path)?),
        Type::Map(key_ty, value_ty) => {
            let mut entries = Vec::new();
            for (i, entry) in array(json, ty, path)?.iter().enumerate() {
                let pair = match entry.as_array() {
                    Some(pair) if pair.len() == 2 => pair,
                    _ => bail!("Map entry at {} must be a [key, value] pair", path.index(i)),
                };
                entries.push((
                    from_json(scope, key_ty, &pair[0], &path.key(i))?,
                    from_json(scope, value_ty, &pair[1], &path.index(i))?,
                ));
            }
            Value::Map(entries)
        }
        Type::Optional(inner) => match json {
            JsonValue::Null => Value::none(),
            other => Value::some(from_json(scope, inner, other, path)?),
        },
        Type::Result(ok_ty, err_ty) => {
            let object = json.as_object().ok_or_else(|| expected(path, ty, json))?;
            if object.len() != 1 {
                bail!("Result at {} must have exactly one of \"Ok\" or \"Err\"", path);
            }
            match (object.get("Ok"), object.get("Err")) {
                (Some(ok), None) => Value::ok(from_json(scope, ok_ty, ok, &path.field("Ok"))?),
                (None, Some(err)) => Value::err(from_json(scope, err_ty, err, &path.field("Err"))?),
                _ => bail!("Result at {} must have exactly one of \"Ok\" or \"Err\"", path),
            }
        }
        Type::Defined { namespace, name } => {
            let resolved = scope.resolve_scoped(namespace.as_deref(), name)?;
            from_json_def(resolved.registry, resolved.def, json, path)?
        }
    };
    Ok(value)
}

fn from_json_def(scope: &Registry, def: &TypeDef, json: &JsonValue, path: &WirePath) -> Result<Value> {
    match def {
        TypeDef::Enum { name, variants } => {
            let variant = json
                .as_str()
                .ok_or_else(|| anyhow!("Expected a variant of enum '{}' at {}, got {}", name, path, json))?;
            if !variants.iter().any(|v| v == variant) {
                bail!(
                    "Invalid variant '{}' for enum '{}' at {} (expected one of: {})",
                    variant,
                    name,
                    path,
                    variants.join(", ")
                );
            }
            Ok(Value::variant(variant))
        }
        TypeDef::Struct { name, fields } | TypeDef::Event { name, fields, .. } => {
            let object = json
                .as_object()
                .ok_or_else(|| anyhow!("Expected an object for '{}' at {}, got {}", name, path, json))?;
            if let Some(unknown) = object.keys().find(|k| !fields.iter().any(|f| &f.name == *k)) {
                bail!("Unknown field '{}' for '{}' at {}", unknown, name, path);
            }
            fields
                .iter()
                .map(|field| struct_field(scope, name, field, object, path))
                .collect::<Result<Vec<_>>>()
                .map(Value::Struct)
        }
    }
}

/// Omitted optional fields read as `null`.
fn struct_field(
    scope: &Registry,
    type_name: &str,
    field: &Field,
    object: &Map<String, JsonValue>,
    path: &WirePath,
) -> Result<(String, Value)> {
    let value = match (object.get(&field.name), &field.ty) {
        (Some(json), ty) => from_json(scope, ty, json, &path.field(&field.name))?,
        (None, Type::Optional(_)) => Value::none(),
        (None, _) => bail!("Missing field '{}' of '{}' at {}", field.name, type_name, path),
    };
    Ok((field.name.clone(), value))
}

fn elements(scope: &Registry, item: &Type, items: &[JsonValue], path: &WirePath) -> Result<Vec<Value>> {
    items
        .iter()
        .enumerate()
        .map(|(i, json)| from_json(scope, item, json, &path.index(i)))
        .collect()
}

fn unsigned<T: TryFrom<u64>>(json: &JsonValue, ty: &Type, path: &WirePath) -> Result<T> {
    let raw = json.as_u64().ok_or_else(|| expected(path, ty, json))?;
    T::try_from(raw).map_err(|_| anyhow!("Integer {} out of range for {} at {}", raw, ty, path))
}

fn signed<T: TryFrom<i64>>(json: &JsonValue, ty: &Type, path: &WirePath) -> Result<T> {
    let raw = json.as_i64().ok_or_else(|| expected(path, ty, json))?;
    T::try_from(raw).map_err(|_| anyhow!("Integer {} out of range for {} at {}", raw, ty, path))
}

fn text<'j>(json: &'j JsonValue, ty: &Type, path: &WirePath) -> Result<&'j str> {
    json.as_str().ok_or_else(|| expected(path, ty, json))
}

fn array<'j>(json: &'j JsonValue, ty: &Type, path: &WirePath) -> Result<&'j [JsonValue]> {
    json.as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| expected(path, ty, json))
}

fn expected(path: &WirePath, ty: &Type, got: &JsonValue) -> anyhow::Error {
    anyhow!("Expected {} at {}, got {}", ty, path, got)
}

pub fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Bool(v) => json!(v),
        Value::U8(v) => json!(v),
        Value::I8(v) => json!(v),
        Value::U16(v) => json!(v),
        Value::I16(v) => json!(v),
        Value::U32(v) => json!(v),
        Value::I32(v) => json!(v),
        Value::U64(v) => json!(v),
        Value::I64(v) => json!(v),
        Value::F32(v) => json!(v),
        Value::F64(v) => json!(v),
        Value::String(v) => json!(v),
        Value::Bytes(v) => json!(format!("0x{}", hex::encode(v))),
        Value::Address(v) => json!(v.to_string()),
        Value::Balance(v) => json!(v.to_string()),
        Value::Tuple(items) | Value::List(items) | Value::Set(items) => {
            JsonValue::Array(items.iter().map(value_to_json).collect())
        }
        Value::Map(entries) => JsonValue::Array(
            entries
                .iter()
                .map(|(k, v)| json!([value_to_json(k), value_to_json(v)]))
                .collect(),
        ),
        Value::Optional(None) => JsonValue::Null,
        Value::Optional(Some(inner)) => value_to_json(inner),
        Value::Result(Ok(v)) => json!({ "Ok": value_to_json(v) }),
        Value::Result(Err(e)) => json!({ "Err": value_to_json(e) }),
        Value::Enum(variant) => json!(variant),
        Value::Struct(fields) => JsonValue::Object(
            fields
                .iter()
                .map(|(name, v)| (name.clone(), value_to_json(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        let mut registry = Registry::new("bank");
        registry
            .register(TypeDef::new_enum("Tier", ["Basic", "Gold"]))
            .unwrap();
        registry
            .register(TypeDef::new_struct(
                "Account",
                vec![
                    Field::new("owner", Type::Address),
                    Field::new("funds", Type::Balance),
                    Field::new("tier", Type::defined("Tier")),
                    Field::new("nickname", Type::optional(Type::String)),
                ],
            ))
            .unwrap();
        registry
    }

    fn account_json() -> JsonValue {
        json!({
            "owner": format!("0x{}", "ab".repeat(20)),
            "funds": "1267650600228229401496703205376",
            "tier": "Gold",
        })
    }

    #[test]
    fn test_struct_from_json() {
        let registry = registry();
        let value = value_from_json(&registry, &Type::defined("Account"), &account_json()).unwrap();

        assert_eq!(value.get("owner"), Some(&Value::Address(Address::new([0xab; 20]))));
        assert_eq!(
            value.get("funds"),
            Some(&Value::Balance("1267650600228229401496703205376".parse().unwrap()))
        );
        assert_eq!(value.get("tier"), Some(&Value::variant("Gold")));
        assert_eq!(value.get("nickname"), Some(&Value::none()));
    }

    #[test]
    fn test_json_roundtrip() {
        let registry = registry();
        let ty = Type::tuple([
            Type::defined("Account"),
            Type::map(Type::String, Type::U32),
            Type::result(Type::Bytes, Type::String),
            Type::array(Type::I16, 2),
        ]);
        let json = json!([
            account_json(),
            [["a", 1], ["b", 2]],
            {"Ok": "0x0102"},
            [-1, 7],
        ]);

        let value = value_from_json(&registry, &ty, &json).unwrap();
        let back = value_to_json(&value);
        assert_eq!(value_from_json(&registry, &ty, &back).unwrap(), value);
        assert_eq!(back[2], json!({"Ok": "0x0102"}));
        assert_eq!(back[0]["nickname"], JsonValue::Null);
    }

    #[test]
    fn test_balance_accepts_plain_numbers() {
        let registry = registry();
        assert_eq!(
            value_from_json(&registry, &Type::Balance, &json!(500)).unwrap(),
            Value::Balance(Balance::from(500u64))
        );
        assert!(value_from_json(&registry, &Type::Balance, &json!(-1)).is_err());
    }

    #[test]
    fn test_rejections_name_the_path() {
        let registry = registry();

        let err = value_from_json(&registry, &Type::array(Type::U8, 4), &json!([1, 2, 3])).unwrap_err();
        assert_eq!(err.to_string(), "Array length mismatch at $: expected 4 elements, got 3");

        let err = value_from_json(&registry, &Type::list(Type::U8), &json!([1, 300])).unwrap_err();
        assert_eq!(err.to_string(), "Integer 300 out of range for u8 at $[1]");

        let mut bad_tier = account_json();
        bad_tier["tier"] = json!("Platinum");
        let err = value_from_json(&registry, &Type::defined("Account"), &bad_tier).unwrap_err();
        assert!(err.to_string().contains("Invalid variant 'Platinum' for enum 'Tier' at $.tier"));

        let mut extra = account_json();
        extra["color"] = json!("red");
        let err = value_from_json(&registry, &Type::defined("Account"), &extra).unwrap_err();
        assert!(err.to_string().contains("Unknown field 'color'"));
    }

    #[test]
    fn test_result_needs_exactly_one_key() {
        let registry = registry();
        let ty = Type::result(Type::U8, Type::String);
        assert!(value_from_json(&registry, &ty, &json!({"Ok": 1, "Err": "x"})).is_err());
        assert!(value_from_json(&registry, &ty, &json!({})).is_err());
        assert_eq!(
            value_from_json(&registry, &ty, &json!({"Err": "x"})).unwrap(),
            Value::err("x".into())
        );
    }

    #[test]
    fn test_unknown_type_reference() {
        let registry = registry();
        assert!(value_from_json(&registry, &Type::defined("Missing"), &json!("x")).is_err());
    }
}
