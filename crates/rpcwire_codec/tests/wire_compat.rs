//! Byte-exact wire compatibility tests.
//!
//! These pin the canonical bytes that independently built clients and
//! services must agree on. Expected bytes are written out by hand from
//! RFC 8949, not produced by the encoder under test.

use num_bigint::BigUint;
use rpcwire_codec::{DecodeError, Decoder, Encoder, Value};
use rpcwire_schema::{InterfaceSet, Registry};
use rpcwire_types::{Balance, Field, Function, Interface, Type, TypeDef};
use std::sync::Arc;

fn empty_registry() -> Arc<Registry> {
    Registry::load(&Interface::new("wire"), &InterfaceSet::new()).expect("empty interface is valid")
}

fn two_pow_100_bytes() -> Vec<u8> {
    let mut bytes = vec![0xC2, 0x4D, 0x10];
    bytes.extend_from_slice(&[0u8; 12]);
    bytes
}

// =============================================================================
// CANONICAL BYTES
// =============================================================================

/// Tuple(U32, String) value (7, "ok") is a two-element sequence
#[test]
fn test_tuple_encodes_as_sequence() {
    let registry = empty_registry();
    let ty = Type::tuple([Type::U32, Type::String]);
    let value = Value::Tuple(vec![Value::U32(7), "ok".into()]);

    let bytes = Encoder::new(&registry).encode(&ty, &value);
    assert_eq!(bytes, vec![0x82, 0x07, 0x62, b'o', b'k']);
    assert_eq!(Decoder::new(&registry).decode(&ty, &bytes).unwrap(), value);
}

/// Result encodes as a single-key map, "Ok" or "Err"
#[test]
fn test_result_encodes_as_single_key_map() {
    let registry = empty_registry();
    let enc = Encoder::new(&registry);
    let ty = Type::result(Type::U32, Type::String);

    assert_eq!(
        enc.encode(&ty, &Value::err("bad".into())),
        vec![0xA1, 0x63, b'E', b'r', b'r', 0x63, b'b', b'a', b'd']
    );
    assert_eq!(
        enc.encode(&ty, &Value::ok(Value::U32(5))),
        vec![0xA1, 0x62, b'O', b'k', 0x05]
    );
}

/// 2^100 is tag 2 over a 13-byte big-endian magnitude
#[test]
fn test_large_balance_canonical_bytes() {
    let registry = empty_registry();
    let two_pow_100 = Balance::from(BigUint::from(1u8) << 100usize);

    let bytes = Encoder::new(&registry).encode(&Type::Balance, &Value::Balance(two_pow_100.clone()));
    assert_eq!(bytes, two_pow_100_bytes());
}

/// Two separately loaded registries, each with its own encoder and
/// decoder, agree on 2^100 in both directions.
#[test]
fn test_large_balance_across_implementations() {
    let expected = Balance::from(BigUint::from(1u8) << 100usize);
    let sender = empty_registry();
    let receiver = Registry::load(
        &Interface::new("receiver").with_function(Function::new("credit").with_input("amount", Type::Balance)),
        &InterfaceSet::new(),
    )
    .unwrap();

    let bytes = Encoder::new(&sender).encode(&Type::Balance, &Value::Balance(expected.clone()));
    let decoded = Decoder::new(&receiver).decode(&Type::Balance, &bytes).unwrap();
    assert_eq!(decoded, Value::Balance(expected.clone()));

    let from_hand = Decoder::new(&sender)
        .decode(&Type::Balance, &two_pow_100_bytes())
        .unwrap();
    assert_eq!(from_hand, Value::Balance(expected));
}

/// Balances beyond 128 bits stay exact
#[test]
fn test_balance_wider_than_u128() {
    let registry = empty_registry();
    let huge: Balance = "340282366920938463463374607431768211456123".parse().unwrap();

    let bytes = Encoder::new(&registry).encode(&Type::Balance, &Value::Balance(huge.clone()));
    assert_eq!(bytes[0], 0xC2);
    assert_eq!(
        Decoder::new(&registry).decode(&Type::Balance, &bytes).unwrap(),
        Value::Balance(huge)
    );
}

#[test]
fn test_enum_encodes_as_variant_text() {
    let iface = Interface::new("wire").with_type_def(TypeDef::new_enum("Side", ["Buy", "Sell"]));
    let registry = Registry::load(&iface, &InterfaceSet::new()).unwrap();

    let bytes = Encoder::new(&registry).encode(&Type::defined("Side"), &Value::variant("Sell"));
    assert_eq!(bytes, vec![0x64, b'S', b'e', b'l', b'l']);
}

#[test]
fn test_event_encodes_fields_in_declared_order() {
    let iface = Interface::new("wire").with_type_def(TypeDef::new_event(
        "Ping",
        vec![Field::new("b", Type::U8), Field::new("a", Type::U8)],
        ["a"],
    ));
    let registry = Registry::load(&iface, &InterfaceSet::new()).unwrap();

    let value = Value::record([("a", Value::U8(1)), ("b", Value::U8(2))]);
    let bytes = Encoder::new(&registry).encode(&Type::defined("Ping"), &value);
    assert_eq!(bytes, vec![0xA2, 0x61, b'b', 0x02, 0x61, b'a', 0x01]);
}

// =============================================================================
// ARRAY / LIST SUBSTITUTABILITY
// =============================================================================

/// A 3-element sequence does not satisfy Array<u8, 4>
#[test]
fn test_short_sequence_is_array_length_mismatch() {
    let registry = empty_registry();
    let bytes = [0x83, 0x01, 0x02, 0x03];

    let err = Decoder::new(&registry)
        .decode(&Type::array(Type::U8, 4), &bytes)
        .unwrap_err();
    assert!(matches!(
        err,
        DecodeError::ArrayLengthMismatch { expected: 4, got: 3, .. }
    ));
}

#[test]
fn test_array_and_list_are_wire_identical() {
    let registry = empty_registry();
    let enc = Encoder::new(&registry);
    let value = Value::list([Value::U8(1), Value::U8(2), Value::U8(3), Value::U8(4)]);

    let as_array = enc.encode(&Type::array(Type::U8, 4), &value);
    let as_list = enc.encode(&Type::list(Type::U8), &value);
    assert_eq!(as_array, as_list);

    let dec = Decoder::new(&registry);
    assert_eq!(dec.decode(&Type::list(Type::U8), &as_array).unwrap(), value);
    assert_eq!(dec.decode(&Type::array(Type::U8, 4), &as_list).unwrap(), value);
}

/// The length rule applies below the top level too
#[test]
fn test_nested_array_mismatch_reports_path() {
    let registry = empty_registry();
    let ty = Type::list(Type::array(Type::U16, 2));
    let value = Value::list([
        Value::list([Value::U16(1), Value::U16(2)]),
        Value::list([Value::U16(3)]),
    ]);
    let bytes = Encoder::new(&registry).encode(&Type::list(Type::list(Type::U16)), &value);

    let err = Decoder::new(&registry).decode(&ty, &bytes).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Array length mismatch at $[1]: expected 2 elements, got 1"
    );
}

// =============================================================================
// REJECTIONS
// =============================================================================

#[test]
fn test_result_with_both_keys_is_malformed() {
    let registry = empty_registry();
    let bytes = [0xA2, 0x62, b'O', b'k', 0x01, 0x63, b'E', b'r', b'r', 0x02];

    let err = Decoder::new(&registry)
        .decode(&Type::result(Type::U8, Type::U8), &bytes)
        .unwrap_err();
    assert!(matches!(err, DecodeError::MalformedWireValue { .. }));
}

#[test]
fn test_undeclared_variant_is_rejected() {
    let iface = Interface::new("wire").with_type_def(TypeDef::new_enum("Side", ["Buy", "Sell"]));
    let registry = Registry::load(&iface, &InterfaceSet::new()).unwrap();
    let bytes = [0x64, b'H', b'o', b'l', b'd'];

    let err = Decoder::new(&registry)
        .decode(&Type::defined("Side"), &bytes)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid variant 'Hold' for enum 'Side' at $"
    );
}

#[test]
fn test_address_as_integer_is_malformed() {
    let registry = empty_registry();
    let err = Decoder::new(&registry)
        .decode(&Type::Address, &[0x1A, 0x00, 0x01, 0x00, 0x00])
        .unwrap_err();
    assert!(matches!(err, DecodeError::MalformedWireValue { .. }));
}

/// Optional unwraps on the wire: null is None, anything else is Some
#[test]
fn test_optional_wire_form() {
    let registry = empty_registry();
    let dec = Decoder::new(&registry);
    let ty = Type::optional(Type::String);

    assert_eq!(dec.decode(&ty, &[0xF6]).unwrap(), Value::none());
    assert_eq!(
        dec.decode(&ty, &[0x61, b'x']).unwrap(),
        Value::some("x".into())
    );
    assert!(dec.decode(&ty, &[0x01]).is_err());
}
