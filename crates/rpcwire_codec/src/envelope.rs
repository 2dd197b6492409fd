//! Call envelope for method dispatch.
//!
//! A call travels as a two-entry map:
//!
//! ```text
//! {"method": "transfer", "payload": [<to>, <amount>]}
//! ```
//!
//! The payload holds the arguments in declared input order, each encoded
//! under its input type. Constructor arguments travel bare, as the same
//! positional sequence (`[<owner>, <supply>]`). A function's return value
//! is encoded under its output type; a function without an output returns
//! null.

use crate::compat::WireShape;
use crate::config::CodecConfig;
use crate::decode::Decoder;
use crate::encode::{write_cbor, Encoder};
use crate::error::{DecodeError, EncodeError, EnvelopeError};
use crate::path::WirePath;
use crate::value::Value;
use ciborium::value::Value as CborValue;
use rpcwire_schema::Registry;
use rpcwire_types::{Field, Function};
use std::collections::HashMap;
use tracing::debug;

type Result<T> = std::result::Result<T, EnvelopeError>;

const METHOD_KEY: &str = "method";
const PAYLOAD_KEY: &str = "payload";

/// A decoded method call.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: String,
    pub args: Vec<Value>,
}

/// Encodes and decodes calls against the functions of one registry.
#[derive(Debug, Clone, Copy)]
pub struct Envelope<'r> {
    registry: &'r Registry,
    config: CodecConfig,
}

impl<'r> Envelope<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self::with_config(registry, CodecConfig::default())
    }

    pub fn with_config(registry: &'r Registry, config: CodecConfig) -> Self {
        Self { registry, config }
    }

    fn encoder(&self) -> Encoder<'r> {
        Encoder::new(self.registry)
    }

    fn decoder(&self) -> Decoder<'r> {
        Decoder::with_config(self.registry, self.config)
    }

    fn function(&self, method: &str) -> Result<&'r Function> {
        self.registry
            .function(method)
            .ok_or_else(|| EnvelopeError::UnknownMethod(method.to_string()))
    }

    pub fn encode_call(&self, method: &str, args: &[Value]) -> Result<Vec<u8>> {
        let function = self.function(method)?;
        check_arity(method, &function.inputs, args.len())?;

        let payload_path = WirePath::root().field(PAYLOAD_KEY);
        let mut payload = Vec::with_capacity(args.len());
        for (i, (input, arg)) in function.inputs.iter().zip(args).enumerate() {
            payload.push(self.encoder().to_wire_at(&input.ty, arg, &payload_path.index(i))?);
        }

        let wire = CborValue::Map(vec![
            (CborValue::Text(METHOD_KEY.into()), CborValue::Text(method.into())),
            (CborValue::Text(PAYLOAD_KEY.into()), CborValue::Array(payload)),
        ]);
        debug!(method, args = args.len(), "Encoded call");
        Ok(write_cbor(&wire))
    }

    pub fn decode_call(&self, bytes: &[u8]) -> Result<Call> {
        let wire = self.decoder().read_wire(bytes)?;
        let root = WirePath::root();
        let entries = text_keyed(&wire, &root)?;

        let method = match entries.get(METHOD_KEY) {
            Some(CborValue::Text(method)) => method.clone(),
            Some(_) => {
                return Err(DecodeError::malformed(&root.field(METHOD_KEY), "method must be text").into())
            }
            None => return Err(missing("call", METHOD_KEY).into()),
        };
        let function = self.function(&method)?;

        let payload_path = root.field(PAYLOAD_KEY);
        let payload = match entries.get(PAYLOAD_KEY) {
            Some(CborValue::Array(items)) => items,
            Some(_) => {
                return Err(DecodeError::malformed(&payload_path, "payload must be a sequence").into())
            }
            None => return Err(missing("call", PAYLOAD_KEY).into()),
        };
        check_arity(&method, &function.inputs, payload.len())?;

        let decoder = self.decoder();
        let mut args = Vec::with_capacity(payload.len());
        for (i, (input, item)) in function.inputs.iter().zip(payload).enumerate() {
            args.push(decoder.decode_at(&input.ty, item, &payload_path.index(i))?);
        }
        debug!(method = %method, args = args.len(), "Decoded call");
        Ok(Call { method, args })
    }

    pub fn encode_constructor(&self, args: &[Value]) -> Result<Vec<u8>> {
        let inputs = &self.registry.constructor().inputs;
        check_arity("constructor", inputs, args.len())?;

        let root = WirePath::root();
        let mut payload = Vec::with_capacity(args.len());
        for (i, (input, arg)) in inputs.iter().zip(args).enumerate() {
            payload.push(self.encoder().to_wire_at(&input.ty, arg, &root.index(i))?);
        }
        Ok(write_cbor(&CborValue::Array(payload)))
    }

    /// Constructor arguments in declared input order.
    pub fn decode_constructor(&self, bytes: &[u8]) -> Result<Vec<Value>> {
        let wire = self.decoder().read_wire(bytes)?;
        let root = WirePath::root();
        let CborValue::Array(payload) = &wire else {
            return Err(DecodeError::malformed(
                &root,
                format!("constructor payload must be a sequence, got {}", WireShape::of(&wire)),
            )
            .into());
        };

        let inputs = &self.registry.constructor().inputs;
        check_arity("constructor", inputs, payload.len())?;

        let decoder = self.decoder();
        let mut args = Vec::with_capacity(payload.len());
        for (i, (input, item)) in inputs.iter().zip(payload).enumerate() {
            args.push(decoder.decode_at(&input.ty, item, &root.index(i))?);
        }
        Ok(args)
    }

    /// Encode a return value. Functions without an output take the unit
    /// value (an empty tuple) and encode it as null.
    pub fn encode_output(&self, method: &str, value: &Value) -> Result<Vec<u8>> {
        let function = self.function(method)?;
        match &function.output {
            Some(ty) => Ok(self.encoder().try_encode(ty, value)?),
            None => match value {
                Value::Tuple(items) if items.is_empty() => Ok(write_cbor(&CborValue::Null)),
                other => Err(EncodeError::mismatch(&WirePath::root(), "()", other.kind_name()).into()),
            },
        }
    }

    pub fn decode_output(&self, method: &str, bytes: &[u8]) -> Result<Value> {
        let function = self.function(method)?;
        match &function.output {
            Some(ty) => Ok(self.decoder().decode(ty, bytes)?),
            None => match self.decoder().read_wire(bytes)? {
                CborValue::Null => Ok(Value::Tuple(Vec::new())),
                other => Err(DecodeError::malformed(
                    &WirePath::root(),
                    format!("'{}' returns nothing, got {}", method, WireShape::of(&other)),
                )
                .into()),
            },
        }
    }
}

fn check_arity(method: &str, inputs: &[Field], got: usize) -> Result<()> {
    if inputs.len() != got {
        return Err(EnvelopeError::ArgumentCountMismatch {
            method: method.to_string(),
            expected: inputs.len(),
            got,
        });
    }
    Ok(())
}

fn missing(owner: &str, field: &str) -> DecodeError {
    DecodeError::MissingField {
        path: WirePath::root(),
        type_name: owner.to_string(),
        field: field.to_string(),
    }
}

fn text_keyed<'w>(
    wire: &'w CborValue,
    path: &WirePath,
) -> std::result::Result<HashMap<&'w str, &'w CborValue>, DecodeError> {
    let CborValue::Map(entries) = wire else {
        return Err(DecodeError::malformed(path, "expected a map"));
    };
    let mut by_name = HashMap::with_capacity(entries.len());
    for (i, (key, value)) in entries.iter().enumerate() {
        let CborValue::Text(key) = key else {
            return Err(DecodeError::malformed(&path.key(i), "keys must be text"));
        };
        if by_name.insert(key.as_str(), value).is_some() {
            return Err(DecodeError::malformed(&path.key(i), format!("'{}' appears more than once", key)));
        }
    }
    Ok(by_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpcwire_types::{Address, Balance, Constructor, Type, TypeDef};

    fn token() -> Registry {
        let mut registry = Registry::new("token");
        registry
            .register(TypeDef::new_enum("Denied", ["Frozen", "Insufficient"]))
            .unwrap();
        registry
            .register_function(
                Function::new("transfer")
                    .mutable()
                    .with_input("to", Type::Address)
                    .with_input("amount", Type::Balance)
                    .with_output(Type::result(Type::Bool, Type::defined("Denied"))),
            )
            .unwrap();
        registry.register_function(Function::new("ping")).unwrap();
        registry.set_constructor(
            Constructor::new()
                .with_input("owner", Type::Address)
                .with_input("supply", Type::Balance),
        );
        registry
    }

    fn transfer_args() -> Vec<Value> {
        vec![
            Value::Address(Address::new([1; 20])),
            Value::Balance(Balance::from(500u64)),
        ]
    }

    #[test]
    fn test_call_roundtrip() {
        let registry = token();
        let envelope = Envelope::new(&registry);
        let bytes = envelope.encode_call("transfer", &transfer_args()).unwrap();
        let call = envelope.decode_call(&bytes).unwrap();
        assert_eq!(call.method, "transfer");
        assert_eq!(call.args, transfer_args());
    }

    #[test]
    fn test_call_wire_shape() {
        let registry = token();
        let bytes = Envelope::new(&registry).encode_call("ping", &[]).unwrap();
        let mut expected = vec![0xA2, 0x66];
        expected.extend_from_slice(b"method");
        expected.push(0x64);
        expected.extend_from_slice(b"ping");
        expected.push(0x67);
        expected.extend_from_slice(b"payload");
        expected.push(0x80);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_unknown_method_and_arity() {
        let registry = token();
        let envelope = Envelope::new(&registry);
        assert_eq!(
            envelope.encode_call("burn", &[]).unwrap_err(),
            EnvelopeError::UnknownMethod("burn".into())
        );
        assert_eq!(
            envelope.encode_call("transfer", &transfer_args()[..1]).unwrap_err(),
            EnvelopeError::ArgumentCountMismatch {
                method: "transfer".into(),
                expected: 2,
                got: 1,
            }
        );
    }

    #[test]
    fn test_decode_call_errors_carry_payload_path() {
        let registry = token();
        let wire = CborValue::Map(vec![
            (CborValue::Text("method".into()), CborValue::Text("transfer".into())),
            (
                CborValue::Text("payload".into()),
                CborValue::Array(vec![CborValue::Bytes(vec![0; 19]), CborValue::Integer(1.into())]),
            ),
        ]);
        let err = Envelope::new(&registry).decode_call(&write_cbor(&wire)).unwrap_err();
        assert!(matches!(
            err,
            EnvelopeError::Decode(DecodeError::MalformedWireValue { ref path, .. })
                if path.to_string() == "$.payload[0]"
        ));
    }

    #[test]
    fn test_constructor_roundtrip() {
        let registry = token();
        let envelope = Envelope::new(&registry);
        let bytes = envelope.encode_constructor(&transfer_args()).unwrap();
        assert_eq!(envelope.decode_constructor(&bytes).unwrap(), transfer_args());
    }

    /// Constructor arguments are a bare positional sequence
    #[test]
    fn test_constructor_wire_shape() {
        let mut registry = Registry::new("counter");
        registry.set_constructor(
            Constructor::new()
                .with_input("start", Type::U8)
                .with_input("label", Type::String),
        );
        let envelope = Envelope::new(&registry);
        let args = vec![Value::U8(1), "x".into()];

        let bytes = envelope.encode_constructor(&args).unwrap();
        assert_eq!(bytes, vec![0x82, 0x01, 0x61, b'x']);
        assert_eq!(envelope.decode_constructor(&[0x82, 0x01, 0x61, b'x']).unwrap(), args);
    }

    #[test]
    fn test_constructor_rejects_wrong_arity_and_shape() {
        let registry = token();
        let envelope = Envelope::new(&registry);

        let short = CborValue::Array(vec![CborValue::Bytes(vec![1; 20])]);
        assert_eq!(
            envelope.decode_constructor(&write_cbor(&short)).unwrap_err(),
            EnvelopeError::ArgumentCountMismatch {
                method: "constructor".into(),
                expected: 2,
                got: 1,
            }
        );

        let keyed = CborValue::Map(vec![(
            CborValue::Text("owner".into()),
            CborValue::Bytes(vec![1; 20]),
        )]);
        assert!(matches!(
            envelope.decode_constructor(&write_cbor(&keyed)),
            Err(EnvelopeError::Decode(DecodeError::MalformedWireValue { .. }))
        ));

        let bad_owner = CborValue::Array(vec![CborValue::Bytes(vec![1; 19]), CborValue::Integer(5.into())]);
        assert!(matches!(
            envelope.decode_constructor(&write_cbor(&bad_owner)),
            Err(EnvelopeError::Decode(DecodeError::MalformedWireValue { ref path, .. }))
                if path.to_string() == "$[0]"
        ));
    }

    #[test]
    fn test_output_roundtrip() {
        let registry = token();
        let envelope = Envelope::new(&registry);

        let denied = Value::err(Value::variant("Frozen"));
        let bytes = envelope.encode_output("transfer", &denied).unwrap();
        assert_eq!(envelope.decode_output("transfer", &bytes).unwrap(), denied);

        let unit = Value::Tuple(Vec::new());
        let bytes = envelope.encode_output("ping", &unit).unwrap();
        assert_eq!(bytes, vec![0xF6]);
        assert_eq!(envelope.decode_output("ping", &bytes).unwrap(), unit);
        assert!(envelope.encode_output("ping", &Value::Bool(true)).is_err());
    }
}
