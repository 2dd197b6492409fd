//! Schema-driven CBOR codec for rpcwire interfaces.
//!
//! Values are encoded into CBOR (RFC 8949) under a declared [`Type`] and
//! decoded back against the same type. The type, not the bytes, decides
//! what a value means: `Array<u8, 4>` and `List<u8>` produce identical
//! bytes and the decoder enforces the difference.
//!
//! Encoder and decoder borrow an immutable [`Registry`] to resolve named
//! types and hold no other state, so one registry can serve any number of
//! threads at once.
//!
//! # Example
//!
//! ```text
//! let registry = Registry::load(&interface, &imports)?;
//! let bytes = Encoder::new(&registry).encode(&ty, &value);
//! let back = Decoder::new(&registry).decode(&ty, &bytes)?;
//! ```
//!
//! [`Type`]: rpcwire_types::Type
//! [`Registry`]: rpcwire_schema::Registry

pub mod compat;
pub mod config;
pub mod decode;
pub mod defaults;
pub mod encode;
pub mod envelope;
pub mod error;
pub mod path;
pub mod value;

pub use compat::{compatible, compatible_def, convertible, WireShape};
pub use config::CodecConfig;
pub use decode::Decoder;
pub use encode::Encoder;
pub use envelope::{Call, Envelope};
pub use error::{DecodeError, EncodeError, EnvelopeError, Result};
pub use path::WirePath;
pub use value::Value;
