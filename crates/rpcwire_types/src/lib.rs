//! Type model for rpcwire interfaces.
//!
//! An interface document describes the values a service accepts and
//! returns. This crate holds the pieces of that description:
//!
//! - [`Type`]: the recursive shape of every value (primitives, composites,
//!   and references to user-declared types)
//! - [`TypeDef`]: user declarations (structs, closed string enums, events)
//! - [`Function`], [`Constructor`], [`Import`], [`Interface`]: the document itself
//! - [`Address`], [`Balance`]: the two domain scalars with special wire rules
//!
//! Nothing here validates or encodes anything. Validation lives in
//! `rpcwire_schema`, encoding in `rpcwire_codec`.
//!
//! # Document format
//!
//! Interfaces are exchanged as JSON:
//!
//! ```text
//! {
//!   "name": "bank",
//!   "version": "0.1.0",
//!   "type_defs": [
//!     { "type": "enum", "name": "Tier", "variants": ["Basic", "Gold"] }
//!   ],
//!   "functions": [
//!     { "name": "balance_of", "inputs": [{ "name": "who", "type": { "type": "address" } }],
//!       "output": { "type": "balance" } }
//!   ],
//!   "constructor": { "inputs": [] }
//! }
//! ```

pub mod address;
pub mod balance;
pub mod error;
pub mod interface;
pub mod ty;

pub use address::Address;
pub use balance::Balance;
pub use error::ParseError;
pub use interface::{
    Constructor, Field, Function, Import, Interface, StateMutability, TypeDef,
    MAX_INDEXED_FIELDS,
};
pub use ty::Type;
