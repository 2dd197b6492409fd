//! Schema Registry and Validator
//!
//! An interface is validated exactly once, before any value is exchanged.
//! Validation is exhaustive: every violation is collected and reported
//! together, so a caller fixing a document sees the whole list at once.
//!
//! The result of a successful load is an immutable [`Registry`] behind an
//! `Arc`. Encoders and decoders borrow it to resolve named types; nothing
//! mutates it afterwards, so it can be shared across threads freely.
//!
//! # Modules
//!
//! - [`registry`]: declared types, functions and imported registries
//! - [`set`]: the closed set of interface documents handed over by the resolver
//! - [`validate`]: the ordered checks run over one interface
//! - [`error`]: violation types

pub mod error;
pub mod registry;
pub mod set;
pub mod validate;

pub use error::{NameScope, Result, SchemaError, ValidationErrors};
pub use registry::{Registry, Resolved};
pub use set::InterfaceSet;
pub use validate::validate;

pub use rpcwire_types::MAX_INDEXED_FIELDS;
