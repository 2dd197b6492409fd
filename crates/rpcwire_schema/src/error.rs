//! Schema error types

use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SchemaError>;

/// Where a duplicated name was declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameScope {
    /// Type declarations of an interface
    TypeDef { interface: String },
    /// Fields of a struct or event
    Field { owner: String },
    /// Variants of an enum
    Variant { owner: String },
    /// Functions of an interface
    Function { interface: String },
    /// Parameters of a function or of the constructor
    Parameter { owner: String },
    /// Indexed field list of an event
    Indexed { owner: String },
}

impl fmt::Display for NameScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameScope::TypeDef { interface } => write!(f, "type in interface '{}'", interface),
            NameScope::Field { owner } => write!(f, "field in '{}'", owner),
            NameScope::Variant { owner } => write!(f, "variant in enum '{}'", owner),
            NameScope::Function { interface } => {
                write!(f, "function in interface '{}'", interface)
            }
            NameScope::Parameter { owner } => write!(f, "parameter of '{}'", owner),
            NameScope::Indexed { owner } => write!(f, "indexed field of event '{}'", owner),
        }
    }
}

/// A single schema violation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Duplicate {scope} name '{name}'")]
    DuplicateName { scope: NameScope, name: String },

    #[error("Unknown type reference '{reference}' in {location}")]
    UnknownTypeReference { reference: String, location: String },

    #[error("Interface '{interface}' imports '{import}', which was not supplied")]
    UnknownImport { interface: String, import: String },

    #[error("Cyclic import: {}", cycle.join(" -> "))]
    CyclicImport { cycle: Vec<String> },

    #[error("Event '{event}' declares {count} indexed fields (max {max})")]
    TooManyIndexedFields {
        event: String,
        count: usize,
        max: usize,
    },

    #[error("Event '{event}' indexes '{field}', which is not one of its fields")]
    IndexedFieldNotFound { event: String, field: String },
}

/// Every violation found while validating one interface, in check order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    pub interface: String,
    pub errors: Vec<SchemaError>,
}

impl ValidationErrors {
    pub fn new(interface: impl Into<String>, errors: Vec<SchemaError>) -> Self {
        Self {
            interface: interface.into(),
            errors,
        }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SchemaError> {
        self.errors.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Interface '{}' failed validation with {} error(s)",
            self.interface,
            self.errors.len()
        )?;
        for error in &self.errors {
            write!(f, "\n  - {}", error)?;
        }
        Ok(())
    }
}

impl IntoIterator for ValidationErrors {
    type Item = SchemaError;
    type IntoIter = std::vec::IntoIter<SchemaError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a SchemaError;
    type IntoIter = std::slice::Iter<'a, SchemaError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
