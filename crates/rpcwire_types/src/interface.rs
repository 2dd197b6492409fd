//! Interface document: declarations, functions, constructor, imports.

use crate::Type;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of indexed fields an event may declare.
pub const MAX_INDEXED_FIELDS: usize = 3;

/// A named, typed slot: a struct/event field or a function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A user-declared type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum TypeDef {
    /// Ordered named fields
    Struct { name: String, fields: Vec<Field> },

    /// Closed set of string variants, no associated data
    Enum { name: String, variants: Vec<String> },

    /// Struct-shaped record with up to three indexed fields
    Event {
        name: String,
        fields: Vec<Field>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        indexed: Vec<String>,
    },
}

impl TypeDef {
    pub fn new_struct(name: impl Into<String>, fields: Vec<Field>) -> Self {
        TypeDef::Struct {
            name: name.into(),
            fields,
        }
    }

    pub fn new_enum<S: Into<String>>(
        name: impl Into<String>,
        variants: impl IntoIterator<Item = S>,
    ) -> Self {
        TypeDef::Enum {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    pub fn new_event<S: Into<String>>(
        name: impl Into<String>,
        fields: Vec<Field>,
        indexed: impl IntoIterator<Item = S>,
    ) -> Self {
        TypeDef::Event {
            name: name.into(),
            fields,
            indexed: indexed.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TypeDef::Struct { name, .. }
            | TypeDef::Enum { name, .. }
            | TypeDef::Event { name, .. } => name,
        }
    }

    /// Fields of a struct or event; `None` for enums.
    pub fn fields(&self) -> Option<&[Field]> {
        match self {
            TypeDef::Struct { fields, .. } | TypeDef::Event { fields, .. } => Some(fields),
            TypeDef::Enum { .. } => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TypeDef::Struct { .. } => "struct",
            TypeDef::Enum { .. } => "enum",
            TypeDef::Event { .. } => "event",
        }
    }
}

/// Advisory mutability annotation. Never enforced by rpcwire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    #[default]
    Immutable,
    Mutable,
}

impl fmt::Display for StateMutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateMutability::Immutable => write!(f, "immutable"),
            StateMutability::Mutable => write!(f, "mutable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    #[serde(default)]
    pub mutability: StateMutability,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Type>,
}

impl Function {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mutability: StateMutability::Immutable,
            inputs: Vec::new(),
            output: None,
        }
    }

    pub fn with_input(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.inputs.push(Field::new(name, ty));
        self
    }

    pub fn with_output(mut self, ty: Type) -> Self {
        self.output = Some(ty);
        self
    }

    pub fn mutable(mut self) -> Self {
        self.mutability = StateMutability::Mutable;
        self
    }

    pub fn is_mutating(&self) -> bool {
        self.mutability == StateMutability::Mutable
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, input) in self.inputs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", input.name, input.ty)?;
        }
        write!(f, ")")?;
        if let Some(output) = &self.output {
            write!(f, " -> {}", output)?;
        }
        Ok(())
    }
}

/// The service constructor. Its success value is the service itself, so
/// only the inputs and an optional error type are declared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constructor {
    #[serde(default)]
    pub inputs: Vec<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Type>,
}

impl Constructor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.inputs.push(Field::new(name, ty));
        self
    }

    pub fn with_error(mut self, ty: Type) -> Self {
        self.error = Some(ty);
        self
    }
}

/// Reference to another interface document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Import {
    pub name: String,
    #[serde(default = "any_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,
}

fn any_version() -> String {
    "*".to_string()
}

impl Import {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: any_version(),
            registry: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

/// One RPC schema document.
///
/// Loaded once, validated once, then treated as immutable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    /// Package the interface was generated from. Informational only: type
    /// references never go through it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<Import>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_defs: Vec<TypeDef>,
    #[serde(default)]
    pub constructor: Constructor,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<Function>,
}

impl Interface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            version: String::new(),
            imports: Vec::new(),
            type_defs: Vec::new(),
            constructor: Constructor::default(),
            functions: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_import(mut self, import: Import) -> Self {
        self.imports.push(import);
        self
    }

    pub fn with_type_def(mut self, def: TypeDef) -> Self {
        self.type_defs.push(def);
        self
    }

    pub fn with_function(mut self, function: Function) -> Self {
        self.functions.push(function);
        self
    }

    pub fn with_constructor(mut self, constructor: Constructor) -> Self {
        self.constructor = constructor;
        self
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Every `(location, type)` pair in the document, in declaration order:
    /// type def fields, function inputs and outputs, constructor inputs and error.
    pub fn type_sites(&self) -> Vec<(String, &Type)> {
        let mut sites = Vec::new();
        for def in &self.type_defs {
            for field in def.fields().unwrap_or_default() {
                sites.push((
                    format!("field '{}' of {} '{}'", field.name, def.kind(), def.name()),
                    &field.ty,
                ));
            }
        }
        for function in &self.functions {
            for input in &function.inputs {
                sites.push((
                    format!("input '{}' of function '{}'", input.name, function.name),
                    &input.ty,
                ));
            }
            if let Some(output) = &function.output {
                sites.push((format!("output of function '{}'", function.name), output));
            }
        }
        for input in &self.constructor.inputs {
            sites.push((format!("constructor input '{}'", input.name), &input.ty));
        }
        if let Some(error) = &self.constructor.error {
            sites.push(("constructor error".to_string(), error));
        }
        sites
    }
}
