//! Schema Registry
//!
//! Owns the type declarations and function signatures of one interface and
//! shares the registries of its imports. Built and checked once by
//! [`Registry::load`]; after that it is only ever read.

use crate::error::{NameScope, Result, SchemaError, ValidationErrors};
use crate::set::InterfaceSet;
use crate::validate::validate;
use rpcwire_types::{Constructor, Function, Interface, TypeDef};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Declarations of one interface plus its imported registries.
#[derive(Debug, Default)]
pub struct Registry {
    name: String,
    namespace: Option<String>,
    type_defs: Vec<TypeDef>,
    index: HashMap<String, usize>,
    functions: Vec<Function>,
    constructor: Constructor,
    imports: BTreeMap<String, Arc<Registry>>,
}

/// A resolved type reference together with the registry that declares it.
///
/// References inside the resolved declaration must be resolved against
/// `registry`, not against the registry the lookup started from.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub registry: &'a Registry,
    pub def: &'a TypeDef,
}

impl Registry {
    /// An empty registry for the interface `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Validate `interface` and build its registry, including registries
    /// for every import (each of which is validated as well).
    pub fn load(
        interface: &Interface,
        imports: &InterfaceSet,
    ) -> std::result::Result<Arc<Registry>, ValidationErrors> {
        let mut cache = HashMap::new();
        Self::load_cached(interface, imports, &mut cache)
    }

    fn load_cached(
        interface: &Interface,
        imports: &InterfaceSet,
        cache: &mut HashMap<String, Arc<Registry>>,
    ) -> std::result::Result<Arc<Registry>, ValidationErrors> {
        if let Some(loaded) = cache.get(&interface.name) {
            return Ok(Arc::clone(loaded));
        }

        validate(interface, imports)?;

        let mut registry = Registry::new(interface.name.clone());
        registry.namespace = interface.namespace.clone();
        let mut errors = Vec::new();
        for def in &interface.type_defs {
            if let Err(err) = registry.register(def.clone()) {
                errors.push(err);
            }
        }
        for function in &interface.functions {
            if let Err(err) = registry.register_function(function.clone()) {
                errors.push(err);
            }
        }
        registry.constructor = interface.constructor.clone();
        if !errors.is_empty() {
            return Err(ValidationErrors::new(interface.name.clone(), errors));
        }

        for import in &interface.imports {
            // Validation guarantees every import is present and acyclic.
            if let Some(imported) = imports.get(&import.name) {
                let loaded = Self::load_cached(imported, imports, cache)?;
                registry.add_import(import.name.clone(), loaded);
            }
        }

        info!(
            interface = %registry.name,
            type_defs = registry.type_defs.len(),
            functions = registry.functions.len(),
            imports = registry.imports.len(),
            "Loaded interface registry"
        );

        let registry = Arc::new(registry);
        cache.insert(interface.name.clone(), Arc::clone(&registry));
        Ok(registry)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a type.
    ///
    /// Fails with `DuplicateName` if the type name is already declared
    /// here, or if a member name (field, variant, indexed field) repeats inside `def`.
    pub fn register(&mut self, def: TypeDef) -> Result<()> {
        if self.index.contains_key(def.name()) {
            return Err(SchemaError::DuplicateName {
                scope: NameScope::TypeDef {
                    interface: self.name.clone(),
                },
                name: def.name().to_string(),
            });
        }

        let (members, scope): (Vec<&str>, NameScope) = match &def {
            TypeDef::Struct { name, fields } | TypeDef::Event { name, fields, .. } => (
                fields.iter().map(|f| f.name.as_str()).collect(),
                NameScope::Field { owner: name.clone() },
            ),
            TypeDef::Enum { name, variants } => (
                variants.iter().map(String::as_str).collect(),
                NameScope::Variant { owner: name.clone() },
            ),
        };
        if let Some(dup) = first_duplicate(&members) {
            return Err(SchemaError::DuplicateName {
                scope,
                name: dup.to_string(),
            });
        }
        if let TypeDef::Event { name, indexed, .. } = &def {
            let indexed: Vec<&str> = indexed.iter().map(String::as_str).collect();
            if let Some(dup) = first_duplicate(&indexed) {
                return Err(SchemaError::DuplicateName {
                    scope: NameScope::Indexed { owner: name.clone() },
                    name: dup.to_string(),
                });
            }
        }

        debug!(interface = %self.name, kind = def.kind(), name = def.name(), "Registered type");
        self.index.insert(def.name().to_string(), self.type_defs.len());
        self.type_defs.push(def);
        Ok(())
    }

    /// Declare a function signature. Fails with `DuplicateName` on a
    /// repeated function or parameter name.
    pub fn register_function(&mut self, function: Function) -> Result<()> {
        if self.function(&function.name).is_some() {
            return Err(SchemaError::DuplicateName {
                scope: NameScope::Function {
                    interface: self.name.clone(),
                },
                name: function.name,
            });
        }
        let params: Vec<&str> = function.inputs.iter().map(|f| f.name.as_str()).collect();
        if let Some(dup) = first_duplicate(&params) {
            return Err(SchemaError::DuplicateName {
                scope: NameScope::Parameter {
                    owner: function.name.clone(),
                },
                name: dup.to_string(),
            });
        }
        self.functions.push(function);
        Ok(())
    }

    pub fn set_constructor(&mut self, constructor: Constructor) {
        self.constructor = constructor;
    }

    /// Make the registry of an imported interface visible under `name`.
    pub fn add_import(&mut self, name: impl Into<String>, registry: Arc<Registry>) {
        self.imports.insert(name.into(), registry);
    }

    /// Resolve a type reference to its declaration.
    ///
    /// A bare name (`namespace == None`) is looked up in this interface's
    /// own declarations, then in every transitively imported interface. A
    /// namespaced name is looked up in that import only (and its imports).
    pub fn resolve(&self, namespace: Option<&str>, name: &str) -> Result<&TypeDef> {
        self.resolve_scoped(namespace, name).map(|resolved| resolved.def)
    }

    /// Like [`Registry::resolve`], also returning the declaring registry.
    pub fn resolve_scoped(&self, namespace: Option<&str>, name: &str) -> Result<Resolved<'_>> {
        let found = match namespace {
            None => self.find(name, &mut HashSet::new()),
            Some(ns) => self
                .imports
                .get(ns)
                .and_then(|imported| imported.find(name, &mut HashSet::new())),
        };
        found.ok_or_else(|| SchemaError::UnknownTypeReference {
            reference: match namespace {
                Some(ns) => format!("{}::{}", ns, name),
                None => name.to_string(),
            },
            location: format!("interface '{}'", self.name),
        })
    }

    fn find<'a>(&'a self, name: &str, visited: &mut HashSet<&'a str>) -> Option<Resolved<'a>> {
        if !visited.insert(self.name.as_str()) {
            return None;
        }
        if let Some(&idx) = self.index.get(name) {
            return Some(Resolved {
                registry: self,
                def: &self.type_defs[idx],
            });
        }
        self.imports
            .values()
            .find_map(|imported| imported.find(name, visited))
    }

    /// Local declaration by name (imports are not searched).
    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.index.get(name).map(|&idx| &self.type_defs[idx])
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn type_defs(&self) -> &[TypeDef] {
        &self.type_defs
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn constructor(&self) -> &Constructor {
        &self.constructor
    }

    pub fn imports(&self) -> impl Iterator<Item = (&str, &Arc<Registry>)> {
        self.imports.iter().map(|(name, reg)| (name.as_str(), reg))
    }

    pub fn import(&self, name: &str) -> Option<&Arc<Registry>> {
        self.imports.get(name)
    }
}

fn first_duplicate<'a>(names: &[&'a str]) -> Option<&'a str> {
    let mut seen = HashSet::new();
    names.iter().copied().find(|name| !seen.insert(*name))
}
