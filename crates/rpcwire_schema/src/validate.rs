//! Interface validation.
//!
//! Checks run in a fixed order and never stop early:
//!
//! 1. duplicate names (type defs, fields, variants, functions, parameters)
//! 2. resolution of every `Defined` reference anywhere in the document
//! 3. event `indexed` size and membership
//! 4. import graph: missing imports and cycles
//!
//! All violations are returned together in that order.

use crate::error::{NameScope, SchemaError, ValidationErrors};
use crate::set::InterfaceSet;
use rpcwire_types::{Field, Interface, Type, TypeDef, MAX_INDEXED_FIELDS};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Validate `interface` against the documents it may import.
pub fn validate(interface: &Interface, imports: &InterfaceSet) -> Result<(), ValidationErrors> {
    debug!(
        interface = %interface.name,
        type_defs = interface.type_defs.len(),
        functions = interface.functions.len(),
        "Validating interface"
    );

    let validator = Validator {
        root: interface,
        imports,
    };

    let mut errors = Vec::new();
    validator.check_duplicates(&mut errors);
    validator.check_references(&mut errors);
    validator.check_events(&mut errors);
    validator.check_import_graph(&mut errors);

    if errors.is_empty() {
        return Ok(());
    }
    for error in &errors {
        warn!(interface = %interface.name, "{}", error);
    }
    Err(ValidationErrors::new(interface.name.clone(), errors))
}

struct Validator<'a> {
    root: &'a Interface,
    imports: &'a InterfaceSet,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

impl<'a> Validator<'a> {
    fn lookup(&self, name: &str) -> Option<&'a Interface> {
        if name == self.root.name {
            Some(self.root)
        } else {
            self.imports.get(name)
        }
    }

    fn check_duplicates(&self, errors: &mut Vec<SchemaError>) {
        let iface = &self.root.name;

        report_duplicates(
            self.root.type_defs.iter().map(TypeDef::name),
            || NameScope::TypeDef {
                interface: iface.clone(),
            },
            errors,
        );

        for def in &self.root.type_defs {
            match def {
                TypeDef::Struct { name, fields } => {
                    report_duplicates(
                        field_names(fields),
                        || NameScope::Field { owner: name.clone() },
                        errors,
                    );
                }
                TypeDef::Event {
                    name,
                    fields,
                    indexed,
                } => {
                    report_duplicates(
                        field_names(fields),
                        || NameScope::Field { owner: name.clone() },
                        errors,
                    );
                    report_duplicates(
                        indexed.iter().map(String::as_str),
                        || NameScope::Indexed { owner: name.clone() },
                        errors,
                    );
                }
                TypeDef::Enum { name, variants } => {
                    report_duplicates(
                        variants.iter().map(String::as_str),
                        || NameScope::Variant { owner: name.clone() },
                        errors,
                    );
                }
            }
        }

        report_duplicates(
            self.root.functions.iter().map(|f| f.name.as_str()),
            || NameScope::Function {
                interface: iface.clone(),
            },
            errors,
        );

        for function in &self.root.functions {
            report_duplicates(
                field_names(&function.inputs),
                || NameScope::Parameter {
                    owner: function.name.clone(),
                },
                errors,
            );
        }

        report_duplicates(
            field_names(&self.root.constructor.inputs),
            || NameScope::Parameter {
                owner: "constructor".to_string(),
            },
            errors,
        );
    }

    fn check_references(&self, errors: &mut Vec<SchemaError>) {
        for (location, ty) in self.root.type_sites() {
            ty.visit(&mut |nested| {
                if let Type::Defined { namespace, name } = nested {
                    if !self.resolves(namespace.as_deref(), name) {
                        errors.push(SchemaError::UnknownTypeReference {
                            reference: nested.to_string(),
                            location: location.clone(),
                        });
                    }
                }
            });
        }
    }

    fn check_events(&self, errors: &mut Vec<SchemaError>) {
        for def in &self.root.type_defs {
            let TypeDef::Event {
                name,
                fields,
                indexed,
            } = def
            else {
                continue;
            };

            if indexed.len() > MAX_INDEXED_FIELDS {
                errors.push(SchemaError::TooManyIndexedFields {
                    event: name.clone(),
                    count: indexed.len(),
                    max: MAX_INDEXED_FIELDS,
                });
            }
            for field in indexed {
                if !fields.iter().any(|f| &f.name == field) {
                    errors.push(SchemaError::IndexedFieldNotFound {
                        event: name.clone(),
                        field: field.clone(),
                    });
                }
            }
        }
    }

    fn check_import_graph(&self, errors: &mut Vec<SchemaError>) {
        let mut marks = HashMap::new();
        let mut stack = Vec::new();
        self.walk_imports(self.root, &mut marks, &mut stack, errors);
    }

    fn walk_imports(
        &self,
        iface: &'a Interface,
        marks: &mut HashMap<&'a str, Mark>,
        stack: &mut Vec<&'a str>,
        errors: &mut Vec<SchemaError>,
    ) {
        marks.insert(iface.name.as_str(), Mark::Visiting);
        stack.push(iface.name.as_str());

        for import in &iface.imports {
            match marks.get(import.name.as_str()).copied() {
                Some(Mark::Done) => {}
                Some(Mark::Visiting) => {
                    let start = stack
                        .iter()
                        .position(|name| *name == import.name)
                        .unwrap_or(0);
                    let mut cycle: Vec<String> =
                        stack[start..].iter().map(|name| name.to_string()).collect();
                    cycle.push(import.name.clone());
                    errors.push(SchemaError::CyclicImport { cycle });
                }
                None => match self.lookup(&import.name) {
                    Some(next) => self.walk_imports(next, marks, stack, errors),
                    None => {
                        errors.push(SchemaError::UnknownImport {
                            interface: iface.name.clone(),
                            import: import.name.clone(),
                        });
                        marks.insert(import.name.as_str(), Mark::Done);
                    }
                },
            }
        }

        stack.pop();
        marks.insert(iface.name.as_str(), Mark::Done);
    }

    /// Mirrors `Registry::resolve`: a bare name searches the root and,
    /// transitively, its imports; a namespaced name searches that import.
    fn resolves(&self, namespace: Option<&str>, name: &str) -> bool {
        match namespace {
            None => self.declares(self.root, name, &mut HashSet::new()),
            Some(ns) => {
                self.root.imports.iter().any(|import| import.name == ns)
                    && self
                        .lookup(ns)
                        .is_some_and(|iface| self.declares(iface, name, &mut HashSet::new()))
            }
        }
    }

    fn declares(&self, iface: &'a Interface, name: &str, visited: &mut HashSet<&'a str>) -> bool {
        if !visited.insert(iface.name.as_str()) {
            return false;
        }
        if iface.type_defs.iter().any(|def| def.name() == name) {
            return true;
        }
        iface
            .imports
            .iter()
            .filter_map(|import| self.lookup(&import.name))
            .any(|imported| self.declares(imported, name, visited))
    }
}

fn field_names(fields: &[Field]) -> impl Iterator<Item = &str> {
    fields.iter().map(|f| f.name.as_str())
}

/// Push one `DuplicateName` per name that repeats, at its first repetition.
fn report_duplicates<'n>(
    names: impl Iterator<Item = &'n str>,
    scope: impl Fn() -> NameScope,
    errors: &mut Vec<SchemaError>,
) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for name in names {
        if !seen.insert(name) && reported.insert(name) {
            errors.push(SchemaError::DuplicateName {
                scope: scope(),
                name: name.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpcwire_types::{Constructor, Function, Import};

    fn errors_of(iface: &Interface, set: &InterfaceSet) -> Vec<SchemaError> {
        validate(iface, set).map(|_| Vec::new()).unwrap_or_else(|e| e.errors)
    }

    #[test]
    fn test_valid_interface() {
        let iface = Interface::new("bank")
            .with_type_def(TypeDef::new_struct(
                "Account",
                vec![
                    Field::new("owner", Type::Address),
                    Field::new("tier", Type::defined("Tier")),
                ],
            ))
            .with_type_def(TypeDef::new_enum("Tier", ["Basic", "Gold"]))
            .with_function(
                Function::new("open")
                    .with_input("owner", Type::Address)
                    .with_output(Type::defined("Account")),
            );
        assert!(validate(&iface, &InterfaceSet::new()).is_ok());
    }

    #[test]
    fn test_duplicate_type_defs_reported_once() {
        let iface = Interface::new("bank")
            .with_type_def(TypeDef::new_enum("Tier", ["A"]))
            .with_type_def(TypeDef::new_enum("Tier", ["B"]))
            .with_type_def(TypeDef::new_enum("Tier", ["C"]));

        let errors = errors_of(&iface, &InterfaceSet::new());
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            SchemaError::DuplicateName { name, scope: NameScope::TypeDef { .. } } if name == "Tier"
        ));
    }

    #[test]
    fn test_duplicate_fields_variants_functions_and_parameters() {
        let iface = Interface::new("bank")
            .with_type_def(TypeDef::new_struct(
                "Account",
                vec![Field::new("id", Type::U64), Field::new("id", Type::U32)],
            ))
            .with_type_def(TypeDef::new_enum("Tier", ["Gold", "Gold"]))
            .with_function(Function::new("ping"))
            .with_function(
                Function::new("ping")
                    .with_input("x", Type::U8)
                    .with_input("x", Type::U8),
            )
            .with_constructor(
                Constructor::new()
                    .with_input("seed", Type::Bytes)
                    .with_input("seed", Type::Bytes),
            );

        let errors = errors_of(&iface, &InterfaceSet::new());
        let scopes: Vec<String> = errors
            .iter()
            .map(|e| match e {
                SchemaError::DuplicateName { scope, .. } => scope.to_string(),
                other => panic!("unexpected error: {}", other),
            })
            .collect();
        assert_eq!(
            scopes,
            vec![
                "field in 'Account'",
                "variant in enum 'Tier'",
                "function in interface 'bank'",
                "parameter of 'ping'",
                "parameter of 'constructor'",
            ]
        );
    }

    #[test]
    fn test_unknown_reference_in_every_position() {
        let iface = Interface::new("bank")
            .with_type_def(TypeDef::new_struct(
                "Account",
                vec![Field::new("history", Type::list(Type::defined("Entry")))],
            ))
            .with_function(
                Function::new("get")
                    .with_input("key", Type::defined("Key"))
                    .with_output(Type::optional(Type::defined("Value"))),
            )
            .with_constructor(
                Constructor::new()
                    .with_input("cfg", Type::defined("Config"))
                    .with_error(Type::defined("InitError")),
            );

        let errors = errors_of(&iface, &InterfaceSet::new());
        let refs: Vec<&str> = errors
            .iter()
            .map(|e| match e {
                SchemaError::UnknownTypeReference { reference, .. } => reference.as_str(),
                other => panic!("unexpected error: {}", other),
            })
            .collect();
        assert_eq!(refs, vec!["Entry", "Key", "Value", "Config", "InitError"]);
    }

    #[test]
    fn test_reference_resolves_through_imports() {
        let token = Interface::new("token")
            .with_type_def(TypeDef::new_struct("Amount", vec![Field::new("v", Type::Balance)]));
        let bank = Interface::new("bank")
            .with_import(Import::new("token"))
            .with_function(
                Function::new("deposit")
                    .with_input("a", Type::imported("token", "Amount"))
                    .with_input("b", Type::defined("Amount")),
            );
        let set = InterfaceSet::new().with(token);
        assert!(validate(&bank, &set).is_ok());
    }

    #[test]
    fn test_namespace_must_be_a_declared_import() {
        let token = Interface::new("token")
            .with_type_def(TypeDef::new_enum("Unit", ["Wei"]));
        let bank = Interface::new("bank")
            .with_function(Function::new("f").with_input("u", Type::imported("token", "Unit")));
        let set = InterfaceSet::new().with(token);

        let errors = errors_of(&bank, &set);
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], SchemaError::UnknownTypeReference { reference, .. } if reference == "token::Unit"));
    }

    #[test]
    fn test_event_indexed_limits() {
        let fields = vec![
            Field::new("owner", Type::Address),
            Field::new("amount", Type::Balance),
            Field::new("extra", Type::String),
        ];
        let ok = Interface::new("e").with_type_def(TypeDef::new_event(
            "Moved",
            fields.clone(),
            ["owner", "amount"],
        ));
        assert!(validate(&ok, &InterfaceSet::new()).is_ok());

        let mut four = fields;
        four.push(Field::new("memo", Type::String));
        let too_many = Interface::new("e").with_type_def(TypeDef::new_event(
            "Moved",
            four,
            ["owner", "amount", "extra", "memo"],
        ));
        let errors = errors_of(&too_many, &InterfaceSet::new());
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            SchemaError::TooManyIndexedFields { count: 4, max: 3, .. }
        ));
    }

    #[test]
    fn test_repeated_indexed_field() {
        let iface = Interface::new("e").with_type_def(TypeDef::new_event(
            "Moved",
            vec![
                Field::new("owner", Type::Address),
                Field::new("amount", Type::Balance),
            ],
            ["owner", "owner", "owner"],
        ));
        let errors = errors_of(&iface, &InterfaceSet::new());
        assert_eq!(
            errors,
            vec![SchemaError::DuplicateName {
                scope: NameScope::Indexed {
                    owner: "Moved".into(),
                },
                name: "owner".into(),
            }]
        );
    }

    #[test]
    fn test_indexed_field_not_found() {
        let iface = Interface::new("e").with_type_def(TypeDef::new_event(
            "Moved",
            vec![Field::new("owner", Type::Address)],
            ["owner", "recipient"],
        ));
        let errors = errors_of(&iface, &InterfaceSet::new());
        assert_eq!(
            errors,
            vec![SchemaError::IndexedFieldNotFound {
                event: "Moved".into(),
                field: "recipient".into(),
            }]
        );
    }

    #[test]
    fn test_self_import_is_a_cycle() {
        let iface = Interface::new("loop").with_import(Import::new("loop"));
        let errors = errors_of(&iface, &InterfaceSet::new());
        assert_eq!(
            errors,
            vec![SchemaError::CyclicImport {
                cycle: vec!["loop".into(), "loop".into()]
            }]
        );
    }

    #[test]
    fn test_transitive_cycle_path() {
        let a = Interface::new("a").with_import(Import::new("b"));
        let b = Interface::new("b").with_import(Import::new("c"));
        let c = Interface::new("c").with_import(Import::new("a"));
        let set: InterfaceSet = [b, c].into_iter().collect();

        let errors = errors_of(&a, &set);
        assert_eq!(
            errors,
            vec![SchemaError::CyclicImport {
                cycle: vec!["a".into(), "b".into(), "c".into(), "a".into()]
            }]
        );
    }

    #[test]
    fn test_diamond_imports_are_not_cycles() {
        let root = Interface::new("root")
            .with_import(Import::new("left"))
            .with_import(Import::new("right"));
        let left = Interface::new("left").with_import(Import::new("base"));
        let right = Interface::new("right").with_import(Import::new("base"));
        let base = Interface::new("base");
        let set: InterfaceSet = [left, right, base].into_iter().collect();
        assert!(validate(&root, &set).is_ok());
    }

    #[test]
    fn test_missing_import() {
        let iface = Interface::new("bank").with_import(Import::new("ghost"));
        let errors = errors_of(&iface, &InterfaceSet::new());
        assert_eq!(
            errors,
            vec![SchemaError::UnknownImport {
                interface: "bank".into(),
                import: "ghost".into(),
            }]
        );
    }

    #[test]
    fn test_cyclic_reference_lookup_terminates() {
        let a = Interface::new("a")
            .with_import(Import::new("b"))
            .with_function(Function::new("f").with_input("x", Type::defined("Nowhere")));
        let b = Interface::new("b").with_import(Import::new("a"));
        let set = InterfaceSet::new().with(b);

        let errors = errors_of(&a, &set);
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], SchemaError::UnknownTypeReference { .. }));
        assert!(matches!(errors[1], SchemaError::CyclicImport { .. }));
    }
}
