//! Describe command - list declared types and function signatures

use anyhow::Result;
use clap::Args;
use rpcwire_schema::Registry;
use rpcwire_types::{Field, TypeDef};
use std::fmt::{self, Write};
use std::path::PathBuf;

use crate::cli::load;

/// Arguments for the `describe` command
#[derive(Debug, Args)]
pub struct DescribeArgs {
    /// Interface document (JSON)
    pub interface: PathBuf,

    /// Imported interface documents, one per flag
    #[arg(long = "import", value_name = "PATH")]
    pub imports: Vec<PathBuf>,
}

pub fn run(args: DescribeArgs) -> Result<()> {
    let registry = load::load_registry(Some(&args.interface), &args.imports)?;
    print!("{}", render(&registry)?);
    Ok(())
}

fn fields(fields: &[Field], indexed: &[String]) -> String {
    fields
        .iter()
        .map(|f| {
            let marker = if indexed.contains(&f.name) { " [indexed]" } else { "" };
            format!("{}: {}{}", f.name, f.ty, marker)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn render(registry: &Registry) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write!(out, "interface {}", registry.name())?;
    match registry.namespace() {
        Some(namespace) => writeln!(out, " ({})", namespace)?,
        None => writeln!(out)?,
    }

    let imports: Vec<&str> = registry.imports().map(|(name, _)| name).collect();
    if !imports.is_empty() {
        writeln!(out, "\nimports: {}", imports.join(", "))?;
    }

    if !registry.type_defs().is_empty() {
        writeln!(out, "\ntypes:")?;
        for def in registry.type_defs() {
            let body = match def {
                TypeDef::Enum { variants, .. } => variants.join(" | "),
                TypeDef::Struct { fields: f, .. } => fields(f, &[]),
                TypeDef::Event { fields: f, indexed, .. } => fields(f, indexed),
            };
            writeln!(out, "  {} {} {{ {} }}", def.kind(), def.name(), body)?;
        }
    }

    let constructor = registry.constructor();
    write!(out, "\nconstructor({})", fields(&constructor.inputs, &[]))?;
    match &constructor.error {
        Some(error) => writeln!(out, " -> Result<(), {}>", error)?,
        None => writeln!(out)?,
    }

    if !registry.functions().is_empty() {
        writeln!(out, "\nfunctions:")?;
        for function in registry.functions() {
            writeln!(out, "  {} [{}]", function, function.mutability)?;
        }
    }
    Ok(out)
}
