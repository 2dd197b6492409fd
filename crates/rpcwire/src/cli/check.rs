//! Check command - validate an interface document

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::load;

/// Arguments for the `check` command
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Interface document (JSON)
    pub interface: PathBuf,

    /// Imported interface documents, one per flag
    #[arg(long = "import", value_name = "PATH")]
    pub imports: Vec<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    interface: String,
    valid: bool,
    errors: Vec<String>,
}

fn check(args: &CheckArgs) -> Result<CheckReport> {
    let report = match load::try_load(&args.interface, &args.imports)? {
        Ok(registry) => CheckReport {
            interface: registry.name().to_string(),
            valid: true,
            errors: Vec::new(),
        },
        Err(errors) => CheckReport {
            interface: errors.interface.clone(),
            valid: false,
            errors: errors.iter().map(|e| e.to_string()).collect(),
        },
    };
    Ok(report)
}

pub fn run(args: CheckArgs) -> Result<()> {
    let report = check(&args)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.valid {
        println!("Interface '{}' is valid", report.interface);
    } else {
        println!("Interface '{}' has {} violation(s):", report.interface, report.errors.len());
        for error in &report.errors {
            println!("  - {}", error);
        }
    }

    if !report.valid {
        bail!("Validation failed for '{}'", report.interface);
    }
    Ok(())
}
