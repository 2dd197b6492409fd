//! Helpful error types for CLI commands
//!
//! Every error includes:
//! - What went wrong
//! - Context about the situation
//! - Suggestions for how to fix it

use std::fmt;
use std::path::Path;

/// An error with helpful context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestions(mut self, suggestions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.suggestions.extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    // === Common error constructors ===

    pub fn file_not_found(path: &Path) -> Self {
        Self::new(format!("File not found: {}", path.display()))
            .with_context("The specified file does not exist")
            .with_suggestions([
                format!("TRY: Check if the file exists: ls -la {}", path.display()),
                "TRY: Check for typos in the path".to_string(),
            ])
    }

    /// Interface document is not valid JSON or does not match the document format
    pub fn invalid_document(path: &Path, details: &str) -> Self {
        Self::new(format!("Cannot parse interface document: {}", path.display()))
            .with_context(details.to_string())
            .with_suggestions([
                format!("TRY: Validate JSON syntax: jq . {}", path.display()),
                "TRY: Types are written as {\"type\": \"u32\"} or {\"type\": \"list\", \"params\": {\"type\": \"u8\"}}".to_string(),
            ])
    }

    /// `--type` argument is not a type expression
    pub fn invalid_type(text: &str, details: &str) -> Self {
        Self::new(format!("Invalid type expression: '{}'", text))
            .with_context(details.to_string())
            .with_suggestions([
                "TRY: --type '{\"type\": \"u32\"}'".to_string(),
                "TRY: --type '{\"type\": \"defined\", \"params\": {\"type\": \"Entry\"}}'".to_string(),
            ])
    }

    /// Hex input does not parse
    pub fn invalid_hex(details: &str) -> Self {
        Self::new("Invalid hex input")
            .with_context(details.to_string())
            .with_suggestions([
                "TRY: Use an even number of hex digits, with or without a 0x prefix".to_string(),
                "TRY: Example: --hex 0x8207626f6b".to_string(),
            ])
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}
