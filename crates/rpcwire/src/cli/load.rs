//! Reading interface documents and type expressions from the command line

use anyhow::{Context, Result};
use rpcwire_schema::{InterfaceSet, Registry, ValidationErrors};
use rpcwire_types::{Interface, Type};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::cli::error::HelpfulError;

pub fn read_interface(path: &Path) -> Result<Interface> {
    if !path.exists() {
        return Err(HelpfulError::file_not_found(path).into());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read interface: {}", path.display()))?;
    let interface = Interface::from_json_str(&text)
        .map_err(|e| HelpfulError::invalid_document(path, &e.to_string()))?;
    debug!(path = %path.display(), interface = %interface.name, "Read interface document");
    Ok(interface)
}

/// Read every import document into the set handed to the registry loader.
pub fn read_imports(paths: &[PathBuf]) -> Result<InterfaceSet> {
    let mut set = InterfaceSet::new();
    for path in paths {
        set.insert(read_interface(path)?);
    }
    Ok(set)
}

/// Outcome of loading a document: schema violations are data, not failures.
pub fn try_load(
    interface: &Path,
    imports: &[PathBuf],
) -> Result<std::result::Result<Arc<Registry>, ValidationErrors>> {
    let root = read_interface(interface)?;
    let set = read_imports(imports)?;
    Ok(Registry::load(&root, &set))
}

/// Load a registry, or an empty one when no interface is given.
pub fn load_registry(interface: Option<&Path>, imports: &[PathBuf]) -> Result<Arc<Registry>> {
    let Some(path) = interface else {
        return Ok(Arc::new(Registry::new("cli")));
    };
    try_load(path, imports)?.map_err(anyhow::Error::from)
}

/// Parse a type expression in its JSON form, e.g. `{"type": "list", "params": {"type": "u8"}}`.
pub fn parse_type(text: &str) -> Result<Type> {
    serde_json::from_str(text).map_err(|e| HelpfulError::invalid_type(text, &e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const TOKEN: &str = r#"{
        "name": "token",
        "type_defs": [{"type": "struct", "name": "Amount", "fields": [
            {"name": "value", "type": {"type": "balance"}}
        ]}]
    }"#;

    const BANK: &str = r#"{
        "name": "bank",
        "imports": [{"name": "token"}],
        "functions": [{"name": "deposit", "inputs": [
            {"name": "amount", "type": {"type": "defined", "params": {"namespace": "token", "type": "Amount"}}}
        ]}]
    }"#;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_with_imports() {
        let dir = TempDir::new().unwrap();
        let bank = write(&dir, "bank.json", BANK);
        let token = write(&dir, "token.json", TOKEN);

        let registry = load_registry(Some(&bank), &[token]).unwrap();
        assert_eq!(registry.name(), "bank");
        assert!(registry.import("token").is_some());
    }

    #[test]
    fn test_missing_import_is_a_validation_result() {
        let dir = TempDir::new().unwrap();
        let bank = write(&dir, "bank.json", BANK);

        let outcome = try_load(&bank, &[]).unwrap();
        assert!(outcome.is_err());
        assert!(load_registry(Some(&bank), &[]).is_err());
    }

    #[test]
    fn test_missing_file_is_helpful() {
        let err = read_interface(Path::new("/nonexistent/bank.json")).unwrap_err();
        let helpful = err.downcast_ref::<HelpfulError>().unwrap();
        assert!(helpful.message.starts_with("File not found"));
    }

    #[test]
    fn test_bad_document_is_helpful() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "broken.json", "{\"name\": ");
        let err = read_interface(&path).unwrap_err();
        assert!(err.downcast_ref::<HelpfulError>().is_some());
    }

    #[test]
    fn test_parse_type() {
        assert_eq!(parse_type(r#"{"type": "u32"}"#).unwrap(), Type::U32);
        assert_eq!(
            parse_type(r#"{"type": "array", "params": [{"type": "u8"}, 4]}"#).unwrap(),
            Type::array(Type::U8, 4)
        );
        assert!(parse_type("u32").is_err());
    }

    #[test]
    fn test_no_interface_gives_empty_registry() {
        let registry = load_registry(None, &[]).unwrap();
        assert!(registry.type_defs().is_empty());
    }
}
