//! Codec configuration for the CLI
//!
//! Sources, lowest precedence first: built-in defaults, the `--config` TOML
//! file, then `--max-depth` / `--max-input-len` (or their environment
//! variables).
//!
//! ```toml
//! max_depth = 32
//! max_input_len = 65536
//! ```

use anyhow::{Context, Result};
use rpcwire_codec::CodecConfig;
use std::path::Path;
use tracing::debug;

use crate::cli::error::HelpfulError;

/// Limits given directly on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub max_depth: Option<usize>,
    pub max_input_len: Option<usize>,
}

pub fn load(path: Option<&Path>, overrides: Overrides) -> Result<CodecConfig> {
    let mut config = match path {
        Some(path) => read_file(path)?,
        None => CodecConfig::default(),
    };
    if let Some(max_depth) = overrides.max_depth {
        config = config.with_max_depth(max_depth);
    }
    if let Some(max_input_len) = overrides.max_input_len {
        config = config.with_max_input_len(max_input_len);
    }
    debug!(max_depth = config.max_depth, max_input_len = config.max_input_len, "Codec config");
    Ok(config)
}

fn read_file(path: &Path) -> Result<CodecConfig> {
    if !path.exists() {
        return Err(HelpfulError::file_not_found(path).into());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Invalid codec config: {}", path.display()))
}
