//! Codec configuration.

use crate::defaults::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_INPUT_LEN};
use serde::{Deserialize, Serialize};

/// Resource limits applied by the decoder.
///
/// Deserializable from a config file; missing keys fall back to the
/// canonical defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Maximum composite nesting depth (the root value is depth 0)
    pub max_depth: usize,
    /// Maximum encoded input length in bytes
    pub max_input_len: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_input_len: DEFAULT_MAX_INPUT_LEN,
        }
    }
}

impl CodecConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_input_len(mut self, max_input_len: usize) -> Self {
        self.max_input_len = max_input_len;
        self
    }
}
