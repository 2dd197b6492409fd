//! Canonical default values for encode/decode limits.

/// Deepest composite nesting the decoder will follow.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Largest input the decoder will accept, in bytes (1 MiB).
pub const DEFAULT_MAX_INPUT_LEN: usize = 1024 * 1024;
