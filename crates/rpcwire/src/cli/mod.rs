//! CLI command implementations

pub mod check;
pub mod codec;
pub mod config;
pub mod describe;
pub mod error;
pub mod json;
pub mod load;
