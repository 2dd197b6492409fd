//! Parse errors for the domain scalars

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid address '{input}': {reason}")]
    InvalidAddress { input: String, reason: String },

    #[error("Invalid balance '{input}': expected an unsigned decimal integer")]
    InvalidBalance { input: String },
}
