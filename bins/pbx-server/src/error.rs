//! Top-level server errors -- binding and argument failures (§ 7).
//!
//! Kept separate from `pbx_core::PbxError`, the same way the teacher keeps
//! its binary's startup failures (config load, stack construction) out of
//! the library crates' own error types.

use std::fmt;
use std::io;

#[derive(Debug)]
pub enum ServerError {
    /// Failed to bind or configure the listening socket.
    Bind(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Bind(e) => write!(f, "failed to bind listening socket: {e}"),
        }
    }
}

impl std::error::Error for ServerError {}
