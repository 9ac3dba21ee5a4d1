//! Error taxonomy (§ 7).

use std::fmt;
use std::io;

/// Errors returned by [`crate::Pbx`] and its per-TU operations.
///
/// Transitions into [`crate::TuState::Error`] or
/// [`crate::TuState::BusySignal`] are *not* represented here -- per § 7
/// those are first-class engine outcomes, not API errors.
#[derive(Debug)]
pub enum PbxError {
    /// `register` found no free slot.
    RegistryFull,
    /// An extension handle or a dialed target was out of `[0, N)`.
    InvalidExtension(i64),
    /// `chat` was attempted while the TU was not `CONNECTED`.
    NotConnected,
    /// Writing a notification line to a TU's own sink failed.
    Io(io::Error),
}

impl fmt::Display for PbxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PbxError::RegistryFull => write!(f, "PBX registry is at capacity"),
            PbxError::InvalidExtension(ext) => write!(f, "invalid extension: {ext}"),
            PbxError::NotConnected => write!(f, "TU is not connected"),
            PbxError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for PbxError {}

impl From<io::Error> for PbxError {
    fn from(e: io::Error) -> Self {
        PbxError::Io(e)
    }
}
