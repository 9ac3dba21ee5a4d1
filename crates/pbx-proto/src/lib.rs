//! Wire-level concerns for the PBX telephone exchange protocol: parsing
//! client command lines and formatting server notification/chat lines.
//!
//! Kept separate from `pbx-core` so the state engine never touches raw
//! bytes directly -- it calls into [`notify`] with already-resolved
//! display values and lets this crate own the exact byte layout.

pub mod command;
pub mod notify;

pub use command::{parse_command, Command};
