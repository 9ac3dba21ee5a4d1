//! The PBX state engine: a concurrent, strictly-serialized multi-actor
//! state machine over telephone units (TUs).
//!
//! This crate has no notion of sockets, threads, or line framing -- see
//! `pbx-proto` for the wire format and the `pbx-server` binary for the
//! networking that drives this engine.

mod engine;
mod error;
mod registry;
mod sink;
mod state;
mod tu;

pub use error::PbxError;
pub use registry::{Extension, Pbx, DEFAULT_MAX_EXTENSIONS};
pub use sink::Sink;
pub use state::TuState;
pub use tu::Tu;
