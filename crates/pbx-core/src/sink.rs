//! The TU output sink (§ 4.1, § 5): a write-only byte channel to a client.
//!
//! Kept as a trait object rather than a concrete `TcpStream` so the engine
//! is unit-testable without real sockets, the same separation the teacher
//! draws between `NetworkTransport` and its TCP/QUIC/UDP implementations.

use std::io;

/// Write side of a TU's connection, plus the ability to force it closed.
///
/// Implementors must not block indefinitely under contention the engine
/// doesn't control; the spec (§ 5) accepts that a slow sink can stall the
/// PBX lock and places no further requirement on this trait.
pub trait Sink: Send {
    /// Writes one already-formatted line (including its terminator).
    fn write_line(&mut self, line: &[u8]) -> io::Result<()>;

    /// Half-closes the underlying connection for both reading and writing,
    /// used by the shutdown controller (§ 4.5) to unblock a service loop's
    /// next read.
    fn shutdown(&mut self);
}
