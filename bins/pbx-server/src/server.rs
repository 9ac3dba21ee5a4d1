//! TCP accept loop and per-connection service loop (§ 6, § 4.5).
//!
//! Split into [`bind`] and [`serve`] so integration tests can bind an
//! ephemeral port, read it back, and drive the loop from a background
//! thread -- mirroring the teacher's habit of keeping socket setup and the
//! run loop as separate calls rather than one `run(cfg)` that swallows
//! both.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use pbx_core::{Extension, Pbx, PbxError, Sink};
use pbx_proto::{parse_command, Command};

use crate::error::ServerError;

/// How long the accept loop sleeps between non-blocking `accept()` polls
/// while waiting for either a connection or the shutdown flag.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A [`Sink`] backed by a cloned `TcpStream`. Shutting it down half-closes
/// the shared socket, which unblocks the connection's blocking
/// `read_until` on the other clone (§ 4.5).
struct TcpSink {
    stream: TcpStream,
}

impl Sink for TcpSink {
    fn write_line(&mut self, line: &[u8]) -> io::Result<()> {
        self.stream.write_all(line)
    }

    fn shutdown(&mut self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

/// Binds the listening socket. Kept separate from [`serve`] so callers can
/// bind port `0` in tests and read back the OS-assigned port via
/// `TcpListener::local_addr`.
pub fn bind(port: u16) -> Result<TcpListener, ServerError> {
    let listener =
        TcpListener::bind(("0.0.0.0", port)).map_err(ServerError::Bind)?;
    listener.set_nonblocking(true).map_err(ServerError::Bind)?;
    tracing::info!(
        addr = %listener.local_addr().map(|a| a.to_string()).unwrap_or_default(),
        "listening"
    );
    Ok(listener)
}

/// Runs the accept loop until `shutdown` is set, spawning one thread per
/// accepted connection (§ 6.3). The listener must already be in
/// non-blocking mode, as returned by [`bind`].
pub fn serve(listener: TcpListener, pbx: Arc<Pbx>, shutdown: Arc<AtomicBool>) {
    let mut conn_id: u64 = 0;

    loop {
        if shutdown.load(Ordering::SeqCst) {
            tracing::info!("shutdown requested, stopping accept loop");
            pbx.shutdown();
            break;
        }

        match listener.accept() {
            Ok((stream, addr)) => {
                conn_id += 1;
                let id = conn_id;
                let pbx = Arc::clone(&pbx);
                tracing::debug!(conn_id = id, peer = %addr, "accepted connection");
                thread::spawn(move || service_connection(id, stream, pbx));
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
            Err(e) => {
                tracing::warn!(error = %e, "accept() failed");
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
        }
    }
}

/// Strips a trailing `\r\n` or bare `\n` from a line read by
/// `read_until(b'\n', ..)`.
fn trim_line(mut line: Vec<u8>) -> Vec<u8> {
    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }
    line
}

/// Services one accepted connection for its entire lifetime: registers a
/// TU, dispatches each incoming line as a command, and unregisters on
/// EOF or I/O error (§ 6.3).
fn service_connection(conn_id: u64, stream: TcpStream, pbx: Arc<Pbx>) {
    let reader_stream = match stream.try_clone() {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(conn_id, error = %e, "failed to clone connection");
            return;
        }
    };
    let sink = Box::new(TcpSink { stream });

    let ext = match pbx.register(conn_id, sink) {
        Ok(ext) => ext,
        Err(e) => {
            tracing::warn!(conn_id, error = %e, "registration failed");
            return;
        }
    };

    let mut reader = BufReader::new(reader_stream);
    loop {
        let mut raw = Vec::new();
        match reader.read_until(b'\n', &mut raw) {
            Ok(0) => {
                tracing::debug!(conn_id, extension = %ext, "connection closed by peer");
                break;
            }
            Ok(_) => {
                let line = trim_line(raw);
                let text = String::from_utf8_lossy(&line);
                match parse_command(&text) {
                    Some(cmd) => dispatch(&pbx, ext, cmd),
                    None => {
                        tracing::debug!(conn_id, extension = %ext, line = %text, "ignoring unrecognized line")
                    }
                }
            }
            Err(e) => {
                tracing::debug!(conn_id, extension = %ext, error = %e, "read error, closing connection");
                break;
            }
        }
    }

    if let Err(e) = pbx.unregister(ext) {
        tracing::warn!(conn_id, extension = %ext, error = %e, "unregister failed");
    }
}

/// Maps one parsed command onto the corresponding `Pbx` operation,
/// logging any error result (§ 7) rather than propagating it -- a bad
/// command never tears down the connection.
fn dispatch(pbx: &Pbx, ext: Extension, cmd: Command) {
    let result = match cmd {
        Command::Pickup => pbx.pickup(ext),
        Command::Hangup => pbx.hangup(ext),
        Command::Dial(target) => pbx.dial(ext, target),
        Command::Chat(message) => pbx.chat(ext, &message),
    };

    if let Err(e) = result {
        match e {
            PbxError::NotConnected => {
                tracing::debug!(extension = %ext, "chat attempted while not connected")
            }
            other => tracing::warn!(extension = %ext, error = %other, "command failed"),
        }
    }
}
