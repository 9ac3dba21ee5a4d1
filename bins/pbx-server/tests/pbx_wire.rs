//! Socket-level end-to-end tests: real `TcpStream`s against a `serve()`
//! loop running in a background thread, bound to an OS-assigned port.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use pbx_core::Pbx;
use pbx_server::server;

struct TestServer {
    addr: std::net::SocketAddr,
    shutdown: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl TestServer {
    fn start() -> Self {
        let listener = server::bind(0).expect("bind");
        let addr = listener.local_addr().expect("local_addr");
        let pbx = Arc::new(Pbx::with_capacity(8));
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let handle = thread::spawn(move || server::serve(listener, pbx, shutdown_clone));
        // Give the accept loop a moment to start polling.
        thread::sleep(Duration::from_millis(50));
        TestServer {
            addr,
            shutdown,
            handle: Some(handle),
        }
    }

    fn connect(&self) -> TcpStream {
        TcpStream::connect(self.addr).expect("connect")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn read_line(reader: &mut BufReader<TcpStream>) -> String {
    let mut raw = Vec::new();
    reader.read_until(b'\n', &mut raw).expect("read_until");
    let mut s = String::from_utf8_lossy(&raw).into_owned();
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
    s
}

fn send_line(stream: &mut TcpStream, line: &str) {
    stream.write_all(line.as_bytes()).unwrap();
    stream.write_all(b"\r\n").unwrap();
}

#[test]
fn registers_and_echoes_on_hook_on_connect() {
    let server = TestServer::start();
    let stream = server.connect();
    let mut reader = BufReader::new(stream);
    assert_eq!(read_line(&mut reader), "ON_HOOK 0");
}

#[test]
fn two_extensions_complete_a_call_and_chat() {
    let server = TestServer::start();

    let stream_a = server.connect();
    let mut reader_a = BufReader::new(stream_a.try_clone().unwrap());
    let mut stream_a = stream_a;
    assert_eq!(read_line(&mut reader_a), "ON_HOOK 0");

    let stream_b = server.connect();
    let mut reader_b = BufReader::new(stream_b.try_clone().unwrap());
    let mut stream_b = stream_b;
    assert_eq!(read_line(&mut reader_b), "ON_HOOK 1");

    send_line(&mut stream_a, "pickup");
    assert_eq!(read_line(&mut reader_a), "DIAL_TONE");

    send_line(&mut stream_a, "dial 1");
    assert_eq!(read_line(&mut reader_a), "RING_BACK");
    assert_eq!(read_line(&mut reader_b), "RINGING");

    send_line(&mut stream_b, "pickup");
    assert_eq!(read_line(&mut reader_b), "CONNECTED 0");
    assert_eq!(read_line(&mut reader_a), "CONNECTED 1");

    send_line(&mut stream_a, "chat hello");
    assert_eq!(read_line(&mut reader_b), "CHAT hello");

    send_line(&mut stream_a, "hangup");
    assert_eq!(read_line(&mut reader_a), "ON_HOOK 0");
    assert_eq!(read_line(&mut reader_b), "DIAL_TONE");
}

#[test]
fn disconnect_unregisters_and_frees_extension() {
    let server = TestServer::start();

    let stream_a = server.connect();
    let mut reader_a = BufReader::new(stream_a.try_clone().unwrap());
    assert_eq!(read_line(&mut reader_a), "ON_HOOK 0");
    drop(stream_a);
    drop(reader_a);

    // Give the server a moment to observe EOF and unregister.
    thread::sleep(Duration::from_millis(100));

    let stream_b = server.connect();
    let mut reader_b = BufReader::new(stream_b);
    // Slot 0 should have been freed by the first connection's departure.
    assert_eq!(read_line(&mut reader_b), "ON_HOOK 0");
}

#[test]
fn dial_unknown_extension_yields_error() {
    let server = TestServer::start();

    let stream_a = server.connect();
    let mut reader_a = BufReader::new(stream_a.try_clone().unwrap());
    let mut stream_a = stream_a;
    assert_eq!(read_line(&mut reader_a), "ON_HOOK 0");

    send_line(&mut stream_a, "pickup");
    assert_eq!(read_line(&mut reader_a), "DIAL_TONE");

    send_line(&mut stream_a, "dial 99");
    assert_eq!(read_line(&mut reader_a), "ERROR");
}
