#![forbid(unsafe_code)]

//! `HttpSource` against a scripted local HTTP server.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use aidsec_cli::cli::{DataArgs, OutputArgs, RenderArgs};
use aidsec_cli::source::HttpSource;
use aidsec_cli::{Cli, Commands, run};
use aidsec_runtime::{CsvSource, FetchError};

const FIXTURE: &str = include_str!("fixtures/incidents.csv");

// ═══════════════════════════════════════════════════════════════════════════
// Scripted server
// ═══════════════════════════════════════════════════════════════════════════

struct ServerHarness {
    endpoint: String,
    requests: Arc<Mutex<Vec<String>>>,
    stop: Arc<AtomicBool>,
    join_handle: Option<thread::JoinHandle<()>>,
}

impl ServerHarness {
    /// Serves `body` at `path`; every other path is a 404.
    fn start(path: &'static str, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let endpoint = format!("http://{}", listener.local_addr().expect("addr"));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let stop = Arc::new(AtomicBool::new(false));

        let seen = Arc::clone(&requests);
        let stopped = Arc::clone(&stop);
        let join_handle = thread::spawn(move || {
            for stream in listener.incoming() {
                if stopped.load(Ordering::SeqCst) {
                    break;
                }
                let Ok(mut stream) = stream else { continue };
                let Some(requested) = read_request_path(&mut stream) else {
                    continue;
                };
                seen.lock().expect("requests lock").push(requested.clone());
                if requested == path {
                    write_response(&mut stream, "200 OK", body);
                } else {
                    write_response(&mut stream, "404 Not Found", "missing");
                }
            }
        });

        Self {
            endpoint,
            requests,
            stop,
            join_handle: Some(join_handle),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.endpoint)
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl Drop for ServerHarness {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        let _ = TcpStream::connect(self.endpoint.strip_prefix("http://").unwrap_or_default());
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
    }
}

fn read_request_path(stream: &mut TcpStream) -> Option<String> {
    stream.set_read_timeout(Some(Duration::from_secs(2))).ok()?;
    let mut bytes = Vec::new();
    let mut buf = [0_u8; 1024];
    while !bytes.windows(4).any(|window| window == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(read) => bytes.extend_from_slice(&buf[..read]),
        }
    }
    let text = String::from_utf8_lossy(&bytes);
    text.lines()
        .next()?
        .split_whitespace()
        .nth(1)
        .map(ToOwned::to_owned)
}

fn write_response(stream: &mut TcpStream, status: &str, body: &str) {
    let payload = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(payload.as_bytes());
    let _ = stream.flush();
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn fetches_body_on_success() {
    let server = ServerHarness::start("/data/incidents.csv", FIXTURE);
    let source = HttpSource::new().expect("client");

    let text = source.fetch(&server.url("/data/incidents.csv")).expect("fetch");
    assert_eq!(text, FIXTURE);
    assert_eq!(server.requests(), ["/data/incidents.csv"]);
}

#[test]
fn base_url_resolves_relative_paths() {
    let server = ServerHarness::start("/data/incidents.csv", FIXTURE);
    let source = HttpSource::with_base(server.url("/data")).expect("client");

    assert_eq!(source.fetch("incidents.csv").expect("fetch"), FIXTURE);
}

#[test]
fn non_success_status_is_reported() {
    let server = ServerHarness::start("/data/incidents.csv", FIXTURE);
    let source = HttpSource::new().expect("client");

    let error = source.fetch(&server.url("/other.csv")).unwrap_err();
    assert_eq!(
        error,
        FetchError::Status {
            path: server.url("/other.csv"),
            status: 404,
        }
    );
    assert!(error.to_string().starts_with("HTTP error! status: 404"));
}

#[test]
fn refused_connection_is_transport_failure() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let source = HttpSource::new().expect("client");

    let error = source
        .fetch(&format!("http://127.0.0.1:{port}/incidents.csv"))
        .unwrap_err();
    assert!(matches!(error, FetchError::Transport { .. }), "{error:?}");
}

#[test]
fn render_over_http_fetches_once() {
    let server = ServerHarness::start("/incidents.csv", FIXTURE);
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("frames.jsonl");

    run(Cli {
        config: None,
        log_json: false,
        command: Commands::Render(RenderArgs {
            data: DataArgs {
                data: Some(server.url("/incidents.csv")),
            },
            output: OutputArgs {
                out: Some(out.clone()),
                pretty: false,
            },
            ..RenderArgs::default()
        }),
    })
    .expect("render succeeds");

    let frames = std::fs::read_to_string(&out).expect("read frames");
    assert_eq!(frames.lines().count(), 10);
    assert_eq!(server.requests().len(), 1);
}
