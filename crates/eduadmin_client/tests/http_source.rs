//! HttpListSource against a canned single-purpose HTTP server.

use eduadmin_client::HttpListSource;
use eduadmin_core::{AppError, Filter, ListParams, ListSource, RecordId, SortOrder};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

struct CannedServer {
    base: String,
    request_lines: Arc<Mutex<Vec<String>>>,
    shutdown_tx: mpsc::Sender<()>,
    worker: Option<thread::JoinHandle<()>>,
}

impl CannedServer {
    fn start(status_line: &'static str, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
        let base = format!("http://{}", listener.local_addr().expect("listener addr"));
        listener
            .set_nonblocking(true)
            .expect("set listener non-blocking");
        let request_lines = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&request_lines);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let worker = thread::spawn(move || loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }
            match listener.accept() {
                Ok((mut stream, _)) => {
                    let _ = stream.set_nonblocking(false);
                    let _ = stream.set_read_timeout(Some(Duration::from_millis(500)));
                    let _ = stream.set_write_timeout(Some(Duration::from_millis(500)));
                    let mut request = Vec::new();
                    let mut chunk = [0_u8; 1024];
                    while !request.windows(4).any(|window| window == b"\r\n\r\n") {
                        match stream.read(&mut chunk) {
                            Ok(0) | Err(_) => break,
                            Ok(read) => request.extend_from_slice(&chunk[..read]),
                        }
                    }
                    let text = String::from_utf8_lossy(&request);
                    if let Some(line) = text.lines().next() {
                        captured.lock().expect("lock").push(line.to_string());
                    }
                    let response = format!(
                        "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status_line,
                        body.len(),
                        body
                    );
                    let _ = stream.write_all(response.as_bytes());
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(_) => break,
            }
        });
        Self {
            base,
            request_lines,
            shutdown_tx,
            worker: Some(worker),
        }
    }

    fn source(&self) -> HttpListSource {
        HttpListSource::new(&self.base, Duration::from_secs(5)).expect("source")
    }

    fn request_lines(&self) -> Vec<String> {
        self.request_lines.lock().expect("lock").clone()
    }
}

impl Drop for CannedServer {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn params(page: usize, per_page: usize) -> ListParams {
    ListParams {
        page,
        per_page,
        sort_field: "name".to_string(),
        sort_order: SortOrder::Asc,
        filter: Filter::new(),
    }
}

#[test]
fn fetch_list_sends_paging_sort_and_filter_params() {
    let server = CannedServer::start(
        "HTTP/1.1 200 OK",
        r#"{"data":[{"id":4,"documentId":"t-4","name":"Algebra"}],"total":11,"hasMore":true}"#,
    );
    let mut request = params(2, 10);
    request.filter.insert("subject", 3);

    let page = server
        .source()
        .fetch_list("topics", &request)
        .expect("list page");

    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].id, RecordId::from(4u64));
    assert_eq!(page.data[0].display("name"), Some("Algebra".to_string()));
    assert_eq!(page.total, Some(11));
    assert_eq!(page.has_more, Some(true));

    let lines = server.request_lines();
    assert_eq!(lines.len(), 1);
    let line = &lines[0];
    assert!(line.starts_with("GET /api/topics?"), "line: {}", line);
    for expected in [
        "page=2",
        "perPage=10",
        "sort=name",
        "order=ASC",
        "filter=%7B%22subject%22%3A3%7D",
    ] {
        assert!(line.contains(expected), "missing {} in {}", expected, line);
    }
}

#[test]
fn fetch_list_accepts_bare_array_bodies() {
    let server = CannedServer::start("HTTP/1.1 200 OK", r#"[{"id":"a"},{"id":"b"}]"#);
    let page = server
        .source()
        .fetch_list("subjects", &params(1, 20))
        .expect("list page");
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.total, None);
    assert_eq!(page.has_more, None);
    assert!(!server.request_lines()[0].contains("filter="));
}

#[test]
fn non_success_status_maps_to_http_error_with_server_message() {
    let server = CannedServer::start(
        "HTTP/1.1 403 Forbidden",
        r#"{"error":{"status":403,"message":"Forbidden resource"}}"#,
    );
    let err = server
        .source()
        .fetch_list("questions", &params(1, 20))
        .expect_err("forbidden");
    match err {
        AppError::Http { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "Forbidden resource");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn malformed_body_maps_to_decode_error() {
    let server = CannedServer::start("HTTP/1.1 200 OK", r#"{"data":"nope"}"#);
    let err = server
        .source()
        .fetch_list("questions", &params(1, 20))
        .expect_err("decode");
    assert!(matches!(err, AppError::Decode(_)), "{:?}", err);
}

#[test]
fn unreachable_server_maps_to_retryable_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
    let base = format!("http://{}", listener.local_addr().expect("listener addr"));
    drop(listener);

    let source = HttpListSource::new(&base, Duration::from_secs(2)).expect("source");
    let err = source
        .fetch_list("topics", &params(1, 20))
        .expect_err("connection refused");
    assert!(matches!(err, AppError::Transport(_)), "{:?}", err);
    assert!(err.is_retryable());
}
