use fanjob::engine::{fetch_body, fetch_urls};
use fanjob::{JobOpts, ThresholdPolicy};
use reqwest::blocking::Client;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

/// Minimal HTTP/1.1 server on a random local port: `/ok/<name>` -> 200 with body `<name>`,
/// anything else -> 404. Runs until the test process exits.
fn spawn_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            thread::spawn(move || handle(stream));
        }
    });
    format!("http://{addr}")
}

fn handle(mut stream: TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 512];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    let request = String::from_utf8_lossy(&buf);
    let path = request.split_whitespace().nth(1).unwrap_or("/");
    let (status, body) = match path.strip_prefix("/ok/") {
        Some(name) => ("200 OK", name.to_string()),
        None => ("404 Not Found", "missing".to_string()),
    };
    let resp = format!(
        "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(resp.as_bytes());
}

fn local_client() -> Client {
    Client::builder().no_proxy().build().unwrap()
}

#[test]
fn test_fetch_body_ok_and_not_found() {
    let base = spawn_server();
    let client = local_client();
    assert_eq!(fetch_body(&client, &format!("{base}/ok/hello")).unwrap(), "hello");
    let err = fetch_body(&client, &format!("{base}/nope")).unwrap_err();
    assert!(err.to_string().contains("404"));
}

#[test]
fn test_fetch_urls_records_non_200_and_bad_urls_as_errors() {
    let base = spawn_server();
    let urls = vec![
        format!("{base}/ok/books"),
        format!("{base}/ok/quotes"),
        format!("{base}/missing"),
        "not a url".to_string(),
    ];
    let sink = fetch_urls(
        urls,
        local_client(),
        &ThresholdPolicy::default(),
        JobOpts::default(),
    )
    .unwrap();

    assert_eq!(sink.outcomes_received(), 4);
    assert_eq!(sink.success().len(), 2);
    assert_eq!(sink.success()[&format!("{base}/ok/books")], "books");
    assert_eq!(sink.success()[&format!("{base}/ok/quotes")], "quotes");
    let failed: Vec<&str> = sink.errors().iter().map(|(k, _)| k.as_str()).collect();
    assert!(failed.contains(&format!("{base}/missing").as_str()));
    assert!(failed.contains(&"not a url"));
}

#[test]
fn test_fetch_urls_pooled_many() {
    let base = spawn_server();
    let urls: Vec<String> = (0..40).map(|i| format!("{base}/ok/p{i}")).collect();
    let sink = fetch_urls(
        urls,
        local_client(),
        &ThresholdPolicy::default(),
        JobOpts::pooled(4),
    )
    .unwrap();
    assert_eq!(sink.success().len(), 40);
    assert!(sink.errors().is_empty());
}
