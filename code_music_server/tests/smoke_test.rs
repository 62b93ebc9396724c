// Integration smoke test for the HTTP server.
//
// Starts the server on localhost, then talks raw HTTP/1.1 over plain TCP
// sockets: fetches the form, converts code in every accepted body format,
// checks the error statuses, and makes sure a stalled upload does not block
// other clients. No HTTP client library is involved, so this
// exercises tiny_http parsing and our response headers end to end.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use code_music::midi::to_midi_bytes;
use code_music::{SourceText, convert};
use code_music_server::{ServerConfig, start_server};

/// A parsed HTTP response.
struct HttpResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl HttpResponse {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Helper: send one request with `Connection: close` and read the full reply.
fn request(
    addr: SocketAddr,
    method: &str,
    path: &str,
    content_type: Option<&str>,
    body: &[u8],
) -> HttpResponse {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();

    let mut head = format!(
        "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\nContent-Length: {}\r\n",
        body.len()
    );
    if let Some(ct) = content_type {
        head.push_str(&format!("Content-Type: {ct}\r\n"));
    }
    head.push_str("\r\n");
    stream.write_all(head.as_bytes()).unwrap();
    stream.write_all(body).unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).unwrap();
    parse_response(&raw)
}

fn parse_response(raw: &[u8]) -> HttpResponse {
    let split = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has a header terminator");
    let head = String::from_utf8_lossy(&raw[..split]).to_string();
    let body = raw[split + 4..].to_vec();

    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap();
    let status = status_line
        .split_whitespace()
        .nth(1)
        .unwrap()
        .parse()
        .unwrap();
    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    HttpResponse {
        status,
        headers,
        body,
    }
}

#[test]
fn full_server_lifecycle() {
    // 1. Start on a random port.
    let config = ServerConfig {
        port: 0, // OS picks a free port
        ..ServerConfig::default()
    };
    let (handle, addr) = start_server(config).unwrap();

    // 2. The form page.
    let resp = request(addr, "GET", "/", None, b"");
    assert_eq!(resp.status, 200);
    assert!(resp.header("Content-Type").unwrap().starts_with("text/html"));
    assert!(String::from_utf8_lossy(&resp.body).contains("/convert"));

    // 3. JSON conversion returns the same bytes the core produces.
    let code = "def main():\n    for x in items:\n        print(x)\n";
    let json = serde_json::to_vec(&serde_json::json!({ "code": code })).unwrap();
    let resp = request(addr, "POST", "/convert", Some("application/json"), &json);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.header("Content-Type"), Some("audio/midi"));
    assert_eq!(
        resp.header("Content-Disposition"),
        Some("attachment; filename=\"code_music_def-main-for.mid\"")
    );
    let expected = to_midi_bytes(&convert(&SourceText::new(code).unwrap())).unwrap();
    assert_eq!(resp.body, expected);

    // 4. Raw text body.
    let resp = request(addr, "POST", "/convert", Some("text/plain"), code.as_bytes());
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, expected);

    // 5. Form post, as sent by a plain HTML form or `curl -d code=...`.
    let form = serde_urlencoded::to_string([("code", code)]).unwrap();
    let resp = request(
        addr,
        "POST",
        "/convert",
        Some("application/x-www-form-urlencoded"),
        form.as_bytes(),
    );
    assert_eq!(resp.status, 200);
    assert_eq!(
        resp.header("Content-Disposition"),
        Some("attachment; filename=\"code_music_def-main-for.mid\"")
    );
    assert_eq!(resp.body, expected);

    // 6. Error statuses.
    let resp = request(addr, "POST", "/convert", Some("application/json"), br#"{"code":""}"#);
    assert_eq!(resp.status, 400);
    assert_eq!(resp.body, b"No code provided");

    let resp = request(
        addr,
        "POST",
        "/convert",
        Some("application/x-www-form-urlencoded"),
        b"code=",
    );
    assert_eq!(resp.status, 400);

    assert_eq!(request(addr, "GET", "/convert", None, b"").status, 405);
    assert_eq!(request(addr, "GET", "/missing", None, b"").status, 404);

    // 7. Shut down cleanly.
    handle.stop();
}

#[test]
fn oversized_body_is_rejected() {
    let config = ServerConfig {
        port: 0,
        max_body_bytes: 16,
        ..ServerConfig::default()
    };
    let (handle, addr) = start_server(config).unwrap();

    let body = "x = 1\n".repeat(10);
    let resp = request(addr, "POST", "/convert", Some("text/plain"), body.as_bytes());
    assert_eq!(resp.status, 413);

    handle.stop();
}

/// Read from `stream` until the response head has arrived and return the
/// status code. Used where the server may keep the connection open.
fn read_status(stream: &mut TcpStream) -> u16 {
    let mut raw = Vec::new();
    let mut buf = [0u8; 512];
    while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).unwrap();
        assert!(n > 0, "connection closed before the response head");
        raw.extend_from_slice(&buf[..n]);
    }
    parse_response(&raw).status
}

#[test]
fn declared_oversized_body_is_rejected_before_upload() {
    let config = ServerConfig {
        port: 0,
        max_body_bytes: 16,
        ..ServerConfig::default()
    };
    let (handle, addr) = start_server(config).unwrap();

    // Announce a large body but send none of it.
    let mut stream = TcpStream::connect(addr).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let head = format!(
        "POST /convert HTTP/1.1\r\nHost: {addr}\r\nContent-Type: text/plain\r\nContent-Length: 100000\r\n\r\n"
    );
    stream.write_all(head.as_bytes()).unwrap();
    assert_eq!(read_status(&mut stream), 413);

    drop(stream);
    handle.stop();
}

#[test]
fn stalled_upload_does_not_block_other_clients() {
    let config = ServerConfig {
        port: 0,
        ..ServerConfig::default()
    };
    let (handle, addr) = start_server(config).unwrap();

    // 1. Client A promises a body larger than tiny_http buffers up front,
    //    sends two bytes of it, and goes quiet.
    let mut stalled = TcpStream::connect(addr).unwrap();
    let head = format!(
        "POST /convert HTTP/1.1\r\nHost: {addr}\r\nContent-Type: text/plain\r\nContent-Length: 100000\r\n\r\nab"
    );
    stalled.write_all(head.as_bytes()).unwrap();
    std::thread::sleep(Duration::from_millis(200));

    // 2. Client B is still served promptly.
    let resp = request(addr, "GET", "/", None, b"");
    assert_eq!(resp.status, 200);

    let resp = request(addr, "POST", "/convert", Some("text/plain"), b"x = 1");
    assert_eq!(resp.status, 200);

    // 3. Stopping works while A is still connected.
    handle.stop();
    drop(stalled);
}
