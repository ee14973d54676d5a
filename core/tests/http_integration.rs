/*
 * http_integration.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * End-to-end tests for the string client over the HTTP/1.1 connection, against a
 * scripted server on a local socket. No network access needed.
 *
 * Run with:
 *   cargo test -p textwire_core --test http_integration -- --nocapture
 */

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use textwire_core::error::TransportErrorKind;
use textwire_core::protocol::http::{HttpClient, HttpConnection, Method, RequestContext};
use textwire_core::string_client::digest::content_md5;
use textwire_core::string_client::form;
use textwire_core::{ClientOptions, OutboundBody, StringClient};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One request as the server saw it. Header names are lowercased.
#[derive(Debug)]
struct Captured {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Captured {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

async fn read_request(stream: &mut TcpStream, buf: &mut Vec<u8>) -> Option<Captured> {
    let mut tmp = [0u8; 4096];
    let head_end = loop {
        if let Some(i) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break i;
        }
        let n = stream.read(&mut tmp).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&tmp[..n]);
    };
    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    buf.drain(..head_end + 4);

    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split(' ');
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();
    let len = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < len {
        let n = stream.read(&mut tmp).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&tmp[..n]);
    }
    let body = buf.drain(..len).collect();
    Some(Captured {
        method,
        path,
        headers,
        body,
    })
}

/// Accept one connection and answer each request with the next canned reply, then hang up.
async fn serve(replies: Vec<Vec<u8>>) -> (u16, JoinHandle<Vec<Captured>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let task = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut seen = Vec::new();
        for reply in replies {
            let Some(request) = read_request(&mut stream, &mut buf).await else {
                break;
            };
            seen.push(request);
            stream.write_all(&reply).await.unwrap();
            stream.flush().await.unwrap();
        }
        seen
    });
    (port, task)
}

/// Answer one request with `head` and keep the socket open, streaming nothing more, until the
/// client hangs up. Resolves to true once the client closed its side.
async fn serve_open_stream(head: Vec<u8>) -> (u16, JoinHandle<bool>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let task = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        if read_request(&mut stream, &mut buf).await.is_none() {
            return false;
        }
        stream.write_all(&head).await.unwrap();
        stream.flush().await.unwrap();
        let mut tmp = [0u8; 256];
        loop {
            match stream.read(&mut tmp).await {
                Ok(0) | Err(_) => return true,
                Ok(_) => {}
            }
        }
    });
    (port, task)
}

fn reply(status: &str, headers: &[(&str, &str)], body: &[u8]) -> Vec<u8> {
    let mut out = format!("HTTP/1.1 {}\r\n", status).into_bytes();
    for (k, v) in headers {
        out.extend_from_slice(format!("{}: {}\r\n", k, v).as_bytes());
    }
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(body);
    out
}

fn verified(body: &str) -> Vec<u8> {
    let md5 = content_md5(body.as_bytes());
    let len = body.len().to_string();
    reply(
        "200 OK",
        &[("Content-Length", len.as_str()), ("Content-MD5", md5.as_str())],
        body.as_bytes(),
    )
}

async fn client(port: u16) -> StringClient<HttpConnection> {
    init_logging();
    let conn = HttpClient::connect("127.0.0.1", port, false).await.unwrap();
    StringClient::new(conn, ClientOptions::default())
}

#[tokio::test]
async fn form_post_is_framed_and_verified() {
    let (port, server) = serve(vec![verified("created")]).await;
    let mut c = client(port).await;

    let body = OutboundBody::form([("a", "1"), ("b", "two words")]);
    let done = c.post("/items", Some(body)).await.unwrap();
    assert!(done.is_ok(), "{:?}", done.error);
    assert_eq!(done.body.as_deref(), Some("created"));
    assert_eq!(done.response.as_ref().map(|r| r.code), Some(200));

    let seen = server.await.unwrap();
    let req = &seen[0];
    assert_eq!(req.method, "POST");
    assert_eq!(req.path, "/items");
    assert_eq!(req.body, b"a=1&b=two%20words");
    assert_eq!(req.header("content-length"), Some("17"));
    assert_eq!(req.header("content-md5"), Some(content_md5(&req.body).as_str()));
    assert_eq!(req.header("content-type"), Some("application/x-www-form-urlencoded"));
    assert_eq!(req.header("accept"), Some("text/plain"));
    assert_eq!(req.header("host"), Some(format!("127.0.0.1:{}", port).as_str()));
    let pairs = form::decode(std::str::from_utf8(&req.body).unwrap());
    assert_eq!(pairs[1], ("b".to_string(), "two words".to_string()));
}

#[tokio::test]
async fn keep_alive_carries_consecutive_requests() {
    let (port, server) = serve(vec![verified("one"), verified("two")]).await;
    let mut c = client(port).await;

    let first = c.put("/doc", Some(OutboundBody::text("draft"))).await.unwrap();
    let second = c.get("/doc").await.unwrap();
    assert_eq!(first.body.as_deref(), Some("one"));
    assert_eq!(second.body.as_deref(), Some("two"));
    assert!(!c.transport().is_closed());

    let seen = server.await.unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].method, "PUT");
    assert_eq!(seen[0].body, b"draft");
    assert_eq!(seen[1].method, "GET");
    assert!(seen[1].body.is_empty());
    assert!(seen[1].header("content-type").is_none());
}

#[tokio::test]
async fn chunked_response_is_assembled_and_verified() {
    let md5 = content_md5(b"hello");
    let chunked = reply(
        "200 OK",
        &[("Transfer-Encoding", "chunked"), ("Content-MD5", md5.as_str())],
        b"2\r\nhe\r\n3\r\nllo\r\n0\r\n\r\n",
    );
    let (port, _server) = serve(vec![chunked]).await;
    let mut c = client(port).await;

    let (response, body) = c.get("/greeting").await.unwrap().into_result().unwrap();
    assert!(response.is_chunked());
    assert_eq!(body.as_deref(), Some("hello"));
}

#[tokio::test]
async fn unframed_response_resolves_without_body() {
    let raw = reply("200 OK", &[("Connection", "close")], b"streamed until close");
    let (port, _server) = serve(vec![raw]).await;
    let mut c = client(port).await;

    let done = c.get("/events").await.unwrap();
    assert!(done.is_ok());
    assert!(done.body.is_none());
    assert!(c.transport().is_closed());

    let again = c.get("/events").await.unwrap();
    let err = again.error.as_ref().and_then(|e| e.transport()).unwrap();
    assert_eq!(err.kind(), TransportErrorKind::Closed);
    assert!(again.response.is_none());
}

#[tokio::test]
async fn error_status_reports_body_as_message() {
    let raw = reply("404 Not Found", &[("Content-Length", "13")], b"missing thing");
    let (port, _server) = serve(vec![raw]).await;
    let mut c = client(port).await;

    let done = c.del("/things/9").await.unwrap();
    let err = done.error.as_ref().unwrap();
    assert_eq!(err.to_string(), "missing thing");
    assert_eq!(err.transport().and_then(|t| t.status_code()), Some(404));
    assert_eq!(done.body.as_deref(), Some("missing thing"));
}

#[tokio::test]
async fn corrupted_body_is_bad_digest() {
    let md5 = content_md5(b"hello");
    let raw = reply(
        "200 OK",
        &[("Content-Length", "5"), ("Content-MD5", md5.as_str())],
        b"jello",
    );
    let (port, _server) = serve(vec![raw]).await;
    let mut c = client(port).await;

    let done = c.get("/x").await.unwrap();
    assert!(done.error.as_ref().unwrap().is_bad_digest());
    assert_eq!(done.body.as_deref(), Some("jello"));
}

#[tokio::test]
async fn head_response_has_empty_body() {
    let md5 = content_md5(b"hello");
    let raw = reply(
        "200 OK",
        &[("Content-Length", "5"), ("Content-MD5", md5.as_str())],
        b"",
    );
    let (port, server) = serve(vec![raw]).await;
    let mut c = client(port).await;

    let done = c.head("/x").await.unwrap();
    assert!(done.is_ok());
    assert_eq!(done.body.as_deref(), Some(""));
    assert_eq!(server.await.unwrap()[0].method, "HEAD");
}

#[tokio::test]
async fn truncated_body_is_a_transport_error() {
    let raw = reply("200 OK", &[("Content-Length", "10")], b"short");
    let (port, _server) = serve(vec![raw]).await;
    let mut c = client(port).await;

    let done = c
        .read(RequestContext::new(Method::Get, "/partial"))
        .await
        .unwrap();
    let err = done.error.as_ref().and_then(|e| e.transport()).unwrap();
    assert_eq!(
        err.kind(),
        TransportErrorKind::Io(std::io::ErrorKind::UnexpectedEof)
    );
    assert!(done.body.is_none());
}

#[tokio::test]
async fn unframed_stream_resolves_while_server_keeps_it_open() {
    let raw = reply(
        "200 OK",
        &[("Content-Type", "text/event-stream")],
        b"data: 1\n\n",
    );
    let (port, server) = serve_open_stream(raw).await;
    let mut c = client(port).await;

    let done = tokio::time::timeout(Duration::from_secs(5), c.get("/events"))
        .await
        .expect("unframed response must resolve at its headers")
        .unwrap();
    assert!(done.is_ok());
    assert!(done.body.is_none());
    assert_eq!(
        done.response.as_ref().and_then(|r| r.header("content-type")),
        Some("text/event-stream")
    );
    assert!(c.transport().is_closed());

    let hung_up = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("client should release the stream")
        .unwrap();
    assert!(hung_up);
}

#[tokio::test]
async fn chunked_before_another_coding_is_close_delimited() {
    let raw = reply(
        "200 OK",
        &[("Transfer-Encoding", "chunked, gzip")],
        b"5\r\nhello\r\n0\r\n\r\n",
    );
    let (port, server) = serve_open_stream(raw).await;
    let mut c = client(port).await;

    let done = tokio::time::timeout(Duration::from_secs(5), c.get("/compressed"))
        .await
        .expect("response without final chunked coding must resolve at its headers")
        .unwrap();
    assert!(done.is_ok());
    assert!(done.body.is_none());
    assert!(!done.response.as_ref().unwrap().is_chunked());
    assert!(c.transport().is_closed());
    assert!(server.await.unwrap());
}
