/*
 * connection.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Textwire, a text-oriented HTTP client.
 *
 * Textwire is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Textwire is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Textwire.  If not, see <http://www.gnu.org/licenses/>.
 */

//! HTTP connection: one TCP or TLS stream, drives the HTTP/1.1 parser, invokes ResponseHandler.
//! This is the network `Transport`; requests run one at a time over the kept-alive stream.

use bytes::BytesMut;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream as TokioTlsStream;
use tracing::{debug, trace};

use crate::error::{TransportError, TransportErrorKind};
use crate::protocol::http::h1::{BodyMode, H1ResponseHandler, ParseState, ResponseParser};
use crate::protocol::http::request::{Method, RequestContext};
use crate::protocol::http::response::{is_chunked_coding, Response};
use crate::protocol::http::transport::{RequestHandle, Transport};
use crate::protocol::http::ResponseHandler;

/// Unified stream: plain TCP or TLS. Implements AsyncRead + AsyncWrite.
pub enum HttpStream {
    Plain(TcpStream),
    Tls(Box<TokioTlsStream<TcpStream>>),
}

impl AsyncRead for HttpStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match &mut *self {
            HttpStream::Plain(s) => Pin::new(s).poll_read(cx, buf),
            HttpStream::Tls(s) => Pin::new(s.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for HttpStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match &mut *self {
            HttpStream::Plain(s) => Pin::new(s).poll_write(cx, buf),
            HttpStream::Tls(s) => Pin::new(s.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut *self {
            HttpStream::Plain(s) => Pin::new(s).poll_flush(cx),
            HttpStream::Tls(s) => Pin::new(s.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut *self {
            HttpStream::Plain(s) => Pin::new(s).poll_shutdown(cx),
            HttpStream::Tls(s) => Pin::new(s.as_mut()).poll_shutdown(cx),
        }
    }
}

/// Bridges H1 parser callbacks to the connection state and user's ResponseHandler.
struct H1Driver<'a> {
    h1_status: &'a mut Option<(u16, Option<String>)>,
    h1_headers: &'a mut Vec<(String, String)>,
    handler: &'a mut (dyn ResponseHandler + Send),
}

impl H1ResponseHandler for H1Driver<'_> {
    fn status(&mut self, code: u16, reason: Option<&str>) {
        *self.h1_status = Some((code, reason.map(|s| s.to_string())));
    }

    fn header(&mut self, name: &str, value: &str) {
        self.h1_headers.push((name.to_string(), value.to_string()));
    }

    fn start_body(&mut self) {
        self.handler.start_body();
    }

    fn body_chunk(&mut self, data: &[u8]) {
        self.handler.body_chunk(data);
    }

    fn end_body(&mut self) {
        self.handler.end_body();
    }

    fn trailer(&mut self, name: &str, value: &str) {
        self.handler.header(name, value);
    }

    fn complete(&mut self) {
        self.handler.complete();
    }
}

/// HTTP connection: holds the stream and drives the read loop. Implements `Transport`.
pub struct HttpConnection {
    stream: HttpStream,
    host: String,
    port: u16,
    secure: bool,
    /// Set once the stream cannot carry another request (I/O failure, `connection: close`, EOF-delimited body).
    closed: bool,

    // Read buffer; bytes past the end of one response stay for the next.
    read_buf: BytesMut,

    h1_parser: ResponseParser,
    h1_status: Option<(u16, Option<String>)>,
    h1_headers: Vec<(String, String)>,
}

impl HttpConnection {
    /// Create from an already-connected stream. Used by HttpClient::connect().
    pub fn new(stream: HttpStream, host: String, port: u16, secure: bool) -> Self {
        Self {
            stream,
            host,
            port,
            secure,
            closed: false,
            read_buf: BytesMut::with_capacity(8192),
            h1_parser: ResponseParser::new(),
            h1_status: None,
            h1_headers: Vec::new(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Send the request and run the read loop until the response is complete. Handler is invoked as data arrives.
    async fn send_http1(
        &mut self,
        request: RequestHandle,
        handler: &mut (dyn ResponseHandler + Send),
    ) -> io::Result<()> {
        self.h1_status = None;
        self.h1_headers.clear();
        self.h1_parser.reset();

        let (context, body) = request.into_parts();
        let method = context.method;
        self.write_http1_request(&context, &body).await?;

        let mut tmp = [0u8; 8192];
        loop {
            {
                let mut driver = H1Driver {
                    h1_status: &mut self.h1_status,
                    h1_headers: &mut self.h1_headers,
                    handler: &mut *handler,
                };
                self.h1_parser.receive(&mut self.read_buf, &mut driver)?;
            }

            match self.h1_parser.state() {
                ParseState::HeadersComplete => {
                    if !self.deliver_head(method, &mut *handler)? {
                        let _ = self.stream.shutdown().await;
                        break;
                    }
                    continue;
                }
                ParseState::Idle => break,
                _ => {}
            }

            let n = self.stream.read(&mut tmp).await?;
            if n == 0 {
                let mut driver = H1Driver {
                    h1_status: &mut self.h1_status,
                    h1_headers: &mut self.h1_headers,
                    handler: &mut *handler,
                };
                if self.h1_parser.finish_on_close(&mut driver) {
                    self.closed = true;
                    break;
                }
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "HTTP connection closed",
                ));
            }
            self.read_buf.extend_from_slice(&tmp[..n]);
        }
        Ok(())
    }

    /// Headers are in: report status and headers, then pick the body framing.
    /// Returns false when the handler declined a close-delimited body; the connection is then
    /// closed and the caller stops reading.
    fn deliver_head(
        &mut self,
        method: Method,
        handler: &mut (dyn ResponseHandler + Send),
    ) -> io::Result<bool> {
        let (code, reason) = self.h1_status.take().unwrap_or((0, None));
        if (100..200).contains(&code) && code != 101 {
            // Interim response (100 Continue etc.): the final status line follows.
            trace!(code, "skipping interim response");
            self.h1_headers.clear();
            self.h1_parser.reset();
            return Ok(true);
        }

        let content_length = self
            .h1_headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.trim().parse::<u64>().ok());
        let chunked = self
            .h1_headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("transfer-encoding"))
            .map(|(_, v)| is_chunked_coding(v))
            .unwrap_or(false);
        let close = self.h1_headers.iter().any(|(k, v)| {
            k.eq_ignore_ascii_case("connection") && v.trim().eq_ignore_ascii_case("close")
        });

        let response = match reason {
            Some(r) => Response::with_reason(code, r),
            None => Response::new(code),
        };
        if (200..300).contains(&code) {
            handler.ok(response);
        } else {
            handler.error(response);
        }
        for (name, value) in &self.h1_headers {
            handler.header(name, value);
        }
        handler.end_headers();

        let mode = if method.is_no_body() || code == 204 || code == 304 {
            BodyMode::None
        } else if chunked {
            BodyMode::Chunked
        } else if let Some(cl) = content_length {
            BodyMode::Length(cl)
        } else {
            BodyMode::UntilClose
        };
        debug!(code, ?mode, host = %self.host, "response head");
        if close {
            self.closed = true;
        }
        if mode == BodyMode::UntilClose && !handler.wants_body() {
            debug!(code, host = %self.host, "close-delimited body not wanted; dropping connection");
            self.closed = true;
            self.read_buf.clear();
            self.h1_parser.reset();
            return Ok(false);
        }
        let mut driver = H1Driver {
            h1_status: &mut self.h1_status,
            h1_headers: &mut self.h1_headers,
            handler,
        };
        self.h1_parser.set_body_mode(mode, &mut driver)?;
        Ok(true)
    }

    async fn write_http1_request(&mut self, request: &RequestContext, body: &[u8]) -> io::Result<()> {
        let host_header = if (self.secure && self.port != 443) || (!self.secure && self.port != 80) {
            format!("{}:{}", self.host, self.port)
        } else {
            self.host.clone()
        };
        let use_chunked = !body.is_empty()
            && !request.headers.contains("Content-Length")
            && !request.headers.contains("Transfer-Encoding");
        let mut req = format!("{} {} HTTP/1.1\r\n", request.method.as_str(), request.path);
        if !request.headers.contains("Host") {
            req.push_str("Host: ");
            req.push_str(&host_header);
            req.push_str("\r\n");
        }
        for (k, v) in request.headers.iter() {
            req.push_str(k);
            req.push_str(": ");
            req.push_str(v);
            req.push_str("\r\n");
        }
        if body.is_empty() {
            if !request.headers.contains("Connection") {
                req.push_str("Connection: keep-alive\r\n");
            }
        } else if use_chunked {
            req.push_str("Transfer-Encoding: chunked\r\n");
        }
        req.push_str("\r\n");
        debug!(method = %request.method, path = %request.path, body_len = body.len(), "sending request");
        self.stream.write_all(req.as_bytes()).await?;
        if !body.is_empty() {
            if use_chunked {
                let hex_len = format!("{:x}\r\n", body.len());
                self.stream.write_all(hex_len.as_bytes()).await?;
                self.stream.write_all(body).await?;
                self.stream.write_all(b"\r\n").await?;
                self.stream.write_all(b"0\r\n\r\n").await?;
            } else {
                self.stream.write_all(body).await?;
            }
        }
        self.stream.flush().await?;
        Ok(())
    }
}

impl Transport for HttpConnection {
    async fn dispatch(&mut self, request: RequestContext) -> Result<RequestHandle, TransportError> {
        if self.closed {
            return Err(TransportError::new(
                TransportErrorKind::Closed,
                format!("connection to {}:{} is closed", self.host, self.port),
            ));
        }
        Ok(RequestHandle::new(request))
    }

    async fn result(&mut self, request: RequestHandle, handler: &mut (dyn ResponseHandler + Send)) {
        if !request.is_ended() {
            handler.failed(&io::Error::new(
                io::ErrorKind::InvalidInput,
                "request handle was not ended",
            ));
            return;
        }
        if let Err(e) = self.send_http1(request, handler).await {
            debug!(error = %e, host = %self.host, "request failed; closing connection");
            self.closed = true;
            handler.failed(&e);
        }
    }
}
