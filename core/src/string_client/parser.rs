/*
 * parser.rs
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

//! Response side of the string client: assembles a text body and checks `content-md5`.
//!
//! Responses with neither `transfer-encoding: chunked` nor `content-length` are handed back at
//! `end_headers` without a body. Otherwise every chunk is buffered (and digested when the
//! response declares `content-md5` and the request was not HEAD) until `complete`.
//! The callback fires exactly once: a digest mismatch replaces any upstream error.
//! Once resolved the parser declines close-delimited bodies, so the transport can stop reading.

use std::io;

use bytes::BytesMut;
use tracing::{debug, trace, Span};

use crate::error::{ClientError, TransportError, TransportErrorKind};
use crate::protocol::http::{RequestContext, Response, ResponseHandler};
use crate::string_client::digest::RunningDigest;
use crate::string_client::Completion;

pub type CompletionCallback = Box<dyn FnOnce(Completion) + Send>;

/// `ResponseHandler` bound to one request and one completion callback.
pub struct StringResponseParser {
    request: RequestContext,
    callback: Option<CompletionCallback>,
    response: Option<Response>,
    /// Non-2xx status, held until the body is known.
    upstream: Option<TransportError>,
    headers_done: bool,
    buffering: bool,
    body: BytesMut,
    digest: Option<RunningDigest>,
    span: Span,
}

impl StringResponseParser {
    pub fn new(request: RequestContext, callback: impl FnOnce(Completion) + Send + 'static) -> Self {
        Self {
            request,
            callback: Some(Box::new(callback)),
            response: None,
            upstream: None,
            headers_done: false,
            buffering: false,
            body: BytesMut::new(),
            digest: None,
            span: Span::none(),
        }
    }

    /// Log under `span` instead of the caller's current span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.callback.is_none()
    }

    /// Force a resolution if the transport returned without finishing the response.
    pub fn finish(&mut self) {
        if !self.is_resolved() {
            self.span.in_scope(|| {
                debug!(path = %self.request.path, "transport finished without completing the response")
            });
            self.resolve(
                Some(ClientError::Transport(TransportError::new(
                    TransportErrorKind::Incomplete,
                    "response ended before it was complete",
                ))),
                None,
            );
        }
    }

    fn resolve(&mut self, error: Option<ClientError>, body: Option<String>) {
        if let Some(callback) = self.callback.take() {
            callback(Completion {
                error,
                request: self.request.clone(),
                response: self.response.take(),
                body,
            });
        }
    }
}

impl ResponseHandler for StringResponseParser {
    fn ok(&mut self, response: Response) {
        self.response = Some(response);
    }

    fn error(&mut self, response: Response) {
        self.upstream = Some(TransportError::status(response.code, response.reason.as_deref()));
        self.response = Some(response);
    }

    fn header(&mut self, name: &str, value: &str) {
        if let Some(response) = self.response.as_mut() {
            response.headers.append(name, value);
        }
    }

    fn end_headers(&mut self) {
        if self.headers_done || self.is_resolved() {
            return;
        }
        self.headers_done = true;
        let Some(response) = self.response.as_ref() else {
            return;
        };
        let code = response.code;
        let framed = response.is_chunked() || response.declares_content_length();
        let declares_md5 = response.header("content-md5").is_some();
        if !framed {
            self.span.in_scope(|| trace!(code, "no body framing; not buffering"));
            let error = self.upstream.take().map(ClientError::Transport);
            self.resolve(error, None);
            return;
        }
        self.buffering = true;
        if declares_md5 && !self.request.method.is_no_body() {
            self.digest = Some(RunningDigest::new());
        }
    }

    /// An unframed body is never read: the response resolved at `end_headers`.
    fn wants_body(&self) -> bool {
        !self.is_resolved()
    }

    fn start_body(&mut self) {}

    fn body_chunk(&mut self, data: &[u8]) {
        if !self.buffering || self.is_resolved() {
            return;
        }
        self.body.extend_from_slice(data);
        if let Some(digest) = self.digest.as_mut() {
            digest.update(data);
        }
    }

    fn end_body(&mut self) {}

    fn complete(&mut self) {
        if !self.headers_done {
            self.end_headers();
        }
        if self.is_resolved() {
            return;
        }
        let text = String::from_utf8_lossy(&self.body).into_owned();
        self.span
            .in_scope(|| trace!(path = %self.request.path, body = %text, "body received"));

        if let Some(digest) = self.digest.take() {
            let actual = digest.finish();
            let expected = self
                .response
                .as_ref()
                .and_then(|r| r.header("content-md5"))
                .unwrap_or_default()
                .trim()
                .to_string();
            if expected != actual {
                self.span.in_scope(|| {
                    debug!(%expected, %actual, path = %self.request.path, "content-md5 mismatch")
                });
                self.resolve(Some(ClientError::BadDigest { expected, actual }), Some(text));
                return;
            }
        }

        let error = self.upstream.take().map(|mut e| {
            e.set_message(text.clone());
            ClientError::Transport(e)
        });
        self.resolve(error, Some(text));
    }

    fn failed(&mut self, error: &io::Error) {
        if self.is_resolved() {
            return;
        }
        self.span
            .in_scope(|| debug!(error = %error, path = %self.request.path, "transport failed"));
        self.resolve(Some(ClientError::Transport(TransportError::from(error))), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::protocol::http::Method;
    use crate::string_client::digest::content_md5;

    type Calls = Arc<Mutex<Vec<Completion>>>;

    fn parser_for(method: Method) -> (StringResponseParser, Calls) {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));
        let sink = calls.clone();
        let parser = StringResponseParser::new(RequestContext::new(method, "/r"), move |c| {
            sink.lock().unwrap().push(c);
        });
        (parser, calls)
    }

    fn head(p: &mut StringResponseParser, code: u16, headers: &[(&str, &str)]) {
        let response = Response::new(code);
        if (200..300).contains(&code) {
            p.ok(response);
        } else {
            p.error(response);
        }
        for (k, v) in headers {
            p.header(k, v);
        }
        p.end_headers();
    }

    fn body(p: &mut StringResponseParser, chunks: &[&str]) {
        p.start_body();
        for c in chunks {
            p.body_chunk(c.as_bytes());
        }
        p.end_body();
        p.complete();
    }

    #[test]
    fn content_length_with_matching_digest() {
        let (mut p, calls) = parser_for(Method::Get);
        head(&mut p, 200, &[("content-length", "5"), ("content-md5", content_md5(b"hello").as_str())]);
        body(&mut p, &["hello"]);
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].error.is_none());
        assert_eq!(calls[0].body.as_deref(), Some("hello"));
        assert_eq!(calls[0].response.as_ref().map(|r| r.code), Some(200));
    }

    #[test]
    fn wrong_digest_is_bad_digest_with_body() {
        let (mut p, calls) = parser_for(Method::Get);
        head(&mut p, 200, &[("Content-Length", "5"), ("Content-MD5", "AAAAAAAAAAAAAAAAAAAAAA==")]);
        body(&mut p, &["hello"]);
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        match &calls[0].error {
            Some(ClientError::BadDigest { expected, actual }) => {
                assert_eq!(expected, "AAAAAAAAAAAAAAAAAAAAAA==");
                assert_eq!(actual, &content_md5(b"hello"));
            }
            other => panic!("expected BadDigest, got {:?}", other),
        }
        assert_eq!(calls[0].body.as_deref(), Some("hello"));
    }

    #[test]
    fn no_framing_resolves_without_body() {
        let (mut p, calls) = parser_for(Method::Get);
        head(&mut p, 200, &[("content-type", "text/plain")]);
        assert!(p.is_resolved());
        body(&mut p, &["ignored"]);
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].error.is_none());
        assert!(calls[0].body.is_none());
        assert!(calls[0].response.is_some());
    }

    #[test]
    fn only_unresolved_parser_wants_body() {
        let (mut p, _calls) = parser_for(Method::Get);
        head(&mut p, 200, &[("content-type", "text/event-stream")]);
        assert!(!p.wants_body());

        let (mut p, _calls) = parser_for(Method::Get);
        head(&mut p, 200, &[("content-length", "5")]);
        assert!(p.wants_body());
    }

    #[test]
    fn no_framing_keeps_upstream_error_message() {
        let (mut p, calls) = parser_for(Method::Get);
        p.error(Response::with_reason(502, "Bad Gateway"));
        p.end_headers();
        let calls = calls.lock().unwrap();
        let err = calls[0].error.as_ref().and_then(|e| e.transport()).unwrap();
        assert_eq!(err.status_code(), Some(502));
        assert_eq!(err.message(), "Bad Gateway");
        assert!(calls[0].body.is_none());
    }

    #[test]
    fn chunked_digest_covers_concatenation() {
        let (mut p, calls) = parser_for(Method::Get);
        head(&mut p, 200, &[("transfer-encoding", "chunked"), ("content-md5", content_md5(b"hello").as_str())]);
        body(&mut p, &["he", "llo"]);
        let calls = calls.lock().unwrap();
        assert!(calls[0].error.is_none());
        assert_eq!(calls[0].body.as_deref(), Some("hello"));
    }

    #[test]
    fn upstream_error_takes_body_as_message() {
        let (mut p, calls) = parser_for(Method::Post);
        head(&mut p, 409, &[("content-length", "14")]);
        body(&mut p, &["already exists"]);
        let calls = calls.lock().unwrap();
        let err = calls[0].error.as_ref().unwrap();
        assert_eq!(err.to_string(), "already exists");
        assert_eq!(err.transport().and_then(|t| t.status_code()), Some(409));
        assert_eq!(calls[0].body.as_deref(), Some("already exists"));
    }

    #[test]
    fn digest_mismatch_beats_upstream_error() {
        let (mut p, calls) = parser_for(Method::Get);
        head(&mut p, 500, &[("content-length", "4"), ("content-md5", content_md5(b"else").as_str())]);
        body(&mut p, &["oops"]);
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].error.as_ref().unwrap().is_bad_digest());
        assert_eq!(calls[0].body.as_deref(), Some("oops"));
    }

    #[test]
    fn head_requests_skip_digest() {
        let (mut p, calls) = parser_for(Method::Head);
        head(&mut p, 200, &[("content-length", "5"), ("content-md5", content_md5(b"hello").as_str())]);
        p.complete();
        let calls = calls.lock().unwrap();
        assert!(calls[0].error.is_none());
        assert_eq!(calls[0].body.as_deref(), Some(""));
    }

    #[test]
    fn multibyte_split_across_chunks() {
        let (mut p, calls) = parser_for(Method::Get);
        let text = "zoë";
        let bytes = text.as_bytes();
        head(&mut p, 200, &[("content-length", "4"), ("content-md5", content_md5(bytes).as_str())]);
        p.start_body();
        p.body_chunk(&bytes[..3]);
        p.body_chunk(&bytes[3..]);
        p.complete();
        assert_eq!(calls.lock().unwrap()[0].body.as_deref(), Some("zoë"));
    }

    #[test]
    fn resolves_once() {
        let (mut p, calls) = parser_for(Method::Get);
        head(&mut p, 200, &[("content-length", "2")]);
        body(&mut p, &["ok"]);
        p.complete();
        p.failed(&io::Error::new(io::ErrorKind::BrokenPipe, "late"));
        p.finish();
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn failure_mid_body() {
        let (mut p, calls) = parser_for(Method::Get);
        head(&mut p, 200, &[("content-length", "10")]);
        p.start_body();
        p.body_chunk(b"part");
        p.failed(&io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        let calls = calls.lock().unwrap();
        let err = calls[0].error.as_ref().and_then(|e| e.transport()).unwrap();
        assert_eq!(err.kind(), TransportErrorKind::Io(io::ErrorKind::ConnectionReset));
        assert!(calls[0].body.is_none());
        assert!(calls[0].response.is_some());
    }

    #[test]
    fn finish_without_events_is_incomplete() {
        let (mut p, calls) = parser_for(Method::Get);
        p.finish();
        let calls = calls.lock().unwrap();
        let err = calls[0].error.as_ref().and_then(|e| e.transport()).unwrap();
        assert_eq!(err.kind(), TransportErrorKind::Incomplete);
        assert!(calls[0].response.is_none());
    }

    #[test]
    fn complete_without_end_headers_still_decides_framing() {
        let (mut p, calls) = parser_for(Method::Get);
        p.ok(Response::new(200));
        p.header("content-length", "3");
        p.body_chunk(b"abc");
        p.complete();
        let calls = calls.lock().unwrap();
        // Framing was only known at completion, so the chunk arrived before buffering began.
        assert_eq!(calls[0].body.as_deref(), Some(""));
    }
}
