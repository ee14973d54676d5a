/*
 * client.rs
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

//! String client: text and form bodies out, verified text bodies back, over any `Transport`.

use tokio::sync::oneshot;
use tracing::{debug, debug_span, trace, Instrument, Span};

use crate::config::ClientOptions;
use crate::error::{ClientError, TransportError, TransportErrorKind};
use crate::protocol::http::{Method, RequestContext, Response, Transport};
use crate::string_client::body::OutboundBody;
use crate::string_client::parser::StringResponseParser;

/// Outcome of one request: `(error, request, response, body)`.
///
/// Check `error` before trusting `body`. A `BadDigest` error still carries the (untrusted) body;
/// a transport error from a non-2xx response carries the body text as its message.
#[derive(Debug)]
pub struct Completion {
    pub error: Option<ClientError>,
    /// The request as sent, including computed framing headers.
    pub request: RequestContext,
    /// Absent when the transport failed before a status line arrived.
    pub response: Option<Response>,
    /// Present only when the response declared chunked framing or a content-length.
    pub body: Option<String>,
}

impl Completion {
    pub(crate) fn failed(request: RequestContext, error: TransportError) -> Self {
        Self {
            error: Some(ClientError::Transport(error)),
            request,
            response: None,
            body: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Collapse into a `Result`, discarding the body on error.
    pub fn into_result(self) -> Result<(Response, Option<String>), ClientError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        match self.response {
            Some(response) => Ok((response, self.body)),
            None => Err(ClientError::Transport(TransportError::new(
                TransportErrorKind::Incomplete,
                "no response",
            ))),
        }
    }
}

/// Text-oriented client over an injected transport.
///
/// Each operation returns `Err` only for `InvalidArgument` (checked before any I/O); every other
/// outcome, including transport failure, is a `Completion`.
pub struct StringClient<T> {
    transport: T,
    options: ClientOptions,
    span: Span,
}

impl<T: Transport> StringClient<T> {
    pub fn new(transport: T, options: ClientOptions) -> Self {
        let span = debug_span!("string_client", name = %options.name);
        Self {
            transport,
            options,
            span,
        }
    }

    /// Use `span` as the logging scope for this client's diagnostics.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    pub async fn post(
        &mut self,
        request: impl Into<RequestContext>,
        body: Option<OutboundBody>,
    ) -> Result<Completion, ClientError> {
        let mut request = request.into();
        request.method = Method::Post;
        self.write(request, body).await
    }

    pub async fn put(
        &mut self,
        request: impl Into<RequestContext>,
        body: Option<OutboundBody>,
    ) -> Result<Completion, ClientError> {
        let mut request = request.into();
        request.method = Method::Put;
        self.write(request, body).await
    }

    pub async fn get(&mut self, request: impl Into<RequestContext>) -> Result<Completion, ClientError> {
        let mut request = request.into();
        request.method = Method::Get;
        self.read(request).await
    }

    pub async fn head(&mut self, request: impl Into<RequestContext>) -> Result<Completion, ClientError> {
        let mut request = request.into();
        request.method = Method::Head;
        self.read(request).await
    }

    pub async fn del(&mut self, request: impl Into<RequestContext>) -> Result<Completion, ClientError> {
        let mut request = request.into();
        request.method = Method::Delete;
        self.read(request).await
    }

    /// Send a request without a body, using the request's own method.
    pub async fn read(&mut self, request: impl Into<RequestContext>) -> Result<Completion, ClientError> {
        let mut request = request.into();
        request.validate()?;
        self.options.apply_defaults(&mut request.headers, false);
        let span = self.span.clone();
        Ok(self.execute(request, None).instrument(span).await)
    }

    /// Send a request with an optional body, using the request's own method.
    /// A body gets exact `content-length` and `content-md5` headers computed from the sent bytes.
    pub async fn write(
        &mut self,
        request: impl Into<RequestContext>,
        body: Option<OutboundBody>,
    ) -> Result<Completion, ClientError> {
        let mut request = request.into();
        request.validate()?;
        if body.is_some() && request.method.is_no_body() {
            return Err(ClientError::invalid(format!(
                "{} requests cannot carry a body",
                request.method
            )));
        }
        let encoded = body.as_ref().map(OutboundBody::encode);
        if let Some(e) = &encoded {
            request.headers.set("content-length", e.content_length.to_string());
            request.headers.set("content-md5", e.content_md5.as_str());
        }
        self.options.apply_defaults(&mut request.headers, encoded.is_some());
        let span = self.span.clone();
        Ok(self
            .execute(request, encoded.map(|e| e.text))
            .instrument(span)
            .await)
    }

    /// Response parser for `request` that reports to `callback`, logging under this client's span.
    pub fn parse(
        &self,
        request: RequestContext,
        callback: impl FnOnce(Completion) + Send + 'static,
    ) -> StringResponseParser {
        StringResponseParser::new(request, callback).with_span(self.span.clone())
    }

    async fn execute(&mut self, request: RequestContext, body: Option<String>) -> Completion {
        let sent = request.clone();
        let mut handle = match self.transport.dispatch(request).await {
            Ok(handle) => handle,
            Err(e) => {
                debug!(error = %e, path = %sent.path, "dispatch failed");
                return Completion::failed(sent, e);
            }
        };
        if let Some(body) = body.filter(|b| !b.is_empty()) {
            trace!(path = %sent.path, body = %body, "sending body");
            if let Err(e) = handle.write(body.as_bytes()) {
                return Completion::failed(sent, e);
            }
        }
        handle.end();

        let (tx, rx) = oneshot::channel();
        let mut parser = self.parse(handle.context().clone(), move |completion| {
            let _ = tx.send(completion);
        });
        self.transport.result(handle, &mut parser).await;
        parser.finish();
        match rx.await {
            Ok(completion) => completion,
            Err(_) => Completion::failed(
                sent,
                TransportError::new(TransportErrorKind::Incomplete, "response parser dropped"),
            ),
        }
    }
}
