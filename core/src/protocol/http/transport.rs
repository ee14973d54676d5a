/*
 * transport.rs
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

//! Transport primitive: the capability set the string client is built on.
//!
//! `dispatch` turns a request description into a `RequestHandle`; the caller writes body bytes
//! to the handle and ends it; `result` sends the ended request and pushes the response into a
//! `ResponseHandler`. `HttpConnection` is the network implementation; tests plug in scripted ones.

use std::future::Future;

use bytes::{Bytes, BytesMut};

use crate::error::{TransportError, TransportErrorKind};
use crate::protocol::http::{Method, RequestContext, ResponseHandler};

/// A dispatched request: its description plus the body written so far.
#[derive(Debug)]
pub struct RequestHandle {
    context: RequestContext,
    body: BytesMut,
    ended: bool,
}

impl RequestHandle {
    pub fn new(context: RequestContext) -> Self {
        Self {
            context,
            body: BytesMut::new(),
            ended: false,
        }
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    pub fn method(&self) -> Method {
        self.context.method
    }

    /// Append body bytes. Fails once the handle has been ended.
    pub fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if self.ended {
            return Err(TransportError::new(
                TransportErrorKind::WriteAfterEnd,
                "write after end",
            ));
        }
        self.body.extend_from_slice(data);
        Ok(())
    }

    /// Finalize the request; no more writes are accepted.
    pub fn end(&mut self) {
        self.ended = true;
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_parts(self) -> (RequestContext, Bytes) {
        (self.context, self.body.freeze())
    }
}

/// Connection-level request/response engine.
pub trait Transport {
    /// Produce a request handle, or fail without sending anything.
    fn dispatch(
        &mut self,
        request: RequestContext,
    ) -> impl Future<Output = Result<RequestHandle, TransportError>> + Send;

    /// Send an ended request and drive its response events into `handler`.
    /// Every outcome, including failure to send, is reported through the handler.
    fn result(
        &mut self,
        request: RequestHandle,
        handler: &mut (dyn ResponseHandler + Send),
    ) -> impl Future<Output = ()> + Send;
}
