/*
 * request.rs
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

//! HTTP request: method, target, headers.
//!
//! The body travels separately through the request handle (see `transport`).

use std::fmt;

use crate::error::ClientError;
use crate::protocol::http::Headers;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
    Other(&'static str),
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Patch => "PATCH",
            Method::Other(s) => s,
        }
    }

    /// Methods whose response never carries content (HEAD). Such requests may not send a body
    /// and their responses are exempt from digest verification.
    pub fn is_no_body(&self) -> bool {
        matches!(self, Method::Head)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-call request description: method, target and headers.
///
/// Build with `RequestContext::new(method, path)` or from a path string (GET), add headers,
/// then hand it to a `StringClient` operation or directly to a `Transport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub method: Method,
    /// Request target: origin-form path (`/a/b?c=d`) or absolute URL.
    pub path: String,
    pub headers: Headers,
}

impl RequestContext {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Headers::new(),
        }
    }

    /// Add or replace a header. Names compare case-insensitively.
    pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.set(name, value);
        self
    }

    /// Consuming variant of `header` for one-expression construction.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Checks the parts static typing cannot: a usable target and well-formed header fields.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.path.is_empty() {
            return Err(ClientError::invalid("request target is empty"));
        }
        if self
            .path
            .bytes()
            .any(|b| b.is_ascii_whitespace() || b.is_ascii_control())
        {
            return Err(ClientError::invalid(format!(
                "request target contains whitespace or control characters: {:?}",
                self.path
            )));
        }
        if let Method::Other(name) = self.method {
            if name.is_empty() || !name.bytes().all(is_token_byte) {
                return Err(ClientError::invalid(format!("invalid method {:?}", name)));
            }
        }
        for (name, value) in self.headers.iter() {
            if name.is_empty() || !name.bytes().all(is_token_byte) {
                return Err(ClientError::invalid(format!("invalid header name {:?}", name)));
            }
            if value.bytes().any(|b| b == b'\r' || b == b'\n' || b == 0) {
                return Err(ClientError::invalid(format!(
                    "header {} has a value with CR, LF or NUL",
                    name
                )));
            }
        }
        Ok(())
    }
}

impl From<&str> for RequestContext {
    fn from(path: &str) -> Self {
        RequestContext::new(Method::Get, path)
    }
}

impl From<String> for RequestContext {
    fn from(path: String) -> Self {
        RequestContext::new(Method::Get, path)
    }
}

/// RFC 9110 tchar.
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}
