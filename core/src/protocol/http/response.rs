/*
 * response.rs
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

//! HTTP response head: status code, reason phrase, headers.

use crate::protocol::http::Headers;

/// Response status line plus headers. Transports pass it to `ResponseHandler::ok`/`error`
/// with empty headers; the headers follow as `header` events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub code: u16,
    pub reason: Option<String>,
    pub headers: Headers,
}

impl Response {
    pub fn new(code: u16) -> Self {
        Self {
            code,
            reason: None,
            headers: Headers::new(),
        }
    }

    pub fn with_reason(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: Some(reason.into()),
            headers: Headers::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// True when the last transfer coding is `chunked`.
    pub fn is_chunked(&self) -> bool {
        self.headers
            .get("transfer-encoding")
            .map(is_chunked_coding)
            .unwrap_or(false)
    }

    /// True when a non-empty `content-length` header is present (a declared `0` counts).
    pub fn declares_content_length(&self) -> bool {
        self.headers
            .get("content-length")
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false)
    }

    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get("content-length")
            .and_then(|v| v.trim().parse::<u64>().ok())
    }
}

/// `transfer-encoding` value whose final coding is `chunked`. Only then is the body chunk-framed.
pub(crate) fn is_chunked_coding(value: &str) -> bool {
    value
        .rsplit(',')
        .next()
        .map(|last| last.trim().eq_ignore_ascii_case("chunked"))
        .unwrap_or(false)
}
