/*
 * handler.rs
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

//! Push events a `Transport` delivers for one response.

use std::io;

use crate::protocol::http::response::Response;

/// Receives one response as it is parsed.
///
/// The status arrives first, as `ok` for 2xx or `error` otherwise, followed by one `header` call
/// per field and then `end_headers`. At that point framing is decided. A framed or
/// close-delimited body arrives as `start_body`, `body_chunk`s in wire order and `end_body`.
/// Chunked trailers come through `header` after `end_body`, and `complete` closes the response.
/// HEAD, 204, 304 and `content-length: 0` responses go straight from `end_headers` to `complete`.
///
/// A connection or protocol failure ends the exchange with a single `failed` and nothing after.
pub trait ResponseHandler {
    fn ok(&mut self, response: Response);

    fn error(&mut self, response: Response);

    /// Response header or chunked trailer. Names may repeat.
    fn header(&mut self, name: &str, value: &str);

    fn end_headers(&mut self) {}

    /// Asked after `end_headers` when the body is delimited only by connection close. `false`
    /// stops the read there: the transport drops the connection and sends no further events.
    fn wants_body(&self) -> bool {
        true
    }

    fn start_body(&mut self);

    /// Body bytes, borrowed for the duration of the call.
    fn body_chunk(&mut self, data: &[u8]);

    fn end_body(&mut self);

    fn complete(&mut self);

    fn failed(&mut self, error: &io::Error);
}
