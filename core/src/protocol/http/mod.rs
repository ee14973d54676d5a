/*
 * mod.rs
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

//! HTTP transport: HTTP/1.1 client with push-parsed responses.
//!
//! Design:
//! - Callback-based response API: `ResponseHandler` with `ok`/`error`, `header`, `end_headers`, `start_body`, `body_chunk`, `end_body`, `complete`, `failed`.
//! - `Transport` is the seam: `dispatch` yields a `RequestHandle` (write body, end), `result` drives the response into a handler.
//! - Buffers: `bytes` crate (BytesMut for parse buffer and request body).
//! - HTTP/1.1 state-machine response parser; TLS via rustls with ALPN `http/1.1`.

mod handler;
mod headers;
mod request;
mod response;
mod transport;

pub mod h1;

pub use handler::ResponseHandler;
pub use h1::H1ResponseHandler;
pub use headers::Headers;
pub use request::{Method, RequestContext};
pub use response::Response;
pub use transport::{RequestHandle, Transport};

pub mod client;
pub mod connection;

pub use client::HttpClient;
pub use connection::{HttpConnection, HttpStream};
