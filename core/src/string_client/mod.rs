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

//! String client: sends text or form bodies and reads back text bodies verified against `content-md5`.
//!
//! - `StringClient` wraps any `Transport`; operations resolve to a `Completion`.
//! - `StringResponseParser` is the `ResponseHandler` behind every read, also usable directly via `StringClient::parse`.
//! - Request bodies carry exact `content-length` and `content-md5` headers computed from the bytes sent.

mod body;
mod client;
pub mod digest;
pub mod form;
mod parser;

pub use body::{EncodedBody, OutboundBody};
pub use client::{Completion, StringClient};
pub use parser::{CompletionCallback, StringResponseParser};
