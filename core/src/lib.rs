/*
 * lib.rs
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

//! Textwire core: a text-oriented HTTP client.
//!
//! `string_client::StringClient` sends string or form-encoded bodies and returns string bodies,
//! checking `content-md5` on both sides. The HTTP/1.1 transport lives in `protocol::http`.

pub mod config;
pub mod error;
pub mod net;
pub mod protocol;
pub mod string_client;

pub use config::ClientOptions;
pub use error::{ClientError, TransportError, TransportErrorKind};
pub use string_client::{Completion, OutboundBody, StringClient};
