/*
 * error.rs
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

//! Client and transport errors.

use std::io;

use thiserror::Error;

/// What went wrong underneath the string client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The server answered with a non-2xx status.
    Status(u16),
    /// Connection or protocol failure reported by the transport.
    Io(io::ErrorKind),
    /// The connection can no longer carry requests.
    Closed,
    /// Body bytes were written to a request handle after `end()`.
    WriteAfterEnd,
    /// The transport returned without finishing the response.
    Incomplete,
}

/// Opaque failure from the transport primitive.
///
/// The message starts out as whatever the transport reported (reason phrase, I/O error text).
/// When the response body was assembled the string client replaces it with the body text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Error for a non-2xx status. Falls back to `HTTP <code>` when there is no reason phrase.
    pub fn status(code: u16, reason: Option<&str>) -> Self {
        let message = match reason {
            Some(r) if !r.is_empty() => r.to_string(),
            _ => format!("HTTP {}", code),
        };
        Self::new(TransportErrorKind::Status(code), message)
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    /// Status code when this error came from a non-2xx response.
    pub fn status_code(&self) -> Option<u16> {
        match self.kind {
            TransportErrorKind::Status(code) => Some(code),
            _ => None,
        }
    }
}

impl From<&io::Error> for TransportError {
    fn from(e: &io::Error) -> Self {
        Self::new(TransportErrorKind::Io(e.kind()), e.to_string())
    }
}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> Self {
        Self::from(&e)
    }
}

/// Errors surfaced to string client callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Malformed caller input, rejected before any I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Computed MD5 of the received body does not match the declared `content-md5`.
    #[error("BadDigest: content-md5 {expected} does not match computed {actual}")]
    BadDigest { expected: String, actual: String },
}

impl ClientError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn is_bad_digest(&self) -> bool {
        matches!(self, ClientError::BadDigest { .. })
    }

    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            ClientError::Transport(e) => Some(e),
            _ => None,
        }
    }
}
