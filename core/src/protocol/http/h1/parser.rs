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

//! HTTP/1.1 response push parser: status line, headers, body (Content-Length, chunked or until close).

use bytes::Buf;
use bytes::BytesMut;
use std::io;

/// Callback for HTTP/1.1 response events. Connection implements this and forwards to ResponseHandler.
pub trait H1ResponseHandler {
    fn status(&mut self, code: u16, reason: Option<&str>);
    fn header(&mut self, name: &str, value: &str);
    fn start_body(&mut self);
    fn body_chunk(&mut self, data: &[u8]);
    fn end_body(&mut self);
    fn trailer(&mut self, name: &str, value: &str);
    fn complete(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    Idle,
    StatusLine,
    Headers,
    /// Headers done; connection must call set_body_mode().
    HeadersComplete,
    Body,
    ChunkSize,
    ChunkData,
    ChunkTrailer,
}

/// How the body of the current response is delimited. Chosen by the connection once headers are in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    /// No body (HEAD, 204, 304).
    None,
    Length(u64),
    Chunked,
    /// No framing headers: the body runs until the server closes the connection.
    UntilClose,
}

/// Push parser for HTTP/1.1 response. Feed bytes via `receive`; handler is invoked as complete tokens are parsed.
pub struct ResponseParser {
    state: ParseState,
    /// Content-Length when known (-1 for chunked or read-until-close).
    content_length: i64,
    bytes_received: i64,
    /// Current chunk size (for chunked encoding).
    chunk_remaining: i64,
}

impl ResponseParser {
    pub fn new() -> Self {
        Self {
            state: ParseState::StatusLine,
            content_length: -1,
            bytes_received: 0,
            chunk_remaining: 0,
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = ParseState::StatusLine;
        self.content_length = -1;
        self.bytes_received = 0;
        self.chunk_remaining = 0;
    }

    /// Find CRLF in the readable part of buf; return number of bytes to the start of CRLF, or None if not found.
    fn find_crlf(buf: &[u8]) -> Option<usize> {
        buf.windows(2).position(|w| w == b"\r\n")
    }

    fn invalid(msg: &str) -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, msg.to_string())
    }

    /// Consume and parse as much as possible from buf. Handler is called for each complete token.
    /// Partial data remains in buf for the next call.
    pub fn receive<H: H1ResponseHandler>(
        &mut self,
        buf: &mut BytesMut,
        handler: &mut H,
    ) -> Result<(), io::Error> {
        while !buf.is_empty() {
            match self.state {
                ParseState::StatusLine => {
                    let line_end = match Self::find_crlf(buf) {
                        Some(n) => n,
                        None => return Ok(()),
                    };
                    let line = buf.split_to(line_end + 2); // include CRLF
                    let line_str = std::str::from_utf8(&line[..line_end])
                        .map_err(|_| Self::invalid("invalid status line UTF-8"))?;
                    // HTTP/1.1 200 OK or HTTP/1.1 200
                    let mut parts = line_str.splitn(3, ' ');
                    let version = parts.next().unwrap_or("");
                    if !version.starts_with("HTTP/") {
                        return Err(Self::invalid("invalid status line"));
                    }
                    let code = parts
                        .next()
                        .and_then(|s| s.parse::<u16>().ok())
                        .filter(|c| (100..1000).contains(c))
                        .ok_or_else(|| Self::invalid("invalid status code"))?;
                    let reason = parts.next().map(str::trim).filter(|r| !r.is_empty());
                    handler.status(code, reason);
                    self.state = ParseState::Headers;
                }
                ParseState::Headers => {
                    let line_end = match Self::find_crlf(buf) {
                        Some(n) => n,
                        None => return Ok(()),
                    };
                    if line_end == 0 {
                        buf.advance(2);
                        self.state = ParseState::HeadersComplete;
                        return Ok(()); // Connection will set_body_mode and call receive again
                    }
                    let line = buf.split_to(line_end + 2);
                    let line_str = std::str::from_utf8(&line[..line_end])
                        .map_err(|_| Self::invalid("invalid header UTF-8"))?;
                    if let Some(colon) = line_str.find(':') {
                        let name = line_str[..colon].trim();
                        let value = line_str[colon + 1..].trim();
                        handler.header(name, value);
                    }
                }
                ParseState::Body => {
                    if self.content_length >= 0 {
                        let remaining = (self.content_length - self.bytes_received) as usize;
                        let to_read = remaining.min(buf.len());
                        if to_read > 0 {
                            let chunk = buf.split_to(to_read);
                            handler.body_chunk(&chunk);
                            self.bytes_received += to_read as i64;
                        }
                        if self.bytes_received >= self.content_length {
                            handler.end_body();
                            handler.complete();
                            self.state = ParseState::Idle;
                        }
                    } else {
                        // Read until close: deliver all available
                        let chunk = buf.split_to(buf.len());
                        handler.body_chunk(&chunk);
                        // Connection close ends the body (finish_on_close)
                        return Ok(());
                    }
                }
                ParseState::ChunkSize => {
                    let line_end = match Self::find_crlf(buf) {
                        Some(n) => n,
                        None => return Ok(()),
                    };
                    let line = buf.split_to(line_end + 2);
                    let line_str = std::str::from_utf8(&line[..line_end])
                        .map_err(|_| Self::invalid("invalid chunk size"))?;
                    let hex_part = line_str.split(';').next().unwrap_or(line_str).trim();
                    self.chunk_remaining = i64::from_str_radix(hex_part, 16)
                        .ok()
                        .filter(|n| *n >= 0)
                        .ok_or_else(|| Self::invalid("invalid chunk size"))?;
                    if self.chunk_remaining == 0 {
                        self.state = ParseState::ChunkTrailer;
                    } else {
                        self.state = ParseState::ChunkData;
                    }
                }
                ParseState::ChunkData => {
                    let to_read = (self.chunk_remaining as usize).min(buf.len());
                    if to_read > 0 {
                        let chunk = buf.split_to(to_read);
                        handler.body_chunk(&chunk);
                        self.chunk_remaining -= to_read as i64;
                    }
                    if self.chunk_remaining == 0 {
                        // Need to consume trailing CRLF
                        if buf.len() >= 2 {
                            if &buf[..2] != b"\r\n" {
                                return Err(Self::invalid("missing CRLF after chunk data"));
                            }
                            buf.advance(2);
                            self.state = ParseState::ChunkSize;
                        } else {
                            return Ok(());
                        }
                    } else {
                        return Ok(());
                    }
                }
                ParseState::HeadersComplete => {
                    // Waiting for connection to call set_body_mode()
                    return Ok(());
                }
                ParseState::ChunkTrailer => {
                    let line_end = match Self::find_crlf(buf) {
                        Some(n) => n,
                        None => return Ok(()),
                    };
                    if line_end == 0 {
                        buf.advance(2);
                        handler.end_body();
                        handler.complete();
                        self.state = ParseState::Idle;
                    } else {
                        let line = buf.split_to(line_end + 2);
                        let line_str = std::str::from_utf8(&line[..line_end])
                            .map_err(|_| Self::invalid("invalid trailer"))?;
                        if let Some(colon) = line_str.find(':') {
                            let name = line_str[..colon].trim();
                            let value = line_str[colon + 1..].trim();
                            handler.trailer(name, value);
                        }
                    }
                }
                ParseState::Idle => return Ok(()),
            }
        }
        Ok(())
    }

    /// Called by the connection after headers are received (state HeadersComplete).
    /// Bodiless responses complete immediately; otherwise `start_body` fires and parsing continues.
    /// A length too large to track is rejected before any body event.
    pub fn set_body_mode<H: H1ResponseHandler>(
        &mut self,
        mode: BodyMode,
        handler: &mut H,
    ) -> Result<(), io::Error> {
        if self.state != ParseState::HeadersComplete {
            return Ok(());
        }
        match mode {
            BodyMode::None | BodyMode::Length(0) => {
                handler.complete();
                self.state = ParseState::Idle;
            }
            BodyMode::Length(cl) => {
                let cl = i64::try_from(cl).map_err(|_| Self::invalid("Content-Length out of range"))?;
                handler.start_body();
                self.content_length = cl;
                self.bytes_received = 0;
                self.state = ParseState::Body;
            }
            BodyMode::Chunked => {
                handler.start_body();
                self.content_length = -1;
                self.state = ParseState::ChunkSize;
            }
            BodyMode::UntilClose => {
                handler.start_body();
                self.content_length = -1;
                self.state = ParseState::Body;
            }
        }
        Ok(())
    }

    /// Called by the connection when the peer closed the stream. Ends a read-until-close body
    /// and returns true; returns false if the close truncated the response.
    pub fn finish_on_close<H: H1ResponseHandler>(&mut self, handler: &mut H) -> bool {
        if self.state == ParseState::Body && self.content_length < 0 {
            handler.end_body();
            handler.complete();
            self.state = ParseState::Idle;
            true
        } else {
            self.state == ParseState::Idle
        }
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}
