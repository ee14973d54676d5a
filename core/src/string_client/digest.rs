/*
 * digest.rs
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

//! Content-MD5 values: base64 of the MD5 of the body bytes.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use md5::{Digest, Md5};

/// `content-md5` header value for a complete body.
pub fn content_md5(data: &[u8]) -> String {
    BASE64.encode(Md5::digest(data))
}

/// MD5 fed chunk by chunk as a response body streams in.
#[derive(Clone, Default)]
pub struct RunningDigest {
    hasher: Md5,
}

impl RunningDigest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
    }

    /// Base64 digest of everything fed so far.
    pub fn finish(self) -> String {
        BASE64.encode(self.hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_values() {
        assert_eq!(content_md5(b"hello"), "XUFAKrxLKna5cZ2REBfFkg==");
        assert_eq!(content_md5(b""), "1B2M2Y8AsgTpgAmY7PhCfg==");
    }

    #[test]
    fn running_digest_covers_concatenation() {
        let mut d = RunningDigest::new();
        d.update(b"he");
        d.update(b"llo");
        assert_eq!(d.finish(), content_md5(b"hello"));
        assert_ne!(content_md5(b"he"), content_md5(b"hello"));
    }
}
