/*
 * body.rs
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

//! Outbound request bodies and their framing headers.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use crate::error::ClientError;
use crate::string_client::{digest, form};

/// Body for a write: raw text or key/value pairs sent form-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundBody {
    Text(String),
    Form(Vec<(String, String)>),
}

/// Serialized body plus the header values computed from the exact bytes sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    pub text: String,
    pub content_length: usize,
    pub content_md5: String,
}

impl OutboundBody {
    pub fn text(s: impl Into<String>) -> Self {
        OutboundBody::Text(s.into())
    }

    pub fn form<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        OutboundBody::Form(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Accept a dynamically typed body: `null` means no body, a string is sent as-is and a flat
    /// object is form-encoded. Arrays of scalars repeat the key. Anything else is rejected.
    pub fn from_value(value: Value) -> Result<Option<Self>, ClientError> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(OutboundBody::Text(s))),
            Value::Object(map) => {
                let mut pairs = Vec::with_capacity(map.len());
                for (key, value) in map {
                    match value {
                        Value::Array(items) => {
                            for item in items {
                                let text = scalar_text(&key, item)?;
                                pairs.push((key.clone(), text));
                            }
                        }
                        other => {
                            let text = scalar_text(&key, other)?;
                            pairs.push((key, text));
                        }
                    }
                }
                Ok(Some(OutboundBody::Form(pairs)))
            }
            other => Err(ClientError::invalid(format!(
                "body must be a string or an object, got {}",
                value_kind(&other)
            ))),
        }
    }

    /// The exact text that goes on the wire.
    pub fn serialize(&self) -> Cow<'_, str> {
        match self {
            OutboundBody::Text(s) => Cow::Borrowed(s),
            OutboundBody::Form(pairs) => Cow::Owned(form::encode(
                pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            )),
        }
    }

    /// Serialize and compute `content-length` (bytes, not characters) and `content-md5`.
    pub fn encode(&self) -> EncodedBody {
        let text = self.serialize().into_owned();
        EncodedBody {
            content_length: text.len(),
            content_md5: digest::content_md5(text.as_bytes()),
            text,
        }
    }
}

fn scalar_text(key: &str, value: Value) -> Result<String, ClientError> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(ClientError::invalid(format!(
            "form field {} must be a scalar, got {}",
            key,
            value_kind(&other)
        ))),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl From<String> for OutboundBody {
    fn from(s: String) -> Self {
        OutboundBody::Text(s)
    }
}

impl From<&str> for OutboundBody {
    fn from(s: &str) -> Self {
        OutboundBody::Text(s.to_string())
    }
}

impl From<Vec<(String, String)>> for OutboundBody {
    fn from(pairs: Vec<(String, String)>) -> Self {
        OutboundBody::Form(pairs)
    }
}

impl From<BTreeMap<String, String>> for OutboundBody {
    fn from(map: BTreeMap<String, String>) -> Self {
        OutboundBody::Form(map.into_iter().collect())
    }
}

impl From<HashMap<String, String>> for OutboundBody {
    fn from(map: HashMap<String, String>) -> Self {
        OutboundBody::Form(map.into_iter().collect())
    }
}
