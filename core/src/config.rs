/*
 * config.rs
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

//! Client options: name used in diagnostics and the default headers put on every request.
//! Loadable from JSON; every field is optional there.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::protocol::http::Headers;

pub const DEFAULT_NAME: &str = "StringClient";
pub const DEFAULT_ACCEPT: &str = "text/plain";
pub const DEFAULT_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// Client name, recorded on the logging span.
    pub name: String,
    pub accept: String,
    /// Content type for requests that carry a body.
    pub content_type: String,
    pub user_agent: Option<String>,
    /// Extra headers for every request.
    pub headers: BTreeMap<String, String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            user_agent: None,
            headers: BTreeMap::new(),
        }
    }
}

impl ClientOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = accept.into();
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Fill in default headers the caller did not set. `content-type` only goes on requests with a body.
    pub(crate) fn apply_defaults(&self, headers: &mut Headers, has_body: bool) {
        headers.set_default("accept", self.accept.as_str());
        if has_body {
            headers.set_default("content-type", self.content_type.as_str());
        }
        if let Some(ua) = &self.user_agent {
            headers.set_default("user-agent", ua.as_str());
        }
        for (name, value) in &self.headers {
            headers.set_default(name.as_str(), value.as_str());
        }
    }
}
