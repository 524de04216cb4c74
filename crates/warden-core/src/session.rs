// Copyright 2024 Warden Authors
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Session credential detection.
//!
//! Only the presence of a recognized cookie is checked. The cookie value is
//! never inspected, so an empty or forged token still counts as present.

use serde::{Deserialize, Serialize};

/// Cookie set by the session provider over plain HTTP.
pub const SESSION_COOKIE: &str = "next-auth.session-token";
/// Cookie set by the session provider over HTTPS.
pub const SECURE_SESSION_COOKIE: &str = "__Secure-next-auth.session-token";

/// The set of cookie names that identify a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionCookies {
    /// Recognized cookie names, compared case-sensitively.
    pub cookie_names: Vec<String>,
}

impl Default for SessionCookies {
    fn default() -> Self {
        Self {
            cookie_names: vec![SESSION_COOKIE.to_string(), SECURE_SESSION_COOKIE.to_string()],
        }
    }
}

impl SessionCookies {
    /// Creates a detector for the given cookie names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cookie_names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if `name` is a recognized session cookie.
    pub fn is_session_cookie(&self, name: &str) -> bool {
        self.cookie_names.iter().any(|n| n == name)
    }

    /// Returns true if any of the `Cookie` header values carries a
    /// recognized session cookie.
    pub fn has_session_credential<'a, I>(&self, cookie_headers: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        cookie_headers
            .into_iter()
            .flat_map(cookie_names)
            .any(|name| self.is_session_cookie(name))
    }
}

/// Yields the names of every `name=value` pair in a `Cookie` header value.
/// Pairs without `=` are skipped.
pub fn cookie_names(header: &str) -> impl Iterator<Item = &str> {
    header
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .map(|(name, _)| name.trim())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_either_default_cookie() {
        let cookies = SessionCookies::default();
        assert!(cookies.has_session_credential(["next-auth.session-token=abc"]));
        assert!(
            cookies.has_session_credential(["theme=dark; __Secure-next-auth.session-token=xyz"])
        );
        assert!(!cookies.has_session_credential(["theme=dark; next-auth.csrf-token=1"]));
        assert!(!cookies.has_session_credential(std::iter::empty()));
    }

    #[test]
    fn test_presence_not_value() {
        let cookies = SessionCookies::default();
        assert!(cookies.has_session_credential(["next-auth.session-token="]));
    }

    #[test]
    fn test_names_are_exact() {
        let cookies = SessionCookies::default();
        assert!(!cookies.has_session_credential(["Next-Auth.Session-Token=abc"]));
        assert!(!cookies.has_session_credential(["next-auth.session-token-x=abc"]));
        // A bare name without '=' is not a cookie pair.
        assert!(!cookies.has_session_credential(["next-auth.session-token"]));
    }

    #[test]
    fn test_multiple_headers_and_whitespace() {
        let cookies = SessionCookies::default();
        assert!(cookies.has_session_credential(["a=1", "  next-auth.session-token = t ;b=2"]));
    }

    #[test]
    fn test_cookie_names_parsing() {
        let names: Vec<&str> = cookie_names("a=1; b=x=y;;c; =empty").collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_custom_names() {
        let cookies = SessionCookies::new(["sid"]);
        assert!(cookies.has_session_credential(["sid=42"]));
        assert!(!cookies.has_session_credential(["next-auth.session-token=abc"]));
    }
}
