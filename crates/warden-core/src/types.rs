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

//! Common type definitions used throughout Warden.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything the access policy looks at for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// URL path of the request, normally starting with `/`.
    pub path: String,
    /// HTTP verb, uppercase (e.g. "GET", "DELETE").
    pub method: String,
    /// True if any recognized session cookie is present.
    /// Only presence is tracked, never validity.
    pub has_session_credential: bool,
}

impl RequestDescriptor {
    /// Creates a new RequestDescriptor.
    pub fn new(
        path: impl Into<String>,
        method: impl Into<String>,
        has_session_credential: bool,
    ) -> Self {
        Self {
            path: path.into(),
            method: method.into(),
            has_session_credential,
        }
    }
}

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    /// The request may continue.
    Allow,
    /// The request must be rejected by the host.
    Deny,
}

impl Decision {
    /// Returns true for [`Decision::Allow`].
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }
}

impl From<bool> for Decision {
    fn from(allowed: bool) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Decision::Allow => write!(f, "allow"),
            Decision::Deny => write!(f, "deny"),
        }
    }
}

/// The policy rule that produced a [`Decision`], in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchedRule {
    /// Path is under the protected prefix; a session is required.
    ProtectedRoute,
    /// Path is under one of the public prefixes.
    PublicRoute,
    /// API path requested with a safe method.
    ApiSafeMethod,
    /// API path requested with any other method; a session is required.
    ApiMutation,
    /// Nothing else matched.
    DefaultOpen,
}

impl fmt::Display for MatchedRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            MatchedRule::ProtectedRoute => "protected_route",
            MatchedRule::PublicRoute => "public_route",
            MatchedRule::ApiSafeMethod => "api_safe_method",
            MatchedRule::ApiMutation => "api_mutation",
            MatchedRule::DefaultOpen => "default_open",
        };
        f.write_str(name)
    }
}

/// A decision together with the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// The access decision.
    pub decision: Decision,
    /// Which rule decided.
    pub rule: MatchedRule,
}
