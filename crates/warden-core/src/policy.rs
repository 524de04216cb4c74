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

//! Access policy configuration and evaluation.
//!
//! The policy is an ordered list of prefix rules over the request path; the
//! first rule that matches decides. Evaluation is pure: it performs no I/O,
//! holds no mutable state, and cannot fail.

use crate::types::{Decision, Evaluation, MatchedRule, RequestDescriptor};
use serde::{Deserialize, Serialize};

/// Route prefixes and methods the access policy is built from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AccessPolicyConfig {
    /// Paths under this prefix always require a session.
    pub protected_prefix: String,
    /// Paths under any of these prefixes are always allowed.
    ///
    /// Entries are compared verbatim against the request path, so an entry
    /// without a leading `/` never matches a real path.
    pub public_prefixes: Vec<String>,
    /// Paths under this prefix require a session for non-safe methods.
    pub api_prefix: String,
    /// Methods allowed on API paths without a session.
    pub safe_methods: Vec<String>,
}

impl Default for AccessPolicyConfig {
    fn default() -> Self {
        Self {
            protected_prefix: "/dashboard".to_string(),
            public_prefixes: vec!["/api/auth/".to_string(), "api/public/".to_string()],
            api_prefix: "/api".to_string(),
            safe_methods: vec!["GET".to_string()],
        }
    }
}

/// Trait for components that turn a request into an access decision.
///
/// Enforcement points (HTTP middleware, tests, dry-run tools) depend on this
/// trait rather than on a concrete evaluator.
pub trait PolicyEvaluator: Send + Sync {
    /// Returns the decision and the rule that produced it.
    fn explain(&self, request: &RequestDescriptor) -> Evaluation;

    /// Returns only the decision.
    fn evaluate(&self, request: &RequestDescriptor) -> Decision {
        self.explain(request).decision
    }
}

/// The default [`PolicyEvaluator`], driven by an [`AccessPolicyConfig`].
#[derive(Debug, Clone, Default)]
pub struct AccessPolicyEvaluator {
    config: AccessPolicyConfig,
}

impl AccessPolicyEvaluator {
    /// Creates an evaluator over the given configuration.
    pub fn new(config: AccessPolicyConfig) -> Self {
        Self { config }
    }

    fn is_public(&self, path: &str) -> bool {
        self.config
            .public_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    fn is_safe_method(&self, method: &str) -> bool {
        self.config.safe_methods.iter().any(|m| m == method)
    }
}

impl PolicyEvaluator for AccessPolicyEvaluator {
    fn explain(&self, request: &RequestDescriptor) -> Evaluation {
        let path = request.path.as_str();
        let authenticated = Decision::from(request.has_session_credential);

        let (decision, rule) = if path.starts_with(self.config.protected_prefix.as_str()) {
            (authenticated, MatchedRule::ProtectedRoute)
        } else if self.is_public(path) {
            (Decision::Allow, MatchedRule::PublicRoute)
        } else if path.starts_with(self.config.api_prefix.as_str()) {
            if self.is_safe_method(&request.method) {
                (Decision::Allow, MatchedRule::ApiSafeMethod)
            } else {
                (authenticated, MatchedRule::ApiMutation)
            }
        } else {
            (Decision::Allow, MatchedRule::DefaultOpen)
        };

        Evaluation { decision, rule }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluator() -> AccessPolicyEvaluator {
        AccessPolicyEvaluator::new(AccessPolicyConfig::default())
    }

    fn req(path: &str, method: &str, session: bool) -> RequestDescriptor {
        RequestDescriptor::new(path, method, session)
    }

    #[test]
    fn test_concrete_cases() {
        let eval = evaluator();
        assert_eq!(eval.evaluate(&req("/dashboard/settings", "GET", false)), Decision::Deny);
        assert_eq!(eval.evaluate(&req("/dashboard/settings", "GET", true)), Decision::Allow);
        assert_eq!(eval.evaluate(&req("/api/post/5", "DELETE", false)), Decision::Deny);
        assert_eq!(eval.evaluate(&req("/api/post/5", "GET", false)), Decision::Allow);
        assert_eq!(eval.evaluate(&req("/about", "GET", false)), Decision::Allow);
    }

    #[test]
    fn test_rule_attribution() {
        let eval = evaluator();
        let rule = |path, method, session| eval.explain(&req(path, method, session)).rule;
        assert_eq!(rule("/dashboard", "POST", true), MatchedRule::ProtectedRoute);
        assert_eq!(rule("/api/auth/signin", "POST", false), MatchedRule::PublicRoute);
        assert_eq!(rule("/api/image/1", "GET", false), MatchedRule::ApiSafeMethod);
        assert_eq!(rule("/api/image/1", "PUT", true), MatchedRule::ApiMutation);
        assert_eq!(rule("/", "GET", false), MatchedRule::DefaultOpen);
    }

    #[test]
    fn test_public_auth_routes_ignore_method_and_session() {
        let eval = evaluator();
        for method in ["GET", "POST", "DELETE"] {
            assert_eq!(eval.evaluate(&req("/api/auth/callback", method, false)), Decision::Allow);
        }
    }

    #[test]
    fn test_public_prefix_without_leading_slash_never_matches() {
        let eval = evaluator();
        let evaluation = eval.explain(&req("/api/public/feed", "POST", false));
        assert_eq!(evaluation.rule, MatchedRule::ApiMutation);
        assert_eq!(evaluation.decision, Decision::Deny);

        // Only a path that is not slash-led can hit it.
        let evaluation = eval.explain(&req("api/public/feed", "POST", false));
        assert_eq!(evaluation.rule, MatchedRule::PublicRoute);
    }

    #[test]
    fn test_prefixes_are_plain_string_prefixes() {
        let eval = evaluator();
        assert_eq!(eval.evaluate(&req("/dashboards", "GET", false)), Decision::Deny);
        assert_eq!(eval.explain(&req("/apiary", "PATCH", false)).rule, MatchedRule::ApiMutation);
        // "/api/auth" without the trailing slash is not public.
        assert_eq!(eval.evaluate(&req("/api/auth", "POST", false)), Decision::Deny);
    }

    #[test]
    fn test_method_comparison_is_exact() {
        let eval = evaluator();
        assert_eq!(eval.evaluate(&req("/api/post/5", "get", false)), Decision::Deny);
        assert_eq!(eval.evaluate(&req("/api/post/5", "HEAD", false)), Decision::Deny);
    }

    #[test]
    fn test_empty_path_is_default_open() {
        let eval = evaluator();
        assert_eq!(eval.explain(&req("", "DELETE", false)).rule, MatchedRule::DefaultOpen);
    }

    #[test]
    fn test_custom_config_is_honoured() {
        let eval = AccessPolicyEvaluator::new(AccessPolicyConfig {
            protected_prefix: "/admin".to_string(),
            public_prefixes: vec!["/api/health".to_string()],
            api_prefix: "/api".to_string(),
            safe_methods: vec!["GET".to_string(), "HEAD".to_string()],
        });
        assert_eq!(eval.evaluate(&req("/admin/users", "GET", false)), Decision::Deny);
        assert_eq!(eval.evaluate(&req("/dashboard", "GET", false)), Decision::Allow);
        assert_eq!(eval.evaluate(&req("/api/health", "POST", false)), Decision::Allow);
        assert_eq!(eval.evaluate(&req("/api/post/1", "HEAD", false)), Decision::Allow);
    }

    #[test]
    fn test_config_partial_deserialization_uses_defaults() {
        let config: AccessPolicyConfig =
            serde_json::from_str(r#"{ "protected_prefix": "/admin" }"#).unwrap();
        assert_eq!(config.protected_prefix, "/admin");
        assert_eq!(config.public_prefixes, AccessPolicyConfig::default().public_prefixes);
        assert_eq!(config.safe_methods, vec!["GET".to_string()]);
    }
}
