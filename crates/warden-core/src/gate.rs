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

//! Request gate: matchers, session detection and the access policy combined.

use crate::config::WardenConfig;
use crate::errors::Result;
use crate::matcher::{MatcherSet, RoutePattern};
use crate::policy::{AccessPolicyEvaluator, PolicyEvaluator};
use crate::session::SessionCookies;
use crate::types::{Decision, Evaluation, RequestDescriptor};
use std::borrow::Cow;
use std::sync::Arc;

/// Result of running a request through the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome<'g> {
    /// No matcher accepted the path; the policy was not consulted.
    Bypassed,
    /// The policy was consulted.
    Evaluated {
        /// The policy's decision and the rule behind it.
        evaluation: Evaluation,
        /// The first matcher that accepted the path.
        matcher: &'g RoutePattern,
    },
}

impl GateOutcome<'_> {
    /// The effective decision. Bypassed requests are always allowed.
    pub fn decision(&self) -> Decision {
        match self {
            GateOutcome::Bypassed => Decision::Allow,
            GateOutcome::Evaluated { evaluation, .. } => evaluation.decision,
        }
    }
}

/// Collapses every run of `/` into a single slash.
///
/// `/dashboard//settings` and `//dashboard/settings` address the same
/// resource as `/dashboard/settings` and must be gated the same way.
pub fn collapse_slashes(path: &str) -> Cow<'_, str> {
    if !path.contains("//") {
        return Cow::Borrowed(path);
    }
    let mut collapsed = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && collapsed.ends_with('/') {
            continue;
        }
        collapsed.push(c);
    }
    Cow::Owned(collapsed)
}

/// Decides, from raw request parts, whether a request may continue.
#[derive(Clone)]
pub struct AccessGate {
    matchers: MatcherSet,
    sessions: SessionCookies,
    evaluator: Arc<dyn PolicyEvaluator>,
}

impl AccessGate {
    /// Creates a gate around an arbitrary evaluator.
    pub fn new(
        matchers: MatcherSet,
        sessions: SessionCookies,
        evaluator: Arc<dyn PolicyEvaluator>,
    ) -> Self {
        Self {
            matchers,
            sessions,
            evaluator,
        }
    }

    /// Validates the configuration and builds the gate it describes.
    pub fn from_config(config: &WardenConfig) -> Result<Self> {
        config.validate()?;
        let matchers = MatcherSet::new(&config.matcher)?;
        let evaluator = AccessPolicyEvaluator::new(config.policy.clone());
        Ok(Self::new(matchers, config.session.clone(), Arc::new(evaluator)))
    }

    /// Checks a request. `cookie_headers` are the raw `Cookie` header values.
    ///
    /// Repeated slashes in `path` are collapsed before matching and
    /// evaluation.
    pub fn check<'a, I>(&self, path: &str, method: &str, cookie_headers: I) -> GateOutcome<'_>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let path = collapse_slashes(path);
        let Some(matcher) = self.matchers.first_match(&path) else {
            return GateOutcome::Bypassed;
        };
        let request = RequestDescriptor::new(
            path.as_ref(),
            method,
            self.sessions.has_session_credential(cookie_headers),
        );
        GateOutcome::Evaluated {
            evaluation: self.evaluator.explain(&request),
            matcher,
        }
    }

    /// The matchers deciding which paths are gated.
    pub fn matchers(&self) -> &MatcherSet {
        &self.matchers
    }
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate")
            .field("matchers", &self.matchers)
            .field("sessions", &self.sessions)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MatchedRule;

    fn gate() -> AccessGate {
        AccessGate::from_config(&WardenConfig::default()).unwrap()
    }

    #[test]
    fn test_unmatched_paths_bypass_the_policy() {
        let gate = gate();
        assert_eq!(gate.check("/about", "GET", []), GateOutcome::Bypassed);
        // The policy would deny this, but no matcher covers it.
        let outcome = gate.check("/api/comment/1", "DELETE", []);
        assert_eq!(outcome, GateOutcome::Bypassed);
        assert_eq!(outcome.decision(), Decision::Allow);
    }

    #[test]
    fn test_matched_paths_are_evaluated() {
        let gate = gate();
        let outcome = gate.check("/dashboard/settings", "GET", []);
        assert_eq!(outcome.decision(), Decision::Deny);
        match outcome {
            GateOutcome::Evaluated { evaluation, matcher } => {
                assert_eq!(evaluation.rule, MatchedRule::ProtectedRoute);
                assert_eq!(matcher.as_str(), "/dashboard/:path*");
            }
            GateOutcome::Bypassed => panic!("dashboard must be gated"),
        }

        let outcome = gate.check(
            "/dashboard/settings",
            "GET",
            ["next-auth.session-token=abc"],
        );
        assert_eq!(outcome.decision(), Decision::Allow);
    }

    #[test]
    fn test_repeated_slashes_do_not_bypass_the_gate() {
        let gate = gate();
        for path in ["/dashboard//settings", "//dashboard/settings", "/dashboard///"] {
            let outcome = gate.check(path, "GET", []);
            assert_ne!(outcome, GateOutcome::Bypassed, "{path} must be gated");
            assert_eq!(outcome.decision(), Decision::Deny, "{path}");
        }
        assert_eq!(gate.check("/api/post//5", "DELETE", []).decision(), Decision::Deny);
        assert_eq!(
            gate.check("/api/post//5", "DELETE", ["next-auth.session-token=abc"])
                .decision(),
            Decision::Allow
        );
    }

    #[test]
    fn test_collapse_slashes() {
        assert!(matches!(collapse_slashes("/api/post/5"), Cow::Borrowed(_)));
        assert_eq!(collapse_slashes("//a///b/"), "/a/b/");
        assert_eq!(collapse_slashes("/"), "/");
        assert_eq!(collapse_slashes(""), "");
    }

    #[test]
    fn test_api_mutation_requires_session() {
        let gate = gate();
        assert_eq!(gate.check("/api/post/5", "DELETE", []).decision(), Decision::Deny);
        assert_eq!(gate.check("/api/post/5", "GET", []).decision(), Decision::Allow);
        assert_eq!(
            gate.check("/api/image/1", "POST", ["__Secure-next-auth.session-token=x"])
                .decision(),
            Decision::Allow
        );
    }

    struct DenyAll;

    impl PolicyEvaluator for DenyAll {
        fn explain(&self, _request: &RequestDescriptor) -> Evaluation {
            Evaluation {
                decision: Decision::Deny,
                rule: MatchedRule::ProtectedRoute,
            }
        }
    }

    #[test]
    fn test_custom_evaluator() {
        let gate = AccessGate::new(
            MatcherSet::new(["/:path*"]).unwrap(),
            SessionCookies::default(),
            Arc::new(DenyAll),
        );
        assert_eq!(gate.check("/about", "GET", []).decision(), Decision::Deny);
    }
}
