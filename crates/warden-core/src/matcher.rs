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

//! Route matcher patterns.
//!
//! A matcher decides whether a request path is gated at all. Paths that no
//! matcher accepts bypass the access policy and are always allowed.
//!
//! Pattern syntax is a `/`-separated list of segments. A segment is either a
//! literal or a named parameter with an optional modifier:
//!
//! | segment  | matches                         |
//! |----------|---------------------------------|
//! | `:name`  | exactly one non-empty segment   |
//! | `:name?` | zero or one segment             |
//! | `:name+` | one or more segments            |
//! | `:name*` | zero or more segments           |
//!
//! A single trailing slash on the request path is ignored.

use crate::errors::{Result, WardenError};
use regex::{Regex, RegexSet};
use std::fmt;

const SEGMENT: &str = "/[^/]+";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(Modifier),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Modifier {
    One,
    Optional,
    OneOrMore,
    ZeroOrMore,
}

impl Segment {
    fn parse(pattern: &str, raw: &str) -> Result<Self> {
        let Some(param) = raw.strip_prefix(':') else {
            if raw.contains(':') {
                return Err(WardenError::invalid_pattern(
                    pattern,
                    format!("parameter must span a whole segment, found '{}'", raw),
                ));
            }
            return Ok(Segment::Literal(raw.to_string()));
        };

        let (name, modifier) = match param.chars().last() {
            Some('?') => (&param[..param.len() - 1], Modifier::Optional),
            Some('+') => (&param[..param.len() - 1], Modifier::OneOrMore),
            Some('*') => (&param[..param.len() - 1], Modifier::ZeroOrMore),
            _ => (param, Modifier::One),
        };

        if name.is_empty() {
            return Err(WardenError::invalid_pattern(pattern, "empty parameter name"));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(WardenError::invalid_pattern(
                pattern,
                format!("invalid parameter name '{}'", name),
            ));
        }

        Ok(Segment::Param(modifier))
    }

    fn to_regex(&self) -> String {
        match self {
            Segment::Literal(lit) => format!("/{}", regex::escape(lit)),
            Segment::Param(modifier) => match modifier {
                Modifier::One => SEGMENT.to_string(),
                Modifier::Optional => format!("(?:{})?", SEGMENT),
                Modifier::OneOrMore => format!("(?:{})+", SEGMENT),
                Modifier::ZeroOrMore => format!("(?:{})*", SEGMENT),
            },
        }
    }
}

/// A single compiled route matcher such as `/dashboard/:path*`.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    source: String,
    regex: Regex,
}

impl RoutePattern {
    /// Parses and compiles a pattern.
    pub fn parse(pattern: &str) -> Result<Self> {
        let Some(body) = pattern.strip_prefix('/') else {
            return Err(WardenError::invalid_pattern(pattern, "must start with '/'"));
        };
        let body = body.strip_suffix('/').unwrap_or(body);

        let segments = if body.is_empty() {
            Vec::new()
        } else {
            body.split('/')
                .map(|raw| {
                    if raw.is_empty() {
                        Err(WardenError::invalid_pattern(pattern, "empty path segment"))
                    } else {
                        Segment::parse(pattern, raw)
                    }
                })
                .collect::<Result<Vec<_>>>()?
        };

        let expr = Self::expression(&segments);
        let regex = Regex::new(&expr)
            .map_err(|e| WardenError::invalid_pattern(pattern, e.to_string()))?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    fn expression(segments: &[Segment]) -> String {
        let body: String = segments.iter().map(Segment::to_regex).collect();
        format!("^{}/?$", body)
    }

    /// Returns true if the whole path matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// The pattern as originally written.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl PartialEq for RoutePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for RoutePattern {}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// The list of matchers that decide which paths invoke the access policy.
#[derive(Debug, Clone)]
pub struct MatcherSet {
    patterns: Vec<RoutePattern>,
    set: RegexSet,
}

impl MatcherSet {
    /// Compiles every pattern; fails on the first invalid one.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| RoutePattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let set = RegexSet::new(patterns.iter().map(|p| p.regex.as_str())).map_err(|e| {
            WardenError::InternalError(format!("failed to build matcher set: {}", e))
        })?;
        Ok(Self { patterns, set })
    }

    /// Returns true if any pattern matches the path.
    pub fn matches(&self, path: &str) -> bool {
        self.set.is_match(path)
    }

    /// The first pattern matching the path, if any.
    pub fn first_match(&self, path: &str) -> Option<&RoutePattern> {
        self.set
            .matches(path)
            .iter()
            .next()
            .map(|idx| &self.patterns[idx])
    }

    /// The compiled patterns, in configuration order.
    pub fn patterns(&self) -> &[RoutePattern] {
        &self.patterns
    }

    /// Number of patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True if there are no patterns, in which case nothing is gated.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
