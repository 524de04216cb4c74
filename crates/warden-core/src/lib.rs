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

#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Core Warden types and logic: the access policy, route matchers, session
//! cookie detection and configuration.
//!
//! Most callers only need [`AccessGate`]:
//!
//! ```
//! use warden_core::{AccessGate, Decision, WardenConfig};
//!
//! let gate = AccessGate::from_config(&WardenConfig::default()).unwrap();
//! let outcome = gate.check("/dashboard/settings", "GET", ["theme=dark"]);
//! assert_eq!(outcome.decision(), Decision::Deny);
//! ```

pub mod config;
pub mod errors;
pub mod gate;
pub mod matcher;
pub mod policy;
pub mod session;
pub mod types;

pub use config::WardenConfig;
pub use errors::WardenError;
pub use gate::{AccessGate, GateOutcome};
pub use matcher::{MatcherSet, RoutePattern};
pub use policy::{AccessPolicyConfig, AccessPolicyEvaluator, PolicyEvaluator};
pub use session::SessionCookies;
pub use types::{Decision, Evaluation, MatchedRule, RequestDescriptor};
