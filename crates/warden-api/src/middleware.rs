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

//! Axum middleware enforcing access gate decisions.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use warden_core::{AccessGate, GateOutcome};

/// Runs every request through the [`AccessGate`]. Denied requests get a bare
/// `401 Unauthorized`; everything else continues down the stack.
pub async fn enforce_access(
    State(gate): State<Arc<AccessGate>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let outcome = {
        let cookies = request
            .headers()
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok());
        gate.check(request.uri().path(), request.method().as_str(), cookies)
    };

    let GateOutcome::Evaluated {
        evaluation,
        matcher,
    } = outcome
    else {
        tracing::trace!(path = %request.uri().path(), "Path not gated");
        return Ok(next.run(request).await);
    };

    if !evaluation.decision.is_allowed() {
        tracing::warn!(
            path = %request.uri().path(),
            method = %request.method(),
            matcher = %matcher,
            rule = %evaluation.rule,
            "Access denied"
        );
        return Err(StatusCode::UNAUTHORIZED);
    }

    tracing::debug!(
        path = %request.uri().path(),
        method = %request.method(),
        matcher = %matcher,
        rule = %evaluation.rule,
        "Access allowed"
    );
    Ok(next.run(request).await)
}
