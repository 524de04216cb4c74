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

//! HTTP server hosting the Warden access gate.

mod middleware;

use anyhow::Context;
use axum::{
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use warden_core::{AccessGate, WardenConfig};

/// Serve requests behind the Warden access gate.
#[derive(Parser, Debug)]
#[command(name = "warden-api", about = "HTTP server enforcing Warden access decisions")]
struct Args {
    /// JSON configuration file (defaults to $WARDEN_CONFIG, then built-in defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the configuration
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let mut config =
        WardenConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }

    let gate = Arc::new(AccessGate::from_config(&config)?);
    for pattern in gate.matchers().patterns() {
        tracing::debug!(pattern = %pattern, "Gating route");
    }
    tracing::info!(matchers = gate.matchers().len(), "Access gate ready");

    let addr = config.server.socket_addr()?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, app(gate)).await?;
    Ok(())
}

#[derive(Serialize)]
struct HealthStatus {
    status: String,
}

async fn health_check() -> impl IntoResponse {
    tracing::info!("Health check requested");
    let health = HealthStatus {
        status: "ok".to_string(),
    };
    (StatusCode::OK, Json(health))
}

#[derive(Serialize)]
struct Passthrough {
    path: String,
    method: String,
}

// Stands in for the application behind the gate.
async fn passthrough(method: Method, uri: Uri) -> impl IntoResponse {
    let body = Passthrough {
        path: uri.path().to_string(),
        method: method.to_string(),
    };
    (StatusCode::OK, Json(body))
}

fn app(gate: Arc<AccessGate>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .fallback(passthrough)
        .layer(axum::middleware::from_fn_with_state(
            gate,
            middleware::enforce_access,
        ))
        .layer(TraceLayer::new_for_http())
}
