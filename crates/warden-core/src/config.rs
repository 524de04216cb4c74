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

//! Central module for Warden configuration.
//!
//! Sources, lowest to highest precedence: built-in defaults, a JSON file,
//! then environment variables. Every section is optional in the file.

use crate::errors::{Result, WardenError};
use crate::matcher::RoutePattern;
use crate::policy::AccessPolicyConfig;
use crate::session::SessionCookies;
use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Environment variable naming a JSON configuration file.
pub const CONFIG_PATH_ENV_VAR: &str = "WARDEN_CONFIG";
/// Environment variable overriding the server bind address.
pub const BIND_ADDR_ENV_VAR: &str = "WARDEN_BIND_ADDR";

/// Default matcher list: the only paths that reach the access policy.
pub const DEFAULT_MATCHERS: [&str; 3] =
    ["/dashboard/:path*", "/api/image/:path*", "/api/post/:path*"];

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
        }
    }
}

impl ServerConfig {
    /// Parses the bind address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_addr.parse().map_err(|e| {
            WardenError::validation("server.bind_addr", format!("'{}': {}", self.bind_addr, e))
        })
    }
}

/// Complete Warden configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WardenConfig {
    /// Route matcher patterns selecting which paths are gated.
    pub matcher: Vec<String>,
    /// Access policy prefixes and methods.
    pub policy: AccessPolicyConfig,
    /// Recognized session cookie names.
    pub session: SessionCookies,
    /// HTTP server settings.
    pub server: ServerConfig,
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            matcher: DEFAULT_MATCHERS.iter().map(|m| m.to_string()).collect(),
            policy: AccessPolicyConfig::default(),
            session: SessionCookies::default(),
            server: ServerConfig::default(),
        }
    }
}

impl WardenConfig {
    /// Parses a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        tracing::info!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Loads configuration from `path`, or from the file named by
    /// `WARDEN_CONFIG` when `path` is `None`, or defaults when neither is
    /// set, then applies environment overrides.
    ///
    /// The result is not validated here; [`AccessGate::from_config`] does
    /// that once the final configuration is assembled.
    ///
    /// [`AccessGate::from_config`]: crate::gate::AccessGate::from_config
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path: Option<PathBuf> = path
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(CONFIG_PATH_ENV_VAR).map(PathBuf::from));

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                tracing::info!("No configuration file given, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    /// Applies environment overrides using `lookup` to read variables.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(BIND_ADDR_ENV_VAR) {
            tracing::debug!(bind_addr = %addr, "Bind address overridden from environment");
            self.server.bind_addr = addr;
        }
    }

    /// Checks the configuration for errors.
    ///
    /// Public prefixes without a leading `/` are accepted but reported, since
    /// they can never match a request path.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.matcher {
            RoutePattern::parse(pattern)?;
        }

        if self.session.cookie_names.is_empty() {
            return Err(WardenError::validation(
                "session.cookie_names",
                "at least one session cookie name is required",
            ));
        }
        if self.session.cookie_names.iter().any(|n| n.trim().is_empty()) {
            return Err(WardenError::validation(
                "session.cookie_names",
                "cookie names must not be empty",
            ));
        }

        if self.policy.protected_prefix.is_empty() {
            return Err(WardenError::validation(
                "policy.protected_prefix",
                "must not be empty",
            ));
        }
        if self.policy.api_prefix.is_empty() {
            return Err(WardenError::validation("policy.api_prefix", "must not be empty"));
        }
        if self.policy.public_prefixes.iter().any(String::is_empty) {
            return Err(WardenError::validation(
                "policy.public_prefixes",
                "an empty prefix would make every path public",
            ));
        }
        for prefix in &self.policy.public_prefixes {
            if !prefix.starts_with('/') {
                tracing::warn!(
                    prefix = %prefix,
                    "Public route prefix does not start with '/' and will never match"
                );
            }
        }

        self.server.socket_addr()?;
        Ok(())
    }
}
