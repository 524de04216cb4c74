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

//! Defines common error types for the Warden core library.

use thiserror::Error;

/// The primary error type for Warden operations.
///
/// Policy evaluation itself never fails; these errors only surface while
/// building matchers or loading configuration.
#[derive(Error, Debug)]
pub enum WardenError {
    /// Error while reading a configuration file.
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error while parsing a JSON configuration document.
    #[error("Serialization/Deserialization Error: {0}")]
    SerdeError(#[from] serde_json::Error),

    /// A route matcher pattern could not be parsed.
    #[error("Invalid route pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern as written in the configuration.
        pattern: String,
        /// What is wrong with it.
        message: String,
    },

    /// Error indicating a failure during configuration validation.
    #[error("Validation Error ({context}): {message}")]
    ValidationError {
        /// Context or field where validation failed.
        context: String,
        /// Specific validation failure message.
        message: String,
    },

    /// Represents an unexpected internal error.
    #[error("Internal Error: {0}")]
    InternalError(String),
}

impl WardenError {
    pub(crate) fn invalid_pattern(pattern: &str, message: impl Into<String>) -> Self {
        WardenError::InvalidPattern {
            pattern: pattern.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn validation(context: impl Into<String>, message: impl Into<String>) -> Self {
        WardenError::ValidationError {
            context: context.into(),
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, WardenError>;
