// Copyright 2025 dentsusoken
//
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

mod context;
mod exit_codes;
mod format;

pub use context::ErrorContext;
pub use exit_codes::get_exit_code;
pub use format::{format_error_chain, format_error_with_color};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtFetchError {
    #[error("Failed to open the page for '{package}': {reason}")]
    Navigation { package: String, reason: String },

    #[error("Failed to download {label}: {reason}")]
    Download { label: String, reason: String },

    #[error("Page did not behave as expected: {0}")]
    InternalConsistency(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown platform code '{code}'")]
    InvalidPlatform { code: String, known: Vec<String> },

    #[error("Invalid package list: {0}")]
    InputList(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to launch browser: {0}")]
    BrowserLaunch(String),

    #[error("WebDriver command failed: {0}")]
    WebDriver(String),

    #[error("Operation cancelled by user")]
    UserDeclined,

    #[error("{} package(s) failed to download", failed.len())]
    BatchFailed { failed: Vec<String> },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<fantoccini::error::CmdError> for ExtFetchError {
    fn from(err: fantoccini::error::CmdError) -> Self {
        ExtFetchError::WebDriver(err.to_string())
    }
}

impl From<config::ConfigError> for ExtFetchError {
    fn from(err: config::ConfigError) -> Self {
        ExtFetchError::ConfigError(err.to_string())
    }
}

impl ExtFetchError {
    /// Whether the error was raised before any browser interaction.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            ExtFetchError::InvalidConfig(_)
                | ExtFetchError::InvalidPlatform { .. }
                | ExtFetchError::InputList(_)
                | ExtFetchError::ConfigError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ExtFetchError>;
