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

use crate::error::ExtFetchError;
use std::fmt;

pub struct ErrorContext<'a> {
    pub error: &'a ExtFetchError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl<'a> ErrorContext<'a> {
    pub fn new(error: &'a ExtFetchError) -> Self {
        let (suggestion, details) = match error {
            ExtFetchError::Navigation { reason, .. } => {
                let suggestion = if reason.contains("timed out") || reason.contains("Timeout") {
                    Some(
                        "Try increasing the timeout with --timeout option (e.g., --timeout 300)."
                            .to_string(),
                    )
                } else {
                    Some(
                        "Check that the package identifier exists on the marketplace and that \
                         the marketplace is reachable."
                            .to_string(),
                    )
                };
                (suggestion, None)
            }
            ExtFetchError::Download { label, reason } => {
                let suggestion = Some(
                    "Check your internet connection and try again. Use --timeout to increase \
                     timeout if needed."
                        .to_string(),
                );
                let details = Some(format!("Download of {label} failed: {reason}"));
                (suggestion, details)
            }
            ExtFetchError::InternalConsistency(msg) => {
                let suggestion = Some(
                    "The marketplace page layout may have changed. Override the page selectors \
                     in config.toml ([selectors] section) or run with --debug to watch the \
                     browser."
                        .to_string(),
                );
                let details = Some(msg.clone());
                (suggestion, details)
            }
            ExtFetchError::InvalidPlatform { known, .. } => {
                let suggestion = Some(format!("Supported platform codes: {}", known.join(", ")));
                (suggestion, None)
            }
            ExtFetchError::InputList(msg) => {
                let suggestion = Some(
                    "The package list must contain one identifier per line (e.g. \
                     'publisher.extension'). Lines starting with '#' are ignored."
                        .to_string(),
                );
                let details = Some(msg.clone());
                (suggestion, details)
            }
            ExtFetchError::BrowserLaunch(msg) => {
                let suggestion = Some(
                    "Install chromedriver matching your Chrome version and make sure it is on \
                     PATH, or point --webdriver at a running WebDriver server (e.g. \
                     http://localhost:9515)."
                        .to_string(),
                );
                let details = Some(msg.clone());
                (suggestion, details)
            }
            ExtFetchError::UserDeclined => {
                let suggestion =
                    Some("Use --yes to write into a non-empty output directory.".to_string());
                (suggestion, None)
            }
            ExtFetchError::BatchFailed { failed } => {
                let suggestion = Some(
                    "Re-run with only the failed identifiers, or use -v for more detail."
                        .to_string(),
                );
                let details = Some(format!(
                    "Failed packages:\n{}",
                    failed
                        .iter()
                        .map(|p| format!("  - {p}"))
                        .collect::<Vec<_>>()
                        .join("\n")
                ));
                (suggestion, details)
            }
            ExtFetchError::Io(io_err) => {
                let suggestion = match io_err.kind() {
                    std::io::ErrorKind::PermissionDenied => {
                        if cfg!(unix) {
                            Some("Check the permissions of the output directory.".to_string())
                        } else {
                            Some("Run as Administrator or check file permissions.".to_string())
                        }
                    }
                    std::io::ErrorKind::NotFound => Some(
                        "Ensure the file or directory exists and the path is correct.".to_string(),
                    ),
                    _ => None,
                };
                let details = Some(format!("I/O error: {io_err}"));
                (suggestion, details)
            }
            _ => (None, None),
        };

        ErrorContext {
            error,
            suggestion,
            details,
        }
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestion = Some(suggestion);
        self
    }
}

impl<'a> fmt::Display for ErrorContext<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\n\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}
