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

//! Progress feedback for batch downloads
//!
//! The display style (animated bar, plain lines, or nothing) is picked by
//! [`ProgressFactory`] from the environment and the `--no-progress` flag.

mod factory;
mod indicatif;
mod silent;
mod simple;
pub mod types;

pub use factory::{ProgressFactory, ProgressRenderer};
pub use indicatif::IndicatifProgress;
pub use silent::SilentProgress;
pub use simple::SimpleProgress;
pub use types::ProgressConfig;

/// Core trait for progress indicator implementations
///
/// Implementations include:
/// - `IndicatifProgress` - animated progress bar for terminals
/// - `SimpleProgress` - plain lines for CI and redirected output
/// - `SilentProgress` - no progress output for `--no-progress`
pub trait ProgressIndicator: Send + Sync {
    /// Start a new progress operation
    ///
    /// A bar is shown when `config.total` is set, a spinner otherwise.
    fn start(&mut self, config: ProgressConfig);

    /// Move to `current`, optionally replacing the total
    fn update(&mut self, current: u64, total: Option<u64>);

    /// Change the message shown next to the indicator
    fn set_message(&mut self, message: String);

    /// Complete the progress operation successfully
    fn complete(&mut self, message: Option<String>);

    /// Mark the operation as failed
    fn error(&mut self, message: String);

    /// Report a non-fatal problem without disturbing the display
    ///
    /// Warnings stay visible in every mode, including silent.
    fn warn(&mut self, message: String);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RecordingProgress {
        total: Option<u64>,
        current: u64,
        message: String,
        warnings: Vec<String>,
        completed: bool,
    }

    impl ProgressIndicator for RecordingProgress {
        fn start(&mut self, config: ProgressConfig) {
            self.total = config.total;
            self.message = format!("{} {}", config.operation, config.context);
        }

        fn update(&mut self, current: u64, total: Option<u64>) {
            self.current = current;
            if total.is_some() {
                self.total = total;
            }
        }

        fn set_message(&mut self, message: String) {
            self.message = message;
        }

        fn complete(&mut self, message: Option<String>) {
            self.completed = true;
            if let Some(msg) = message {
                self.message = msg;
            }
        }

        fn error(&mut self, message: String) {
            self.message = message;
        }

        fn warn(&mut self, message: String) {
            self.warnings.push(message);
        }
    }

    #[test]
    fn test_trait_object_usage() {
        let mut progress: Box<dyn ProgressIndicator> = Box::new(RecordingProgress {
            total: None,
            current: 0,
            message: String::new(),
            warnings: Vec::new(),
            completed: false,
        });

        progress.start(ProgressConfig::new("Fetching", "2 packages").with_total(2));
        progress.update(1, None);
        progress.warn("Skipping a.b".to_string());
        progress.update(2, Some(2));
        progress.complete(None);
    }

    #[test]
    fn test_update_keeps_total_when_absent() {
        let mut progress = RecordingProgress {
            total: None,
            current: 0,
            message: String::new(),
            warnings: Vec::new(),
            completed: false,
        };

        progress.start(ProgressConfig::new("Fetching", "packages").with_total(5));
        progress.update(3, None);
        assert_eq!(progress.total, Some(5));
        assert_eq!(progress.current, 3);

        progress.warn("first".to_string());
        progress.complete(Some("done".to_string()));
        assert_eq!(progress.warnings, vec!["first".to_string()]);
        assert!(progress.completed);
        assert_eq!(progress.message, "done");
    }
}
