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

use crate::indicator::{ProgressConfig, ProgressIndicator};

/// Null indicator for `--no-progress`; warnings and errors still reach stderr.
pub struct SilentProgress;

impl SilentProgress {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SilentProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressIndicator for SilentProgress {
    fn start(&mut self, _config: ProgressConfig) {}

    fn update(&mut self, _current: u64, _total: Option<u64>) {}

    fn set_message(&mut self, _message: String) {}

    fn complete(&mut self, _message: Option<String>) {}

    fn error(&mut self, message: String) {
        eprintln!("✗ {message}");
    }

    fn warn(&mut self, message: String) {
        eprintln!("⚠ {message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_panic_on_calls() {
        let mut progress = SilentProgress::new();

        progress.start(ProgressConfig::new("Fetching", "packages").with_total(100));
        progress.update(50, None);
        progress.update(75, Some(200));
        progress.set_message("Processing".to_string());
        progress.complete(Some("Done".to_string()));
        progress.error("Error occurred".to_string());
    }

    #[test]
    fn test_zero_sized() {
        let progress = SilentProgress::new();
        assert_eq!(std::mem::size_of_val(&progress), 0);

        let _boxed: Box<dyn ProgressIndicator> = Box::new(progress);
    }
}
