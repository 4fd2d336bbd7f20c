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

/// Line-oriented output for CI logs and redirected stderr.
pub struct SimpleProgress {
    operation: String,
    context: String,
    total: Option<u64>,
}

impl SimpleProgress {
    pub fn new() -> Self {
        Self {
            operation: String::new(),
            context: String::new(),
            total: None,
        }
    }

    fn format_complete(&self, message: Option<String>) -> String {
        let msg = message.unwrap_or_else(|| "Complete".to_string());
        format!("✓ {} {} - {}", self.operation, self.context, msg)
    }

    fn format_error(&self, message: &str) -> String {
        format!("✗ {} {} - {}", self.operation, self.context, message)
    }

    fn format_item(&self, message: &str) -> String {
        match self.total {
            Some(total) => format!("  {message} [{total}]"),
            None => format!("  {message}"),
        }
    }
}

impl Default for SimpleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressIndicator for SimpleProgress {
    fn start(&mut self, config: ProgressConfig) {
        self.operation = config.operation;
        self.context = config.context;
        self.total = config.total;
        eprintln!("{} {}...", self.operation, self.context);
    }

    fn update(&mut self, _current: u64, total: Option<u64>) {
        // Positions are not printed to keep logs short
        if total.is_some() {
            self.total = total;
        }
    }

    fn set_message(&mut self, message: String) {
        eprintln!("{}", self.format_item(&message));
    }

    fn complete(&mut self, message: Option<String>) {
        eprintln!("{}", self.format_complete(message));
    }

    fn error(&mut self, message: String) {
        eprintln!("{}", self.format_error(&message));
    }

    fn warn(&mut self, message: String) {
        eprintln!("⚠ {message}");
    }
}
