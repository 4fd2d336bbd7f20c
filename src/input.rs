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

//! Package list parsing.

use crate::error::{ExtFetchError, Result};
use log::debug;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const COMMENT_PREFIX: char = '#';

/// Read a newline-delimited list of package identifiers.
///
/// Lines are trimmed; blank lines and `#` comments are dropped and the
/// first occurrence of a duplicate wins. An unreadable file or a list with
/// no identifiers is an [`ExtFetchError::InputList`].
pub fn read_package_list(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path).map_err(|e| {
        ExtFetchError::InputList(format!("cannot read '{}': {e}", path.display()))
    })?;

    let ids = parse_package_list(&contents);
    if ids.is_empty() {
        return Err(ExtFetchError::InputList(format!(
            "'{}' does not list any package",
            path.display()
        )));
    }

    debug!("read {} package(s) from {}", ids.len(), path.display());
    Ok(ids)
}

fn parse_package_list(contents: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();

    for line in contents.lines().map(str::trim) {
        if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
            continue;
        }
        if !seen.insert(line) {
            debug!("ignoring duplicate package '{line}'");
            continue;
        }
        ids.push(line.to_string());
    }

    ids
}
