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

use crate::error::{ExtFetchError, Result};
use crate::platform::normalize_platform_code;
use std::fmt;

/// How a requested platform set is matched against advertised platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolicy {
    /// At least one requested code must be advertised.
    Any,
    /// Every requested code must be advertised.
    All,
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::All => write!(f, "all"),
        }
    }
}

/// Ordered, non-empty set of lower-cased platform codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformSet {
    codes: Vec<String>,
}

impl PlatformSet {
    /// Build a set from codes that are already known to be valid.
    ///
    /// Codes are lower-cased and de-duplicated, keeping the first occurrence.
    pub fn new<I, S>(codes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for code in codes {
            let code = code.as_ref().trim().to_lowercase();
            if code.is_empty() || normalized.contains(&code) {
                continue;
            }
            normalized.push(code);
        }

        if normalized.is_empty() {
            return Err(ExtFetchError::InvalidConfig(
                "At least one platform code is required".to_string(),
            ));
        }

        Ok(Self { codes: normalized })
    }

    /// Build a set from user input, rejecting codes outside the known table.
    pub fn parse<I, S>(codes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let validated = codes
            .into_iter()
            .map(|code| normalize_platform_code(code.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(validated)
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Exact membership of an already lower-cased name.
    pub fn contains(&self, name: &str) -> bool {
        self.codes.iter().any(|code| code == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }
}

impl fmt::Display for PlatformSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.codes.join(", "))
    }
}
