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

use std::path::PathBuf;

/// One dropdown entry that matched the requested platform set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantTask {
    /// Zero-based position of the entry in page order.
    pub position: usize,
    /// Lower-cased platform name as displayed by the entry.
    pub platform: String,
}

impl VariantTask {
    pub fn new(position: usize, platform: impl Into<String>) -> Self {
        Self {
            position,
            platform: platform.into(),
        }
    }
}

/// Shape of a package page, resolved once per package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildShape {
    /// One build behind the primary download button.
    Single,
    /// Several platform builds behind the variant dropdown.
    Multi(Vec<VariantTask>),
}

/// Terminal state of a package that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageOutcome {
    Done { saved: Vec<PathBuf> },
    Skipped { reason: String },
}

impl PackageOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    pub fn saved_files(&self) -> &[PathBuf] {
        match self {
            Self::Done { saved } => saved,
            Self::Skipped { .. } => &[],
        }
    }
}
