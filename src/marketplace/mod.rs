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

//! Marketplace page automation: navigation, capability probing, variant
//! enumeration and downloading, tied together per package by
//! [`DownloadOrchestrator`].

mod driver;
mod enumerator;
mod navigator;
mod orchestrator;
mod probe;

pub use driver::click_and_download;
pub use enumerator::{DEFAULT_DROPDOWN_PROBE_TIMEOUT, enumerate, ensure_dropdown_open};
pub use navigator::navigate;
pub use orchestrator::DownloadOrchestrator;
pub use probe::{UNIVERSAL_MARKER, has_multiple_builds, satisfies_platforms, text_satisfies};

use crate::browser::PageSelectors;
use crate::models::PlatformSet;
use std::path::PathBuf;
use std::time::Duration;

/// Validated, run-wide settings shared by every package.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub output_dir: PathBuf,
    /// Bound for each navigation, click and download wait
    pub timeout: Duration,
    pub dropdown_probe_timeout: Duration,
    pub platforms: PlatformSet,
    pub selectors: PageSelectors,
}
