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

//! Per-package download state machine.
//!
//! ```text
//! Navigating -> Probing -> SingleDownload ---------------------> Done
//!                       \-> MultiEnumerate -> MultiDownloading(xN) -> Done
//! Probing / MultiEnumerate -> Skipped
//! any state -> Failed (returned as Err)
//! ```

use super::driver::click_and_download;
use super::enumerator::{ensure_dropdown_open, enumerate};
use super::navigator::navigate;
use super::probe::{has_multiple_builds, satisfies_platforms};
use super::FetchSettings;
use crate::browser::{Locator, Page, Trigger};
use crate::error::Result;
use crate::indicator::ProgressIndicator;
use crate::models::{BuildShape, MatchPolicy, Package, PackageOutcome, VariantTask};
use log::{debug, warn};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Navigating,
    Probing,
    SingleDownload,
    MultiEnumerate,
    MultiDownloading { current: usize, total: usize },
    Skipped,
    Done,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Navigating => write!(f, "navigating"),
            Self::Probing => write!(f, "probing"),
            Self::SingleDownload => write!(f, "single download"),
            Self::MultiEnumerate => write!(f, "enumerating variants"),
            Self::MultiDownloading { current, total } => {
                write!(f, "downloading variant {current}/{total}")
            }
            Self::Skipped => write!(f, "skipped"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Outcome of probing a page.
enum Plan {
    Download(BuildShape),
    Skip(String),
}

/// Drives one package at a time through the shared page.
pub struct DownloadOrchestrator<'a> {
    page: &'a dyn Page,
    settings: &'a FetchSettings,
}

impl<'a> DownloadOrchestrator<'a> {
    pub fn new(page: &'a dyn Page, settings: &'a FetchSettings) -> Self {
        Self { page, settings }
    }

    /// Download every requested build of `package`.
    ///
    /// Capability mismatches end in [`PackageOutcome::Skipped`]; every other
    /// problem is returned as an error and nothing is retried.
    pub async fn process(
        &self,
        package: &Package,
        progress: &mut dyn ProgressIndicator,
    ) -> Result<PackageOutcome> {
        enter(package, State::Navigating);
        navigate(
            self.page,
            package,
            &self.settings.selectors,
            self.settings.timeout,
        )
        .await?;

        enter(package, State::Probing);
        let shape = match self.resolve(package).await? {
            Plan::Download(shape) => shape,
            Plan::Skip(reason) => {
                enter(package, State::Skipped);
                warn!("Skipping {package}: {reason}");
                progress.warn(format!("Skipping {package}: {reason}"));
                return Ok(PackageOutcome::Skipped { reason });
            }
        };

        let saved = match shape {
            BuildShape::Single => {
                enter(package, State::SingleDownload);
                vec![self.download_single(package).await?]
            }
            BuildShape::Multi(tasks) => self.download_variants(package, &tasks, progress).await?,
        };

        enter(package, State::Done);
        Ok(PackageOutcome::Done { saved })
    }

    async fn resolve(&self, package: &Package) -> Result<Plan> {
        let settings = self.settings;
        let requested = &settings.platforms;

        if !has_multiple_builds(self.page, &settings.selectors).await? {
            // A single build has to cover every requested platform
            if !satisfies_platforms(self.page, &settings.selectors, requested, MatchPolicy::All)
                .await?
            {
                return Ok(Plan::Skip(format!("not available for {requested}")));
            }
            return Ok(Plan::Download(BuildShape::Single));
        }

        // Individual variants only need to cover part of the request
        if !satisfies_platforms(self.page, &settings.selectors, requested, MatchPolicy::Any).await?
        {
            return Ok(Plan::Skip(format!("none of {requested} is supported")));
        }

        enter(package, State::MultiEnumerate);
        let tasks = enumerate(
            self.page,
            &settings.selectors,
            requested,
            settings.dropdown_probe_timeout,
        )
        .await?;

        if tasks.is_empty() {
            return Ok(Plan::Skip(format!("no download variant matches {requested}")));
        }
        Ok(Plan::Download(BuildShape::Multi(tasks)))
    }

    async fn download_single(&self, package: &Package) -> Result<PathBuf> {
        let trigger = Trigger::Selector(self.settings.selectors.download_button.clone());
        click_and_download(
            package.id(),
            self.page,
            self.settings.timeout,
            &trigger,
            &self.settings.output_dir,
        )
        .await
    }

    async fn download_variants(
        &self,
        package: &Package,
        tasks: &[VariantTask],
        progress: &mut dyn ProgressIndicator,
    ) -> Result<Vec<PathBuf>> {
        let settings = self.settings;
        let total = tasks.len();
        let mut saved = Vec::with_capacity(total);

        for (i, task) in tasks.iter().enumerate() {
            enter(
                package,
                State::MultiDownloading {
                    current: i + 1,
                    total,
                },
            );
            progress.set_message(format!("{package} [{}] ({}/{total})", task.platform, i + 1));

            // The list closes after every download
            ensure_dropdown_open(
                self.page,
                &settings.selectors,
                settings.dropdown_probe_timeout,
            )
            .await?;

            let entry = Locator::new(self.page, &settings.selectors.variant_entry).nth(task.position);
            let label = format!("{package} ({})", task.platform);
            let path = click_and_download(
                &label,
                self.page,
                settings.timeout,
                &Trigger::Element(entry),
                &settings.output_dir,
            )
            .await?;
            saved.push(path);
        }

        Ok(saved)
    }
}

fn enter(package: &Package, state: State) {
    debug!("{package}: {state}");
}
