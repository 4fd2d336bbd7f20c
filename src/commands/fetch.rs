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

use crate::browser::webdriver::WebDriverBrowser;
use crate::browser::{Browser, Page};
use crate::config::FetchConfig;
use crate::error::{ExtFetchError, Result, format_error_with_color};
use crate::indicator::{ProgressConfig, ProgressFactory, ProgressIndicator};
use crate::input::read_package_list;
use crate::marketplace::{DownloadOrchestrator, FetchSettings};
use crate::models::{Package, PackageOutcome};
use colored::*;
use log::{debug, error, info, warn};
use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

/// Result of processing a whole package list.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub saved: Vec<PathBuf>,
    pub skipped: Vec<(String, String)>,
    pub failed: Vec<(String, ExtFetchError)>,
}

impl BatchSummary {
    pub fn failed_ids(&self) -> Vec<String> {
        self.failed.iter().map(|(id, _)| id.clone()).collect()
    }

    fn headline(&self) -> String {
        format!(
            "{} file(s) saved, {} skipped, {} failed",
            self.saved.len(),
            self.skipped.len(),
            self.failed.len()
        )
    }

    pub fn print(&self, output_dir: &Path) {
        let use_color = io::stderr().is_terminal();

        if !self.saved.is_empty() {
            println!(
                "{} Downloaded {} file(s) to {}",
                "✓".green().bold(),
                self.saved.len(),
                output_dir.display()
            );
        }

        if !self.skipped.is_empty() {
            println!("\n{}", "Skipped:".yellow().bold());
            for (id, reason) in &self.skipped {
                println!("  - {id}: {reason}");
            }
        }

        if !self.failed.is_empty() {
            eprintln!("\n{}", "Failed:".red().bold());
            for (id, err) in &self.failed {
                eprintln!("  - {id}");
                eprintln!("{}", format_error_with_color(err, use_color));
            }
        }
    }

    /// `Err(BatchFailed)` when at least one package failed.
    pub fn into_result(self) -> Result<()> {
        if self.failed.is_empty() {
            Ok(())
        } else {
            Err(ExtFetchError::BatchFailed {
                failed: self.failed_ids(),
            })
        }
    }
}

pub struct FetchCommand<'a> {
    config: &'a FetchConfig,
    no_progress: bool,
    assume_yes: bool,
}

impl<'a> FetchCommand<'a> {
    pub fn new(config: &'a FetchConfig, no_progress: bool, assume_yes: bool) -> Self {
        Self {
            config,
            no_progress,
            assume_yes,
        }
    }

    /// Download every package listed in `input`.
    ///
    /// Configuration and the package list are checked before the browser is
    /// started.
    pub async fn execute(&self, input: &Path) -> Result<()> {
        self.config.validate()?;
        let ids = read_package_list(input)?;
        let settings = self.config.fetch_settings()?;
        debug!(
            "Fetching {} package(s) for {} into {}",
            ids.len(),
            settings.platforms,
            settings.output_dir.display()
        );

        prepare_output_dir(
            &settings.output_dir,
            self.assume_yes,
            &mut io::stdin().lock(),
        )?;

        let mut browser = WebDriverBrowser::launch(&self.config.launch_options()).await?;
        let summary = self.fetch(&mut browser, &ids, &settings).await?;

        summary.print(&settings.output_dir);
        summary.into_result()
    }

    /// Run the batch on `browser` and close it afterwards, whatever the outcome.
    pub async fn fetch(
        &self,
        browser: &mut dyn Browser,
        ids: &[String],
        settings: &FetchSettings,
    ) -> Result<BatchSummary> {
        let outcome = match browser.new_page().await {
            Ok(page) => {
                let mut progress = ProgressFactory::create(self.no_progress);
                run_batch(
                    page.as_ref(),
                    ids,
                    settings,
                    &self.config.marketplace_url,
                    self.config.fail_fast,
                    progress.as_mut(),
                )
                .await
            }
            Err(e) => Err(e),
        };

        if let Err(e) = browser.close().await {
            warn!("Failed to close the browser: {e}");
        }
        outcome
    }
}

/// Process `ids` in order on a single page.
///
/// Without `fail_fast` a failing package is recorded and the run moves on;
/// with it the first failure is returned.
pub async fn run_batch(
    page: &dyn Page,
    ids: &[String],
    settings: &FetchSettings,
    marketplace_url: &str,
    fail_fast: bool,
    progress: &mut dyn ProgressIndicator,
) -> Result<BatchSummary> {
    let total = ids.len() as u64;
    progress.start(
        ProgressConfig::new("Fetching", format!("{total} package(s)")).with_total(total),
    );

    let orchestrator = DownloadOrchestrator::new(page, settings);
    let mut summary = BatchSummary::default();

    for (i, id) in ids.iter().enumerate() {
        let package = Package::new(id.as_str(), marketplace_url);
        progress.set_message(id.clone());

        match orchestrator.process(&package, progress).await {
            Ok(PackageOutcome::Done { saved }) => {
                info!("{id}: {} file(s) saved", saved.len());
                summary.saved.extend(saved);
            }
            Ok(PackageOutcome::Skipped { reason }) => {
                summary.skipped.push((id.clone(), reason));
            }
            Err(e) if fail_fast => {
                error!("{id}: {e}");
                progress.error(format!("{id}: {e}"));
                return Err(e);
            }
            Err(e) => {
                error!("{id}: {e}");
                progress.warn(format!("{id} failed: {e}"));
                summary.failed.push((id.clone(), e));
            }
        }

        progress.update(i as u64 + 1, None);
    }

    progress.complete(Some(summary.headline()));
    Ok(summary)
}

/// Create `dir` or make sure the user accepts writing into a non-empty one.
pub fn prepare_output_dir(dir: &Path, assume_yes: bool, input: &mut dyn BufRead) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        info!("Created output directory {}", dir.display());
        return Ok(());
    }

    if !dir.is_dir() {
        return Err(ExtFetchError::InvalidConfig(format!(
            "Output path '{}' is not a directory",
            dir.display()
        )));
    }

    let is_empty = fs::read_dir(dir)?.next().is_none();
    if is_empty || assume_yes {
        return Ok(());
    }

    eprintln!(
        "Output directory {} is not empty; existing files may be overwritten.",
        dir.display()
    );
    eprint!("Continue? [y/N] ");
    io::stderr().flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;

    let answer = answer.trim();
    if answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes") {
        Ok(())
    } else {
        Err(ExtFetchError::UserDeclined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::SilentProgress;
    use crate::models::PlatformSet;
    use crate::test::fixtures::{
        FakeBrowser, FakePage, MockProgress, SINGLE_BUILD_FILE, capture_logs, logged,
    };
    use log::Level;
    use std::io::Cursor;
    use std::time::Duration;
    use tempfile::TempDir;

    const MARKETPLACE: &str = "https://marketplace.test";

    fn settings(output: &TempDir) -> FetchSettings {
        FetchSettings {
            output_dir: output.path().to_path_buf(),
            timeout: Duration::from_millis(200),
            dropdown_probe_timeout: Duration::from_millis(50),
            platforms: PlatformSet::new(["linux-x64"]).unwrap(),
            selectors: Default::default(),
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_batch_continues_past_failing_package() {
        let output = TempDir::new().unwrap();
        let page = FakePage::single_build("linux-x64").failing_goto_for("bad.pkg");

        let summary = run_batch(
            &page,
            &ids(&["bad.pkg", "good.pkg"]),
            &settings(&output),
            MARKETPLACE,
            false,
            &mut SilentProgress::new(),
        )
        .await
        .unwrap();

        assert_eq!(summary.failed_ids(), vec!["bad.pkg"]);
        assert_eq!(summary.saved, vec![output.path().join(SINGLE_BUILD_FILE)]);
        assert_eq!(
            page.visited(),
            vec![format!("{MARKETPLACE}/items?itemName=good.pkg")]
        );
        assert!(matches!(
            summary.into_result(),
            Err(ExtFetchError::BatchFailed { failed }) if failed == vec!["bad.pkg"]
        ));
    }

    #[tokio::test]
    async fn test_batch_fail_fast_stops_at_first_failure() {
        let output = TempDir::new().unwrap();
        let page = FakePage::single_build("linux-x64").failing_goto_for("bad.pkg");

        let err = run_batch(
            &page,
            &ids(&["bad.pkg", "good.pkg"]),
            &settings(&output),
            MARKETPLACE,
            true,
            &mut SilentProgress::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ExtFetchError::Navigation { ref package, .. } if package == "bad.pkg"));
        assert!(page.visited().is_empty());
        assert!(page.saved_files().is_empty());
    }

    #[tokio::test]
    async fn test_batch_fail_fast_names_failing_package() {
        // The dropdown error carries no package id of its own
        capture_logs();
        let output = TempDir::new().unwrap();
        let page =
            FakePage::multi_build("linux-x64", &["linux-x64"]).with_broken_dropdown();
        let mut progress = MockProgress::new();
        progress.expect_start().return_const(());
        progress.expect_set_message().return_const(());
        progress
            .expect_error()
            .times(1)
            .withf(|message| message.starts_with("broken.dropdown: "))
            .return_const(());

        let err = run_batch(
            &page,
            &ids(&["broken.dropdown"]),
            &settings(&output),
            MARKETPLACE,
            true,
            &mut progress,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ExtFetchError::InternalConsistency(_)));
        assert_eq!(logged(Level::Error, "broken.dropdown").len(), 1);
    }

    #[tokio::test]
    async fn test_batch_records_skipped_packages() {
        let output = TempDir::new().unwrap();
        let page = FakePage::single_build("win32-x64");

        let summary = run_batch(
            &page,
            &ids(&["a.b", "c.d"]),
            &settings(&output),
            MARKETPLACE,
            false,
            &mut SilentProgress::new(),
        )
        .await
        .unwrap();

        assert_eq!(summary.skipped.len(), 2);
        assert!(summary.saved.is_empty());
        assert!(summary.into_result().is_ok());
    }

    #[tokio::test]
    async fn test_fetch_closes_browser() {
        let output = TempDir::new().unwrap();
        let config = FetchConfig::default();
        let command = FetchCommand::new(&config, true, true);
        let mut browser = FakeBrowser::with_page(Box::new(FakePage::single_build("linux-x64")));
        let closed = browser.closed_flag();

        let summary = command
            .fetch(&mut browser, &ids(&["a.b"]), &settings(&output))
            .await
            .unwrap();

        assert_eq!(summary.saved.len(), 1);
        assert!(*closed.lock().unwrap());
    }

    #[tokio::test]
    async fn test_fetch_closes_browser_after_fail_fast_error() {
        let output = TempDir::new().unwrap();
        let config = FetchConfig {
            fail_fast: true,
            ..Default::default()
        };
        let command = FetchCommand::new(&config, true, true);
        let page = FakePage::single_build("linux-x64").failing_click();
        let mut browser = FakeBrowser::with_page(Box::new(page));
        let closed = browser.closed_flag();

        let result = command
            .fetch(&mut browser, &ids(&["a.b"]), &settings(&output))
            .await;

        assert!(matches!(result, Err(ExtFetchError::Download { .. })));
        assert!(*closed.lock().unwrap());
    }

    #[tokio::test]
    async fn test_execute_rejects_invalid_platform_before_launch() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("packages.txt");
        fs::write(&input, "a.b\n").unwrap();
        let config = FetchConfig {
            platforms: vec!["amiga-m68k".to_string()],
            output_dir: Some(temp_dir.path().join("out")),
            ..Default::default()
        };

        let err = FetchCommand::new(&config, true, true)
            .execute(&input)
            .await
            .unwrap_err();

        assert!(matches!(err, ExtFetchError::InvalidPlatform { .. }));
        assert!(!temp_dir.path().join("out").exists());
    }

    #[tokio::test]
    async fn test_execute_rejects_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let config = FetchConfig::default();

        let err = FetchCommand::new(&config, true, true)
            .execute(&temp_dir.path().join("missing.txt"))
            .await
            .unwrap_err();

        assert!(matches!(err, ExtFetchError::InputList(_)));
    }

    #[test]
    fn test_prepare_creates_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("nested").join("out");

        prepare_output_dir(&dir, false, &mut Cursor::new("")).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_prepare_accepts_empty_dir_without_prompt() {
        let temp_dir = TempDir::new().unwrap();
        prepare_output_dir(temp_dir.path(), false, &mut Cursor::new("")).unwrap();
    }

    #[test]
    fn test_prepare_non_empty_dir_prompts() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("old.vsix"), b"x").unwrap();

        prepare_output_dir(temp_dir.path(), false, &mut Cursor::new("y\n")).unwrap();
        prepare_output_dir(temp_dir.path(), true, &mut Cursor::new("")).unwrap();

        for answer in ["n\n", "\n", ""] {
            let err =
                prepare_output_dir(temp_dir.path(), false, &mut Cursor::new(answer)).unwrap_err();
            assert!(matches!(err, ExtFetchError::UserDeclined));
        }
    }

    #[test]
    fn test_prepare_rejects_file_path() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("out");
        fs::write(&file, b"x").unwrap();

        let err = prepare_output_dir(&file, true, &mut Cursor::new("")).unwrap_err();
        assert!(matches!(err, ExtFetchError::InvalidConfig(_)));
    }
}
