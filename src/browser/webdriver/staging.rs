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

//! Download staging directory.
//!
//! WebDriver has no download events, so Chrome is told to drop every
//! download into a private directory and that directory is watched instead.
//! A download has started once a new, named entry shows up; it has finished
//! once the browser's partial-file suffix is gone.

use crate::browser::DownloadHandle;
use crate::error::{ExtFetchError, Result};
use async_trait::async_trait;
use log::{debug, trace};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::{Instant, sleep};

const PARTIAL_SUFFIXES: &[&str] = &[".crdownload", ".part", ".tmp", ".download"];
const UNCONFIRMED_PREFIX: &str = "Unconfirmed ";
const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub struct DownloadStaging {
    dir: TempDir,
}

impl DownloadStaging {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("extfetch-").tempdir()?;
        debug!("Download staging directory: {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Names currently present in the staging directory.
    pub fn snapshot(&self) -> Result<HashSet<String>> {
        list_entries(self.dir.path())
    }

    /// Wait until an entry not in `known` appears and carries its final name.
    pub async fn wait_for_new(
        &self,
        known: &HashSet<String>,
        timeout: Duration,
    ) -> Result<StagedDownload> {
        let deadline = Instant::now() + timeout;

        loop {
            for entry in list_entries(self.dir.path())? {
                if known.contains(&entry) {
                    continue;
                }
                if let Some(filename) = final_name(&entry) {
                    trace!("Download started: {entry}");
                    return Ok(StagedDownload::new(
                        self.dir.path().to_path_buf(),
                        filename,
                        timeout,
                    ));
                }
            }

            if Instant::now() >= deadline {
                return Err(ExtFetchError::WebDriver(format!(
                    "no download started within {timeout:?}"
                )));
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}

/// A download landing in the staging directory.
pub struct StagedDownload {
    dir: PathBuf,
    filename: String,
    /// Bound for the transfer to complete once it has started
    timeout: Duration,
    released: bool,
}

impl StagedDownload {
    fn new(dir: PathBuf, filename: String, timeout: Duration) -> Self {
        Self {
            dir,
            filename,
            timeout,
            released: false,
        }
    }

    fn finished_path(&self) -> PathBuf {
        self.dir.join(&self.filename)
    }

    fn partial_paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        PARTIAL_SUFFIXES
            .iter()
            .map(move |suffix| self.dir.join(format!("{}{suffix}", self.filename)))
    }

    fn in_progress(&self) -> bool {
        self.partial_paths().any(|path| path.exists())
    }

    async fn wait_until_finished(&self) -> Result<PathBuf> {
        let finished = self.finished_path();
        let deadline = Instant::now() + self.timeout;
        loop {
            let in_progress = self.in_progress();
            if finished.exists() && !in_progress {
                return Ok(finished);
            }
            if !finished.exists() && !in_progress {
                return Err(ExtFetchError::WebDriver(format!(
                    "download of {} was interrupted",
                    self.filename
                )));
            }
            if Instant::now() >= deadline {
                return Err(ExtFetchError::WebDriver(format!(
                    "download of {} did not finish within {:?}",
                    self.filename, self.timeout
                )));
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    fn remove_leftovers(&self) -> std::io::Result<()> {
        for path in std::iter::once(self.finished_path()).chain(self.partial_paths()) {
            match fs::remove_file(&path) {
                Ok(()) => trace!("Removed staged file {}", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DownloadHandle for StagedDownload {
    fn suggested_filename(&self) -> String {
        self.filename.clone()
    }

    async fn save_as(&mut self, path: &Path) -> Result<()> {
        let finished = self.wait_until_finished().await?;
        move_file(&finished, path).await
    }

    async fn delete(&mut self) -> Result<()> {
        self.released = true;
        self.remove_leftovers()?;
        Ok(())
    }
}

impl Drop for StagedDownload {
    fn drop(&mut self) {
        if !self.released {
            let _ = self.remove_leftovers();
        }
    }
}

fn list_entries(dir: &Path) -> Result<HashSet<String>> {
    let mut names = HashSet::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if let Some(name) = entry.file_name().to_str() {
            names.insert(name.to_string());
        }
    }
    Ok(names)
}

/// Final file name of a staged entry, or `None` while the browser has not
/// named it yet.
fn final_name(entry: &str) -> Option<String> {
    if entry.starts_with('.') || entry.starts_with(UNCONFIRMED_PREFIX) {
        return None;
    }

    let name = PARTIAL_SUFFIXES
        .iter()
        .find_map(|suffix| entry.strip_suffix(suffix))
        .unwrap_or(entry);

    (!name.is_empty()).then(|| name.to_string())
}

async fn move_file(from: &Path, to: &Path) -> Result<()> {
    if to.exists() {
        tokio::fs::remove_file(to).await?;
    }

    // Staging lives in the temp directory, which may be another filesystem
    if tokio::fs::rename(from, to).await.is_err() {
        tokio::fs::copy(from, to).await?;
        tokio::fs::remove_file(from).await?;
    }
    Ok(())
}
