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

//! Browser capability set used by the marketplace logic.
//!
//! The marketplace code only talks to these traits. The production
//! implementation lives in [`webdriver`] and drives Chrome over the W3C
//! WebDriver protocol; tests substitute an in-memory page.

mod element;
mod selectors;
pub mod webdriver;

pub use element::{Element, Locator, Trigger};
pub use selectors::PageSelectors;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// A running browser instance.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Open the page (tab) that all subsequent navigation happens in.
    async fn new_page(&self) -> Result<Box<dyn Page>>;

    /// Shut the browser down and release everything it holds.
    async fn close(&mut self) -> Result<()>;
}

/// A single browser tab.
///
/// Element-level operations take a CSS selector plus the zero-based index of
/// the match, which is what [`Locator`] and [`Element`] build on.
#[async_trait]
pub trait Page: Send + Sync {
    /// Navigate and wait until the document has loaded.
    async fn goto(&self, url: &str, timeout: Duration) -> Result<()>;

    /// Wait until at least one visible element matches `selector`.
    ///
    /// Fails when the timeout elapses.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Number of elements currently matching `selector`.
    async fn count(&self, selector: &str) -> Result<usize>;

    /// Text content of the `index`-th match, `None` if absent.
    async fn text_content(&self, selector: &str, index: usize) -> Result<Option<String>>;

    /// Click the `index`-th match once it is visible, bounded by `timeout`.
    async fn click(&self, selector: &str, index: usize, timeout: Duration) -> Result<()>;

    /// Resolve when the next download begins.
    ///
    /// Downloads that were already in flight when this is first polled are
    /// not reported.
    async fn wait_for_download(&self, timeout: Duration) -> Result<Box<dyn DownloadHandle>>;
}

/// A download started by the page.
#[async_trait]
pub trait DownloadHandle: Send {
    /// File name proposed by the server.
    fn suggested_filename(&self) -> String;

    /// Wait for the download to finish and persist it at `path`.
    async fn save_as(&mut self, path: &Path) -> Result<()>;

    /// Release any temporary storage still held by the download.
    async fn delete(&mut self) -> Result<()>;
}
