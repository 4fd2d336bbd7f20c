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

//! Chrome over WebDriver, via fantoccini.

mod capabilities;
mod driver_process;
mod staging;

pub use capabilities::chrome_capabilities;
pub use driver_process::ChromeDriverProcess;
pub use staging::{DownloadStaging, StagedDownload};

use crate::browser::{Browser, DownloadHandle, Page};
use crate::error::{ExtFetchError, Result};
use async_trait::async_trait;
use fantoccini::elements::Element as WebElement;
use fantoccini::{Client, ClientBuilder, Locator};
use log::{debug, info, trace, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep};

const ELEMENT_POLL_INTERVAL: Duration = Duration::from_millis(100);
const CONNECT_RETRY_INTERVAL: Duration = Duration::from_millis(250);

/// How to obtain a browser session.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Show the browser window instead of running headless.
    pub headless: bool,
    /// Existing WebDriver endpoint. When unset, chromedriver is spawned.
    pub webdriver_url: Option<String>,
    /// chromedriver binary; looked up in `PATH` when unset.
    pub chromedriver_path: Option<PathBuf>,
    /// Upper bound for the WebDriver session to come up.
    pub launch_timeout: Duration,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            webdriver_url: None,
            chromedriver_path: None,
            launch_timeout: Duration::from_secs(30),
        }
    }
}

pub struct WebDriverBrowser {
    client: Option<Client>,
    driver: Option<ChromeDriverProcess>,
    staging: Arc<DownloadStaging>,
}

impl WebDriverBrowser {
    /// Start (or attach to) a WebDriver server and open a Chrome session.
    pub async fn launch(options: &LaunchOptions) -> Result<Self> {
        let staging = Arc::new(DownloadStaging::new()?);

        let (driver, url) = match &options.webdriver_url {
            Some(url) => (None, url.clone()),
            None => {
                let driver = ChromeDriverProcess::spawn(options.chromedriver_path.as_deref())?;
                let url = driver.url();
                (Some(driver), url)
            }
        };

        let capabilities = chrome_capabilities(options.headless, staging.path());
        let client = connect(&url, capabilities, options.launch_timeout).await?;
        info!(
            "Browser session started ({})",
            if options.headless { "headless" } else { "headed" }
        );

        Ok(Self {
            client: Some(client),
            driver,
            staging,
        })
    }
}

async fn connect(
    url: &str,
    capabilities: serde_json::Map<String, serde_json::Value>,
    timeout: Duration,
) -> Result<Client> {
    let deadline = Instant::now() + timeout;
    let mut builder = ClientBuilder::rustls()
        .map_err(|e| ExtFetchError::BrowserLaunch(format!("TLS setup failed: {e}")))?;
    builder.capabilities(capabilities);

    loop {
        match builder.connect(url).await {
            Ok(client) => return Ok(client),
            Err(e) if Instant::now() < deadline => {
                // A freshly spawned chromedriver needs a moment before it listens
                trace!("WebDriver at {url} not ready yet: {e}");
                sleep(CONNECT_RETRY_INTERVAL).await;
            }
            Err(e) => {
                return Err(ExtFetchError::BrowserLaunch(format!(
                    "Could not start a session at {url}: {e}"
                )));
            }
        }
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn new_page(&self) -> Result<Box<dyn Page>> {
        let client = self
            .client
            .clone()
            .ok_or_else(|| ExtFetchError::WebDriver("browser already closed".to_string()))?;
        Ok(Box::new(WebDriverPage {
            client,
            staging: Arc::clone(&self.staging),
        }))
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(client) = self.client.take()
            && let Err(e) = client.close().await
        {
            warn!("Failed to close browser session: {e}");
        }
        if let Some(mut driver) = self.driver.take() {
            driver.shutdown().await;
        }
        debug!("Browser closed");
        Ok(())
    }
}

pub struct WebDriverPage {
    client: Client,
    staging: Arc<DownloadStaging>,
}

impl WebDriverPage {
    async fn find_all(&self, selector: &str) -> Result<Vec<WebElement>> {
        trace!("find_all {selector}");
        Ok(self.client.find_all(Locator::Css(selector)).await?)
    }

    /// The `index`-th match of `selector` if it is displayed right now.
    async fn displayed(&self, selector: &str, index: usize) -> Result<Option<WebElement>> {
        let Some(element) = self.find_all(selector).await?.into_iter().nth(index) else {
            return Ok(None);
        };
        // Stale elements count as not displayed
        let visible = element.is_displayed().await.unwrap_or(false);
        Ok(visible.then_some(element))
    }
}

fn timed_out(what: &str, timeout: Duration) -> ExtFetchError {
    ExtFetchError::WebDriver(format!("{what} timed out after {timeout:?}"))
}

#[async_trait]
impl Page for WebDriverPage {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<()> {
        debug!("Navigating to {url}");
        tokio::time::timeout(timeout, self.client.goto(url))
            .await
            .map_err(|_| timed_out(&format!("loading {url}"), timeout))??;
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            for element in self.find_all(selector).await? {
                if element.is_displayed().await.unwrap_or(false) {
                    return Ok(());
                }
            }
            if Instant::now() >= deadline {
                return Err(timed_out(&format!("waiting for '{selector}'"), timeout));
            }
            sleep(ELEMENT_POLL_INTERVAL).await;
        }
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        Ok(self.find_all(selector).await?.len())
    }

    async fn text_content(&self, selector: &str, index: usize) -> Result<Option<String>> {
        match self.find_all(selector).await?.into_iter().nth(index) {
            Some(element) => Ok(element.prop("textContent").await?),
            None => Ok(None),
        }
    }

    async fn click(&self, selector: &str, index: usize, timeout: Duration) -> Result<()> {
        let attempt = async {
            loop {
                if let Some(element) = self.displayed(selector, index).await? {
                    element.click().await?;
                    return Ok::<(), ExtFetchError>(());
                }
                sleep(ELEMENT_POLL_INTERVAL).await;
            }
        };

        tokio::time::timeout(timeout, attempt)
            .await
            .map_err(|_| timed_out(&format!("clicking '{selector}' #{index}"), timeout))?
    }

    async fn wait_for_download(&self, timeout: Duration) -> Result<Box<dyn DownloadHandle>> {
        // Taken on first poll, before the click that triggers the download
        let known = self.staging.snapshot()?;
        let download = self.staging.wait_for_new(&known, timeout).await?;
        Ok(Box::new(download))
    }
}
