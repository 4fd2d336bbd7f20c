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

use crate::browser::{Page, Trigger};
use crate::error::{ExtFetchError, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

const FALLBACK_FILENAME: &str = "download.vsix";

/// Click `trigger` and save the download it starts into `output_dir`.
///
/// The download listener and the click are driven together and both must
/// succeed. Returns the path the file was saved to.
pub async fn click_and_download(
    label: &str,
    page: &dyn Page,
    timeout: Duration,
    trigger: &Trigger<'_>,
    output_dir: &Path,
) -> Result<PathBuf> {
    debug!("{label}: clicking {trigger:?}");

    // The listener future is polled first so it is armed before the click lands
    let (mut download, ()) = tokio::try_join!(
        page.wait_for_download(timeout),
        trigger.click(page, timeout),
    )
    .map_err(|e| ExtFetchError::Download {
        label: label.to_string(),
        reason: e.to_string(),
    })?;

    let target = output_dir.join(sanitize_filename(&download.suggested_filename()));
    let saved = download.save_as(&target).await;

    if let Err(e) = download.delete().await {
        warn!("{label}: failed to release temporary download: {e}");
    }

    saved.map_err(|e| ExtFetchError::Download {
        label: label.to_string(),
        reason: e.to_string(),
    })?;
    info!("{label}: saved {}", target.display());
    Ok(target)
}

/// Keep only the final path component of a server-suggested name.
fn sanitize_filename(suggested: &str) -> String {
    let name = suggested
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." || name == ".." {
        FALLBACK_FILENAME.to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::Locator;
    use crate::test::fixtures::{FakePage, SINGLE_BUILD_FILE};
    use tempfile::TempDir;

    const TIMEOUT: Duration = Duration::from_millis(200);

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("ext-1.0.vsix"), "ext-1.0.vsix");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("dir\\ext.vsix"), "ext.vsix");
        assert_eq!(sanitize_filename(".."), FALLBACK_FILENAME);
        assert_eq!(sanitize_filename(""), FALLBACK_FILENAME);
    }

    #[tokio::test]
    async fn test_download_with_selector_trigger() {
        let page = FakePage::single_build("linux-x64");
        let output = TempDir::new().unwrap();
        let trigger = Trigger::Selector(page.selectors().download_button);

        let path = click_and_download("pub.ext", &page, TIMEOUT, &trigger, output.path())
            .await
            .unwrap();

        assert_eq!(path, output.path().join(SINGLE_BUILD_FILE));
        assert!(path.exists());
        assert_eq!(page.deleted_downloads(), 1);
    }

    #[tokio::test]
    async fn test_download_with_element_trigger() {
        let page = FakePage::multi_build("linux-x64", &["win32-x64", "linux-x64"])
            .with_dropdown_open();
        let selectors = page.selectors();
        let output = TempDir::new().unwrap();
        let trigger = Trigger::Element(Locator::new(&page, &selectors.variant_entry).nth(1));

        let path = click_and_download("pub.ext", &page, TIMEOUT, &trigger, output.path())
            .await
            .unwrap();

        assert_eq!(
            path.file_name().unwrap(),
            "publisher.ext-1.0.0@linux-x64.vsix"
        );
        assert_eq!(page.clicks(), vec![(selectors.variant_entry.clone(), 1)]);
    }

    #[tokio::test]
    async fn test_click_failure_is_download_error() {
        let page = FakePage::single_build("linux-x64").failing_click();
        let output = TempDir::new().unwrap();
        let trigger = Trigger::Selector(page.selectors().download_button);

        let err = click_and_download("pub.ext", &page, TIMEOUT, &trigger, output.path())
            .await
            .unwrap_err();

        match err {
            ExtFetchError::Download { label, .. } => assert_eq!(label, "pub.ext"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(page.saved_files().is_empty());
    }

    #[tokio::test]
    async fn test_missing_download_event_is_download_error() {
        let page = FakePage::single_build("linux-x64").without_download();
        let output = TempDir::new().unwrap();
        let trigger = Trigger::Selector(page.selectors().download_button);

        let err = click_and_download("pub.ext", &page, TIMEOUT, &trigger, output.path())
            .await
            .unwrap_err();

        assert!(matches!(err, ExtFetchError::Download { .. }));
        assert!(page.saved_files().is_empty());
        assert_eq!(page.deleted_downloads(), 0);
    }

    #[tokio::test]
    async fn test_download_released_when_save_fails() {
        let page = FakePage::single_build("linux-x64").failing_save();
        let output = TempDir::new().unwrap();
        let trigger = Trigger::Selector(page.selectors().download_button);

        let err = click_and_download("pub.ext", &page, TIMEOUT, &trigger, output.path())
            .await
            .unwrap_err();

        match err {
            ExtFetchError::Download { label, .. } => assert_eq!(label, "pub.ext"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(page.deleted_downloads(), 1);
    }
}
