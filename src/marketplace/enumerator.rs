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

use crate::browser::{Locator, Page, PageSelectors};
use crate::error::{ExtFetchError, Result};
use crate::models::{PlatformSet, VariantTask};
use log::{debug, trace};
use std::time::Duration;

/// Default bound for checking whether the variant list is showing.
pub const DEFAULT_DROPDOWN_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Make sure the variant entries are visible, expanding the list if needed.
///
/// A timeout on the first check only means "not open". Entries still missing
/// after the download button was clicked is an [`ExtFetchError::InternalConsistency`].
pub async fn ensure_dropdown_open(
    page: &dyn Page,
    selectors: &PageSelectors,
    probe_timeout: Duration,
) -> Result<()> {
    if page
        .wait_for_selector(&selectors.variant_entry, probe_timeout)
        .await
        .is_ok()
    {
        trace!("variant list already open");
        return Ok(());
    }

    debug!("variant list closed, expanding");
    page.click(&selectors.download_button, 0, probe_timeout).await?;

    page.wait_for_selector(&selectors.variant_entry, probe_timeout)
        .await
        .map_err(|e| {
            ExtFetchError::InternalConsistency(format!(
                "variant list did not open after clicking '{}': {e}",
                selectors.download_button
            ))
        })
}

/// List the dropdown entries whose name is one of the requested platforms.
///
/// Entries are compared by exact, lower-cased name and returned in page
/// order.
pub async fn enumerate(
    page: &dyn Page,
    selectors: &PageSelectors,
    requested: &PlatformSet,
    probe_timeout: Duration,
) -> Result<Vec<VariantTask>> {
    ensure_dropdown_open(page, selectors, probe_timeout).await?;

    let entries = Locator::new(page, &selectors.variant_entry);
    let count = entries.count().await?;
    let mut tasks = Vec::new();

    for position in 0..count {
        let Some(text) = entries.nth(position).text_content().await? else {
            continue;
        };
        let name = text.trim().to_lowercase();
        if requested.contains(&name) {
            tasks.push(VariantTask::new(position, name));
        } else {
            trace!("skipping variant #{position} '{name}'");
        }
    }

    debug!("{} of {count} variants requested", tasks.len());
    Ok(tasks)
}
