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

use crate::browser::{Page, PageSelectors};
use crate::error::{ExtFetchError, Result};
use crate::models::Package;
use log::debug;
use std::time::Duration;

/// Open the package's detail page and wait for its download button.
pub async fn navigate(
    page: &dyn Page,
    package: &Package,
    selectors: &PageSelectors,
    timeout: Duration,
) -> Result<()> {
    let navigation_error = |e: ExtFetchError| ExtFetchError::Navigation {
        package: package.id().to_string(),
        reason: e.to_string(),
    };

    page.goto(package.url(), timeout)
        .await
        .map_err(navigation_error)?;
    page.wait_for_selector(&selectors.download_button, timeout)
        .await
        .map_err(navigation_error)?;

    debug!("{package}: detail page ready");
    Ok(())
}
