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

//! Inspection of what a package page offers.

use crate::browser::{Locator, Page, PageSelectors};
use crate::error::Result;
use crate::models::{MatchPolicy, PlatformSet};
use log::trace;

/// Marker for builds that run on every platform.
pub const UNIVERSAL_MARKER: &str = "universal";

/// A page has platform variants iff exactly one variant toggle is present.
///
/// Zero toggles is a single-build page. More than one means the page layout
/// is not the one this tool understands, which is treated the same way.
pub async fn has_multiple_builds(page: &dyn Page, selectors: &PageSelectors) -> Result<bool> {
    let toggles = Locator::new(page, &selectors.variant_toggle).count().await?;
    trace!("variant toggles on page: {toggles}");
    Ok(toggles == 1)
}

/// Whether the page's advertised platforms cover `requested` under `policy`.
///
/// A page without a platform list never matches.
pub async fn satisfies_platforms(
    page: &dyn Page,
    selectors: &PageSelectors,
    requested: &PlatformSet,
    policy: MatchPolicy,
) -> Result<bool> {
    let text = Locator::new(page, &selectors.platform_list)
        .first()
        .text_content()
        .await?;

    Ok(match text {
        Some(text) => text_satisfies(&text, requested, policy),
        None => false,
    })
}

/// Substring matching of platform codes against advertised text.
///
/// Codes are short tokens that appear verbatim in the page's descriptive
/// text, so containment is the intended test.
pub fn text_satisfies(text: &str, requested: &PlatformSet, policy: MatchPolicy) -> bool {
    let text = text.to_lowercase();
    if text.contains(UNIVERSAL_MARKER) {
        return true;
    }

    match policy {
        MatchPolicy::All => requested.iter().all(|code| text.contains(code)),
        MatchPolicy::Any => requested.iter().any(|code| text.contains(code)),
    }
}
