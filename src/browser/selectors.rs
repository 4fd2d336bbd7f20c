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

use serde::{Deserialize, Serialize};

const DEFAULT_DOWNLOAD_BUTTON: &str = ".ux-item-download button.ms-Button--primary";
const DEFAULT_VARIANT_TOGGLE: &str = ".ux-item-download button.ms-Button--icon";
const DEFAULT_VARIANT_ENTRY: &str = ".ms-ContextualMenu-list .ms-ContextualMenu-itemText";
const DEFAULT_PLATFORM_LIST: &str = ".ux-item-platforms";

/// CSS selectors describing the parts of a package page that are used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSelectors {
    /// Primary download affordance. Also expands the variant list on
    /// multi-build pages.
    #[serde(default = "default_download_button")]
    pub download_button: String,

    /// Affordance that reveals the variant dropdown; only present on
    /// multi-build pages.
    #[serde(default = "default_variant_toggle")]
    pub variant_toggle: String,

    /// Name label of each entry in the variant dropdown.
    #[serde(default = "default_variant_entry")]
    pub variant_entry: String,

    /// Element whose text lists the platforms a package supports.
    #[serde(default = "default_platform_list")]
    pub platform_list: String,
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            download_button: default_download_button(),
            variant_toggle: default_variant_toggle(),
            variant_entry: default_variant_entry(),
            platform_list: default_platform_list(),
        }
    }
}

impl PageSelectors {
    /// Names of selectors that are blank.
    pub fn blank_fields(&self) -> Vec<&'static str> {
        [
            ("download_button", &self.download_button),
            ("variant_toggle", &self.variant_toggle),
            ("variant_entry", &self.variant_entry),
            ("platform_list", &self.platform_list),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

fn default_download_button() -> String {
    DEFAULT_DOWNLOAD_BUTTON.to_string()
}

fn default_variant_toggle() -> String {
    DEFAULT_VARIANT_TOGGLE.to_string()
}

fn default_variant_entry() -> String {
    DEFAULT_VARIANT_ENTRY.to_string()
}

fn default_platform_list() -> String {
    DEFAULT_PLATFORM_LIST.to_string()
}
