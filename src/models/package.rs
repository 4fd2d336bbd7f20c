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

use std::fmt;

/// A marketplace package identifier together with its detail page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    id: String,
    url: String,
}

impl Package {
    /// Resolve `id` against the marketplace base URL.
    pub fn new(id: impl Into<String>, marketplace_url: &str) -> Self {
        let id = id.into();
        let url = format!(
            "{}/items?itemName={}",
            marketplace_url.trim_end_matches('/'),
            id
        );
        Self { id, url }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}
