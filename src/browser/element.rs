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

use super::Page;
use crate::error::Result;
use std::fmt;
use std::time::Duration;

/// Lazy query for every element matching a selector.
#[derive(Clone, Copy)]
pub struct Locator<'a> {
    page: &'a dyn Page,
    selector: &'a str,
}

impl<'a> Locator<'a> {
    pub fn new(page: &'a dyn Page, selector: &'a str) -> Self {
        Self { page, selector }
    }

    pub async fn count(&self) -> Result<usize> {
        self.page.count(self.selector).await
    }

    pub fn nth(&self, index: usize) -> Element<'a> {
        Element {
            page: self.page,
            selector: self.selector.to_string(),
            index,
        }
    }

    pub fn first(&self) -> Element<'a> {
        self.nth(0)
    }
}

/// The `index`-th element matching a selector.
///
/// The handle is resolved again on every call, so it stays valid across
/// re-renders of the page.
#[derive(Clone)]
pub struct Element<'a> {
    page: &'a dyn Page,
    selector: String,
    index: usize,
}

impl<'a> Element<'a> {
    pub async fn text_content(&self) -> Result<Option<String>> {
        self.page.text_content(&self.selector, self.index).await
    }

    pub async fn click(&self, timeout: Duration) -> Result<()> {
        self.page.click(&self.selector, self.index, timeout).await
    }
}

impl fmt::Debug for Element<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("selector", &self.selector)
            .field("index", &self.index)
            .finish()
    }
}

/// What gets clicked to start a download.
#[derive(Debug)]
pub enum Trigger<'a> {
    /// First element matching a page-level selector.
    Selector(String),
    /// An element that has already been located.
    Element(Element<'a>),
}

impl Trigger<'_> {
    pub async fn click(&self, page: &dyn Page, timeout: Duration) -> Result<()> {
        match self {
            Trigger::Selector(selector) => page.click(selector, 0, timeout).await,
            Trigger::Element(element) => element.click(timeout).await,
        }
    }
}
