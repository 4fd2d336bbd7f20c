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

use serde_json::{Map, Value, json};
use std::path::Path;

const WINDOW_SIZE: &str = "--window-size=1366,900";

/// Chrome session capabilities that route every download into `download_dir`.
pub fn chrome_capabilities(headless: bool, download_dir: &Path) -> Map<String, Value> {
    let mut args = vec![WINDOW_SIZE, "--disable-dev-shm-usage", "--no-first-run"];
    if headless {
        args.push("--headless=new");
    }

    let capabilities = json!({
        "browserName": "chrome",
        "goog:chromeOptions": {
            "args": args,
            "prefs": {
                "download.default_directory": download_dir.to_string_lossy(),
                "download.prompt_for_download": false,
                "download.directory_upgrade": true,
                "safebrowsing.enabled": true,
            },
        },
    });

    match capabilities {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
