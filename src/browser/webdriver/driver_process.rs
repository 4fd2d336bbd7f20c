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

use crate::error::{ExtFetchError, Result};
use log::{debug, warn};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, Command};

const CHROMEDRIVER_BINARY: &str = "chromedriver";

/// A chromedriver child process listening on a local port.
///
/// The process is killed when the value is dropped.
pub struct ChromeDriverProcess {
    child: Child,
    port: u16,
}

impl ChromeDriverProcess {
    /// Start chromedriver, either from `binary` or from `PATH`.
    pub fn spawn(binary: Option<&Path>) -> Result<Self> {
        let binary = locate_chromedriver(binary)?;
        let port = free_local_port()?;

        debug!("Starting {} on port {port}", binary.display());
        let child = Command::new(&binary)
            .arg(format!("--port={port}"))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ExtFetchError::BrowserLaunch(format!(
                    "Failed to start {}: {e}",
                    binary.display()
                ))
            })?;

        Ok(Self { child, port })
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub async fn shutdown(&mut self) {
        if let Err(e) = self.child.kill().await {
            warn!("Failed to stop chromedriver: {e}");
        }
    }
}

fn locate_chromedriver(binary: Option<&Path>) -> Result<PathBuf> {
    match binary {
        Some(path) if path.is_file() => Ok(path.to_path_buf()),
        Some(path) => Err(ExtFetchError::BrowserLaunch(format!(
            "chromedriver not found at {}",
            path.display()
        ))),
        None => which::which(CHROMEDRIVER_BINARY).map_err(|e| {
            ExtFetchError::BrowserLaunch(format!("{CHROMEDRIVER_BINARY} not found in PATH: {e}"))
        }),
    }
}

fn free_local_port() -> Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_free_local_port() {
        let port = free_local_port().unwrap();
        assert!(port > 0);
    }

    #[test]
    fn test_locate_missing_explicit_binary() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("chromedriver");
        let err = locate_chromedriver(Some(&missing)).unwrap_err();
        assert!(matches!(err, ExtFetchError::BrowserLaunch(_)));
    }

    #[test]
    fn test_locate_explicit_binary() {
        let temp_dir = TempDir::new().unwrap();
        let binary = temp_dir.path().join("chromedriver");
        std::fs::write(&binary, b"").unwrap();
        assert_eq!(locate_chromedriver(Some(&binary)).unwrap(), binary);
    }
}
