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

//! Platform detection and the marketplace's platform-code table.
//!
//! The marketplace publishes platform-specific builds under target codes of
//! the form `<os>-<arch>` (e.g. `linux-x64`, `darwin-arm64`). This module maps
//! the running host onto one of those codes and validates user-supplied codes.

use crate::error::{ExtFetchError, Result};
use std::sync::OnceLock;

/// Every platform code the marketplace is known to publish builds for.
pub const KNOWN_PLATFORMS: &[&str] = &[
    "win32-x64",
    "win32-arm64",
    "linux-x64",
    "linux-arm64",
    "linux-armhf",
    "alpine-x64",
    "alpine-arm64",
    "darwin-x64",
    "darwin-arm64",
    "web",
];

// Platform-specific OS naming used by the marketplace
#[cfg(all(target_os = "linux", target_env = "musl"))]
const PLATFORM_OS: &str = "alpine";

#[cfg(all(target_os = "linux", not(target_env = "musl")))]
const PLATFORM_OS: &str = "linux";

#[cfg(target_os = "macos")]
const PLATFORM_OS: &str = "darwin";

#[cfg(target_os = "windows")]
const PLATFORM_OS: &str = "win32";

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
const PLATFORM_OS: &str = "unknown";

/// Cached host platform code to avoid rebuilding the string.
static CACHED_PLATFORM: OnceLock<Option<String>> = OnceLock::new();

/// Detect the current system architecture using marketplace naming.
///
/// - `x86_64` → `"x64"`
/// - `aarch64` → `"arm64"`
/// - `arm` → `"armhf"`
/// - Others → `"unknown"`
pub fn get_current_architecture() -> &'static str {
    #[cfg(target_arch = "x86_64")]
    return "x64";

    #[cfg(target_arch = "aarch64")]
    return "arm64";

    #[cfg(target_arch = "arm")]
    return "armhf";

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "arm")))]
    return "unknown";
}

/// Detect the current operating system using marketplace naming.
pub fn get_current_os() -> &'static str {
    PLATFORM_OS
}

/// Platform code of the running host, if the marketplace publishes builds for it.
pub fn host_platform() -> Option<String> {
    CACHED_PLATFORM
        .get_or_init(|| {
            let code = format!("{}-{}", get_current_os(), get_current_architecture());
            is_known_platform(&code).then_some(code)
        })
        .clone()
}

/// Case-insensitive membership test against [`KNOWN_PLATFORMS`].
pub fn is_known_platform(code: &str) -> bool {
    KNOWN_PLATFORMS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(code.trim()))
}

/// Lower-case and validate a user-supplied platform code.
pub fn normalize_platform_code(code: &str) -> Result<String> {
    let normalized = code.trim().to_lowercase();
    if is_known_platform(&normalized) {
        Ok(normalized)
    } else {
        Err(ExtFetchError::InvalidPlatform {
            code: code.to_string(),
            known: KNOWN_PLATFORMS.iter().map(|s| s.to_string()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_os_constant() {
        assert!(["alpine", "linux", "darwin", "win32", "unknown"].contains(&PLATFORM_OS));
    }

    #[test]
    fn test_host_platform_is_known_when_detected() {
        if let Some(code) = host_platform() {
            assert!(KNOWN_PLATFORMS.contains(&code.as_str()));
            assert!(code.starts_with(get_current_os()));
        }
    }

    #[test]
    fn test_normalize_platform_code() {
        assert_eq!(normalize_platform_code("Linux-X64").unwrap(), "linux-x64");
        assert_eq!(normalize_platform_code(" darwin-arm64 ").unwrap(), "darwin-arm64");
    }

    #[test]
    fn test_normalize_rejects_unknown_code() {
        let err = normalize_platform_code("solaris-sparc").unwrap_err();
        match err {
            ExtFetchError::InvalidPlatform { code, known } => {
                assert_eq!(code, "solaris-sparc");
                assert_eq!(known.len(), KNOWN_PLATFORMS.len());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_universal_is_not_a_requestable_code() {
        assert!(!is_known_platform("universal"));
    }
}
