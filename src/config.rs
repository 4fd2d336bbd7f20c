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

//! Layered run configuration.
//!
//! Sources, lowest precedence first: built-in defaults, `config.toml` in the
//! configuration home, `EXTFETCH_*` environment variables, then command line
//! flags applied by the binary.

use crate::browser::PageSelectors;
use crate::browser::webdriver::LaunchOptions;
use crate::error::{ExtFetchError, Result};
use crate::marketplace::{DEFAULT_DROPDOWN_PROBE_TIMEOUT, FetchSettings};
use crate::models::PlatformSet;
use crate::platform::{host_platform, normalize_platform_code};
use config::{Config, Environment, File, FileFormat};
use log::debug;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE_NAME: &str = "config.toml";
const ENV_PREFIX: &str = "EXTFETCH";
const HOME_ENV: &str = "EXTFETCH_HOME";

pub const DEFAULT_MARKETPLACE_URL: &str = "https://marketplace.visualstudio.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;
pub const DEFAULT_LAUNCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Download destination; the user's download directory when unset
    pub output_dir: Option<PathBuf>,
    pub timeout_secs: u64,
    /// Requested platform codes; the host platform when empty
    pub platforms: Vec<String>,
    pub headless: bool,
    pub marketplace_url: String,
    pub webdriver_url: Option<String>,
    pub chromedriver_path: Option<PathBuf>,
    pub launch_timeout_secs: u64,
    pub dropdown_probe_timeout_secs: u64,
    pub fail_fast: bool,
    pub selectors: PageSelectors,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            platforms: Vec::new(),
            headless: true,
            marketplace_url: DEFAULT_MARKETPLACE_URL.to_string(),
            webdriver_url: None,
            chromedriver_path: None,
            launch_timeout_secs: DEFAULT_LAUNCH_TIMEOUT_SECS,
            dropdown_probe_timeout_secs: DEFAULT_DROPDOWN_PROBE_TIMEOUT.as_secs(),
            fail_fast: false,
            selectors: PageSelectors::default(),
        }
    }
}

/// Directory holding `config.toml`: `$EXTFETCH_HOME`, else the platform
/// configuration directory.
pub fn config_home() -> Option<PathBuf> {
    env::var_os(HOME_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::config_dir().map(|dir| dir.join("extfetch")))
}

impl FetchConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(config_home().as_deref())
    }

    /// Load defaults, `home/config.toml` if present, and the environment.
    pub fn load_from(home: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(home) = home {
            let path = home.join(CONFIG_FILE_NAME);
            debug!("Looking for config at {}", path.display());
            builder = builder.add_source(
                File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("platforms")
                .try_parsing(true),
        );

        let config: FetchConfig = builder.build()?.try_deserialize()?;
        debug!("Effective configuration: {config:?}");
        Ok(config)
    }

    /// Reject settings that would only fail once the browser is running.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("timeout_secs", self.timeout_secs),
            ("launch_timeout_secs", self.launch_timeout_secs),
            ("dropdown_probe_timeout_secs", self.dropdown_probe_timeout_secs),
        ] {
            if value == 0 {
                return Err(ExtFetchError::InvalidConfig(format!(
                    "{name} must be greater than zero"
                )));
            }
        }

        for code in &self.platforms {
            normalize_platform_code(code)?;
        }

        let blank = self.selectors.blank_fields();
        if !blank.is_empty() {
            return Err(ExtFetchError::InvalidConfig(format!(
                "empty selector(s): {}",
                blank.join(", ")
            )));
        }

        let url = self.marketplace_url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ExtFetchError::InvalidConfig(format!(
                "marketplace_url must be an http(s) URL, got '{url}'"
            )));
        }

        Ok(())
    }

    /// Requested platforms, falling back to the host platform.
    pub fn platform_set(&self) -> Result<PlatformSet> {
        if !self.platforms.is_empty() {
            return PlatformSet::parse(&self.platforms);
        }

        match host_platform() {
            Some(code) => {
                debug!("No platform requested, using host platform {code}");
                PlatformSet::new([code])
            }
            None => Err(ExtFetchError::InvalidConfig(
                "Host platform is not a marketplace target; pass --platform".to_string(),
            )),
        }
    }

    /// Output directory, falling back to the user's download directory and
    /// then the current directory.
    pub fn resolved_output_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.output_dir {
            return Ok(dir.clone());
        }
        match dirs::download_dir() {
            Some(dir) => Ok(dir),
            None => Ok(env::current_dir()?),
        }
    }

    pub fn fetch_settings(&self) -> Result<FetchSettings> {
        Ok(FetchSettings {
            output_dir: self.resolved_output_dir()?,
            timeout: Duration::from_secs(self.timeout_secs),
            dropdown_probe_timeout: Duration::from_secs(self.dropdown_probe_timeout_secs),
            platforms: self.platform_set()?,
            selectors: self.selectors.clone(),
        })
    }

    pub fn launch_options(&self) -> LaunchOptions {
        LaunchOptions {
            headless: self.headless,
            webdriver_url: self.webdriver_url.clone(),
            chromedriver_path: self.chromedriver_path.clone(),
            launch_timeout: Duration::from_secs(self.launch_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    struct EnvGuard {
        keys: Vec<&'static str>,
    }

    impl EnvGuard {
        fn set(vars: &[(&'static str, &str)]) -> Self {
            for (key, value) in vars {
                unsafe { env::set_var(key, value) };
            }
            Self {
                keys: vars.iter().map(|(key, _)| *key).collect(),
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for key in &self.keys {
                unsafe { env::remove_var(key) };
            }
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_sources() {
        let temp_dir = TempDir::new().unwrap();
        let config = FetchConfig::load_from(Some(temp_dir.path())).unwrap();

        assert_eq!(config, FetchConfig::default());
        assert_eq!(config.timeout_secs, 180);
        assert!(config.headless);
        assert!(!config.fail_fast);
        config.validate().unwrap();
    }

    #[test]
    #[serial]
    fn test_load_config_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            r#"
timeout_secs = 60
platforms = ["linux-x64", "darwin-arm64"]
fail_fast = true

[selectors]
download_button = "button.install"
"#,
        )
        .unwrap();

        let config = FetchConfig::load_from(Some(temp_dir.path())).unwrap();

        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.platforms, vec!["linux-x64", "darwin-arm64"]);
        assert!(config.fail_fast);
        assert_eq!(config.selectors.download_button, "button.install");
        // Unset selectors keep their defaults
        assert_eq!(
            config.selectors.variant_entry,
            PageSelectors::default().variant_entry
        );
    }

    #[test]
    #[serial]
    fn test_environment_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "timeout_secs = 60\n").unwrap();
        let _guard = EnvGuard::set(&[
            ("EXTFETCH_TIMEOUT_SECS", "15"),
            ("EXTFETCH_HEADLESS", "false"),
            ("EXTFETCH_PLATFORMS", "win32-x64,linux-arm64"),
            ("EXTFETCH_SELECTORS__PLATFORM_LIST", "#platforms"),
        ]);

        let config = FetchConfig::load_from(Some(temp_dir.path())).unwrap();

        assert_eq!(config.timeout_secs, 15);
        assert!(!config.headless);
        assert_eq!(config.platforms, vec!["win32-x64", "linux-arm64"]);
        assert_eq!(config.selectors.platform_list, "#platforms");
    }

    #[test]
    #[serial]
    fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "timeout_secs = [").unwrap();

        let err = FetchConfig::load_from(Some(temp_dir.path())).unwrap_err();
        assert!(matches!(err, ExtFetchError::ConfigError(_)));
    }

    #[test]
    #[serial]
    fn test_config_home_prefers_env() {
        let temp_dir = TempDir::new().unwrap();
        let home = temp_dir.path().to_string_lossy().to_string();
        let _guard = EnvGuard::set(&[("EXTFETCH_HOME", &home)]);

        assert_eq!(config_home(), Some(temp_dir.path().to_path_buf()));
    }

    #[test]
    fn test_validate_rejects_unknown_platform() {
        let config = FetchConfig {
            platforms: vec!["linux-x64".to_string(), "beos-x86".to_string()],
            ..Default::default()
        };

        match config.validate().unwrap_err() {
            ExtFetchError::InvalidPlatform { code, known } => {
                assert_eq!(code, "beos-x86");
                assert!(known.contains(&"linux-x64".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = FetchConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ExtFetchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_blank_selector() {
        let mut config = FetchConfig::default();
        config.selectors.variant_toggle = "  ".to_string();

        match config.validate().unwrap_err() {
            ExtFetchError::InvalidConfig(message) => assert!(message.contains("variant_toggle")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_non_http_marketplace() {
        let config = FetchConfig {
            marketplace_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_platform_set_normalizes_codes() {
        let config = FetchConfig {
            platforms: vec!["Linux-X64".to_string(), "linux-x64".to_string()],
            ..Default::default()
        };
        let set = config.platform_set().unwrap();
        assert_eq!(set.codes(), &["linux-x64".to_string()]);
    }

    #[test]
    fn test_platform_set_defaults_to_host() {
        let config = FetchConfig::default();
        match host_platform() {
            Some(code) => assert!(config.platform_set().unwrap().contains(&code)),
            None => assert!(config.platform_set().is_err()),
        }
    }

    #[test]
    fn test_fetch_settings_and_launch_options() {
        let temp_dir = TempDir::new().unwrap();
        let config = FetchConfig {
            output_dir: Some(temp_dir.path().to_path_buf()),
            timeout_secs: 42,
            platforms: vec!["web".to_string()],
            headless: false,
            webdriver_url: Some("http://localhost:4444".to_string()),
            ..Default::default()
        };

        let settings = config.fetch_settings().unwrap();
        assert_eq!(settings.output_dir, temp_dir.path());
        assert_eq!(settings.timeout, Duration::from_secs(42));
        assert!(settings.platforms.contains("web"));

        let options = config.launch_options();
        assert!(!options.headless);
        assert_eq!(options.webdriver_url.as_deref(), Some("http://localhost:4444"));
        assert_eq!(options.launch_timeout, Duration::from_secs(30));
    }
}
