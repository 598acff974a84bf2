//! Options consumed by the scanner, merge engine and cache.
//!
//! Loaded from `config.toml` in the user's config directory.

use crate::error::{Error, Result};
use crate::types::MergeMethod;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory name inside the platform config directory.
const CONFIG_DIR: &str = "dependabot-helper";

/// Filename for options.
const CONFIG_FILE: &str = "config.toml";

/// GitHub caps `per_page` at this value.
const MAX_PAGE_SIZE: u8 = 100;

/// Runtime options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Options {
    /// Long cache lifetime, for near-static data
    pub cache_lifetime_secs: u64,
    /// Short cache lifetime, for volatile data; also the cache floor
    pub short_cache_lifetime_secs: u64,
    /// Bypass the cache for every lookup
    pub disable_caching: bool,
    /// List forked repositories
    pub include_forks: bool,
    /// List private repositories
    pub include_private: bool,
    /// Labels the bot issues must carry
    pub labels: Vec<String>,
    /// Preferred merge methods, most preferred first
    pub merge_preferences: Vec<MergeMethod>,
    /// Wait before each merge retry, in milliseconds
    pub merge_retry_waits_ms: Vec<u64>,
    /// Issues per page when listing bot issues
    pub page_size: u8,
    /// Maximum pages of issues to read per creator
    pub page_count: u32,
    /// Logins of the bots whose pull requests are managed
    pub creators: Vec<String>,
    /// GitHub Enterprise host (None for github.com)
    pub api_host: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            cache_lifetime_secs: 3600,
            short_cache_lifetime_secs: 30,
            disable_caching: false,
            include_forks: false,
            include_private: true,
            labels: vec!["dependencies".to_string()],
            merge_preferences: Vec::new(),
            merge_retry_waits_ms: vec![2000, 4000, 8000],
            page_size: MAX_PAGE_SIZE,
            page_count: 3,
            creators: vec!["dependabot[bot]".to_string()],
            api_host: None,
        }
    }
}

impl Options {
    /// Long cache lifetime
    pub const fn cache_lifetime(&self) -> Duration {
        Duration::from_secs(self.cache_lifetime_secs)
    }

    /// Short cache lifetime
    pub const fn short_cache_lifetime(&self) -> Duration {
        Duration::from_secs(self.short_cache_lifetime_secs)
    }

    /// Merge retry wait schedule
    pub fn merge_retry_waits(&self) -> Vec<Duration> {
        self.merge_retry_waits_ms
            .iter()
            .copied()
            .map(Duration::from_millis)
            .collect()
    }

    /// Reject option combinations the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(Error::Config(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.page_size
            )));
        }
        if self.page_count == 0 {
            return Err(Error::Config("page_count must be at least 1".to_string()));
        }
        if self.creators.is_empty() {
            return Err(Error::Config(
                "at least one bot creator login is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default path of the options file, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load options from disk.
///
/// Returns default options if the file doesn't exist.
pub fn load_options(path: &Path) -> Result<Options> {
    if !path.exists() {
        return Ok(Options::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

    parse_options(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
}

/// Parse and validate options from TOML text.
pub fn parse_options(content: &str) -> Result<Options> {
    let options: Options =
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
    options.validate()?;
    Ok(options)
}
