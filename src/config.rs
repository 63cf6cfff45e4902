use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Never hit the detail endpoint faster than this on a live run.
pub const MIN_REQUEST_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub output_dir: String,
    pub leetcode_session: Option<String>,
    pub csrf_token: Option<String>,
    pub request_delay_ms: u64,
    pub keep_recent: usize,
    pub browser_cookies: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: ".".to_string(),
            leetcode_session: None,
            csrf_token: None,
            request_delay_ms: MIN_REQUEST_DELAY_MS,
            keep_recent: 5,
            browser_cookies: false,
        }
    }
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("leetscrape").join("config.toml"))
    }

    /// Load the config file, falling back to defaults when it does not exist,
    /// then apply `LEETCODE_SESSION` / `LEETCODE_CSRF` from the environment.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.is_file() => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                Self::from_toml(&text)
                    .with_context(|| format!("Failed to parse {}", path.display()))?
            }
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid config")
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(session) = lookup("LEETCODE_SESSION").filter(|s| !s.is_empty()) {
            self.leetcode_session = Some(session);
        }
        if let Some(csrf) = lookup("LEETCODE_CSRF").filter(|s| !s.is_empty()) {
            self.csrf_token = Some(csrf);
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.leetcode_session.as_ref().is_some_and(|s| !s.is_empty())
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir)
    }

    /// The configured delay, raised to the politeness floor.
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms.max(MIN_REQUEST_DELAY_MS))
    }
}
