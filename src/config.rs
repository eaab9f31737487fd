use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::extractor::ListingSelectors;
use crate::fetch::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};

const CONFIG_FILE: &str = "config.yml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Relative paths resolve against the root
    pub data_dir: PathBuf,
    pub recommend_limit: usize,
    pub fetch: FetchSettings,
    pub selectors: ListingSelectors,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            recommend_limit: 5,
            fetch: FetchSettings::default(),
            selectors: ListingSelectors::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchSettings {
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Settings {
    /// Load `{root}/config.yml`; a missing file means defaults.
    pub fn load(root: &str) -> Result<Self> {
        let path = PathBuf::from(root).join(CONFIG_FILE);

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse settings YAML {:?}", path))?;

        Ok(settings)
    }

    pub fn data_dir(&self, root: &str) -> PathBuf {
        if self.data_dir.is_absolute() {
            self.data_dir.clone()
        } else {
            Path::new(root).join(&self.data_dir)
        }
    }
}
