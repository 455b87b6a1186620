//! Combined settings file for the command-line tool
//!
//! ```toml
//! [analytics]
//! parity_strike_band = 50.0
//!
//! [analytics.market]
//! r = 0.045
//!
//! [client]
//! base_url = "http://localhost:8000"
//! timeout_secs = 10
//! ```
//!
//! Every table and key is optional.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::chain::config::AnalyticsConfig;
use crate::client::ClientConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

impl Settings {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(s).context("Failed to parse settings")?;
        settings.analytics.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        Self::from_toml_str(&text)
    }
}
