//! CLI configuration file
//!
//! ```toml
//! token = "eyJhbGciOi..."
//! log_level = "info"
//!
//! [client]
//! display_name = "Front desk"
//! require_audio_permission = false
//! hang_up_for_everyone = false
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use voicedesk_client_core::ClientConfig;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Access token used when `init` is given none
    pub token: Option<String>,
    /// Log filter used when neither `--log-level` nor `RUST_LOG` is set
    pub log_level: Option<String>,
    pub client: ClientConfig,
}

impl CliConfig {
    /// `<config dir>/voicedesk/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("voicedesk").join("config.toml"))
    }

    /// Load `path`, or the default path when it exists. A missing default
    /// file yields the default configuration; a missing explicit file is an
    /// error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
