//! Engine configuration
//!
//! ```toml
//! timestamp_format = "%d %b %Y %H:%M UTC"
//!
//! [embed]
//! placement = "appended_page"
//! font_size = 9.0
//! signature_display = { mode = "truncated", chars = 80 }
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use shared_pdf::EmbedConfig;
use std::fs;
use std::path::Path;

pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Layout of the embedded signature block
    pub embed: EmbedConfig,
    /// chrono format string for the block's Date line, rendered in UTC
    pub timestamp_format: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            embed: EmbedConfig::default(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }
}
