//! Layout options for the embedded signature block

use serde::{Deserialize, Serialize};

/// Where the block is drawn in a PDF
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Bottom band of the existing last page
    #[default]
    LastPageBottom,
    /// A new blank page (same MediaBox) appended after the last page
    AppendedPage,
}

/// How much of the signature is rendered into the block.
///
/// Whatever is rendered is for people to read. Verification always takes
/// the signature from the caller, never from the document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SignatureDisplay {
    #[default]
    Full,
    /// First `chars` base64 characters followed by `...`
    Truncated { chars: usize },
}

/// Embedding configuration, loadable from TOML
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbedConfig {
    pub placement: Placement,
    pub signature_display: SignatureDisplay,
    /// Points from the left edge of the MediaBox
    pub margin_left: f64,
    /// Points from the right edge; the block wraps inside this width
    pub margin_right: f64,
    /// Points from the bottom edge to the last baseline
    pub margin_bottom: f64,
    pub font_size: f64,
    pub line_height: f64,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            placement: Placement::default(),
            signature_display: SignatureDisplay::default(),
            margin_left: 50.0,
            margin_right: 50.0,
            margin_bottom: 36.0,
            font_size: 10.0,
            line_height: 12.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let config = EmbedConfig::default();
        assert_eq!(config.placement, Placement::LastPageBottom);
        assert_eq!(config.signature_display, SignatureDisplay::Full);
        assert_eq!(config.margin_left, 50.0);
        assert_eq!(config.font_size, 10.0);
        assert_eq!(config.line_height, 12.0);
    }
}
