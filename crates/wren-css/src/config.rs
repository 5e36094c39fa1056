//! Engine configuration.
//!
//! There is no layout, so media features are answered from a configured
//! virtual viewport. Every field has a default and a JSON document only
//! needs to name the fields it changes:
//!
//! ```json
//! { "viewport": { "width": 375, "height": 667 }, "prefers_color_scheme": "dark" }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading an [`EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// The file that was requested.
        path: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The text is not a valid configuration document.
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Size of the virtual viewport, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    /// Width in CSS pixels.
    pub width: f64,
    /// Height in CSS pixels.
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 768.0,
        }
    }
}

/// [Media Queries 5 § 12.5 prefers-color-scheme](https://www.w3.org/TR/mediaqueries-5/#prefers-color-scheme)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    /// "Indicates that user has notified that they prefer an interface that
    /// has a light theme, or has not expressed an active preference."
    #[default]
    Light,
    /// "Indicates that user has notified that they prefer an interface that
    /// has a dark theme."
    Dark,
}

impl ColorScheme {
    /// The keyword used in media queries.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Everything the engine needs to know about its environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Virtual viewport used by `@media` and `@container` conditions.
    pub viewport: Viewport,
    /// [Media Queries § 2.3 Media types](https://www.w3.org/TR/mediaqueries-4/#media-types)
    pub media_type: String,
    /// Answer for `prefers-color-scheme`.
    pub prefers_color_scheme: ColorScheme,
    /// Answer for `resolution` (dppx).
    pub device_pixel_ratio: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            media_type: "screen".to_string(),
            prefers_color_scheme: ColorScheme::default(),
            device_pixel_ratio: 1.0,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON configuration document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] if the text is not valid JSON for this type.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a JSON configuration file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, [`ConfigError::Parse`]
    /// if its contents are invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.viewport.width, 1024.0);
        assert_eq!(config.viewport.height, 768.0);
        assert_eq!(config.media_type, "screen");
        assert_eq!(config.prefers_color_scheme, ColorScheme::Light);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            EngineConfig::from_json(r#"{ "viewport": { "width": 375 }, "prefers_color_scheme": "dark" }"#)
                .unwrap();
        assert_eq!(config.viewport.width, 375.0);
        assert_eq!(config.viewport.height, 768.0);
        assert_eq!(config.prefers_color_scheme, ColorScheme::Dark);
        assert_eq!(config.device_pixel_ratio, 1.0);
    }

    #[test]
    fn test_invalid_json() {
        let err = EngineConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("invalid config:"));
    }
}
