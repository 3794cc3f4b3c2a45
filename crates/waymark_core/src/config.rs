//! Tracker configuration presets.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};
use crate::offset::Offset;
use crate::trigger::Alignment;

/// Configuration for a checkpoint tracker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Minimum interval between handled scroll events (ms).
    pub scroll_throttle_ms: u32,
    /// Quiet period before a resize burst is handled (ms).
    pub resize_debounce_ms: u32,
    /// Alignment used when a registration does not name one.
    pub default_alignment: Alignment,
    /// Offset used when a registration does not name one.
    pub default_offset: Offset,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl TrackerConfig {
    /// Standard configuration for general use.
    pub fn standard() -> Self {
        Self {
            scroll_throttle_ms: 300,
            resize_debounce_ms: 300,
            default_alignment: Alignment::Top,
            default_offset: Offset::Fraction(1.0),
        }
    }

    /// Tighter rate limits for pages that need snappier callbacks.
    pub fn responsive() -> Self {
        Self {
            scroll_throttle_ms: 16, // ~60fps
            resize_debounce_ms: 100,
            ..Self::standard()
        }
    }

    /// Testing configuration: every event is handled immediately.
    pub fn testing() -> Self {
        Self {
            scroll_throttle_ms: 0,
            resize_debounce_ms: 0,
            ..Self::standard()
        }
    }

    /// Decode a (possibly partial) TOML table; missing keys keep defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| TrackerError::Config(e.to_string()))
    }

    pub fn scroll_throttle(&self) -> Duration {
        Duration::from_millis(self.scroll_throttle_ms as u64)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms as u64)
    }

    /// Set the scroll throttle interval.
    pub fn with_scroll_throttle(mut self, ms: u32) -> Self {
        self.scroll_throttle_ms = ms;
        self
    }

    /// Set the resize debounce period.
    pub fn with_resize_debounce(mut self, ms: u32) -> Self {
        self.resize_debounce_ms = ms;
        self
    }

    /// Set the default alignment.
    pub fn with_default_alignment(mut self, alignment: Alignment) -> Self {
        self.default_alignment = alignment;
        self
    }

    /// Set the default offset.
    pub fn with_default_offset(mut self, offset: Offset) -> Self {
        self.default_offset = offset;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_defaults() {
        let config = TrackerConfig::default();
        assert_eq!(config.scroll_throttle(), Duration::from_millis(300));
        assert_eq!(config.resize_debounce(), Duration::from_millis(300));
        assert_eq!(config.default_alignment, Alignment::Top);
        assert_eq!(config.default_offset, Offset::Fraction(1.0));
    }

    #[test]
    fn test_partial_toml() {
        let config = TrackerConfig::from_toml_str(
            r#"
            scroll_throttle_ms = 50
            default_alignment = "center"
            default_offset = "-20px"
            "#,
        )
        .unwrap();
        assert_eq!(config.scroll_throttle_ms, 50);
        assert_eq!(config.resize_debounce_ms, 300);
        assert_eq!(config.default_alignment, Alignment::Center);
        assert_eq!(config.default_offset, Offset::PixelsFromBottom(-20));
    }

    #[test]
    fn test_numeric_offset_is_fraction() {
        let config = TrackerConfig::from_toml_str("default_offset = 0.75").unwrap();
        assert_eq!(config.default_offset, Offset::Fraction(0.75));
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = TrackerConfig::from_toml_str("default_alignment = \"sideways\"").unwrap_err();
        assert!(matches!(err, TrackerError::Config(_)));
    }

    #[test]
    fn test_builders() {
        let config = TrackerConfig::testing()
            .with_scroll_throttle(10)
            .with_resize_debounce(20)
            .with_default_alignment(Alignment::Bottom)
            .with_default_offset(Offset::PixelsFromBottom(5));
        assert_eq!(config.scroll_throttle_ms, 10);
        assert_eq!(config.resize_debounce_ms, 20);
        assert_eq!(config.default_alignment, Alignment::Bottom);
        assert_eq!(config.default_offset, Offset::PixelsFromBottom(5));
    }
}
