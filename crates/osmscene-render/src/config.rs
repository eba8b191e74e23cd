//! Scene configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SceneError};

/// Zoom cutoffs used when no configuration is given.
pub const DEFAULT_ZOOM_BANDS: [f32; 4] = [16.0, 14.0, 12.0, 10.0];

/// Configuration of a [`StyleSceneManager`](crate::StyleSceneManager).
///
/// Missing fields take their defaults, so `{}` is a valid document:
///
/// ```json
/// { "zoom_bands": [18, 15, 12], "min_label_font_size": 8 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Zoom factors at which distinct primitive sets are built, strictly
    /// descending.
    pub zoom_bands: Vec<f32>,
    /// Labels whose resolved font size is below this are not built.
    pub min_label_font_size: f32,
    /// Font size for labels that declare `text` without `font-size`.
    pub default_font_size: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            zoom_bands: DEFAULT_ZOOM_BANDS.to_vec(),
            min_label_font_size: 6.0,
            default_font_size: 10.0,
        }
    }
}

impl SceneConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed documents and
    /// [`ConfigError::Scene`] for an unusable band list.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the zoom bands.
    #[must_use]
    pub fn with_zoom_bands(mut self, zoom_bands: impl Into<Vec<f32>>) -> Self {
        self.zoom_bands = zoom_bands.into();
        self
    }

    /// Check the band list: non-empty, finite, non-negative and strictly
    /// descending.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), SceneError> {
        if self.zoom_bands.is_empty() {
            return Err(SceneError::NoZoomBands);
        }
        if let Some(&band) = self.zoom_bands.iter().find(|b| !b.is_finite() || **b < 0.0) {
            return Err(SceneError::InvalidZoomBand(band));
        }
        if let Some(pair) = self.zoom_bands.windows(2).find(|pair| pair[1] >= pair[0]) {
            return Err(SceneError::NonDescendingZoomBands {
                previous: pair[0],
                next: pair[1],
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SceneConfig::default();
        assert_eq!(config.zoom_bands, vec![16.0, 14.0, 12.0, 10.0]);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_rejects_empty() {
        let config = SceneConfig::default().with_zoom_bands(Vec::new());
        assert_eq!(config.validate(), Err(SceneError::NoZoomBands));
    }

    #[test]
    fn test_rejects_ascending_and_repeated() {
        let ascending = SceneConfig::default().with_zoom_bands([10.0, 12.0]);
        assert_eq!(
            ascending.validate(),
            Err(SceneError::NonDescendingZoomBands {
                previous: 10.0,
                next: 12.0
            })
        );
        let repeated = SceneConfig::default().with_zoom_bands([14.0, 14.0]);
        assert!(matches!(
            repeated.validate(),
            Err(SceneError::NonDescendingZoomBands { .. })
        ));
    }

    #[test]
    fn test_rejects_non_finite() {
        let config = SceneConfig::default().with_zoom_bands([16.0, f32::NAN]);
        assert!(matches!(config.validate(), Err(SceneError::InvalidZoomBand(_))));
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = SceneConfig::from_json(r#"{ "zoom_bands": [18, 15, 12] }"#).unwrap();
        assert_eq!(config.zoom_bands, vec![18.0, 15.0, 12.0]);
        assert!((config.default_font_size - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(
            SceneConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            SceneConfig::from_json(r#"{ "zoom_bands": [] }"#),
            Err(ConfigError::Scene(SceneError::NoZoomBands))
        ));
    }
}
