//! Errors raised when a scene manager is configured.
//!
//! Scene building itself never fails: query failures and unusable style
//! values are logged and reported through
//! [`FillReport`](crate::FillReport), leaving the scene partially built.

use thiserror::Error;

/// Invalid zoom band configuration, rejected at construction time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    /// The band list is empty.
    #[error("at least one zoom band is required")]
    NoZoomBands,

    /// Bands must be strictly descending, e.g. `[16, 14, 12, 10]`.
    #[error("zoom bands must be strictly descending: {previous} is followed by {next}")]
    NonDescendingZoomBands {
        /// The earlier band.
        previous: f32,
        /// The band that does not descend from it.
        next: f32,
    },

    /// A band is negative or not finite.
    #[error("invalid zoom band: {0}")]
    InvalidZoomBand(f32),
}

/// Errors loading a [`SceneConfig`](crate::SceneConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON for a scene configuration.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed but describes an unusable configuration.
    #[error(transparent)]
    Scene(#[from] SceneError),
}
