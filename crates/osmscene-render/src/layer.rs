//! The map layer exposed to a hosting UI.

use std::sync::Arc;

use osmscene_geo::{CancelToken, DataSource, GeoCoordinate};
use osmscene_style::{ColorValue, StyleSheet};
use tracing::{debug, trace};

use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::manager::{FillReport, StyleSceneManager};
use crate::scene::{Scene, VisiblePrimitives};
use crate::view::{MapContext, View2D};

/// A map layer drawing the objects of a data source with a style sheet.
///
/// All work happens synchronously inside [`on_view_changed`]; the layer
/// owns no threads or timers. Hosts that draw from another thread read
/// through [`scene`](Self::scene) and may interrupt a slow fill through
/// [`cancel_token`](Self::cancel_token).
///
/// [`on_view_changed`]: Self::on_view_changed
#[derive(Debug)]
pub struct OsmLayer<D: DataSource> {
    data_source: Arc<D>,
    manager: StyleSceneManager,
    cancel: CancelToken,
    closed: bool,
}

impl<D: DataSource> OsmLayer<D> {
    /// Create a layer over `data_source`.
    ///
    /// # Errors
    ///
    /// Returns a [`SceneError`] if the configured zoom bands are invalid.
    pub fn new(data_source: Arc<D>, style: StyleSheet, config: SceneConfig) -> Result<Self, SceneError> {
        Ok(Self {
            data_source,
            manager: StyleSceneManager::new(style, config)?,
            cancel: CancelToken::new(),
            closed: false,
        })
    }

    /// React to a pan, zoom or resize.
    ///
    /// The scene is extended to cover `extra_view`, which a host usually
    /// makes larger than `view` so that small pans find their primitives
    /// already built. Returns `None` once the layer is closed.
    ///
    /// A cancellation requested through [`cancel_token`](Self::cancel_token)
    /// applies to the fill in progress; the next view change starts afresh.
    pub fn on_view_changed(
        &mut self,
        map: &MapContext,
        zoom_factor: f32,
        center: GeoCoordinate,
        view: &View2D,
        extra_view: &View2D,
    ) -> Option<FillReport> {
        if self.closed {
            trace!("view change on a closed layer");
            return None;
        }
        self.cancel.reset();
        let projection = map.projection();
        let bbox = extra_view.outer_box().to_geo_box(projection);
        trace!(zoom_factor, ?center, ?view, ?bbox, "view changed");
        let report = self
            .manager
            .fill_scene(self.data_source.as_ref(), &bbox, projection, &self.cancel);
        debug!(
            zoom_factor,
            added = report.primitives_added,
            skipped = report.bands_skipped,
            "scene filled for view"
        );
        Some(report)
    }

    /// Primitives visible in `view` at `zoom_factor`, in drawing order.
    /// Empty once the layer is closed.
    #[must_use]
    pub fn get(&self, zoom_factor: f32, view: &View2D) -> VisiblePrimitives {
        if self.closed {
            return VisiblePrimitives::default();
        }
        self.manager.scene().get(&view.outer_box(), zoom_factor)
    }

    /// The background color, if the style sheet declares one.
    #[must_use]
    pub fn back_color(&self) -> Option<ColorValue> {
        self.manager.scene().back_color()
    }

    /// Release the layer. Any fill still running is cancelled and later
    /// view changes are ignored. Closing twice has no further effect.
    pub fn close(&mut self) {
        if !self.closed {
            debug!("layer closed");
            self.closed = true;
            self.cancel.cancel();
        }
    }

    /// Check whether [`close`](Self::close) was called.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Shared read handle on the scene.
    #[must_use]
    pub fn scene(&self) -> Arc<Scene> {
        self.manager.scene()
    }

    /// A handle cancelling the fill in progress.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// The scene manager.
    #[must_use]
    pub const fn manager(&self) -> &StyleSceneManager {
        &self.manager
    }
}
