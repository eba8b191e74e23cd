//! Scene construction.
//!
//! The manager turns data source queries into primitives band by band:
//! query, classify and cascade each object at the band's zoom, build its
//! primitives, then publish them as a new band snapshot.

use std::collections::HashSet;
use std::sync::Arc;

use osmscene_geo::{CancelToken, DataSource, DataSourceError, GeoBox, ObjectKey, Projection};
use osmscene_style::{StyleSheet, resolve};
use tracing::{debug, trace, warn};

use crate::builder::PrimitiveBuilder;
use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::scene::Scene;
use crate::style::StyleRegistry;

/// What one [`StyleSceneManager::fill_scene`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[must_use]
pub struct FillReport {
    /// Bands extended by this call.
    pub bands_filled: usize,
    /// Bands whose coverage already contained the box.
    pub bands_skipped: usize,
    /// Objects returned by the data source.
    pub objects: usize,
    /// Primitives added over all bands.
    pub primitives_added: usize,
    /// The data source query failed; no band was touched.
    pub query_failed: bool,
    /// The fill stopped on cancellation. Bands completed before it stay.
    pub cancelled: bool,
}

/// Coverage lists drop their oldest boxes past this length. A forgotten box
/// only costs a repeated query; `seen` still keeps objects from doubling.
const MAX_COVERED_BOXES: usize = 32;

/// Per-band record of what has been built.
#[derive(Debug, Default)]
struct BandCoverage {
    /// Boxes fully processed for this band, oldest first, none containing
    /// another.
    covered: Vec<GeoBox>,
    /// Objects already processed for this band.
    seen: HashSet<ObjectKey>,
}

impl BandCoverage {
    fn covers(&self, bbox: &GeoBox) -> bool {
        self.covered.iter().any(|c| c.contains_box(bbox))
    }

    fn add(&mut self, bbox: GeoBox) {
        let mut merged = bbox;
        while let Some(index) = self.covered.iter().position(|c| union_is_exact(&merged, c)) {
            merged = merged.union(&self.covered.remove(index));
        }
        self.covered.push(merged);
        if self.covered.len() > MAX_COVERED_BOXES {
            let excess = self.covered.len() - MAX_COVERED_BOXES;
            let _ = self.covered.drain(..excess);
        }
    }
}

/// Check whether the union of two boxes covers nothing outside them: one
/// contains the other, or they share a full edge span and touch or overlap
/// along the other axis, as consecutive pans of one view do.
fn union_is_exact(a: &GeoBox, b: &GeoBox) -> bool {
    let same = |x: f64, y: f64| x.total_cmp(&y).is_eq();
    let (a_min, a_max, b_min, b_max) = (a.min(), a.max(), b.min(), b.max());
    let same_latitudes = same(a_min.latitude, b_min.latitude) && same(a_max.latitude, b_max.latitude);
    let same_longitudes = same(a_min.longitude, b_min.longitude) && same(a_max.longitude, b_max.longitude);
    let longitudes_meet = a_min.longitude <= b_max.longitude && b_min.longitude <= a_max.longitude;
    let latitudes_meet = a_min.latitude <= b_max.latitude && b_min.latitude <= a_max.latitude;
    a.contains_box(b)
        || b.contains_box(a)
        || (same_latitudes && longitudes_meet)
        || (same_longitudes && latitudes_meet)
}

/// Builds and owns a zoom-banded [`Scene`] from a style sheet.
///
/// Filling is incremental: each band remembers the boxes and objects it
/// has processed, so repeated or overlapping fills add only what is new.
/// The scene only shrinks on [`rebuild`](Self::rebuild).
#[derive(Debug)]
pub struct StyleSceneManager {
    style: StyleSheet,
    config: SceneConfig,
    scene: Arc<Scene>,
    coverage: Vec<BandCoverage>,
    styles: StyleRegistry,
}

impl StyleSceneManager {
    /// Create a manager with an empty scene.
    ///
    /// Warnings are deduplicated process-wide and shared by every manager,
    /// so creating one leaves that history alone. A host that reloads a
    /// style sheet and wants its problems reported again calls
    /// [`clear_warnings`](osmscene_common::warning::clear_warnings) itself.
    ///
    /// # Errors
    ///
    /// Returns a [`SceneError`] if the configured zoom bands are empty,
    /// not finite or not strictly descending.
    pub fn new(style: StyleSheet, config: SceneConfig) -> Result<Self, SceneError> {
        config.validate()?;
        let back_color = style.canvas_color();
        debug!(
            rules = style.rules.len(),
            bands = ?config.zoom_bands,
            ?back_color,
            "scene manager created"
        );
        Ok(Self {
            scene: Arc::new(Scene::new(&config.zoom_bands, back_color)),
            coverage: config.zoom_bands.iter().map(|_| BandCoverage::default()).collect(),
            styles: StyleRegistry::default(),
            style,
            config,
        })
    }

    /// The scene being built, shared with readers.
    #[must_use]
    pub fn scene(&self) -> Arc<Scene> {
        Arc::clone(&self.scene)
    }

    /// The style sheet the scene is built from.
    #[must_use]
    pub const fn style(&self) -> &StyleSheet {
        &self.style
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Styles interned so far.
    #[must_use]
    pub const fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    /// Extend every band with the objects of `data_source` intersecting
    /// `bbox`, drawn through `projection`.
    ///
    /// Bands whose coverage already contains `bbox` are skipped without a
    /// query; objects a band already holds are not added again. If the
    /// query fails or is cancelled no band changes. If cancellation happens
    /// while building, bands completed before it keep their new primitives
    /// and the interrupted band is left as it was.
    ///
    /// Never fails: problems are logged and recorded in the report.
    pub fn fill_scene<D: DataSource + ?Sized>(
        &mut self,
        data_source: &D,
        bbox: &GeoBox,
        projection: &dyn Projection,
        cancel: &CancelToken,
    ) -> FillReport {
        let mut report = FillReport::default();
        let pending: Vec<usize> = (0..self.coverage.len())
            .filter(|&index| !self.coverage[index].covers(bbox))
            .collect();
        report.bands_skipped = self.coverage.len() - pending.len();
        if pending.is_empty() {
            trace!(?bbox, "box already covered by every band");
            return report;
        }
        if cancel.is_cancelled() {
            report.cancelled = true;
            return report;
        }

        let objects = match data_source.query(bbox, cancel) {
            Ok(objects) => objects,
            Err(DataSourceError::Cancelled) => {
                debug!(?bbox, "query cancelled");
                report.cancelled = true;
                return report;
            }
            Err(error) => {
                warn!(%error, ?bbox, "data source query failed, scene left unchanged");
                report.query_failed = true;
                return report;
            }
        };
        report.objects = objects.len();

        let mut builder = PrimitiveBuilder {
            styles: &mut self.styles,
            projection,
            config: &self.config,
        };
        for index in pending {
            let zoom = self.config.zoom_bands[index];
            let coverage = &mut self.coverage[index];
            let mut added = Vec::new();
            let mut keys = HashSet::new();
            for object in &objects {
                if cancel.is_cancelled() {
                    debug!(band = zoom, "fill cancelled, band left unchanged");
                    report.cancelled = true;
                    return report;
                }
                let key = object.key();
                if coverage.seen.contains(&key) || !keys.insert(key) {
                    continue;
                }
                let style = resolve(object, zoom, &self.style.rules);
                if style.is_empty() {
                    trace!(?key, band = zoom, "not drawn at this band");
                    continue;
                }
                builder.build(object, &style, &mut added);
            }

            debug!(band = zoom, objects = keys.len(), primitives = added.len(), "band extended");
            report.primitives_added += added.len();
            report.bands_filled += 1;
            self.scene.extend_band(index, added);
            coverage.seen.extend(keys);
            coverage.add(*bbox);
        }
        report
    }

    /// Drop every primitive, interned style and coverage record. The next
    /// fill starts from scratch.
    pub fn rebuild(&mut self) {
        debug!("scene rebuild");
        self.scene.clear();
        self.styles.clear();
        for coverage in &mut self.coverage {
            *coverage = BandCoverage::default();
        }
    }
}
