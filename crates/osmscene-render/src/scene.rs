//! The zoom-banded scene.
//!
//! Each band publishes an immutable snapshot of its primitives behind a
//! read-mostly lock. Writers build a new snapshot and swap it in, so a
//! reader either sees a band before or after an extension, never halfway.

use std::sync::Arc;

use osmscene_style::ColorValue;
use parking_lot::RwLock;

use crate::primitive::Primitive;
use crate::view::Rect;

/// Primitives of one band at one point in time.
#[derive(Debug, Default)]
struct BandSnapshot {
    primitives: Vec<Arc<Primitive>>,
}

#[derive(Debug)]
struct Band {
    zoom: f32,
    snapshot: RwLock<Arc<BandSnapshot>>,
}

impl Band {
    fn new(zoom: f32) -> Self {
        Self {
            zoom,
            snapshot: RwLock::new(Arc::default()),
        }
    }

    fn current(&self) -> Arc<BandSnapshot> {
        Arc::clone(&*self.snapshot.read())
    }
}

/// A zoom-banded container of drawable primitives.
///
/// Owned and written by a [`StyleSceneManager`](crate::StyleSceneManager);
/// readers share it through an `Arc` and may query it from any thread.
#[derive(Debug)]
pub struct Scene {
    bands: Vec<Band>,
    back_color: Option<ColorValue>,
}

impl Scene {
    /// Create an empty scene. `zoom_bands` must be strictly descending.
    pub(crate) fn new(zoom_bands: &[f32], back_color: Option<ColorValue>) -> Self {
        Self {
            bands: zoom_bands.iter().copied().map(Band::new).collect(),
            back_color,
        }
    }

    /// Configured bands, descending.
    pub fn zoom_bands(&self) -> impl Iterator<Item = f32> + '_ {
        self.bands.iter().map(|band| band.zoom)
    }

    /// The band serving `zoom_factor`: the largest band not above it.
    ///
    /// `None` when `zoom_factor` is below the smallest band.
    #[must_use]
    pub fn band_for(&self, zoom_factor: f32) -> Option<f32> {
        self.band_index(zoom_factor).map(|index| self.bands[index].zoom)
    }

    fn band_index(&self, zoom_factor: f32) -> Option<usize> {
        self.bands.iter().position(|band| band.zoom <= zoom_factor)
    }

    /// Number of primitives in the band with exactly this zoom, 0 if there
    /// is no such band.
    #[must_use]
    pub fn primitive_count(&self, band: f32) -> usize {
        self.bands
            .iter()
            .find(|b| b.zoom.to_bits() == band.to_bits())
            .map_or(0, |b| b.snapshot.read().primitives.len())
    }

    /// Number of primitives over all bands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bands.iter().map(|b| b.snapshot.read().primitives.len()).sum()
    }

    /// Check whether no band holds a primitive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// [MapCSS 0.2 § canvas](https://wiki.openstreetmap.org/wiki/MapCSS/0.2#Canvas_properties)
    ///
    /// Background color from the style sheet's canvas rules.
    #[must_use]
    pub const fn back_color(&self) -> Option<ColorValue> {
        self.back_color
    }

    /// Primitives of the band serving `zoom_factor` whose extent intersects
    /// `view`, ordered by z-index then insertion.
    ///
    /// Does not mutate the scene. The result keeps the band snapshot it was
    /// taken from, so later extensions do not affect it.
    #[must_use]
    pub fn get(&self, view: &Rect, zoom_factor: f32) -> VisiblePrimitives {
        let Some(index) = self.band_index(zoom_factor) else {
            return VisiblePrimitives::default();
        };
        let band = &self.bands[index];
        let snapshot = band.current();
        let mut indices: Vec<usize> = snapshot
            .primitives
            .iter()
            .enumerate()
            .filter(|(_, primitive)| primitive.extent().intersects(view))
            .map(|(i, _)| i)
            .collect();
        // Stable: equal z-index keeps insertion order.
        indices.sort_by(|&a, &b| {
            snapshot.primitives[a]
                .z_index()
                .total_cmp(&snapshot.primitives[b].z_index())
        });
        VisiblePrimitives {
            band: Some(band.zoom),
            snapshot,
            indices,
        }
    }

    /// Publish a new snapshot of band `index` holding its current primitives
    /// followed by `added`.
    pub(crate) fn extend_band(&self, index: usize, added: Vec<Primitive>) {
        let Some(band) = self.bands.get(index) else {
            return;
        };
        if added.is_empty() {
            return;
        }
        let mut slot = band.snapshot.write();
        let mut primitives = Vec::with_capacity(slot.primitives.len() + added.len());
        primitives.extend(slot.primitives.iter().cloned());
        primitives.extend(added.into_iter().map(Arc::new));
        *slot = Arc::new(BandSnapshot { primitives });
    }

    /// Replace every band with an empty snapshot.
    pub(crate) fn clear(&self) {
        for band in &self.bands {
            *band.snapshot.write() = Arc::default();
        }
    }
}

/// The result of [`Scene::get`]: a band snapshot and the visible subset of
/// it in drawing order.
#[derive(Debug, Default, Clone)]
pub struct VisiblePrimitives {
    band: Option<f32>,
    snapshot: Arc<BandSnapshot>,
    indices: Vec<usize>,
}

impl VisiblePrimitives {
    /// The band the primitives come from, `None` if no band applied.
    #[must_use]
    pub const fn band(&self) -> Option<f32> {
        self.band
    }

    /// Number of visible primitives.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Check if nothing is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Visible primitives in drawing order.
    pub fn iter(&self) -> impl Iterator<Item = &Primitive> {
        self.indices.iter().map(|&i| self.snapshot.primitives[i].as_ref())
    }
}

impl<'a> IntoIterator for &'a VisiblePrimitives {
    type Item = &'a Primitive;
    type IntoIter = Box<dyn Iterator<Item = &'a Primitive> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
