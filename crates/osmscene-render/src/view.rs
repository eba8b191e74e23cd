//! View geometry in scene coordinates.

use std::sync::Arc;

use osmscene_geo::{GeoBox, Projection};
use serde::Serialize;

/// An axis-aligned rectangle in scene coordinates.
///
/// Edges are inclusive: rectangles that only touch intersect.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    /// Left edge.
    pub min_x: f64,
    /// Top edge.
    pub min_y: f64,
    /// Right edge.
    pub max_x: f64,
    /// Bottom edge.
    pub max_y: f64,
}

impl Rect {
    /// Create a rectangle from any two opposite corners.
    #[must_use]
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            min_x: x1.min(x2),
            min_y: y1.min(y2),
            max_x: x1.max(x2),
            max_y: y1.max(y2),
        }
    }

    /// A degenerate rectangle covering one point.
    #[must_use]
    pub const fn point(x: f64, y: f64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    /// Bounding rectangle of a set of points, `None` if empty.
    #[must_use]
    pub fn from_points(points: &[(f64, f64)]) -> Option<Self> {
        let (&(x, y), rest) = points.split_first()?;
        Some(rest.iter().fold(Self::point(x, y), |rect, &(x, y)| Self {
            min_x: rect.min_x.min(x),
            min_y: rect.min_y.min(y),
            max_x: rect.max_x.max(x),
            max_y: rect.max_y.max(y),
        }))
    }

    /// Horizontal extent.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Vertical extent.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (
            f64::midpoint(self.min_x, self.max_x),
            f64::midpoint(self.min_y, self.max_y),
        )
    }

    /// Check whether the point lies inside or on the edge.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Check whether the two rectangles overlap or touch.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// Convert to a geographic box by unprojecting the corners.
    #[must_use]
    pub fn to_geo_box(&self, projection: &dyn Projection) -> GeoBox {
        GeoBox::new(
            projection.to_geo_coordinates(self.min_x, self.min_y),
            projection.to_geo_coordinates(self.max_x, self.max_y),
        )
    }
}

/// A possibly rotated viewport in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct View2D {
    /// Center point.
    pub center: (f64, f64),
    /// Width before rotation.
    pub width: f64,
    /// Height before rotation.
    pub height: f64,
    /// Rotation in degrees, clockwise.
    pub angle: f64,
}

impl View2D {
    /// An unrotated view.
    #[must_use]
    pub const fn new(center: (f64, f64), width: f64, height: f64) -> Self {
        Self {
            center,
            width,
            height,
            angle: 0.0,
        }
    }

    /// Set the rotation.
    #[must_use]
    pub const fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    /// The same view grown by `factor` around its center, as used for
    /// prefetching around the visible area.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
            ..*self
        }
    }

    /// Axis-aligned hull of the rotated view.
    #[must_use]
    pub fn outer_box(&self) -> Rect {
        let (sin, cos) = self.angle.to_radians().sin_cos();
        let (half_w, half_h) = (self.width / 2.0, self.height / 2.0);
        let extent_x = half_w * cos.abs() + half_h * sin.abs();
        let extent_y = half_w * sin.abs() + half_h * cos.abs();
        let (cx, cy) = self.center;
        Rect::new(cx - extent_x, cy - extent_y, cx + extent_x, cy + extent_y)
    }
}

/// What the host map hands a layer on every view change.
#[derive(Clone)]
pub struct MapContext {
    projection: Arc<dyn Projection>,
}

impl MapContext {
    /// Create a context for a map drawn with `projection`.
    #[must_use]
    pub fn new(projection: Arc<dyn Projection>) -> Self {
        Self { projection }
    }

    /// The map's projection.
    #[must_use]
    pub fn projection(&self) -> &dyn Projection {
        self.projection.as_ref()
    }
}

impl std::fmt::Debug for MapContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapContext").finish_non_exhaustive()
    }
}
