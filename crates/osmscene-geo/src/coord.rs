//! Geographic coordinates and bounding boxes.

use serde::{Deserialize, Serialize};

/// A WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
}

impl GeoCoordinate {
    /// Create a coordinate from latitude and longitude.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// An axis-aligned latitude/longitude box.
///
/// The box is closed: points on its edge are inside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBox {
    min: GeoCoordinate,
    max: GeoCoordinate,
}

impl GeoBox {
    /// Create a box spanning two arbitrary corners.
    ///
    /// The corners are normalized, so callers converting a screen box
    /// (where y grows southward) need not swap them.
    #[must_use]
    pub fn new(a: GeoCoordinate, b: GeoCoordinate) -> Self {
        Self {
            min: GeoCoordinate::new(a.latitude.min(b.latitude), a.longitude.min(b.longitude)),
            max: GeoCoordinate::new(a.latitude.max(b.latitude), a.longitude.max(b.longitude)),
        }
    }

    /// Smallest box containing all coordinates, or `None` for an empty slice.
    #[must_use]
    pub fn from_coordinates(coordinates: &[GeoCoordinate]) -> Option<Self> {
        let (first, rest) = coordinates.split_first()?;
        Some(
            rest.iter()
                .fold(Self::new(*first, *first), |acc, c| acc.union(&Self::new(*c, *c))),
        )
    }

    /// South-west corner.
    #[must_use]
    pub const fn min(&self) -> GeoCoordinate {
        self.min
    }

    /// North-east corner.
    #[must_use]
    pub const fn max(&self) -> GeoCoordinate {
        self.max
    }

    /// Check whether a coordinate lies inside the box.
    #[must_use]
    pub fn contains(&self, c: &GeoCoordinate) -> bool {
        (self.min.latitude..=self.max.latitude).contains(&c.latitude)
            && (self.min.longitude..=self.max.longitude).contains(&c.longitude)
    }

    /// Check whether `other` lies entirely inside this box.
    #[must_use]
    pub fn contains_box(&self, other: &Self) -> bool {
        self.contains(&other.min) && self.contains(&other.max)
    }

    /// Check whether the two boxes share at least one point.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.latitude <= other.max.latitude
            && other.min.latitude <= self.max.latitude
            && self.min.longitude <= other.max.longitude
            && other.min.longitude <= self.max.longitude
    }

    /// Smallest box containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: GeoCoordinate::new(
                self.min.latitude.min(other.min.latitude),
                self.min.longitude.min(other.min.longitude),
            ),
            max: GeoCoordinate::new(
                self.max.latitude.max(other.max.latitude),
                self.max.longitude.max(other.max.longitude),
            ),
        }
    }

    /// Check that all four bounds are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.min.latitude.is_finite()
            && self.min.longitude.is_finite()
            && self.max.latitude.is_finite()
            && self.max.longitude.is_finite()
    }
}
