//! Conversions between geographic and scene coordinates.

use std::f64::consts::PI;

use crate::GeoCoordinate;

/// Largest latitude representable in Web Mercator.
const MAX_LATITUDE: f64 = 85.051_128_78;

/// A bidirectional mapping between geographic and 2D scene coordinates.
///
/// The two directions need not be exact inverses beyond rendering
/// precision.
pub trait Projection: Send + Sync {
    /// Convert scene coordinates to a geographic position.
    fn to_geo_coordinates(&self, x: f64, y: f64) -> GeoCoordinate;

    /// Convert a geographic position to scene coordinates.
    fn to_screen_coordinates(&self, coordinate: &GeoCoordinate) -> (f64, f64);
}

/// [Web Mercator](https://wiki.openstreetmap.org/wiki/Mercator)
///
/// Maps the world onto a square of side `world_size`, with the origin in
/// the north-west corner and y growing southward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WebMercator {
    world_size: f64,
}

impl WebMercator {
    /// Create a projection onto a square of side `world_size`.
    #[must_use]
    pub const fn new(world_size: f64) -> Self {
        Self { world_size }
    }

    /// Side of the projected world square.
    #[must_use]
    pub const fn world_size(&self) -> f64 {
        self.world_size
    }
}

impl Default for WebMercator {
    /// One 256 pixel tile at zoom level 0.
    fn default() -> Self {
        Self::new(256.0)
    }
}

impl Projection for WebMercator {
    fn to_geo_coordinates(&self, x: f64, y: f64) -> GeoCoordinate {
        let longitude = x / self.world_size * 360.0 - 180.0;
        let n = PI - 2.0 * PI * y / self.world_size;
        let latitude = n.sinh().atan().to_degrees();
        GeoCoordinate::new(latitude, longitude)
    }

    fn to_screen_coordinates(&self, coordinate: &GeoCoordinate) -> (f64, f64) {
        let latitude = coordinate.latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        let x = (coordinate.longitude + 180.0) / 360.0 * self.world_size;
        let lat_rad = latitude.to_radians();
        let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * self.world_size;
        (x, y)
    }
}
