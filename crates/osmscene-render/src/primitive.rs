//! Drawable primitives.
//!
//! Primitives are the scene's equivalent of display list commands: plain
//! data in scene coordinates, never mutated after insertion.

use osmscene_geo::ObjectKey;

use crate::style::{
    SceneStyleArea, SceneStyleIcon, SceneStyleLine, SceneStylePoint, SceneStyleText, ZIndexed,
};
use crate::view::Rect;

/// A single drawable shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// A marker at a node.
    Point {
        /// Object the marker was built from.
        key: ObjectKey,
        /// Scene position.
        position: (f64, f64),
        /// Interned marker style.
        style: SceneStylePoint,
    },

    /// A polyline. Also used for area outlines and line casings.
    Line {
        /// Object the line was built from.
        key: ObjectKey,
        /// Scene vertices.
        points: Vec<(f64, f64)>,
        /// Interned stroke style.
        style: SceneStyleLine,
        /// Bounding rectangle of `points`.
        extent: Rect,
    },

    /// A filled polygon. The ring is closed: first and last points coincide.
    Polygon {
        /// Object the polygon was built from.
        key: ObjectKey,
        /// Scene vertices of the outer ring.
        points: Vec<(f64, f64)>,
        /// Interned fill style.
        style: SceneStyleArea,
        /// Bounding rectangle of `points`.
        extent: Rect,
    },

    /// A text label anchored at a point.
    Text {
        /// Object the label was built from.
        key: ObjectKey,
        /// Scene anchor.
        position: (f64, f64),
        /// Label text.
        text: String,
        /// Interned label style.
        style: SceneStyleText,
    },

    /// An image anchored at a node.
    Icon {
        /// Object the icon was built from.
        key: ObjectKey,
        /// Scene anchor.
        position: (f64, f64),
        /// Interned icon style.
        style: SceneStyleIcon,
    },
}

impl Primitive {
    /// The object this primitive was built from.
    #[must_use]
    pub const fn key(&self) -> ObjectKey {
        match self {
            Self::Point { key, .. }
            | Self::Line { key, .. }
            | Self::Polygon { key, .. }
            | Self::Text { key, .. }
            | Self::Icon { key, .. } => *key,
        }
    }

    /// Scene-space extent used for visibility tests. Anchored primitives
    /// have a degenerate extent at their anchor.
    #[must_use]
    pub const fn extent(&self) -> Rect {
        match self {
            Self::Line { extent, .. } | Self::Polygon { extent, .. } => *extent,
            Self::Point { position, .. } | Self::Text { position, .. } | Self::Icon { position, .. } => {
                Rect::point(position.0, position.1)
            }
        }
    }

    /// Drawing order within a band, taken from the style.
    #[must_use]
    pub fn z_index(&self) -> f32 {
        match self {
            Self::Point { style, .. } => style.style().z_index(),
            Self::Line { style, .. } => style.style().z_index(),
            Self::Polygon { style, .. } => style.style().z_index(),
            Self::Text { style, .. } => style.style().z_index(),
            Self::Icon { style, .. } => style.style().z_index(),
        }
    }
}
