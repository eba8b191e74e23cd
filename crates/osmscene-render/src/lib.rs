//! Zoom-banded scene construction and the map layer for osmscene.
//!
//! # Scope
//!
//! This crate provides:
//! - **Style Scene Manager** - queries a data source, resolves each object's
//!   style per zoom band and builds interned, drawable primitives
//! - **Scene** - per-band immutable snapshots answering visibility queries
//! - **Layer Adapter** - the entry point a hosting map UI drives with view
//!   changes and draw-time queries
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use osmscene_geo::{GeoCoordinate, GeoObject, MemoryDataSource, TagsCollection, WebMercator};
//! use osmscene_render::{MapContext, OsmLayer, SceneConfig, View2D};
//! use osmscene_style::{Declaration, Rule, Selector, SelectorType, StyleSheet, StyleValue};
//!
//! let mut source = MemoryDataSource::new();
//! source.add(GeoObject::node(1, GeoCoordinate::new(51.05, 3.72), TagsCollection::new()));
//!
//! let style = StyleSheet::new(vec![Rule::new(
//!     Selector::new(SelectorType::Node),
//!     vec![Declaration::new("color", StyleValue::Text("red".into()))],
//! )]);
//! let mut layer = OsmLayer::new(Arc::new(source), style, SceneConfig::default()).unwrap();
//!
//! let map = MapContext::new(Arc::new(WebMercator::default()));
//! let view = View2D::new((128.0, 128.0), 256.0, 256.0);
//! let center = GeoCoordinate::new(0.0, 0.0);
//! let _ = layer.on_view_changed(&map, 16.0, center, &view, &view.scaled(1.5));
//!
//! assert_eq!(layer.get(16.0, &view).len(), 1);
//! ```
//!
//! # Not Yet Implemented
//!
//! - Geometry for relations (multipolygons are matched but not drawn)
//! - Label collision and placement along lines
//! - `fill-image` and `::layer` subparts

mod builder;
/// Scene configuration.
pub mod config;
/// Configuration errors.
pub mod error;
/// The map layer driven by a hosting UI.
pub mod layer;
/// Incremental, zoom-banded scene building.
pub mod manager;
/// Drawable primitives.
pub mod primitive;
/// Band snapshots and visibility queries.
pub mod scene;
/// Resolved drawing styles and interning.
pub mod style;
/// Scene-space rectangles and views.
pub mod view;

pub use config::{DEFAULT_ZOOM_BANDS, SceneConfig};
pub use error::{ConfigError, SceneError};
pub use layer::OsmLayer;
pub use manager::{FillReport, StyleSceneManager};
pub use primitive::Primitive;
pub use scene::{Scene, VisiblePrimitives};
pub use style::{
    AreaStyle, IconStyle, LineCap, LineJoin, LineStyle, PointStyle, Scalar, SceneStyleArea, SceneStyleIcon,
    SceneStyleLine, SceneStylePoint, SceneStyleText, StyleHandle, StyleInterner, StyleRegistry, TextHalo,
    TextStyle, ZIndexed,
};
pub use view::{MapContext, Rect, View2D};
