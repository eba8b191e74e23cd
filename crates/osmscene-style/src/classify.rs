//! Area/line classification of ways.
//!
//! [MapCSS 0.2 § Selectors](https://wiki.openstreetmap.org/wiki/MapCSS/0.2#Selectors)
//!
//! "`line` - a way that is not an area; `area` - a closed way or a
//! multipolygon relation". Whether a closed way is an area is decided by
//! its tags, following [the area key conventions](https://wiki.openstreetmap.org/wiki/Key:area).

use osmscene_geo::{GeoObject, ObjectData, TagsCollection};

/// How a way is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WayClass {
    /// Filled polygon.
    Area,
    /// Stroked polyline.
    Line,
}

/// Keys whose presence on a closed way implies an area, whatever the value.
const AREA_KEYS: &[&str] = &[
    "aeroway",
    "amenity",
    "boundary",
    "building",
    "building:part",
    "craft",
    "historic",
    "landuse",
    "leisure",
    "man_made",
    "military",
    "natural",
    "office",
    "place",
    "shop",
    "tourism",
];

/// `(key, value)` pairs implying an area for keys that are usually lines.
const AREA_TAGS: &[(&str, &str)] = &[
    ("highway", "pedestrian"),
    ("highway", "platform"),
    ("highway", "rest_area"),
    ("highway", "services"),
    ("railway", "platform"),
    ("waterway", "dock"),
    ("waterway", "riverbank"),
];

/// [Key:area](https://wiki.openstreetmap.org/wiki/Key:area)
///
/// Classify a way from its tags and whether it is closed. Open ways are
/// always lines. `area=yes` and `area=no` override the key heuristics.
#[must_use]
pub fn classify_way(tags: &TagsCollection, closed: bool) -> WayClass {
    if !closed {
        return WayClass::Line;
    }
    match tags.get("area") {
        Some("yes") => return WayClass::Area,
        Some("no") => return WayClass::Line,
        _ => {}
    }
    let implied = AREA_KEYS.iter().any(|key| tags.get(key).is_some_and(|v| v != "no"))
        || AREA_TAGS.iter().any(|(key, value)| tags.get(key) == Some(*value));
    if implied { WayClass::Area } else { WayClass::Line }
}

/// Classify an object, or `None` for nodes and relations.
#[must_use]
pub fn classify_object(object: &GeoObject) -> Option<WayClass> {
    match object.data {
        ObjectData::Way { .. } => Some(classify_way(&object.tags, object.is_closed())),
        ObjectData::Node { .. } | ObjectData::Relation { .. } => None,
    }
}
