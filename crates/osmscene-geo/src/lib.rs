//! Geographic object model for osmscene.
//!
//! This crate provides the OpenStreetMap data model consumed by the style
//! and scene crates, following the
//! [OSM Elements](https://wiki.openstreetmap.org/wiki/Elements) description:
//!
//! - **Objects** - nodes, ways and relations with their tags and geometry
//! - **Coordinates** - [`GeoCoordinate`] and [`GeoBox`]
//! - **Data sources** - the [`DataSource`] trait and an arena-backed
//!   [`MemoryDataSource`]
//! - **Projections** - the [`Projection`] trait and [`WebMercator`]
//!
//! # Design
//!
//! Objects are immutable once handed out by a data source and are shared via
//! `Arc`, so a query result can outlive the source's internal storage.

use std::collections::HashMap;

mod coord;
mod projection;
mod source;

pub use coord::{GeoBox, GeoCoordinate};
pub use projection::{Projection, WebMercator};
pub use source::{CancelToken, DataSource, DataSourceError, MemoryDataSource};

/// Map of tag keys to values for an object.
///
/// [OSM Tags](https://wiki.openstreetmap.org/wiki/Tags)
/// "A tag consists of two items, a key and a value."
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagsCollection {
    tags: HashMap<String, String>,
}

impl TagsCollection {
    /// Create an empty tag collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a tag, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.tags.insert(key.into(), value.into())
    }

    /// Get the value of a tag.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Check whether a key is present, whatever its value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.tags.contains_key(key)
    }

    /// [MapCSS 0.2 § Tests](https://wiki.openstreetmap.org/wiki/MapCSS/0.2#Tests)
    ///
    /// "`[key?]` - key has a truthy value (yes, true or 1)"
    #[must_use]
    pub fn is_truthy(&self, key: &str) -> bool {
        self.get(key)
            .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "yes" | "true" | "1"))
    }

    /// Number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Check if there are no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Iterate over `(key, value)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagsCollection {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// An OSM object id, unique per [`ObjectKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub i64);

/// [OSM Elements](https://wiki.openstreetmap.org/wiki/Elements)
///
/// "Elements are the basic components of OpenStreetMap's conceptual data
/// model of the physical world. They consist of nodes, ways and relations."
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum_macros::Display, strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum ObjectKind {
    /// [Node](https://wiki.openstreetmap.org/wiki/Node): a single point.
    Node,
    /// [Way](https://wiki.openstreetmap.org/wiki/Way): an ordered list of nodes.
    Way,
    /// [Relation](https://wiki.openstreetmap.org/wiki/Relation): a group of members.
    Relation,
}

/// Identity of an object across kinds.
///
/// Node 7 and way 7 are different objects; this key tells them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectKey {
    /// Kind of the object.
    pub kind: ObjectKind,
    /// Id of the object within its kind.
    pub id: ObjectId,
}

/// [Relation § Members](https://wiki.openstreetmap.org/wiki/Relation#Members)
///
/// "Each member has a type, an id and a role."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationMember {
    /// The object this member refers to.
    pub member: ObjectKey,
    /// Role of the member (e.g. `outer`, `inner`), possibly empty.
    pub role: String,
}

/// Kind-specific data of an object.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectData {
    /// A node and its position.
    Node {
        /// Position of the node.
        coordinate: GeoCoordinate,
    },
    /// A way with its resolved node positions, in order.
    Way {
        /// Positions of the way's nodes.
        coordinates: Vec<GeoCoordinate>,
    },
    /// A relation with its members. Relations carry no geometry of their own.
    Relation {
        /// Members of the relation.
        members: Vec<RelationMember>,
    },
}

/// A geographic object as yielded by a [`DataSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeoObject {
    /// Id of the object.
    pub id: ObjectId,
    /// Tags of the object.
    pub tags: TagsCollection,
    /// Geometry or membership data.
    pub data: ObjectData,
}

impl GeoObject {
    /// Create a node.
    #[must_use]
    pub const fn node(id: i64, coordinate: GeoCoordinate, tags: TagsCollection) -> Self {
        Self {
            id: ObjectId(id),
            tags,
            data: ObjectData::Node { coordinate },
        }
    }

    /// Create a way.
    #[must_use]
    pub const fn way(id: i64, coordinates: Vec<GeoCoordinate>, tags: TagsCollection) -> Self {
        Self {
            id: ObjectId(id),
            tags,
            data: ObjectData::Way { coordinates },
        }
    }

    /// Create a relation.
    #[must_use]
    pub const fn relation(id: i64, members: Vec<RelationMember>, tags: TagsCollection) -> Self {
        Self {
            id: ObjectId(id),
            tags,
            data: ObjectData::Relation { members },
        }
    }

    /// The kind of this object.
    #[must_use]
    pub const fn kind(&self) -> ObjectKind {
        match self.data {
            ObjectData::Node { .. } => ObjectKind::Node,
            ObjectData::Way { .. } => ObjectKind::Way,
            ObjectData::Relation { .. } => ObjectKind::Relation,
        }
    }

    /// The identity of this object across kinds.
    #[must_use]
    pub const fn key(&self) -> ObjectKey {
        ObjectKey {
            kind: self.kind(),
            id: self.id,
        }
    }

    /// [Way § Closed way](https://wiki.openstreetmap.org/wiki/Way#Closed_way)
    ///
    /// "A closed way is a way whose last node on the way is also the first
    /// on that way." A ring needs at least three distinct points, so fewer
    /// than four coordinates never form a closed way.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match &self.data {
            ObjectData::Way { coordinates } => {
                coordinates.len() >= 4 && coordinates.first() == coordinates.last()
            }
            _ => false,
        }
    }

    /// Bounding box of the object's own geometry.
    ///
    /// Relations and empty ways have none.
    #[must_use]
    pub fn bounding_box(&self) -> Option<GeoBox> {
        match &self.data {
            ObjectData::Node { coordinate } => Some(GeoBox::new(*coordinate, *coordinate)),
            ObjectData::Way { coordinates } => GeoBox::from_coordinates(coordinates),
            ObjectData::Relation { .. } => None,
        }
    }
}
