//! Data sources yielding geographic objects for a bounding box.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{GeoBox, GeoObject, ObjectData, ObjectKey};

/// Errors a data source query can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataSourceError {
    /// The caller cancelled the query before it completed.
    #[error("query cancelled")]
    Cancelled,
    /// The box has non-finite bounds.
    #[error("invalid bounding box")]
    InvalidBox,
    /// The backing store could not be read.
    #[error("data source unavailable: {0}")]
    Unavailable(String),
}

/// Shared cancellation flag checked at the data source boundary.
///
/// Clones share the same flag, so a host can keep one handle and cancel a
/// long-running query issued with another.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Clear the flag so the token can be reused.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Release);
    }
}

/// A read-only source of geographic objects.
///
/// A query reflects a consistent point-in-time view of the data set.
/// Implementations are shared between layers and must support concurrent
/// queries.
pub trait DataSource: Send + Sync {
    /// Return all objects intersecting `bbox`.
    ///
    /// Implementations should check `cancel` between objects and return
    /// [`DataSourceError::Cancelled`] once it is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the query was cancelled, the box is invalid, or
    /// the backing store failed.
    fn query(&self, bbox: &GeoBox, cancel: &CancelToken) -> Result<Vec<Arc<GeoObject>>, DataSourceError>;
}

/// An in-memory data source.
///
/// Objects are stored in insertion order in an arena and indexed by
/// [`ObjectKey`]; adding an object with a key already present replaces it.
#[derive(Debug, Default)]
pub struct MemoryDataSource {
    objects: Vec<Arc<GeoObject>>,
    index: HashMap<ObjectKey, usize>,
}

impl MemoryDataSource {
    /// Create an empty data source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object, replacing any object with the same key.
    pub fn add(&mut self, object: GeoObject) {
        let key = object.key();
        let object = Arc::new(object);
        match self.index.get(&key) {
            Some(&slot) => self.objects[slot] = object,
            None => {
                let _ = self.index.insert(key, self.objects.len());
                self.objects.push(object);
            }
        }
    }

    /// Look up an object by key.
    #[must_use]
    pub fn get(&self, key: &ObjectKey) -> Option<&Arc<GeoObject>> {
        self.index.get(key).and_then(|&slot| self.objects.get(slot))
    }

    /// Number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the source holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Check whether an object intersects the box.
    ///
    /// Relations intersect when any of their members present in this source
    /// does. Nested relations are followed once; cycles are cut there.
    fn intersects(&self, object: &GeoObject, bbox: &GeoBox, depth: usize) -> bool {
        match &object.data {
            ObjectData::Node { .. } | ObjectData::Way { .. } => {
                object.bounding_box().is_some_and(|b| b.intersects(bbox))
            }
            ObjectData::Relation { members } => depth < 2
                && members.iter().any(|m| {
                    self.get(&m.member)
                        .is_some_and(|member| self.intersects(member, bbox, depth + 1))
                }),
        }
    }
}

impl DataSource for MemoryDataSource {
    fn query(&self, bbox: &GeoBox, cancel: &CancelToken) -> Result<Vec<Arc<GeoObject>>, DataSourceError> {
        if !bbox.is_finite() {
            return Err(DataSourceError::InvalidBox);
        }

        let mut result = Vec::new();
        for object in &self.objects {
            if cancel.is_cancelled() {
                return Err(DataSourceError::Cancelled);
            }
            if self.intersects(object, bbox, 0) {
                result.push(Arc::clone(object));
            }
        }
        Ok(result)
    }
}
