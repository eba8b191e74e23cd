//! Style and scene warnings routed through `tracing`.
//!
//! Provides deduplication to avoid spamming the same warning for every
//! feature that hits it. A single bad color in a style sheet can otherwise
//! produce one warning per way in the data set.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Global set of warnings we've already emitted (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about a style or data problem (emitted once per unique message)
///
/// # Example
/// ```ignore
/// warn_once("style", "unparseable color 'blu' in line-color");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let should_emit = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_emit {
        tracing::warn!(component, "{message}");
    }
}

/// Returns true if the given warning has already been emitted.
#[must_use]
pub fn was_warned(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .is_some_and(|set| set.contains(&key))
}

/// Clear all recorded warnings (call when loading a new style sheet)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
