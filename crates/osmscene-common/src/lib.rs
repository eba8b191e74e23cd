//! Common utilities for the osmscene crates.
//!
//! This crate provides shared infrastructure used by all scene components:
//! - **Warning System** - deduplicated authoring warnings routed through `tracing`

pub mod warning;
