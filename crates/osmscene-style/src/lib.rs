//! MapCSS selector matching and style cascade for osmscene.
//!
//! # Scope
//!
//! This crate implements:
//! - **Style model** ([MapCSS 0.2](https://wiki.openstreetmap.org/wiki/MapCSS/0.2))
//!   - Selectors with type, zoom range and tag tests
//!   - Declarations, rules with origins, style sheets
//!   - Colors and property values, including `eval(tag(...))` references
//!
//! - **Selector Engine** ([MapCSS 0.2 § Selectors](https://wiki.openstreetmap.org/wiki/MapCSS/0.2#Selectors))
//!   - Type compatibility for node, way, line, area, relation, canvas and `*`
//!   - Area/line classification of ways from their tags
//!   - Specificity calculation
//!
//! - **Cascade** ([CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/))
//!   - Origin and specificity ordering with declaration order as tie-break
//!   - Tag substitution at resolution time
//!
//! # Not Yet Implemented
//!
//! - Style sheet text parsing (rules arrive pre-parsed)
//! - Multipolygon relations as `area`/`line`
//! - Parent/child selectors (`way > node`), classes and pseudo-classes
//! - Layers (`::casing` subparts)

/// Style cascade per [CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/).
pub mod cascade;
/// Area/line classification of ways per [Key:area](https://wiki.openstreetmap.org/wiki/Key:area).
pub mod classify;
/// Selector model and matching per [MapCSS 0.2 § Selectors](https://wiki.openstreetmap.org/wiki/MapCSS/0.2#Selectors).
pub mod selector;
/// Rules and style sheets per [MapCSS 0.2 § Rules](https://wiki.openstreetmap.org/wiki/MapCSS/0.2#Rules).
pub mod stylesheet;
/// Property values per [MapCSS 0.2 § Vocabulary](https://wiki.openstreetmap.org/wiki/MapCSS/0.2#Vocabulary).
pub mod values;

// Re-exports for convenience
pub use cascade::{CascadeResult, matching_rules, resolve};
pub use classify::{WayClass, classify_object, classify_way};
pub use selector::{NumericOp, Selector, SelectorType, SelectorZoom, Specificity, TagCondition, TagPattern};
pub use stylesheet::{Declaration, Origin, Property, Rule, StyleSheet};
pub use values::{ColorValue, StyleValue};
