//! MapCSS cascade
//!
//! This module implements style resolution per
//! [MapCSS 0.2 § Rules](https://wiki.openstreetmap.org/wiki/MapCSS/0.2#Rules),
//! which borrows its ordering from
//! [CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/).

use std::collections::HashMap;

use osmscene_geo::{GeoObject, TagsCollection};

use crate::selector::{Selector, Specificity};
use crate::stylesheet::{Origin, Property, Rule};
use crate::values::{ColorValue, StyleValue};

/// [§ 6 Cascading](https://www.w3.org/TR/css-cascade-4/#cascading)
///
/// A matched rule with its cascade sort key.
struct MatchedRule<'a> {
    origin: Origin,
    specificity: Specificity,
    rule: &'a Rule,
}

/// The final style of one object at one zoom level.
///
/// Property names map to resolved values; tag references have already been
/// substituted. An empty result means the object is not drawn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CascadeResult {
    properties: HashMap<String, StyleValue>,
}

impl CascadeResult {
    /// Value of a property by name.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&StyleValue> {
        self.properties.get(property)
    }

    /// Value of a known property.
    #[must_use]
    pub fn value(&self, property: Property) -> Option<&StyleValue> {
        self.get(property.as_ref())
    }

    /// A known property as a number.
    #[must_use]
    pub fn number(&self, property: Property) -> Option<f64> {
        self.value(property).and_then(StyleValue::as_number)
    }

    /// A known property as a color.
    #[must_use]
    pub fn color(&self, property: Property) -> Option<ColorValue> {
        self.value(property).and_then(StyleValue::as_color)
    }

    /// A known property as text.
    #[must_use]
    pub fn text(&self, property: Property) -> Option<String> {
        self.value(property).and_then(StyleValue::as_text)
    }

    /// Check whether a property resolved at all.
    #[must_use]
    pub fn contains(&self, property: Property) -> bool {
        self.properties.contains_key(property.as_ref())
    }

    /// Number of resolved properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Check if no property resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Iterate over `(property, value)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// [§ 6.4 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
///
/// Resolve the style of `object` at `zoom_factor`.
///
/// Rules whose selectors match (type, tags and zoom) are sorted by origin,
/// then specificity; the sort is stable, so declaration order breaks ties.
/// Declarations are then overlaid in that order and the last write wins.
///
/// A declaration referencing a tag the object lacks removes the property,
/// so the feature is drawn without it rather than with a stale value.
#[must_use]
pub fn resolve(object: &GeoObject, zoom_factor: f32, rules: &[Rule]) -> CascadeResult {
    let mut matched: Vec<MatchedRule<'_>> = rules
        .iter()
        .filter_map(|rule| {
            // With a comma list, the most specific matching selector counts.
            let specificity = rule
                .selectors
                .iter()
                .filter(|selector| selector.selects(object, zoom_factor))
                .map(Selector::specificity)
                .max()?;
            Some(MatchedRule {
                origin: rule.origin,
                specificity,
                rule,
            })
        })
        .collect();

    matched.sort_by_key(|m| (m.origin, m.specificity));

    let mut result = CascadeResult::default();
    for m in matched {
        for declaration in &m.rule.declarations {
            match substitute(&declaration.value, &object.tags) {
                Some(value) => {
                    let _ = result.properties.insert(declaration.property.clone(), value);
                }
                None => {
                    let _ = result.properties.remove(&declaration.property);
                }
            }
        }
    }
    result
}

/// Indices of the rules selecting `object` at `zoom_factor`, in declaration
/// order.
#[must_use]
pub fn matching_rules(object: &GeoObject, zoom_factor: f32, rules: &[Rule]) -> Vec<usize> {
    rules
        .iter()
        .enumerate()
        .filter(|(_, rule)| rule.selectors.iter().any(|s| s.selects(object, zoom_factor)))
        .map(|(index, _)| index)
        .collect()
}

/// [MapCSS 0.2 § eval](https://wiki.openstreetmap.org/wiki/MapCSS/0.2/Eval)
///
/// Replace a tag reference by the tag's value, verbatim. Numeric properties
/// such as `width` or `z-index` parse the text when they read it.
fn substitute(value: &StyleValue, tags: &TagsCollection) -> Option<StyleValue> {
    match value {
        StyleValue::Tag(key) => Some(StyleValue::Text(tags.get(key)?.to_string())),
        other => Some(other.clone()),
    }
}
