//! MapCSS selector model and matching
//!
//! This module implements selector matching per
//! [MapCSS 0.2 § Selectors](https://wiki.openstreetmap.org/wiki/MapCSS/0.2#Selectors).

use std::fmt;

use osmscene_geo::{GeoObject, ObjectKind, TagsCollection};
use regex::Regex;
use serde::Serialize;

use crate::classify::{WayClass, classify_object};

/// [MapCSS 0.2 § Selectors](https://wiki.openstreetmap.org/wiki/MapCSS/0.2#Selectors)
///
/// "The first part of a selector is the type of object it applies to."
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum_macros::Display, strum_macros::EnumString,
)]
pub enum SelectorType {
    /// `node` - "a point"
    #[strum(serialize = "node")]
    Node,
    /// `way` - "a line or area"
    #[strum(serialize = "way")]
    Way,
    /// `line` - "a way that is not an area"
    #[strum(serialize = "line")]
    Line,
    /// `area` - "a closed way or a multipolygon relation"
    #[strum(serialize = "area")]
    Area,
    /// `relation` - "a relation"
    #[strum(serialize = "relation")]
    Relation,
    /// `canvas` - "the background". Never matches an object; canvas rules
    /// are read by the style sheet for the background color.
    #[strum(serialize = "canvas")]
    Canvas,
    /// `*` - "any object"
    #[strum(serialize = "*")]
    Wildcard,
}

/// [MapCSS 0.2 § Zoom levels](https://wiki.openstreetmap.org/wiki/MapCSS/0.2#Zoom_levels)
///
/// "`|z12-` from zoom 12 upward, `|z-14` up to zoom 14, `|z12-14` between
/// the two." Both bounds are inclusive; a missing bound is unrestricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct SelectorZoom {
    /// Lowest zoom the selector applies at.
    pub min: Option<u32>,
    /// Highest zoom the selector applies at.
    pub max: Option<u32>,
}

impl SelectorZoom {
    /// No restriction.
    pub const ALL: Self = Self { min: None, max: None };

    /// Create a zoom range.
    #[must_use]
    pub const fn new(min: Option<u32>, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Check whether a zoom factor lies inside the range.
    #[must_use]
    pub fn contains(&self, zoom_factor: f32) -> bool {
        let zoom = f64::from(zoom_factor);
        self.min.is_none_or(|min| zoom >= f64::from(min)) && self.max.is_none_or(|max| zoom <= f64::from(max))
    }

    /// Check whether neither bound is set.
    #[must_use]
    pub const fn is_unrestricted(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

impl fmt::Display for SelectorZoom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (None, None) => Ok(()),
            (Some(min), Some(max)) if min == max => write!(f, "|z{min}"),
            (min, max) => {
                f.write_str("|z")?;
                if let Some(min) = min {
                    write!(f, "{min}")?;
                }
                f.write_str("-")?;
                if let Some(max) = max {
                    write!(f, "{max}")?;
                }
                Ok(())
            }
        }
    }
}

/// Numeric comparison operators, `[population>50000]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NumericOp {
    /// `<`
    Less,
    /// `<=`
    LessOrEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterOrEqual,
}

impl NumericOp {
    const fn symbol(self) -> &'static str {
        match self {
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
        }
    }

    fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Self::Less => lhs < rhs,
            Self::LessOrEqual => lhs <= rhs,
            Self::Greater => lhs > rhs,
            Self::GreaterOrEqual => lhs >= rhs,
        }
    }
}

/// A compiled regular expression compared by its source text.
#[derive(Debug, Clone)]
pub struct TagPattern(Regex);

impl TagPattern {
    /// Compile a pattern.
    ///
    /// # Errors
    ///
    /// Returns the regex error for malformed patterns. Style sheets are
    /// expected to be rejected at load time when this fails.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self)
    }

    /// Source text of the pattern.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Check whether the pattern occurs anywhere in `value`.
    #[must_use]
    pub fn is_match(&self, value: &str) -> bool {
        self.0.is_match(value)
    }
}

impl PartialEq for TagPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// [MapCSS 0.2 § Tests](https://wiki.openstreetmap.org/wiki/MapCSS/0.2#Tests)
///
/// A predicate tree over an object's tags.
#[derive(Debug, Clone, PartialEq)]
pub enum TagCondition {
    /// `[key]` - "the key is set"
    Exists(String),
    /// `[key=value]` - "the key has exactly this value"
    Equals(String, String),
    /// `[key=~/regex/]` - "the value matches the regular expression"
    Matches(String, TagPattern),
    /// `[key?]` - "the value is yes, true or 1"
    Truthy(String),
    /// `[key>n]` etc. - "the value is a number comparing so to n".
    /// Non-numeric values never match.
    Numeric(String, NumericOp, f64),
    /// `[!key]`, `[key!=value]` - negation of the inner condition
    Not(Box<TagCondition>),
    /// `[a][b]` - every inner condition holds
    All(Vec<TagCondition>),
}

impl TagCondition {
    /// `[key]`
    #[must_use]
    pub fn exists(key: &str) -> Self {
        Self::Exists(key.to_string())
    }

    /// `[key=value]`
    #[must_use]
    pub fn equals(key: &str, value: &str) -> Self {
        Self::Equals(key.to_string(), value.to_string())
    }

    /// `[key!=value]`
    #[must_use]
    pub fn not_equals(key: &str, value: &str) -> Self {
        Self::Not(Box::new(Self::equals(key, value)))
    }

    /// Check whether the tags satisfy this condition.
    #[must_use]
    pub fn accepts(&self, tags: &TagsCollection) -> bool {
        match self {
            Self::Exists(key) => tags.contains_key(key),
            Self::Equals(key, value) => tags.get(key) == Some(value.as_str()),
            Self::Matches(key, pattern) => tags.get(key).is_some_and(|v| pattern.is_match(v)),
            Self::Truthy(key) => tags.is_truthy(key),
            Self::Numeric(key, op, rhs) => tags
                .get(key)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .is_some_and(|lhs| op.apply(lhs, *rhs)),
            Self::Not(inner) => !inner.accepts(tags),
            Self::All(conditions) => conditions.iter().all(|c| c.accepts(tags)),
        }
    }

    /// Number of leaf tests in the tree, used for specificity.
    #[must_use]
    pub fn leaf_count(&self) -> u32 {
        match self {
            Self::Not(inner) => inner.leaf_count(),
            Self::All(conditions) => conditions.iter().map(Self::leaf_count).sum(),
            _ => 1,
        }
    }
}

impl fmt::Display for TagCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exists(key) => write!(f, "[{key}]"),
            Self::Equals(key, value) => write!(f, "[{key}={value}]"),
            Self::Matches(key, pattern) => write!(f, "[{key}=~/{}/]", pattern.as_str()),
            Self::Truthy(key) => write!(f, "[{key}?]"),
            Self::Numeric(key, op, value) => write!(f, "[{key}{}{value}]", op.symbol()),
            Self::Not(inner) => match inner.as_ref() {
                Self::Exists(key) => write!(f, "[!{key}]"),
                Self::Equals(key, value) => write!(f, "[{key}!={value}]"),
                other => write!(f, "!({other})"),
            },
            Self::All(conditions) => conditions.iter().try_for_each(|c| write!(f, "{c}")),
        }
    }
}

/// [CSS Selectors Level 4 § 17](https://www.w3.org/TR/selectors-4/#specificity-rules),
/// reduced to what a MapCSS selector carries.
///
/// `(type, tests)`: whether the selector names a type other than `*`, then
/// the number of tag tests. Compared lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Specificity(pub u32, pub u32);

/// A MapCSS selector: type, optional zoom range and optional tag tests.
///
/// Example: `area|z14-[building]`
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    /// Type of object selected.
    pub selector_type: SelectorType,
    /// Zoom range, `None` for all zooms.
    pub zoom: Option<SelectorZoom>,
    /// Tag tests, `None` for no tests.
    pub rule: Option<TagCondition>,
}

impl Selector {
    /// A selector on a type with no zoom range and no tests.
    #[must_use]
    pub const fn new(selector_type: SelectorType) -> Self {
        Self {
            selector_type,
            zoom: None,
            rule: None,
        }
    }

    /// Restrict to a zoom range.
    #[must_use]
    pub const fn with_zoom(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.zoom = Some(SelectorZoom::new(min, max));
        self
    }

    /// Attach tag tests. Repeated calls combine with [`TagCondition::All`].
    #[must_use]
    pub fn with_rule(mut self, condition: TagCondition) -> Self {
        self.rule = Some(match self.rule.take() {
            None => condition,
            Some(TagCondition::All(mut conditions)) => {
                conditions.push(condition);
                TagCondition::All(conditions)
            }
            Some(existing) => TagCondition::All(vec![existing, condition]),
        });
        self
    }

    /// The zoom range, [`SelectorZoom::ALL`] when absent.
    #[must_use]
    pub fn zoom_range(&self) -> SelectorZoom {
        self.zoom.unwrap_or(SelectorZoom::ALL)
    }

    /// [MapCSS 0.2 § Selectors](https://wiki.openstreetmap.org/wiki/MapCSS/0.2#Selectors)
    ///
    /// Check whether this selector selects `object`, ignoring zoom.
    ///
    /// The zoom range is returned whatever the outcome; callers ignore it on
    /// a miss. Matching never fails: an object either matches or not.
    #[must_use]
    pub fn matches(&self, object: &GeoObject) -> (bool, SelectorZoom) {
        let zoom = self.zoom_range();

        // A failing tag test short-circuits whatever the type.
        if self.rule.as_ref().is_some_and(|rule| !rule.accepts(&object.tags)) {
            return (false, zoom);
        }

        (type_matches(self.selector_type, object), zoom)
    }

    /// Check whether this selector selects `object` at `zoom_factor`.
    #[must_use]
    pub fn selects(&self, object: &GeoObject, zoom_factor: f32) -> bool {
        let (matched, zoom) = self.matches(object);
        matched && zoom.contains(zoom_factor)
    }

    /// Specificity of this selector. Zoom ranges do not count.
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        let typed = u32::from(self.selector_type != SelectorType::Wildcard);
        let tests = self.rule.as_ref().map_or(0, TagCondition::leaf_count);
        Specificity(typed, tests)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.selector_type)?;
        if let Some(zoom) = &self.zoom {
            write!(f, "{zoom}")?;
        }
        if let Some(rule) = &self.rule {
            write!(f, "{rule}")?;
        }
        Ok(())
    }
}

/// Type compatibility between a selector type and an object.
fn type_matches(selector_type: SelectorType, object: &GeoObject) -> bool {
    match selector_type {
        SelectorType::Node => object.kind() == ObjectKind::Node,
        SelectorType::Way => object.kind() == ObjectKind::Way,
        SelectorType::Relation => object.kind() == ObjectKind::Relation,
        // Multipolygon relations are not assembled, so relations never
        // match `area` or `line`; only ways are classified.
        SelectorType::Area => classify_object(object) == Some(WayClass::Area),
        SelectorType::Line => classify_object(object) == Some(WayClass::Line),
        SelectorType::Canvas => false,
        SelectorType::Wildcard => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use osmscene_geo::GeoCoordinate;

    fn closed_way(pairs: &[(&str, &str)]) -> GeoObject {
        GeoObject::way(
            1,
            vec![
                GeoCoordinate::new(0.0, 0.0),
                GeoCoordinate::new(0.0, 1.0),
                GeoCoordinate::new(1.0, 1.0),
                GeoCoordinate::new(0.0, 0.0),
            ],
            pairs.iter().copied().collect(),
        )
    }

    #[test]
    fn test_zoom_returned_on_miss() {
        let selector = Selector::new(SelectorType::Node).with_zoom(Some(12), None);
        let (matched, zoom) = selector.matches(&closed_way(&[]));
        assert!(!matched);
        assert_eq!(zoom, SelectorZoom::new(Some(12), None));
    }

    #[test]
    fn test_zoom_contains_inclusive() {
        let zoom = SelectorZoom::new(Some(12), Some(14));
        assert!(zoom.contains(12.0));
        assert!(zoom.contains(14.0));
        assert!(!zoom.contains(11.9));
        assert!(!zoom.contains(14.5));
        assert!(SelectorZoom::ALL.contains(3.0));
    }

    #[test]
    fn test_with_rule_combines() {
        let selector = Selector::new(SelectorType::Way)
            .with_rule(TagCondition::exists("highway"))
            .with_rule(TagCondition::not_equals("access", "private"))
            .with_rule(TagCondition::Truthy("bridge".into()));
        assert_eq!(selector.specificity(), Specificity(1, 3));
        assert_eq!(selector.to_string(), "way[highway][access!=private][bridge?]");
    }

    #[test]
    fn test_selector_display() {
        let selector = Selector::new(SelectorType::Area)
            .with_zoom(Some(14), None)
            .with_rule(TagCondition::exists("building"));
        assert_eq!(selector.to_string(), "area|z14-[building]");
        assert_eq!(Selector::new(SelectorType::Wildcard).to_string(), "*");
    }

    #[test]
    fn test_selector_type_from_str() {
        assert_eq!("area".parse::<SelectorType>().ok(), Some(SelectorType::Area));
        assert_eq!("*".parse::<SelectorType>().ok(), Some(SelectorType::Wildcard));
        assert!("polygon".parse::<SelectorType>().is_err());
    }
}
