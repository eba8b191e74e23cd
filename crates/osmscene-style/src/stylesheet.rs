//! MapCSS style sheet domain model
//!
//! [MapCSS 0.2 § Rules](https://wiki.openstreetmap.org/wiki/MapCSS/0.2#Rules)
//!
//! Style sheets arrive here already parsed; this module only holds them.

use osmscene_common::warning::warn_once;
use serde::Serialize;

use crate::selector::{Selector, SelectorType};
use crate::values::{ColorValue, StyleValue};

/// [MapCSS 0.2 § Vocabulary](https://wiki.openstreetmap.org/wiki/MapCSS/0.2#Vocabulary)
///
/// Properties the scene builder understands. Declarations may name other
/// properties; those pass through the cascade untouched.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Property {
    /// `z-index` - drawing order within a band
    ZIndex,
    /// `width` - stroke width in pixels
    Width,
    /// `color` - stroke color (nodes: symbol color)
    Color,
    /// `opacity` - stroke opacity, 0 to 1
    Opacity,
    /// `dashes` - dash pattern, e.g. `4,2`
    Dashes,
    /// `linecap` - `none`, `round` or `square`
    #[strum(serialize = "linecap")]
    LineCap,
    /// `linejoin` - `round`, `miter` or `bevel`
    #[strum(serialize = "linejoin")]
    LineJoin,
    /// `fill-color` - area fill, and the canvas background
    FillColor,
    /// `fill-opacity` - fill opacity, 0 to 1
    FillOpacity,
    /// `casing-width` - extra width of the casing drawn below a line
    CasingWidth,
    /// `casing-color` - color of the casing
    CasingColor,
    /// `icon-image` - image drawn at a node
    IconImage,
    /// `text` - label text, usually `eval(tag("name"))`
    Text,
    /// `text-color` - label color
    TextColor,
    /// `font-size` - label size in pixels
    FontSize,
    /// `text-halo-color` - outline around label glyphs
    TextHaloColor,
    /// `text-halo-radius` - width of the label outline
    TextHaloRadius,
}

/// A single `property: value;` pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Declaration {
    /// Property name as written, e.g. `line-color`.
    pub property: String,
    /// Declared value.
    pub value: StyleValue,
}

impl Declaration {
    /// Create a declaration.
    #[must_use]
    pub fn new(property: impl Into<String>, value: StyleValue) -> Self {
        Self {
            property: property.into(),
            value,
        }
    }
}

/// [CSS Cascading Level 4 § 6.2](https://www.w3.org/TR/css-cascade-4/#cascading-origins)
///
/// Where a rule comes from. User rules outrank base rules regardless of
/// specificity, the way author style outranks the user-agent sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub enum Origin {
    /// The built-in base style.
    #[default]
    Base,
    /// Rules supplied on top of the base style.
    User,
}

/// A MapCSS rule: one or more comma-separated selectors and a declaration
/// block.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Selectors, any of which selects the rule.
    pub selectors: Vec<Selector>,
    /// Declarations in source order.
    pub declarations: Vec<Declaration>,
    /// Origin of the rule.
    pub origin: Origin,
}

impl Rule {
    /// A base-origin rule with a single selector.
    #[must_use]
    pub fn new(selector: Selector, declarations: Vec<Declaration>) -> Self {
        Self {
            selectors: vec![selector],
            declarations,
            origin: Origin::Base,
        }
    }

    /// Set the rule's origin.
    #[must_use]
    pub const fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// Add another selector to the comma list.
    #[must_use]
    pub fn or_selector(mut self, selector: Selector) -> Self {
        self.selectors.push(selector);
        self
    }

    /// Check whether every selector is a canvas selector.
    #[must_use]
    pub fn is_canvas(&self) -> bool {
        !self.selectors.is_empty()
            && self.selectors.iter().all(|s| s.selector_type == SelectorType::Canvas)
    }
}

/// An ordered sequence of rules.
///
/// Rule order is declaration order; the cascade uses it as the final
/// tie-break.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSheet {
    /// Rules in declaration order.
    pub rules: Vec<Rule>,
}

impl StyleSheet {
    /// Create a style sheet from rules in declaration order.
    #[must_use]
    pub const fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Append a rule.
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Append all rules of `other` with the given origin, the way a user
    /// style is layered over the base style.
    pub fn extend_with_origin(&mut self, other: Self, origin: Origin) {
        self.rules
            .extend(other.rules.into_iter().map(|rule| rule.with_origin(origin)));
    }

    /// [MapCSS 0.2 § canvas](https://wiki.openstreetmap.org/wiki/MapCSS/0.2#Canvas_properties)
    ///
    /// Background color: the `fill-color` of the canvas rules, user origin
    /// over base, later over earlier.
    #[must_use]
    pub fn canvas_color(&self) -> Option<ColorValue> {
        let mut winner: Option<(Origin, ColorValue)> = None;
        let fills = self
            .rules
            .iter()
            .filter(|rule| rule.is_canvas())
            .flat_map(|rule| rule.declarations.iter().map(move |d| (rule.origin, d)))
            .filter(|(_, d)| d.property == Property::FillColor.as_ref());
        for (origin, declaration) in fills {
            let Some(color) = declaration.value.as_color() else {
                warn_once("style", &format!("canvas fill-color {:?} is not a color", declaration.value));
                continue;
            };
            if winner.is_none_or(|(current, _)| origin >= current) {
                winner = Some((origin, color));
            }
        }
        winner.map(|(_, color)| color)
    }
}
