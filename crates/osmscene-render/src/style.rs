//! Resolved drawing styles and their interning.
//!
//! Primitives do not carry their style by value. Each distinct style record
//! is interned once and primitives hold a [`StyleHandle`] whose equality is
//! the interned id, so a backend can batch all primitives sharing a style
//! with integer comparisons.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use osmscene_style::ColorValue;
use serde::Serialize;

/// A style quantity (width, size, z-index) usable as a hash key.
///
/// Values compare by bit pattern after canonicalization: `-0.0` becomes
/// `0.0` and NaN becomes `0.0`.
#[derive(Debug, Clone, Copy, Default, PartialOrd, Serialize)]
pub struct Scalar(f32);

impl Scalar {
    /// Canonicalize a value.
    #[must_use]
    pub fn new(value: f32) -> Self {
        if value.is_nan() || value == 0.0 {
            Self(0.0)
        } else {
            Self(value)
        }
    }

    /// The value.
    #[must_use]
    pub const fn get(self) -> f32 {
        self.0
    }
}

impl From<f32> for Scalar {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Scalar {}

impl Hash for Scalar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// [MapCSS 0.2 § linecap](https://wiki.openstreetmap.org/wiki/MapCSS/0.2#Line_properties)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, strum_macros::Display, strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum LineCap {
    /// Flat end at the last vertex (`none`).
    #[default]
    #[strum(to_string = "none", serialize = "butt")]
    Butt,
    /// Half-disc beyond the last vertex.
    Round,
    /// Half-square beyond the last vertex.
    Square,
}

/// [MapCSS 0.2 § linejoin](https://wiki.openstreetmap.org/wiki/MapCSS/0.2#Line_properties)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, strum_macros::Display, strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum LineJoin {
    /// Rounded corners.
    #[default]
    Round,
    /// Sharp corners.
    Miter,
    /// Cut-off corners.
    Bevel,
}

/// Stroke style of a line or an area outline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LineStyle {
    /// Stroke color, opacity applied.
    pub color: ColorValue,
    /// Stroke width in pixels.
    pub width: Scalar,
    /// Dash pattern, empty for a solid line.
    pub dashes: Vec<Scalar>,
    /// End cap.
    pub line_cap: LineCap,
    /// Corner join.
    pub line_join: LineJoin,
    /// Drawing order within a band.
    pub z_index: Scalar,
}

/// Fill style of an area.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AreaStyle {
    /// Fill color, fill opacity applied.
    pub fill_color: ColorValue,
    /// Drawing order within a band.
    pub z_index: Scalar,
}

/// Style of a point marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PointStyle {
    /// Marker color.
    pub color: ColorValue,
    /// Marker diameter in pixels.
    pub size: Scalar,
    /// Drawing order within a band.
    pub z_index: Scalar,
}

/// Outline drawn around label glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TextHalo {
    /// Outline color.
    pub color: ColorValue,
    /// Outline width in pixels.
    pub radius: Scalar,
}

/// Style of a text label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TextStyle {
    /// Glyph color.
    pub color: ColorValue,
    /// Font size in pixels.
    pub font_size: Scalar,
    /// Optional halo.
    pub halo: Option<TextHalo>,
    /// Drawing order within a band.
    pub z_index: Scalar,
}

/// Style of an icon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct IconStyle {
    /// Image reference as written in the style sheet.
    pub image: String,
    /// Drawing order within a band.
    pub z_index: Scalar,
}

/// A style record with the drawing order it carries.
pub trait ZIndexed {
    /// Drawing order within a band.
    fn z_index(&self) -> f32;
}

macro_rules! impl_z_indexed {
    ($($style:ty),*) => {
        $(impl ZIndexed for $style {
            fn z_index(&self) -> f32 {
                self.z_index.get()
            }
        })*
    };
}

impl_z_indexed!(LineStyle, AreaStyle, PointStyle, TextStyle, IconStyle);

/// An interned style: the id plus a shared reference to the record.
///
/// Equality and hashing use the id only.
#[derive(Debug)]
pub struct StyleHandle<T> {
    id: u32,
    style: Arc<T>,
}

impl<T> StyleHandle<T> {
    /// Interned id, unique per style record within one interner.
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// The style record.
    #[must_use]
    pub fn style(&self) -> &T {
        &self.style
    }
}

impl<T> Clone for StyleHandle<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            style: Arc::clone(&self.style),
        }
    }
}

impl<T> PartialEq for StyleHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for StyleHandle<T> {}

impl<T> Hash for StyleHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Interned [`LineStyle`].
pub type SceneStyleLine = StyleHandle<LineStyle>;
/// Interned [`AreaStyle`].
pub type SceneStyleArea = StyleHandle<AreaStyle>;
/// Interned [`PointStyle`].
pub type SceneStylePoint = StyleHandle<PointStyle>;
/// Interned [`TextStyle`].
pub type SceneStyleText = StyleHandle<TextStyle>;
/// Interned [`IconStyle`].
pub type SceneStyleIcon = StyleHandle<IconStyle>;

/// Value-keyed interner assigning ids in first-seen order.
///
/// Ids are never reused, not even across [`clear`](Self::clear), so a
/// handle kept from before a rebuild never equals a different style.
#[derive(Debug)]
pub struct StyleInterner<T> {
    ids: HashMap<Arc<T>, u32>,
    styles: Vec<Arc<T>>,
    /// Id of `styles[0]`.
    first_id: u32,
}

impl<T> Default for StyleInterner<T> {
    fn default() -> Self {
        Self {
            ids: HashMap::new(),
            styles: Vec::new(),
            first_id: 0,
        }
    }
}

impl<T: Eq + Hash> StyleInterner<T> {
    /// Create an empty interner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the handle of `style`, assigning a new id if it is unseen.
    pub fn intern(&mut self, style: T) -> StyleHandle<T> {
        if let Some((existing, &id)) = self.ids.get_key_value(&style) {
            return StyleHandle {
                id,
                style: Arc::clone(existing),
            };
        }
        let id = self.next_id();
        let style = Arc::new(style);
        self.styles.push(Arc::clone(&style));
        let _ = self.ids.insert(Arc::clone(&style), id);
        StyleHandle { id, style }
    }

    /// The handle for an id, if assigned.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<StyleHandle<T>> {
        let index = usize::try_from(id.checked_sub(self.first_id)?).ok()?;
        let style = self.styles.get(index)?;
        Some(StyleHandle {
            id,
            style: Arc::clone(style),
        })
    }

    /// Number of distinct styles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Check if nothing has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Forget all styles. Handles already given out stay valid, and styles
    /// interned afterwards get fresh ids.
    pub fn clear(&mut self) {
        self.first_id = self.next_id();
        self.ids.clear();
        self.styles.clear();
    }

    fn next_id(&self) -> u32 {
        u32::try_from(self.styles.len())
            .ok()
            .and_then(|len| self.first_id.checked_add(len))
            .unwrap_or(u32::MAX)
    }
}

/// One interner per style kind.
#[derive(Debug, Default)]
pub struct StyleRegistry {
    /// Line styles.
    pub lines: StyleInterner<LineStyle>,
    /// Area fill styles.
    pub areas: StyleInterner<AreaStyle>,
    /// Point marker styles.
    pub points: StyleInterner<PointStyle>,
    /// Label styles.
    pub texts: StyleInterner<TextStyle>,
    /// Icon styles.
    pub icons: StyleInterner<IconStyle>,
}

impl StyleRegistry {
    /// Forget all interned styles.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.areas.clear();
        self.points.clear();
        self.texts.clear();
        self.icons.clear();
    }
}
