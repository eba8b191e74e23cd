//! Turning a resolved style into primitives.
//!
//! [MapCSS 0.2 § Vocabulary](https://wiki.openstreetmap.org/wiki/MapCSS/0.2#Vocabulary)
//!
//! Unusable property values are dropped with a one-time warning; the rest
//! of the object is still drawn.

use osmscene_common::warning::warn_once;
use osmscene_geo::{GeoObject, ObjectData, ObjectKey, Projection};
use osmscene_style::{CascadeResult, ColorValue, Property, StyleValue, WayClass, classify_object};
use tracing::trace;

use crate::config::SceneConfig;
use crate::primitive::Primitive;
use crate::style::{
    AreaStyle, IconStyle, LineStyle, PointStyle, Scalar, StyleRegistry, TextHalo, TextStyle,
};
use crate::view::Rect;

/// Casing is drawn this many casing widths wider than the line it wraps.
const CASING_WIDTH_MULTIPLIER: f32 = 2.0;

/// Builds the primitives of one object at one band.
pub(crate) struct PrimitiveBuilder<'a> {
    pub(crate) styles: &'a mut StyleRegistry,
    pub(crate) projection: &'a dyn Projection,
    pub(crate) config: &'a SceneConfig,
}

impl PrimitiveBuilder<'_> {
    /// Append the primitives for `object` styled by `style` to `out`.
    pub(crate) fn build(&mut self, object: &GeoObject, style: &CascadeResult, out: &mut Vec<Primitive>) {
        let key = object.key();
        let values = Values { style, key };
        match &object.data {
            ObjectData::Node { coordinate } => {
                let position = self.projection.to_screen_coordinates(coordinate);
                self.build_node(&values, position, out);
                self.build_label(&values, position, out);
            }
            ObjectData::Way { coordinates } => {
                let points: Vec<(f64, f64)> = coordinates
                    .iter()
                    .map(|c| self.projection.to_screen_coordinates(c))
                    .collect();
                let Some(extent) = Rect::from_points(&points) else {
                    trace!(?key, "way without coordinates");
                    return;
                };
                if points.len() < 2 {
                    trace!(?key, "way with a single coordinate");
                    return;
                }
                let anchor = if classify_object(object) == Some(WayClass::Area) {
                    self.build_area(&values, &points, extent, out);
                    centroid(&points).unwrap_or_else(|| extent.center())
                } else {
                    self.build_line(&values, &points, extent, out);
                    midpoint(&points)
                };
                self.build_label(&values, anchor, out);
            }
            ObjectData::Relation { .. } => {
                trace!(?key, "relations have no geometry of their own");
            }
        }
    }

    fn build_node(&mut self, values: &Values<'_>, position: (f64, f64), out: &mut Vec<Primitive>) {
        let z_index = values.z_index();
        if let Some(image) = values.text(Property::IconImage) {
            let style = self.styles.icons.intern(IconStyle { image, z_index });
            out.push(Primitive::Icon {
                key: values.key,
                position,
                style,
            });
        }

        let color = values.color(Property::Color);
        let width = values.number(Property::Width);
        if color.is_some() || width.is_some() {
            let style = self.styles.points.intern(PointStyle {
                color: color
                    .unwrap_or(ColorValue::BLACK)
                    .with_opacity(values.opacity(Property::Opacity)),
                size: Scalar::new(width.unwrap_or(1.0)),
                z_index,
            });
            out.push(Primitive::Point {
                key: values.key,
                position,
                style,
            });
        }
    }

    fn build_area(&mut self, values: &Values<'_>, points: &[(f64, f64)], extent: Rect, out: &mut Vec<Primitive>) {
        if let Some(fill) = values.color(Property::FillColor) {
            let style = self.styles.areas.intern(AreaStyle {
                fill_color: fill.with_opacity(values.opacity(Property::FillOpacity)),
                z_index: values.z_index(),
            });
            out.push(Primitive::Polygon {
                key: values.key,
                points: points.to_vec(),
                style,
                extent,
            });
        }
        if let Some(stroke) = self.stroke(values) {
            out.push(self.line(values.key, points, stroke, extent));
        }
    }

    fn build_line(&mut self, values: &Values<'_>, points: &[(f64, f64)], extent: Rect, out: &mut Vec<Primitive>) {
        let Some(stroke) = self.stroke(values) else {
            return;
        };
        let casing_width = values.number(Property::CasingWidth).unwrap_or(0.0);
        if casing_width > 0.0 {
            let casing = LineStyle {
                color: values.color(Property::CasingColor).unwrap_or(ColorValue::BLACK),
                width: Scalar::new(stroke.width.get() + CASING_WIDTH_MULTIPLIER * casing_width),
                dashes: Vec::new(),
                ..stroke.clone()
            };
            out.push(self.line(values.key, points, casing, extent));
        }
        out.push(self.line(values.key, points, stroke, extent));
    }

    fn build_label(&mut self, values: &Values<'_>, position: (f64, f64), out: &mut Vec<Primitive>) {
        let Some(text) = values.text(Property::Text) else {
            return;
        };
        let font_size = values
            .number(Property::FontSize)
            .unwrap_or(self.config.default_font_size);
        if font_size < self.config.min_label_font_size {
            trace!(key = ?values.key, font_size, "label below minimum font size");
            return;
        }
        let radius = values.number(Property::TextHaloRadius).unwrap_or(0.0);
        let halo = (radius > 0.0).then(|| TextHalo {
            color: values.color(Property::TextHaloColor).unwrap_or(ColorValue::WHITE),
            radius: Scalar::new(radius),
        });
        let style = self.styles.texts.intern(TextStyle {
            color: values.color(Property::TextColor).unwrap_or(ColorValue::BLACK),
            font_size: Scalar::new(font_size),
            halo,
            z_index: values.z_index(),
        });
        out.push(Primitive::Text {
            key: values.key,
            position,
            text,
            style,
        });
    }

    /// The stroke declared by `color`, `width`, `opacity`, `dashes`,
    /// `linecap` and `linejoin`, or `None` without a usable `color`.
    fn stroke(&self, values: &Values<'_>) -> Option<LineStyle> {
        let color = values.color(Property::Color)?;
        Some(LineStyle {
            color: color.with_opacity(values.opacity(Property::Opacity)),
            width: Scalar::new(values.number(Property::Width).unwrap_or(1.0)),
            dashes: values.dashes(),
            line_cap: values.keyword(Property::LineCap).unwrap_or_default(),
            line_join: values.keyword(Property::LineJoin).unwrap_or_default(),
            z_index: values.z_index(),
        })
    }

    fn line(&mut self, key: ObjectKey, points: &[(f64, f64)], style: LineStyle, extent: Rect) -> Primitive {
        Primitive::Line {
            key,
            points: points.to_vec(),
            style: self.styles.lines.intern(style),
            extent,
        }
    }
}

/// Typed access to a cascade result, warning once per unusable value.
struct Values<'a> {
    style: &'a CascadeResult,
    key: ObjectKey,
}

impl Values<'_> {
    fn warn(&self, property: Property, value: &StyleValue, expected: &str) {
        trace!(key = ?self.key, %property, "unusable value");
        warn_once("scene", &format!("{property}: expected {expected}, got {value:?}"));
    }

    fn number(&self, property: Property) -> Option<f32> {
        let value = self.style.value(property)?;
        let number = value.as_number().filter(|n| n.is_finite());
        if number.is_none() {
            self.warn(property, value, "a number");
        }
        number.map(|n| n as f32)
    }

    fn color(&self, property: Property) -> Option<ColorValue> {
        let value = self.style.value(property)?;
        let color = value.as_color();
        if color.is_none() {
            self.warn(property, value, "a color");
        }
        color
    }

    fn text(&self, property: Property) -> Option<String> {
        self.style
            .value(property)
            .and_then(StyleValue::as_text)
            .filter(|text| !text.is_empty())
    }

    fn keyword<T: std::str::FromStr>(&self, property: Property) -> Option<T> {
        let value = self.style.value(property)?;
        let parsed = value.as_text().and_then(|text| text.trim().parse().ok());
        if parsed.is_none() {
            self.warn(property, value, "a keyword");
        }
        parsed
    }

    fn z_index(&self) -> Scalar {
        Scalar::new(self.number(Property::ZIndex).unwrap_or(0.0))
    }

    fn opacity(&self, property: Property) -> f64 {
        self.number(property).map_or(1.0, f64::from)
    }

    fn dashes(&self) -> Vec<Scalar> {
        let Some(value) = self.style.value(Property::Dashes) else {
            return Vec::new();
        };
        match value.as_numbers() {
            Some(dashes) if dashes.iter().all(|d| d.is_finite() && *d > 0.0) => {
                dashes.into_iter().map(|d| Scalar::new(d as f32)).collect()
            }
            _ => {
                self.warn(Property::Dashes, value, "positive dash lengths");
                Vec::new()
            }
        }
    }
}

/// The point halfway along a polyline.
fn midpoint(points: &[(f64, f64)]) -> (f64, f64) {
    let segment = |&(a, b): &((f64, f64), (f64, f64))| (b.0 - a.0).hypot(b.1 - a.1);
    let segments: Vec<_> = points.windows(2).map(|w| (w[0], w[1])).collect();
    let mut remaining = segments.iter().map(segment).sum::<f64>() / 2.0;
    for pair in &segments {
        let length = segment(pair);
        if remaining <= length && length > 0.0 {
            let t = remaining / length;
            let ((x0, y0), (x1, y1)) = *pair;
            return (x0 + (x1 - x0) * t, y0 + (y1 - y0) * t);
        }
        remaining -= length;
    }
    points[points.len() / 2]
}

/// Centroid of a closed ring, `None` when its area is negligible.
fn centroid(ring: &[(f64, f64)]) -> Option<(f64, f64)> {
    let (mut area, mut cx, mut cy) = (0.0, 0.0, 0.0);
    for w in ring.windows(2) {
        let ((x0, y0), (x1, y1)) = (w[0], w[1]);
        let cross = x0 * y1 - x1 * y0;
        area += cross;
        cx += (x0 + x1) * cross;
        cy += (y0 + y1) * cross;
    }
    if area.abs() < f64::EPSILON {
        return None;
    }
    Some((cx / (3.0 * area), cy / (3.0 * area)))
}
