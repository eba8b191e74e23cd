//! MapCSS property values
//!
//! [MapCSS 0.2 § Properties](https://wiki.openstreetmap.org/wiki/MapCSS/0.2#Vocabulary)

use std::fmt;

use serde::Serialize;

/// [CSS Color Level 4 § 4](https://www.w3.org/TR/css-color-4/#color-syntax)
/// sRGB color represented as RGBA components.
///
/// MapCSS borrows its color syntax from CSS: hex notations and the basic
/// named colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ColorValue {
    /// "the red color channel" (0-255)
    pub r: u8,
    /// "the green color channel" (0-255)
    pub g: u8,
    /// "the blue color channel" (0-255)
    pub b: u8,
    /// "the alpha channel" (0-255, 255 = fully opaque)
    pub a: u8,
}

/// Named colors as `(name, 0xRRGGBB)`.
///
/// [CSS Color Level 4 § 6.1](https://www.w3.org/TR/css-color-4/#named-colors),
/// limited to the keywords that show up in map styles.
const NAMED_COLORS: &[(&str, u32)] = &[
    ("aqua", 0x00ff_ff),
    ("beige", 0xf5f5_dc),
    ("black", 0x0000_00),
    ("blue", 0x0000_ff),
    ("brown", 0xa52a_2a),
    ("cyan", 0x00ff_ff),
    ("darkgreen", 0x0064_00),
    ("fuchsia", 0xff00_ff),
    ("gold", 0xffd7_00),
    ("gray", 0x8080_80),
    ("green", 0x0080_00),
    ("grey", 0x8080_80),
    ("khaki", 0xf0e6_8c),
    ("lightblue", 0xadd8_e6),
    ("lightgreen", 0x90ee_90),
    ("lightgrey", 0xd3d3_d3),
    ("lime", 0x00ff_00),
    ("magenta", 0xff00_ff),
    ("maroon", 0x8000_00),
    ("navy", 0x0000_80),
    ("olive", 0x8080_00),
    ("orange", 0xffa5_00),
    ("pink", 0xffc0_cb),
    ("purple", 0x8000_80),
    ("red", 0xff00_00),
    ("salmon", 0xfa80_72),
    ("silver", 0xc0c0_c0),
    ("tan", 0xd2b4_8c),
    ("teal", 0x0080_80),
    ("white", 0xffff_ff),
    ("yellow", 0xffff_00),
];

impl ColorValue {
    /// Black (#000000)
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0, a: 255 };

    /// White (#ffffff)
    pub const WHITE: Self = Self { r: 255, g: 255, b: 255, a: 255 };

    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self { r: 0, g: 0, b: 0, a: 0 };

    /// Build an opaque color from a packed `0xRRGGBB` value.
    #[must_use]
    pub const fn from_rgb(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
            a: 255,
        }
    }

    /// [CSS Color Level 4 § 4.2](https://www.w3.org/TR/css-color-4/#hex-notation)
    /// "The syntax of a <hex-color> is a <hash-token> token whose value consists of
    /// 3, 4, 6, or 8 hexadecimal digits."
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }
        let digit = |i: usize| u8::from_str_radix(&hex[i..=i].repeat(2), 16).ok();
        let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            // "The three-digit RGB notation (#RGB) is converted into six-digit form (#RRGGBB)
            // by replicating digits, not by adding zeros."
            3 => Some(Self { r: digit(0)?, g: digit(1)?, b: digit(2)?, a: 255 }),
            4 => Some(Self { r: digit(0)?, g: digit(1)?, b: digit(2)?, a: digit(3)? }),
            6 => Some(Self { r: pair(0)?, g: pair(2)?, b: pair(4)?, a: 255 }),
            8 => Some(Self { r: pair(0)?, g: pair(2)?, b: pair(4)?, a: pair(6)? }),
            _ => None,
        }
    }

    /// [CSS Color Level 4 § 6.1](https://www.w3.org/TR/css-color-4/#named-colors)
    #[must_use]
    pub fn from_named(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        if name == "transparent" {
            return Some(Self::TRANSPARENT);
        }
        NAMED_COLORS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, rgb)| Self::from_rgb(rgb))
    }

    /// Parse either notation, as found in a tag value such as `colour=#ff0`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.starts_with('#') {
            Self::from_hex(text)
        } else {
            Self::from_named(text).or_else(|| Self::from_hex(text))
        }
    }

    /// [MapCSS 0.2 § opacity](https://wiki.openstreetmap.org/wiki/MapCSS/0.2#Line_properties)
    ///
    /// Scale the alpha channel by an opacity in `[0, 1]`.
    #[must_use]
    pub fn with_opacity(self, opacity: f64) -> Self {
        let opacity = if opacity.is_nan() { 1.0 } else { opacity.clamp(0.0, 1.0) };
        Self {
            a: (f64::from(self.a) * opacity).round() as u8,
            ..self
        }
    }

    /// Pack as `0xAARRGGBB`, the layout drawing backends usually expect.
    #[must_use]
    pub const fn to_argb(&self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Convert to hex string notation (#RRGGBB or #RRGGBBAA if alpha != 255)
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_string())
    }
}

/// [MapCSS 0.2 § Vocabulary](https://wiki.openstreetmap.org/wiki/MapCSS/0.2#Vocabulary)
///
/// The value side of a declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StyleValue {
    /// A number, e.g. `width: 2`.
    Number(f64),
    /// A color, e.g. `color: #ff0000`.
    Color(ColorValue),
    /// A keyword or string, e.g. `linecap: round` or `icon-image: "bench.png"`.
    Text(String),
    /// A list of numbers, e.g. `dashes: 4,2`.
    Numbers(Vec<f64>),
    /// [MapCSS 0.2 § eval](https://wiki.openstreetmap.org/wiki/MapCSS/0.2/Eval)
    ///
    /// `eval(tag("key"))`: the value of the object's own tag, substituted
    /// at resolution time.
    Tag(String),
}

impl StyleValue {
    /// The value as a number, if it is one or is text holding one.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(t) => parse_number(t),
            _ => None,
        }
    }

    /// The value as a color, if it is one or is text naming one.
    #[must_use]
    pub fn as_color(&self) -> Option<ColorValue> {
        match self {
            Self::Color(c) => Some(*c),
            Self::Text(t) => ColorValue::parse(t),
            _ => None,
        }
    }

    /// The value as text. Numbers are formatted without a trailing `.0`.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(t) => Some(t.clone()),
            Self::Number(n) => Some(n.to_string()),
            Self::Color(c) => Some(c.to_hex_string()),
            Self::Numbers(_) | Self::Tag(_) => None,
        }
    }

    /// The value as a list of numbers; a single number is a list of one.
    #[must_use]
    pub fn as_numbers(&self) -> Option<Vec<f64>> {
        match self {
            Self::Numbers(v) => Some(v.clone()),
            Self::Number(n) => Some(vec![*n]),
            Self::Text(t) => t.split(',').map(parse_number).collect(),
            _ => None,
        }
    }
}

/// Parse a finite number, tolerating surrounding whitespace.
fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}
