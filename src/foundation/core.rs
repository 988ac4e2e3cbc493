use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{OvermarkError, OvermarkResult};

pub use kurbo::{BezPath, Point, Rect, Size, Vec2};

/// Axis-aligned rectangle in percent (0..100) of a page.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PageRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PageRect {
    pub const FULL: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 100.0,
        height: 100.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn right(self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(self) -> f64 {
        self.y + self.height
    }

    /// True when the rectangle cannot be used as a coordinate frame.
    pub fn is_degenerate(self) -> bool {
        let finite = self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite();
        !finite || self.width <= 0.0 || self.height <= 0.0
    }

    /// Inclusive containment test in the same percent space as the rectangle.
    pub fn contains(self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Map to pixels on a `width_px` x `height_px` page surface.
    pub fn to_px(self, width_px: f64, height_px: f64) -> Rect {
        Rect::new(
            self.x / 100.0 * width_px,
            self.y / 100.0 * height_px,
            self.right() / 100.0 * width_px,
            self.bottom() / 100.0 * height_px,
        )
    }
}

/// Explicit surface measurements passed into every geometry and render call.
///
/// `scale` multiplies fixed-size decorations (stroke widths, mark glyphs, badges). It is `1.0`
/// on the reference export raster, which is rendered at twice the document's nominal size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderContext {
    pub container_width_px: f64,
    pub container_height_px: f64,
    pub scale: f64,
}

impl RenderContext {
    pub fn new(container_width_px: f64, container_height_px: f64) -> Self {
        Self {
            container_width_px,
            container_height_px,
            scale: 1.0,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn size(&self) -> Size {
        Size::new(self.container_width_px, self.container_height_px)
    }

    /// True when both dimensions are positive and finite.
    pub fn has_surface(&self) -> bool {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        ok(self.container_width_px) && ok(self.container_height_px)
    }

    /// Decoration scale, falling back to `1.0` for unusable values.
    pub fn decoration_scale(&self) -> f64 {
        if self.scale.is_finite() && self.scale > 0.0 {
            self.scale
        } else {
            1.0
        }
    }
}

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same color with alpha multiplied by `f` (clamped to 0..1).
    pub fn with_alpha_scaled(self, f: f64) -> Self {
        let f = if f.is_finite() { f.clamp(0.0, 1.0) } else { 1.0 };
        Self {
            a: (f64::from(self.a) * f).round() as u8,
            ..self
        }
    }

    pub fn alpha_f64(self) -> f64 {
        f64::from(self.a) / 255.0
    }

    /// `#rrggbb`, alpha dropped.
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A color as written in project data, kept verbatim for lossless round-trips.
#[derive(Clone, Debug, PartialEq)]
pub struct CssColor {
    raw: String,
    rgba: Rgba8,
}

impl CssColor {
    pub fn parse(s: &str) -> OvermarkResult<Self> {
        let rgba = parse_css_color(s).map_err(OvermarkError::validation)?;
        Ok(Self {
            raw: s.to_owned(),
            rgba,
        })
    }

    pub fn from_rgba(rgba: Rgba8) -> Self {
        let raw = if rgba.a == 255 {
            rgba.hex()
        } else {
            format!(
                "rgba({},{},{},{})",
                rgba.r,
                rgba.g,
                rgba.b,
                rgba.alpha_f64()
            )
        };
        Self { raw, rgba }
    }

    pub fn rgba(&self) -> Rgba8 {
        self.rgba
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Default for CssColor {
    fn default() -> Self {
        Self::from_rgba(Rgba8::BLACK)
    }
}

impl fmt::Display for CssColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for CssColor {
    type Err = OvermarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for CssColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> serde::Deserialize<'de> for CssColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

fn parse_css_color(s: &str) -> Result<Rgba8, String> {
    let t = s.trim();
    if let Some(hex) = t.strip_prefix('#') {
        return parse_hex(hex);
    }

    let lower = t.to_ascii_lowercase();
    if let Some(args) = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_args(args);
    }

    match lower.as_str() {
        "black" => Ok(Rgba8::BLACK),
        "white" => Ok(Rgba8::WHITE),
        "red" => Ok(Rgba8::rgb(255, 0, 0)),
        "green" => Ok(Rgba8::rgb(0, 128, 0)),
        "blue" => Ok(Rgba8::rgb(0, 0, 255)),
        "transparent" => Ok(Rgba8::new(0, 0, 0, 0)),
        _ => Err(format!("unsupported color \"{s}\"")),
    }
}

fn parse_hex(s: &str) -> Result<Rgba8, String> {
    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }
    fn hex_nibble(c: &str) -> Result<u8, String> {
        hex_byte(c).map(|v| v * 17)
    }

    if !s.is_ascii() {
        return Err("hex color must be ASCII".to_owned());
    }
    match s.len() {
        3 => Ok(Rgba8::rgb(
            hex_nibble(&s[0..1])?,
            hex_nibble(&s[1..2])?,
            hex_nibble(&s[2..3])?,
        )),
        6 => Ok(Rgba8::rgb(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
        )),
        8 => Ok(Rgba8::new(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            hex_byte(&s[6..8])?,
        )),
        _ => Err("hex color must be #RGB, #RRGGBB or #RRGGBBAA".to_owned()),
    }
}

fn parse_rgb_args(args: &str) -> Result<Rgba8, String> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(format!("rgb()/rgba() takes 3 or 4 components, got {}", parts.len()));
    }

    let channel = |p: &str| -> Result<u8, String> {
        let v: f64 = p
            .parse()
            .map_err(|_| format!("invalid color channel \"{p}\""))?;
        Ok(v.clamp(0.0, 255.0).round() as u8)
    };
    let alpha = match parts.get(3) {
        Some(p) => {
            let v: f64 = p.parse().map_err(|_| format!("invalid alpha \"{p}\""))?;
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        None => 255,
    };

    Ok(Rgba8::new(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        alpha,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
