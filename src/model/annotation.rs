use crate::foundation::core::{CssColor, Point};
use crate::foundation::error::{OvermarkError, OvermarkResult};

/// Underlines narrower than this (region-local percent) are not committed.
pub const UNDERLINE_MIN_WIDTH: f64 = 2.0;

/// Stored relative text sizes outside `(0, MAX_FONT_SIZE_REL]` are treated as invalid.
pub const MAX_FONT_SIZE_REL: f64 = 20.0;

const DEFAULT_LEGACY_FONT_SIZE_PX: f64 = 16.0;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
/// Correction pass an annotation belongs to.
///
/// Records written before roles existed carry no tag and load as [`Role::First`]. That default
/// is a compatibility shim for old data.
pub enum Role {
    /// Primary grader.
    #[default]
    First,
    /// Secondary grader.
    Second,
    /// Reference model solution.
    Solution,
}

impl Role {
    /// The other correction role, `None` for the solution layer.
    pub fn opposing(self) -> Option<Role> {
        match self {
            Role::First => Some(Role::Second),
            Role::Second => Some(Role::First),
            Role::Solution => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::First => "first",
            Role::Second => "second",
            Role::Solution => "solution",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = OvermarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(Role::First),
            "second" => Ok(Role::Second),
            "solution" => Ok(Role::Solution),
            other => Err(OvermarkError::validation(format!("unknown role \"{other}\""))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
/// One committed annotation. All coordinates are percent local to the owning task region.
pub enum Annotation {
    /// Free-hand stroke.
    Pen(PenStroke),
    /// Correction symbol placed at a point.
    Mark(Mark),
    /// Typed text note.
    Text(TextNote),
    /// Horizontal underline.
    Underline(Underline),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Free-hand stroke through an ordered list of points.
pub struct PenStroke {
    /// Stroke color.
    pub color: CssColor,
    /// Nominal width; drawn at twice this value.
    #[serde(default = "default_line_width")]
    pub line_width: f64,
    /// Ordered points.
    pub points: Vec<Point>,
    /// Owning correction pass.
    #[serde(default)]
    pub role: Role,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Correction glyph such as `Gr` or `V`.
pub struct Mark {
    /// Glyph color.
    pub color: CssColor,
    /// Short symbol string.
    pub symbol: String,
    /// Anchor x.
    pub x: f64,
    /// Anchor y.
    pub y: f64,
    /// Owning correction pass.
    #[serde(default)]
    pub role: Role,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Which part of a text line `y` refers to.
pub enum TextAnchor {
    /// `y` is the top; the baseline sits one font height below.
    #[default]
    Top,
    /// `y` is the baseline.
    Baseline,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Typed note.
pub struct TextNote {
    /// Fill color.
    pub color: CssColor,
    /// Left edge x.
    pub x: f64,
    /// Top or baseline y, see `anchor`.
    pub y: f64,
    /// Note content.
    pub text: String,
    /// Font size as percent of region height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size_rel: Option<f64>,
    /// Legacy absolute font size in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Opacity in `[0, 1]`.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Vertical anchor of `y`.
    #[serde(default)]
    pub anchor: TextAnchor,
    /// Owning correction pass.
    #[serde(default)]
    pub role: Role,
}

impl TextNote {
    /// Usable relative size, `None` when missing or out of range.
    pub fn valid_font_size_rel(&self) -> Option<f64> {
        self.font_size_rel
            .filter(|v| v.is_finite() && *v > 0.0 && *v <= MAX_FONT_SIZE_REL)
    }

    /// Pixel size for a region `region_height_px` tall; legacy records fall back to their
    /// absolute size times the decoration scale.
    pub fn size_px(&self, region_height_px: f64, decoration_scale: f64) -> f64 {
        match self.valid_font_size_rel() {
            Some(rel) => crate::text::fit::to_absolute(rel, region_height_px),
            None => {
                let legacy = self
                    .font_size
                    .filter(|v| v.is_finite() && *v > 0.0)
                    .unwrap_or(DEFAULT_LEGACY_FONT_SIZE_PX);
                legacy * decoration_scale
            }
        }
    }

    pub fn clamped_opacity(&self) -> f64 {
        if self.opacity.is_finite() {
            self.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Underline stroke pattern.
pub enum UnderlineStyle {
    /// Continuous line.
    #[default]
    Solid,
    /// Long dashes.
    Dashed,
    /// Round dots.
    Dotted,
    /// Sine wave.
    Wavy,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Horizontal underline spanning `[x, x + width]` at height `y`.
pub struct Underline {
    /// Stroke color.
    pub color: CssColor,
    /// Nominal width.
    #[serde(default = "default_line_width")]
    pub line_width: f64,
    /// Stroke pattern.
    #[serde(default)]
    pub style: UnderlineStyle,
    /// Left end.
    pub x: f64,
    /// Height.
    pub y: f64,
    /// Span length.
    pub width: f64,
    /// Owning correction pass.
    #[serde(default)]
    pub role: Role,
}

fn default_line_width() -> f64 {
    2.0
}

fn default_opacity() -> f64 {
    1.0
}

impl Annotation {
    pub fn role(&self) -> Role {
        match self {
            Annotation::Pen(a) => a.role,
            Annotation::Mark(a) => a.role,
            Annotation::Text(a) => a.role,
            Annotation::Underline(a) => a.role,
        }
    }

    pub fn set_role(&mut self, role: Role) {
        match self {
            Annotation::Pen(a) => a.role = role,
            Annotation::Mark(a) => a.role = role,
            Annotation::Text(a) => a.role = role,
            Annotation::Underline(a) => a.role = role,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.set_role(role);
        self
    }

    pub fn color(&self) -> &CssColor {
        match self {
            Annotation::Pen(a) => &a.color,
            Annotation::Mark(a) => &a.color,
            Annotation::Text(a) => &a.color,
            Annotation::Underline(a) => &a.color,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Annotation::Pen(_) => "pen",
            Annotation::Mark(_) => "mark",
            Annotation::Text(_) => "text",
            Annotation::Underline(_) => "underline",
        }
    }

    /// Commit-time checks: degenerate strokes, underlines and empty text are rejected.
    pub fn validate(&self) -> OvermarkResult<()> {
        let finite = |vals: &[f64]| vals.iter().all(|v| v.is_finite());
        match self {
            Annotation::Pen(p) => {
                if p.points.len() < 2 {
                    return Err(OvermarkError::validation(format!(
                        "pen stroke needs at least 2 points, got {}",
                        p.points.len()
                    )));
                }
                if !p.points.iter().all(|pt| finite(&[pt.x, pt.y])) {
                    return Err(OvermarkError::validation("pen stroke has non-finite points"));
                }
            }
            Annotation::Mark(m) => {
                if !finite(&[m.x, m.y]) {
                    return Err(OvermarkError::validation("mark position is non-finite"));
                }
                if m.symbol.trim().is_empty() {
                    return Err(OvermarkError::validation("mark symbol is empty"));
                }
            }
            Annotation::Text(t) => {
                if t.text.trim().is_empty() {
                    return Err(OvermarkError::validation("text is empty"));
                }
                if !finite(&[t.x, t.y]) {
                    return Err(OvermarkError::validation("text position is non-finite"));
                }
            }
            Annotation::Underline(u) => {
                if !finite(&[u.x, u.y, u.width]) {
                    return Err(OvermarkError::validation("underline geometry is non-finite"));
                }
                if u.width <= UNDERLINE_MIN_WIDTH {
                    return Err(OvermarkError::validation(format!(
                        "underline width {} is below {UNDERLINE_MIN_WIDTH}",
                        u.width
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/annotation.rs"]
mod tests;
