//! Font resolution shared by measurement, the raster backend and SVG rasterization.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::text::fit::{FallbackMetrics, TextMeasure};
use crate::text::layout::{ShapedLine, TextLayoutEngine};

/// Handwriting face used for the total-points label.
pub const TOTAL_FONT_FAMILY: &str = "Indie Flower";
/// Handwriting face used for the grade.
pub const GRADE_FONT_FAMILY: &str = "Gloria Hallelujah";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
/// Requested font family.
pub enum FontFamily {
    /// Generic sans-serif.
    SansSerif,
    /// Generic cursive.
    Cursive,
    /// A family by name.
    Named(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
/// Family plus CSS weight.
pub struct FontSpec {
    /// Requested family.
    pub family: FontFamily,
    /// CSS weight, 400 regular, 700 bold.
    pub weight: u16,
}

impl FontSpec {
    pub fn sans() -> Self {
        Self {
            family: FontFamily::SansSerif,
            weight: 400,
        }
    }

    pub fn sans_bold() -> Self {
        Self {
            family: FontFamily::SansSerif,
            weight: 700,
        }
    }

    pub fn named(name: impl Into<String>, weight: u16) -> Self {
        Self {
            family: FontFamily::Named(name.into()),
            weight,
        }
    }

    /// CSS `font-family` value with generic fallbacks.
    pub fn css_family(&self) -> String {
        match &self.family {
            FontFamily::SansSerif => "sans-serif".to_owned(),
            FontFamily::Cursive => "cursive".to_owned(),
            FontFamily::Named(n) => format!("'{n}', cursive, sans-serif"),
        }
    }
}

/// Waits for font resources before text is measured. Best effort.
pub trait FontReadiness {
    /// Make `specs` available; failures are reported but callers continue with fallback metrics.
    fn ensure_loaded(&mut self, specs: &[FontSpec]) -> OvermarkResult<()>;
}

/// A concrete face picked from the font database.
#[derive(Clone, Debug)]
pub struct ResolvedFace {
    pub family_name: String,
    pub weight: u16,
    pub data: Arc<Vec<u8>>,
    pub index: u32,
}

/// System and directory fonts, resolved once per [`FontSpec`].
pub struct FontBook {
    db: Arc<usvg::fontdb::Database>,
    resolved: HashMap<FontSpec, Option<ResolvedFace>>,
    engine: TextLayoutEngine,
}

impl FontBook {
    /// System fonts plus `OVERMARK_FONT_DIR`, when set.
    pub fn system() -> Self {
        let extra = std::env::var_os("OVERMARK_FONT_DIR").map(PathBuf::from);
        Self::with_font_dirs(true, extra.as_deref().into_iter())
    }

    pub fn with_font_dirs<'a>(system: bool, dirs: impl Iterator<Item = &'a Path>) -> Self {
        let mut db = usvg::fontdb::Database::new();
        if system {
            db.load_system_fonts();
        }
        for dir in dirs {
            load_fonts_from_dir(&mut db, dir);
        }
        tracing::debug!(faces = db.len(), "font database ready");
        Self::from_database(db)
    }

    /// No faces at all: every measurement uses [`FallbackMetrics`] and glyphs are not drawn.
    pub fn empty() -> Self {
        Self::from_database(usvg::fontdb::Database::new())
    }

    pub fn from_database(db: usvg::fontdb::Database) -> Self {
        Self {
            db: Arc::new(db),
            resolved: HashMap::new(),
            engine: TextLayoutEngine::new(),
        }
    }

    pub fn database(&self) -> Arc<usvg::fontdb::Database> {
        Arc::clone(&self.db)
    }

    pub fn has_faces(&self) -> bool {
        !self.db.is_empty()
    }

    /// Pick a face the way SVG text resolution does: requested family, then generic
    /// fallbacks, then any face.
    pub fn resolve(&mut self, spec: &FontSpec) -> Option<ResolvedFace> {
        if let Some(hit) = self.resolved.get(spec) {
            return hit.clone();
        }
        let face = self.query(spec);
        if face.is_none() {
            tracing::warn!(family = ?spec.family, weight = spec.weight, "no font face available");
        }
        self.resolved.insert(spec.clone(), face.clone());
        face
    }

    fn query(&self, spec: &FontSpec) -> Option<ResolvedFace> {
        use usvg::fontdb::{Family, Query, Stretch, Style, Weight};

        let mut families = Vec::<Family<'_>>::new();
        match &spec.family {
            FontFamily::SansSerif => {}
            FontFamily::Cursive => families.push(Family::Cursive),
            FontFamily::Named(n) => families.push(Family::Name(n.as_str())),
        }
        families.push(Family::SansSerif);
        families.push(Family::Serif);
        families.push(Family::Monospace);

        let query = Query {
            families: &families,
            weight: Weight(spec.weight),
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self
            .db
            .query(&query)
            .or_else(|| self.db.faces().next().map(|f| f.id))?;
        let info = self.db.face(id)?;
        let family_name = info.families.first().map(|(name, _)| name.clone())?;
        let weight = info.weight.0;
        let (data, index) = self
            .db
            .with_face_data(id, |data, index| (data.to_vec(), index))?;
        Some(ResolvedFace {
            family_name,
            weight,
            data: Arc::new(data),
            index,
        })
    }

    /// Shape one line for drawing. `None` when no face is available.
    pub fn shape(&mut self, text: &str, spec: &FontSpec, size_px: f64) -> Option<ShapedLine> {
        let face = self.resolve(spec)?;
        match self.engine.shape_line(text, &face, size_px as f32) {
            Ok(line) => Some(line),
            Err(err) => {
                tracing::warn!(%err, "text shaping failed");
                None
            }
        }
    }
}

impl TextMeasure for FontBook {
    fn advance_width(&mut self, text: &str, font: &FontSpec, size_px: f64) -> f64 {
        match self.shape(text, font, size_px) {
            Some(line) => f64::from(line.width),
            None => FallbackMetrics.advance_width(text, font, size_px),
        }
    }
}

impl FontReadiness for FontBook {
    fn ensure_loaded(&mut self, specs: &[FontSpec]) -> OvermarkResult<()> {
        let missing: Vec<String> = specs
            .iter()
            .filter(|s| self.resolve(s).is_none())
            .map(FontSpec::css_family)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(OvermarkError::font(missing.join("; ")))
        }
    }
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::debug!(dir = %dir.display(), "font directory not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(err) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), %err, "skipping font file");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/fonts.rs"]
mod tests;
