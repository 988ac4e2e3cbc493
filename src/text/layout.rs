use std::collections::HashMap;

use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::text::fonts::ResolvedFace;

/// Brush carried through Parley layouts. Paint comes from the scene, so it holds nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlyphBrush;

/// One positioned glyph; `y` is relative to the line baseline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedGlyph {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

/// A single shaped line ready for drawing at a baseline origin.
#[derive(Clone, Debug)]
pub struct ShapedLine {
    pub glyphs: Vec<PlacedGlyph>,
    pub width: f32,
    pub size_px: f32,
    pub face: ResolvedFace,
}

/// Stateful helper for building Parley layouts from resolved faces.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<GlyphBrush>,
    registered: HashMap<(String, u32, u16), String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            registered: HashMap::new(),
        }
    }

    fn family_for(&mut self, face: &ResolvedFace) -> OvermarkResult<String> {
        let key = (face.family_name.clone(), face.index, face.weight);
        if let Some(name) = self.registered.get(&key) {
            return Ok(name.clone());
        }

        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(face.data.as_ref().clone()),
            None,
        );
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| OvermarkError::font("no font families registered from face data"))?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| OvermarkError::font("registered font family has no name"))?
            .to_string();
        self.registered.insert(key, name.clone());
        Ok(name)
    }

    /// Shape `text` as one unbroken line.
    pub fn shape_line(
        &mut self,
        text: &str,
        face: &ResolvedFace,
        size_px: f32,
    ) -> OvermarkResult<ShapedLine> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(OvermarkError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let family = self.family_for(face)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(f32::from(face.weight)),
        ));
        builder.push_default(parley::style::StyleProperty::Brush(GlyphBrush));

        let mut layout: parley::Layout<GlyphBrush> = builder.build(text);
        layout.break_all_lines(None);

        let mut glyphs = Vec::new();
        let mut baseline = None;
        for line in layout.lines() {
            let line_baseline = *baseline.get_or_insert(line.metrics().baseline);
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                glyphs.extend(run.positioned_glyphs().map(|g| PlacedGlyph {
                    id: g.id,
                    x: g.x,
                    y: g.y - line_baseline,
                }));
            }
        }

        Ok(ShapedLine {
            glyphs,
            width: layout.width(),
            size_px,
            face: face.clone(),
        })
    }
}
