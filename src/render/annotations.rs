//! Annotation records to draw commands.

use crate::compose::layers::{LayerPaint, Layered};
use crate::foundation::core::{BezPath, Point, RenderContext, Rgba8};
use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::geometry::space::SurfaceMapping;
use crate::model::annotation::{Annotation, TextAnchor, Underline, UnderlineStyle};
use crate::render::scene::{DrawCmd, LineCap, Scene, TextRun};
use crate::text::fit::TextMeasure;
use crate::text::fonts::FontSpec;

/// Pen strokes are drawn at this multiple of their nominal width.
pub const PEN_WIDTH_FACTOR: f64 = 2.0;
/// Underlines are drawn at this multiple of their nominal width.
pub const UNDERLINE_WIDTH_FACTOR: f64 = 1.2;
/// Correction glyph size on the reference raster.
pub const MARK_SIZE_PX: f64 = 24.0;
/// Baseline offset below a center point, as a fraction of the font size.
pub const CENTER_BASELINE_SHIFT: f64 = 0.35;

const DASH_PATTERN: [f64; 2] = [8.0, 4.0];
const DOT_PATTERN: [f64; 2] = [2.0, 4.0];
const WAVE_STEP_PX: f64 = 0.5;

/// Append draw commands for every entry of `list`. Entries that cannot be mapped are skipped
/// and logged; returns how many were skipped.
pub fn push_annotations(
    scene: &mut Scene,
    list: &[Layered<'_>],
    mapping: &SurfaceMapping,
    ctx: &RenderContext,
    measure: &mut dyn TextMeasure,
) -> usize {
    let mut skipped = 0;
    for item in list {
        match annotation_cmds(item, mapping, ctx, measure) {
            Ok(cmds) => scene.cmds.extend(cmds),
            Err(err) => {
                skipped += 1;
                tracing::warn!(kind = item.annotation.kind(), %err, "annotation skipped");
            }
        }
    }
    skipped
}

/// Draw commands for one annotation.
pub fn annotation_cmds(
    item: &Layered<'_>,
    mapping: &SurfaceMapping,
    ctx: &RenderContext,
    measure: &mut dyn TextMeasure,
) -> OvermarkResult<Vec<DrawCmd>> {
    let scale = ctx.decoration_scale();
    let color = paint_color(item.annotation, item.paint);

    match item.annotation {
        Annotation::Pen(p) => {
            let mut path = BezPath::new();
            for (i, pt) in p.points.iter().enumerate() {
                let px = mapped(mapping, *pt)?;
                if i == 0 {
                    path.move_to(px);
                } else {
                    path.line_to(px);
                }
            }
            Ok(vec![DrawCmd::Stroke {
                path,
                width: nominal_width(p.line_width) * PEN_WIDTH_FACTOR * scale,
                cap: LineCap::Round,
                color,
            }])
        }
        Annotation::Mark(m) => {
            let at = mapped(mapping, Point::new(m.x, m.y))?;
            let font = FontSpec::sans_bold();
            let size_px = MARK_SIZE_PX * scale;
            let w = measure.advance_width(&m.symbol, &font, size_px);
            Ok(vec![DrawCmd::Text(TextRun {
                origin: Point::new(at.x - w / 2.0, at.y + CENTER_BASELINE_SHIFT * size_px),
                text: m.symbol.clone(),
                font,
                size_px,
                color,
            })])
        }
        Annotation::Text(t) => {
            let at = mapped(mapping, Point::new(t.x, t.y))?;
            let size_px = t.size_px(mapping.region_height_px(), scale);
            if !size_px.is_finite() || size_px <= 0.0 {
                return Err(OvermarkError::geometry(format!(
                    "text resolves to unusable size {size_px}"
                )));
            }
            let baseline = match t.anchor {
                TextAnchor::Baseline => at.y,
                TextAnchor::Top => at.y + size_px,
            };
            let color = match item.paint {
                LayerPaint::Stored => color.with_alpha_scaled(t.clamped_opacity()),
                LayerPaint::Underlay { .. } => color,
            };
            Ok(vec![DrawCmd::Text(TextRun {
                origin: Point::new(at.x, baseline),
                text: t.text.clone(),
                font: FontSpec::sans(),
                size_px,
                color,
            })])
        }
        Annotation::Underline(u) => underline_cmds(u, mapping, scale, color),
    }
}

fn underline_cmds(
    u: &Underline,
    mapping: &SurfaceMapping,
    scale: f64,
    color: Rgba8,
) -> OvermarkResult<Vec<DrawCmd>> {
    let start = mapped(mapping, Point::new(u.x, u.y))?;
    let end = mapped(mapping, Point::new(u.x + u.width, u.y))?;
    let width = nominal_width(u.line_width) * UNDERLINE_WIDTH_FACTOR * scale;
    let len = end.x - start.x;

    let (path, cap) = match u.style {
        UnderlineStyle::Solid => {
            let mut path = BezPath::new();
            path.move_to(start);
            path.line_to(end);
            (path, LineCap::Butt)
        }
        UnderlineStyle::Dashed => (dash_path(start, len, DASH_PATTERN, scale), LineCap::Butt),
        UnderlineStyle::Dotted => (dash_path(start, len, DOT_PATTERN, scale), LineCap::Round),
        UnderlineStyle::Wavy => (wave_path(start, len, width, scale), LineCap::Round),
    };
    Ok(vec![DrawCmd::Stroke {
        path,
        width,
        cap,
        color,
    }])
}

/// Horizontal dash segments starting at `start`, pattern lengths multiplied by `scale`.
pub fn dash_path(start: Point, len: f64, pattern: [f64; 2], scale: f64) -> BezPath {
    let on = pattern[0] * scale;
    let period = (pattern[0] + pattern[1]) * scale;
    let mut path = BezPath::new();
    if len <= 0.0 || period <= 0.0 {
        return path;
    }
    let mut x = 0.0;
    while x < len {
        let seg_end = (x + on).min(len);
        path.move_to(Point::new(start.x + x, start.y));
        path.line_to(Point::new(start.x + seg_end, start.y));
        x += period;
    }
    path
}

/// Sine wave along `len` pixels; amplitude and wavelength grow with the stroke width.
pub fn wave_path(start: Point, len: f64, stroke_px: f64, scale: f64) -> BezPath {
    let amp = 2.0 * scale + stroke_px * 0.3;
    let wavelength = 6.0 * scale + stroke_px * 0.5;
    let step = WAVE_STEP_PX * scale;
    let mut path = BezPath::new();
    path.move_to(start);
    if len <= 0.0 || step <= 0.0 {
        return path;
    }
    let mut x = step;
    while x <= len {
        let y = (x / wavelength * std::f64::consts::TAU).sin() * amp;
        path.line_to(Point::new(start.x + x, start.y + y));
        x += step;
    }
    path
}

fn paint_color(a: &Annotation, paint: LayerPaint) -> Rgba8 {
    match paint {
        LayerPaint::Stored => a.color().rgba(),
        LayerPaint::Underlay { color, opacity } => color.with_alpha_scaled(opacity),
    }
}

fn nominal_width(w: f64) -> f64 {
    if w.is_finite() && w > 0.0 { w } else { 2.0 }
}

fn mapped(mapping: &SurfaceMapping, local: Point) -> OvermarkResult<Point> {
    if !(local.x.is_finite() && local.y.is_finite()) {
        return Err(OvermarkError::geometry("annotation point is not finite"));
    }
    Ok(mapping.local_to_px(local))
}

#[cfg(test)]
#[path = "../../tests/unit/render/annotations.rs"]
mod tests;
