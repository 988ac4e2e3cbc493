//! Points badges and score fields painted over finished pages.

use crate::foundation::core::{PageRect, Point, Rect, RenderContext, Rgba8};
use crate::grading::table::format_points;
use crate::render::annotations::CENTER_BASELINE_SHIFT;
use crate::render::scene::{DrawCmd, Scene, TextRun};
use crate::text::fit::{FitOptions, TextMeasure, fit};
use crate::text::fonts::{FontSpec, GRADE_FONT_FAMILY, TOTAL_FONT_FAMILY};

pub const FULL_MARKS: Rgba8 = Rgba8::rgb(0x16, 0xa3, 0x4a);
pub const NO_MARKS: Rgba8 = Rgba8::rgb(0xdc, 0x26, 0x26);
pub const PARTIAL_MARKS: Rgba8 = Rgba8::rgb(0xd9, 0x77, 0x06);
pub const SCORE_INK: Rgba8 = Rgba8::rgb(0xdc, 0x26, 0x26);
pub const FIELD_BORDER: Rgba8 = Rgba8::rgb(0xd9, 0x77, 0x06);

const BADGE_FONT_PX: f64 = 16.0;

/// Badge color: green for full marks, red for none, amber otherwise.
pub fn badge_color(points: f64, max_points: f64) -> Rgba8 {
    if points == max_points {
        FULL_MARKS
    } else if points == 0.0 {
        NO_MARKS
    } else {
        PARTIAL_MARKS
    }
}

/// Default badge anchor: just inside the top-right corner of the region.
pub fn default_badge_anchor(region_px: Rect, ctx: &RenderContext) -> Point {
    let s = ctx.decoration_scale();
    Point::new(region_px.x1 - 5.0 * s, region_px.y0 + 18.0 * s)
}

/// Right-aligned "points/max" label with a white backing.
pub fn push_points_badge(
    scene: &mut Scene,
    points: f64,
    max_points: f64,
    anchor_px: Point,
    ctx: &RenderContext,
    measure: &mut dyn TextMeasure,
) {
    let s = ctx.decoration_scale();
    let label = format!("{}/{}", format_points(points), format_points(max_points));
    let font = FontSpec::sans_bold();
    let size_px = BADGE_FONT_PX * s;
    let tw = measure.advance_width(&label, &font, size_px);
    let (lx, ly) = (anchor_px.x, anchor_px.y);

    scene.push(DrawCmd::FillRect {
        rect: Rect::new(lx - tw - 8.0 * s, ly - 14.0 * s, lx + 4.0 * s, ly + 6.0 * s),
        color: Rgba8::WHITE.with_alpha_scaled(0.9),
    });
    scene.push(DrawCmd::Text(TextRun {
        origin: Point::new(lx - tw, ly),
        text: label,
        font,
        size_px,
        color: badge_color(points, max_points),
    }));
}

/// Label and grade drawn on a student's first page.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreSummary {
    pub total_label: String,
    pub grade_label: String,
}

impl ScoreSummary {
    pub fn new(total: f64, max: f64, grade_label: impl Into<String>) -> Self {
        Self {
            total_label: format!("{} / {} BE", format_points(total), format_points(max)),
            grade_label: grade_label.into(),
        }
    }
}

/// Total and grade in explicit fields, or the default top-right badge when neither is set.
pub fn push_score_summary(
    scene: &mut Scene,
    summary: &ScoreSummary,
    total_field: Option<PageRect>,
    grade_field: Option<PageRect>,
    ctx: &RenderContext,
    measure: &mut dyn TextMeasure,
) {
    let (w, h) = (ctx.container_width_px, ctx.container_height_px);
    let total_font = FontSpec::named(TOTAL_FONT_FAMILY, 400);
    let grade_font = FontSpec::named(GRADE_FONT_FAMILY, 400);

    if let Some(f) = total_field {
        let rect = f.to_px(w, h);
        push_fitted_field(scene, rect, &summary.total_label, total_font.clone(), ctx, measure);
    }
    if let Some(f) = grade_field {
        let rect = f.to_px(w, h);
        push_fitted_field(scene, rect, &summary.grade_label, grade_font.clone(), ctx, measure);
    }
    if total_field.is_some() || grade_field.is_some() {
        return;
    }

    let s = ctx.decoration_scale();
    let (bx, by) = (w - 260.0 * s, 20.0 * s);
    let rect = Rect::new(bx, by, bx + 240.0 * s, by + 120.0 * s);
    scene.push(DrawCmd::FillRect {
        rect,
        color: Rgba8::WHITE.with_alpha_scaled(0.97),
    });
    scene.push(DrawCmd::StrokeRect {
        rect,
        width: 3.0 * s,
        color: FIELD_BORDER,
    });
    scene.push(DrawCmd::Text(TextRun {
        origin: Point::new(bx + 15.0 * s, by + 38.0 * s),
        text: summary.total_label.clone(),
        font: total_font,
        size_px: 26.0 * s,
        color: SCORE_INK,
    }));
    scene.push(DrawCmd::Text(TextRun {
        origin: Point::new(bx + 15.0 * s, by + 102.0 * s),
        text: summary.grade_label.clone(),
        font: grade_font,
        size_px: 54.0 * s,
        color: SCORE_INK,
    }));
}

fn push_fitted_field(
    scene: &mut Scene,
    rect: Rect,
    text: &str,
    font: FontSpec,
    ctx: &RenderContext,
    measure: &mut dyn TextMeasure,
) {
    let s = ctx.decoration_scale();
    scene.push(DrawCmd::FillRect {
        rect,
        color: Rgba8::WHITE.with_alpha_scaled(0.95),
    });
    scene.push(DrawCmd::StrokeRect {
        rect,
        width: 2.0 * s,
        color: FIELD_BORDER,
    });

    let size_px = fit(measure, text, &font, rect.width(), rect.height(), &FitOptions::default());
    let tw = measure.advance_width(text, &font, size_px);
    let c = rect.center();
    scene.push(DrawCmd::Text(TextRun {
        origin: Point::new(c.x - tw / 2.0, c.y + CENTER_BASELINE_SHIFT * size_px),
        text: text.to_owned(),
        font,
        size_px,
        color: SCORE_INK,
    }));
}

#[cfg(test)]
#[path = "../../tests/unit/render/decorations.rs"]
mod tests;
