use crate::foundation::core::{CssColor, Point};
use crate::geometry::space::SurfaceMapping;
use crate::grading::table::CorrectionMark;
use crate::model::annotation::{
    Annotation, Mark, PenStroke, Role, TextAnchor, TextNote, Underline, UnderlineStyle,
};
use crate::model::log::{AnnotationId, AnnotationLog};
use crate::text::fit::to_relative;

/// Eraser radius around pen points, in local percent.
pub const PEN_HIT_RADIUS: f64 = 4.0;
/// Eraser radius around marks and text anchors, in local percent.
pub const POINT_HIT_RADIUS: f64 = 5.0;
/// Vertical eraser tolerance for underlines, in local percent.
pub const UNDERLINE_HIT_DY: f64 = 4.0;

/// Free-hand stroke in progress.
#[derive(Clone, Debug, PartialEq)]
pub struct PenGesture {
    color: CssColor,
    line_width: f64,
    role: Role,
    points: Vec<Point>,
}

impl PenGesture {
    /// Start at surface pixel `px`. `None` when the point misses the active region.
    pub fn begin(
        mapping: &SurfaceMapping,
        px: Point,
        color: CssColor,
        line_width: f64,
        role: Role,
    ) -> Option<Self> {
        let first = mapping.px_to_local(px)?;
        Some(Self {
            color,
            line_width,
            role,
            points: vec![first],
        })
    }

    /// Add a point; points outside the region are dropped. Returns whether it was kept.
    pub fn extend(&mut self, mapping: &SurfaceMapping, px: Point) -> bool {
        match mapping.px_to_local(px) {
            Some(local) => {
                self.points.push(local);
                true
            }
            None => false,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The finished stroke. Single-point strokes are dropped by [`AnnotationLog::append`].
    pub fn finish(self) -> Annotation {
        Annotation::Pen(PenStroke {
            color: self.color,
            line_width: self.line_width,
            points: self.points,
            role: self.role,
        })
    }
}

/// Horizontal underline drag. The line stays at the start height.
#[derive(Clone, Debug, PartialEq)]
pub struct UnderlineGesture {
    color: CssColor,
    line_width: f64,
    style: UnderlineStyle,
    role: Role,
    start: Point,
}

impl UnderlineGesture {
    pub fn begin(
        mapping: &SurfaceMapping,
        px: Point,
        color: CssColor,
        line_width: f64,
        style: UnderlineStyle,
        role: Role,
    ) -> Option<Self> {
        let start = mapping.px_to_local(px)?;
        Some(Self {
            color,
            line_width,
            style,
            role,
            start,
        })
    }

    pub fn start(&self) -> Point {
        self.start
    }

    /// Release at `px`. `None` when the end point misses the region.
    pub fn finish(self, mapping: &SurfaceMapping, px: Point) -> Option<Annotation> {
        let end = mapping.px_to_local(px)?;
        Some(Annotation::Underline(Underline {
            color: self.color,
            line_width: self.line_width,
            style: self.style,
            x: self.start.x.min(end.x),
            y: self.start.y,
            width: (end.x - self.start.x).abs(),
            role: self.role,
        }))
    }
}

pub fn place_mark(mark: &CorrectionMark, local: Point, role: Role) -> Annotation {
    Annotation::Mark(Mark {
        color: mark.color.clone(),
        symbol: mark.symbol.clone(),
        x: local.x,
        y: local.y,
        role,
    })
}

/// Text typed at `local`, anchored on its baseline. The chosen pixel size is stored relative
/// to the region height so it survives zoom and export, and as absolute px for older readers.
/// `None` for blank input.
pub fn submit_text(
    text: &str,
    local: Point,
    size_px: f64,
    region_height_px: f64,
    color: CssColor,
    role: Role,
) -> Option<Annotation> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let rel = to_relative(size_px, region_height_px);
    Some(Annotation::Text(TextNote {
        color,
        x: local.x,
        y: local.y,
        text: text.to_owned(),
        font_size_rel: (rel > 0.0).then_some(rel),
        font_size: (size_px.is_finite() && size_px > 0.0).then_some(size_px),
        opacity: 1.0,
        anchor: TextAnchor::Baseline,
        role,
    }))
}

/// Eraser: the most recently drawn annotation of `role` under `local`.
pub fn hit_test(log: &AnnotationLog, role: Role, local: Point) -> Option<AnnotationId> {
    log.iter()
        .rev()
        .filter(|(_, a)| a.role() == role)
        .find(|(_, a)| hits(a, local))
        .map(|(id, _)| id)
}

fn hits(annotation: &Annotation, p: Point) -> bool {
    match annotation {
        Annotation::Pen(pen) => pen.points.iter().any(|q| q.distance(p) < PEN_HIT_RADIUS),
        Annotation::Mark(m) => Point::new(m.x, m.y).distance(p) < POINT_HIT_RADIUS,
        Annotation::Text(t) => Point::new(t.x, t.y).distance(p) < POINT_HIT_RADIUS,
        Annotation::Underline(u) => {
            (p.y - u.y).abs() < UNDERLINE_HIT_DY && p.x >= u.x && p.x <= u.x + u.width
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interact/gesture.rs"]
mod tests;
