//! SVG backend.
//!
//! The live view shows SVG over the page image. [`SvgCoordinates::Normalized`] writes the
//! square 0..100 view box stretched over the surface, so text is un-distorted with
//! `scale(k, 1)` and strokes keep their pixel width. [`SvgCoordinates::Pixels`] writes surface
//! pixels directly and is what gets rasterized through `resvg`.

use std::fmt::Write as _;

use crate::foundation::core::{BezPath, Point, Rect, Rgba8};
use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::geometry::space::aspect_correction_factor;
use crate::render::backend::RenderBackend;
use crate::render::scene::{DrawCmd, LineCap, PageImage, Scene, TextRun};
use crate::text::fonts::FontBook;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SvgCoordinates {
    #[default]
    Pixels,
    Normalized,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct VectorBackend {
    coords: SvgCoordinates,
}

struct Frame {
    sx: f64,
    sy: f64,
    text_k: f64,
    non_scaling: bool,
}

impl Frame {
    fn pt(&self, p: Point) -> Point {
        Point::new(p.x * self.sx, p.y * self.sy)
    }

    fn rect(&self, r: Rect) -> Rect {
        Rect::new(r.x0 * self.sx, r.y0 * self.sy, r.x1 * self.sx, r.y1 * self.sy)
    }

    fn path(&self, path: &BezPath) -> BezPath {
        kurbo::Affine::scale_non_uniform(self.sx, self.sy) * path.clone()
    }

    fn stroke_extra(&self) -> &'static str {
        if self.non_scaling {
            r#" vector-effect="non-scaling-stroke""#
        } else {
            ""
        }
    }
}

impl VectorBackend {
    pub fn new(coords: SvgCoordinates) -> Self {
        Self { coords }
    }

    pub fn coordinates(&self) -> SvgCoordinates {
        self.coords
    }

    /// Serialize the scene's draw commands. The clear color and page background are not embedded.
    pub fn to_svg(&self, scene: &Scene, fonts: &mut FontBook) -> String {
        let (w, h) = (f64::from(scene.width), f64::from(scene.height));
        let frame = match self.coords {
            SvgCoordinates::Pixels => Frame {
                sx: 1.0,
                sy: 1.0,
                text_k: 1.0,
                non_scaling: false,
            },
            SvgCoordinates::Normalized => Frame {
                sx: if w > 0.0 { 100.0 / w } else { 1.0 },
                sy: if h > 0.0 { 100.0 / h } else { 1.0 },
                text_k: aspect_correction_factor(w, h),
                non_scaling: true,
            },
        };

        let mut out = String::new();
        let view_box = match self.coords {
            SvgCoordinates::Pixels => format!("0 0 {} {}", num(w), num(h)),
            SvgCoordinates::Normalized => "0 0 100 100".to_owned(),
        };
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="{view_box}" preserveAspectRatio="none">"#,
            num(w),
            num(h)
        );

        for cmd in &scene.cmds {
            match cmd {
                DrawCmd::Stroke {
                    path,
                    width,
                    cap,
                    color,
                } => {
                    let (cap, join) = match cap {
                        LineCap::Round => ("round", "round"),
                        LineCap::Butt => ("butt", "miter"),
                    };
                    let width = if frame.non_scaling {
                        *width
                    } else {
                        *width * frame.sx
                    };
                    let _ = write!(
                        out,
                        r#"<path d="{}" fill="none" stroke="{}" stroke-opacity="{}" stroke-width="{}" stroke-linecap="{cap}" stroke-linejoin="{join}"{}/>"#,
                        path_data(&frame.path(path)),
                        color.hex(),
                        num(color.alpha_f64()),
                        num(width),
                        frame.stroke_extra()
                    );
                }
                DrawCmd::FillRect { rect, color } => push_rect_fill(&mut out, frame.rect(*rect), *color),
                DrawCmd::StrokeRect { rect, width, color } => {
                    let r = frame.rect(*rect);
                    let width = if frame.non_scaling {
                        *width
                    } else {
                        *width * frame.sx
                    };
                    let _ = write!(
                        out,
                        r#"<rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke="{}" stroke-opacity="{}" stroke-width="{}"{}/>"#,
                        num(r.x0),
                        num(r.y0),
                        num(r.width()),
                        num(r.height()),
                        color.hex(),
                        num(color.alpha_f64()),
                        num(width),
                        frame.stroke_extra()
                    );
                }
                DrawCmd::Text(run) => push_text(&mut out, run, &frame, fonts),
            }
        }

        out.push_str("</svg>");
        out
    }

    /// Rasterize `svg` over the scene's clear color and background through `resvg`.
    pub fn rasterize(&self, svg: &str, scene: &Scene, fonts: &FontBook) -> OvermarkResult<PageImage> {
        let opts = usvg::Options {
            fontdb: fonts.database(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(svg, &opts)
            .map_err(|e| OvermarkError::rasterization(format!("parse generated svg: {e}")))?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(scene.width, scene.height)
            .ok_or_else(|| OvermarkError::rasterization("surface has zero size"))?;
        if let Some(c) = scene.clear {
            pixmap.fill(resvg::tiny_skia::Color::from_rgba8(c.r, c.g, c.b, c.a));
        }
        if let Some(bg) = &scene.background {
            paint_background(&mut pixmap, bg)?;
        }

        let size = tree.size();
        let transform = resvg::tiny_skia::Transform::from_scale(
            scene.width as f32 / size.width(),
            scene.height as f32 / size.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        Ok(PageImage {
            width: scene.width,
            height: scene.height,
            data: pixmap.data().to_vec(),
            premultiplied: true,
        })
    }
}

impl RenderBackend for VectorBackend {
    fn render_scene(&mut self, scene: &Scene, fonts: &mut FontBook) -> OvermarkResult<PageImage> {
        let svg = Self::new(SvgCoordinates::Pixels).to_svg(scene, fonts);
        self.rasterize(&svg, scene, fonts)
    }
}

fn push_rect_fill(out: &mut String, r: Rect, c: Rgba8) {
    let _ = write!(
        out,
        r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}" fill-opacity="{}"/>"#,
        num(r.x0),
        num(r.y0),
        num(r.width()),
        num(r.height()),
        c.hex(),
        num(c.alpha_f64())
    );
}

fn push_text(out: &mut String, run: &TextRun, frame: &Frame, fonts: &mut FontBook) {
    // Name the resolved face so SVG rasterization picks exactly the face used for measuring.
    let (family, weight) = match fonts.resolve(&run.font) {
        Some(face) => (format!("'{}'", face.family_name), face.weight),
        None => (run.font.css_family(), run.font.weight),
    };
    let at = frame.pt(run.origin);
    let size = run.size_px * frame.sy;
    let _ = write!(
        out,
        r#"<text xml:space="preserve" transform="translate({} {}) scale({} 1)" font-family="{}" font-weight="{weight}" font-size="{}" fill="{}" fill-opacity="{}">{}</text>"#,
        num(at.x),
        num(at.y),
        num(frame.text_k),
        escape_xml(&family),
        num(size),
        run.color.hex(),
        num(run.color.alpha_f64()),
        escape_xml(&run.text)
    );
}

fn paint_background(pixmap: &mut resvg::tiny_skia::Pixmap, bg: &PageImage) -> OvermarkResult<()> {
    bg.check_len()?;
    let mut data = bg.data.clone();
    if !bg.premultiplied {
        crate::foundation::math::premultiply_in_place(&mut data);
    }
    let size = resvg::tiny_skia::IntSize::from_wh(bg.width, bg.height)
        .ok_or_else(|| OvermarkError::rasterization("background has zero size"))?;
    let src = resvg::tiny_skia::Pixmap::from_vec(data, size)
        .ok_or_else(|| OvermarkError::rasterization("background buffer rejected"))?;
    let sx = pixmap.width() as f32 / bg.width as f32;
    let sy = pixmap.height() as f32 / bg.height as f32;
    pixmap.draw_pixmap(
        0,
        0,
        src.as_ref(),
        &resvg::tiny_skia::PixmapPaint::default(),
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        None,
    );
    Ok(())
}

fn path_data(path: &BezPath) -> String {
    use kurbo::PathEl;

    let mut d = String::new();
    for el in path.elements() {
        if !d.is_empty() {
            d.push(' ');
        }
        let _ = match *el {
            PathEl::MoveTo(p) => write!(d, "M{} {}", num(p.x), num(p.y)),
            PathEl::LineTo(p) => write!(d, "L{} {}", num(p.x), num(p.y)),
            PathEl::QuadTo(a, p) => write!(d, "Q{} {} {} {}", num(a.x), num(a.y), num(p.x), num(p.y)),
            PathEl::CurveTo(a, b, p) => write!(
                d,
                "C{} {} {} {} {} {}",
                num(a.x),
                num(a.y),
                num(b.x),
                num(b.y),
                num(p.x),
                num(p.y)
            ),
            PathEl::ClosePath => write!(d, "Z"),
        };
    }
    d
}

fn num(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_owned();
    }
    let s = format!("{v:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_owned() } else { s.to_owned() }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/vector.rs"]
mod tests;
