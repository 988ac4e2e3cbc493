use std::collections::HashMap;

use crate::foundation::core::{BezPath, Point, Rect, Rgba8};
use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::foundation::math::premul_rgba8;
use crate::render::backend::RenderBackend;
use crate::render::scene::{DrawCmd, LineCap, PageImage, Scene, TextRun};
use crate::text::fonts::{FontBook, ResolvedFace};

/// CPU raster backend powered by `vello_cpu`.
#[derive(Default)]
pub struct RasterBackend {
    font_cache: HashMap<(String, u32, u16), vello_cpu::peniko::FontData>,
}

impl RasterBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn font_data(&mut self, face: &ResolvedFace) -> vello_cpu::peniko::FontData {
        let key = (face.family_name.clone(), face.index, face.weight);
        self.font_cache
            .entry(key)
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(face.data.as_ref().clone()),
                    face.index,
                )
            })
            .clone()
    }

    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        run: &TextRun,
        fonts: &mut FontBook,
    ) {
        let Some(line) = fonts.shape(&run.text, &run.font, run.size_px) else {
            tracing::warn!(text = %run.text, "no face for text run, glyphs not drawn");
            return;
        };
        let font = self.font_data(&line.face);

        ctx.set_transform(vello_cpu::kurbo::Affine::translate((run.origin.x, run.origin.y)));
        set_color(ctx, run.color);
        let glyphs = line.glyphs.iter().map(|g| vello_cpu::Glyph {
            id: g.id,
            x: g.x,
            y: g.y,
        });
        ctx.glyph_run(&font)
            .font_size(line.size_px)
            .fill_glyphs(glyphs);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }
}

impl RenderBackend for RasterBackend {
    #[tracing::instrument(skip(self, scene, fonts), fields(w = scene.width, h = scene.height))]
    fn render_scene(&mut self, scene: &Scene, fonts: &mut FontBook) -> OvermarkResult<PageImage> {
        let (w, h) = surface_dims(scene)?;
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        let full = vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(w), f64::from(h));

        if let Some(c) = scene.clear {
            set_color(&mut ctx, c);
            ctx.fill_rect(&full);
        }

        if let Some(bg) = &scene.background {
            let pixmap = page_to_pixmap(bg)?;
            let (bw, bh) = (f64::from(pixmap.width()), f64::from(pixmap.height()));
            ctx.set_transform(vello_cpu::kurbo::Affine::scale_non_uniform(
                f64::from(w) / bw,
                f64::from(h) / bh,
            ));
            ctx.set_paint(vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(std::sync::Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            });
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, bw, bh));
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        }

        for cmd in &scene.cmds {
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            match cmd {
                DrawCmd::Stroke {
                    path,
                    width,
                    cap,
                    color,
                } => {
                    let (cap, join) = match cap {
                        LineCap::Round => (vello_cpu::kurbo::Cap::Round, vello_cpu::kurbo::Join::Round),
                        LineCap::Butt => (vello_cpu::kurbo::Cap::Butt, vello_cpu::kurbo::Join::Miter),
                    };
                    ctx.set_stroke(
                        vello_cpu::kurbo::Stroke::new(*width)
                            .with_caps(cap)
                            .with_join(join),
                    );
                    set_color(&mut ctx, *color);
                    ctx.stroke_path(&bezpath_to_cpu(path));
                }
                DrawCmd::FillRect { rect, color } => {
                    set_color(&mut ctx, *color);
                    ctx.fill_rect(&rect_to_cpu(*rect));
                }
                DrawCmd::StrokeRect { rect, width, color } => {
                    ctx.set_stroke(
                        vello_cpu::kurbo::Stroke::new(*width)
                            .with_join(vello_cpu::kurbo::Join::Miter),
                    );
                    set_color(&mut ctx, *color);
                    ctx.stroke_path(&vello_cpu::kurbo::Shape::to_path(&rect_to_cpu(*rect), 0.1));
                }
                DrawCmd::Text(run) => self.draw_text(&mut ctx, run, fonts),
            }
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);

        Ok(PageImage {
            width: u32::from(w),
            height: u32::from(h),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn set_color(ctx: &mut vello_cpu::RenderContext, c: Rgba8) {
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
}

fn surface_dims(scene: &Scene) -> OvermarkResult<(u16, u16)> {
    let w: u16 = scene
        .width
        .try_into()
        .map_err(|_| OvermarkError::rasterization("surface width exceeds u16"))?;
    let h: u16 = scene
        .height
        .try_into()
        .map_err(|_| OvermarkError::rasterization("surface height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(OvermarkError::rasterization("surface has zero size"));
    }
    Ok((w, h))
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn page_to_pixmap(page: &PageImage) -> OvermarkResult<vello_cpu::Pixmap> {
    page.check_len()?;
    let w: u16 = page
        .width
        .try_into()
        .map_err(|_| OvermarkError::rasterization("page width exceeds u16"))?;
    let h: u16 = page
        .height
        .try_into()
        .map_err(|_| OvermarkError::rasterization("page height exceeds u16"))?;

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(page.width as usize * page.height as usize);
    for px in page.data.chunks_exact(4) {
        let [r, g, b, a] = if page.premultiplied {
            [px[0], px[1], px[2], px[3]]
        } else {
            premul_rgba8(px[0], px[1], px[2], px[3])
        };
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 { r, g, b, a });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
