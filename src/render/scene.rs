//! Backend-agnostic display list.
//!
//! Geometry, text sizing, compositing and decoration placement all happen while building a
//! [`Scene`]. Backends only translate the resulting commands into draw calls, so both produce
//! the same positions, sizes, order and colors.

use std::sync::Arc;

use crate::foundation::core::{BezPath, Point, Rect, RenderContext, Rgba8};
use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::text::fonts::FontSpec;

/// RGBA8 pixels.
///
/// Pixels are premultiplied unless `premultiplied` says otherwise.
#[derive(Clone, Debug, PartialEq)]
pub struct PageImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl PageImage {
    pub fn new_filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
            premultiplied: true,
        }
    }

    pub fn check_len(&self) -> OvermarkResult<()> {
        if self.data.len() != self.width as usize * self.height as usize * 4 {
            return Err(OvermarkError::rasterization(format!(
                "pixel buffer holds {} bytes, expected {}x{}x4",
                self.data.len(),
                self.width,
                self.height
            )));
        }
        Ok(())
    }

    /// Copy of the pixels inside `rect`, clamped to the image. `None` when nothing remains.
    pub fn crop(&self, rect: Rect) -> Option<PageImage> {
        let clamp = |v: f64, max: u32| (v.round().max(0.0) as u32).min(max);
        let (x0, x1) = (clamp(rect.x0, self.width), clamp(rect.x1, self.width));
        let (y0, y1) = (clamp(rect.y0, self.height), clamp(rect.y1, self.height));
        if x1 <= x0 || y1 <= y0 || self.check_len().is_err() {
            return None;
        }
        let row = self.width as usize * 4;
        let mut data = Vec::with_capacity((x1 - x0) as usize * (y1 - y0) as usize * 4);
        for y in y0..y1 {
            let start = y as usize * row + x0 as usize * 4;
            data.extend_from_slice(&self.data[start..start + (x1 - x0) as usize * 4]);
        }
        Some(PageImage {
            width: x1 - x0,
            height: y1 - y0,
            data,
            premultiplied: self.premultiplied,
        })
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Round,
}

/// A single line of text anchored at its left baseline point.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub origin: Point,
    pub text: String,
    pub font: FontSpec,
    pub size_px: f64,
    pub color: Rgba8,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCmd {
    /// Open polyline path. Round caps imply round joins.
    Stroke {
        path: BezPath,
        width: f64,
        cap: LineCap,
        color: Rgba8,
    },
    FillRect {
        rect: Rect,
        color: Rgba8,
    },
    StrokeRect {
        rect: Rect,
        width: f64,
        color: Rgba8,
    },
    Text(TextRun),
}

/// Everything drawn on one surface, bottom to top.
#[derive(Clone, Debug)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub background: Option<Arc<PageImage>>,
    pub clear: Option<Rgba8>,
    pub cmds: Vec<DrawCmd>,
}

impl Scene {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: None,
            clear: None,
            cmds: Vec::new(),
        }
    }

    pub fn with_background(mut self, page: Arc<PageImage>) -> Self {
        self.background = Some(page);
        self
    }

    pub fn with_clear(mut self, color: Rgba8) -> Self {
        self.clear = Some(color);
        self
    }

    pub fn push(&mut self, cmd: DrawCmd) {
        self.cmds.push(cmd);
    }

    /// Measurement context matching this surface.
    pub fn render_context(&self, scale: f64) -> RenderContext {
        RenderContext::new(f64::from(self.width), f64::from(self.height)).with_scale(scale)
    }

    pub fn text_runs(&self) -> impl Iterator<Item = &TextRun> + '_ {
        self.cmds.iter().filter_map(|c| match c {
            DrawCmd::Text(t) => Some(t),
            _ => None,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/scene.rs"]
mod tests;
