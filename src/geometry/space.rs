//! Conversions between page percent space, region-local percent space and surface pixels.
//!
//! Every annotation stores its geometry in the local 0..100 space of its task region. A view
//! either shows the region alone (cropped, local space stretched over the whole surface) or the
//! whole page with the region placed at its page position.

use crate::foundation::core::{PageRect, Point, Rect, RenderContext};
use crate::foundation::error::{OvermarkError, OvermarkResult};

const EDGE_EPS: f64 = 1e-9;

/// How a task region is presented on a surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewMode {
    /// Only the region is shown, stretched over the surface.
    #[default]
    Cropped,
    /// The entire page is shown with the region in place.
    FullPage,
}

/// Page percent point to region-local percent, `None` outside the region or for a degenerate
/// region.
pub fn to_local(page: Point, region: PageRect) -> Option<Point> {
    if region.is_degenerate() {
        return None;
    }
    let inside = page.x >= region.x - EDGE_EPS
        && page.x <= region.right() + EDGE_EPS
        && page.y >= region.y - EDGE_EPS
        && page.y <= region.bottom() + EDGE_EPS;
    if !inside {
        return None;
    }
    Some(Point::new(
        (page.x - region.x) / region.width * 100.0,
        (page.y - region.y) / region.height * 100.0,
    ))
}

/// Region-local percent point to the coordinate space of the view.
pub fn to_display(local: Point, region: PageRect, view: ViewMode) -> Point {
    match view {
        ViewMode::Cropped => local,
        ViewMode::FullPage => Point::new(
            region.x + local.x * region.width / 100.0,
            region.y + local.y * region.height / 100.0,
        ),
    }
}

/// `height / width` of the surface, or `1.0` when either is missing or unusable.
pub fn aspect_correction_factor(container_width_px: f64, container_height_px: f64) -> f64 {
    let w = container_width_px;
    let h = container_height_px;
    if !(w.is_finite() && h.is_finite()) || w <= 0.0 || h <= 0.0 {
        return 1.0;
    }
    let k = h / w;
    if k.is_finite() && k > 0.0 { k } else { 1.0 }
}

/// Maps region-local percent coordinates onto the pixels of one surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceMapping {
    region: PageRect,
    view: ViewMode,
    width_px: f64,
    height_px: f64,
}

impl SurfaceMapping {
    pub fn new(region: PageRect, view: ViewMode, ctx: &RenderContext) -> OvermarkResult<Self> {
        if !ctx.has_surface() {
            return Err(OvermarkError::geometry(format!(
                "surface has no usable size ({}x{})",
                ctx.container_width_px, ctx.container_height_px
            )));
        }
        if region.is_degenerate() {
            return Err(OvermarkError::geometry(format!(
                "region {}x{} at ({}, {}) has no area",
                region.width, region.height, region.x, region.y
            )));
        }
        Ok(Self {
            region,
            view,
            width_px: ctx.container_width_px,
            height_px: ctx.container_height_px,
        })
    }

    pub fn region(&self) -> PageRect {
        self.region
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn surface_width_px(&self) -> f64 {
        self.width_px
    }

    pub fn surface_height_px(&self) -> f64 {
        self.height_px
    }

    pub fn local_to_px(&self, local: Point) -> Point {
        let d = to_display(local, self.region, self.view);
        Point::new(d.x / 100.0 * self.width_px, d.y / 100.0 * self.height_px)
    }

    /// Surface pixel back to region-local percent; `None` outside the region.
    pub fn px_to_local(&self, px: Point) -> Option<Point> {
        let display = Point::new(px.x / self.width_px * 100.0, px.y / self.height_px * 100.0);
        match self.view {
            ViewMode::Cropped => PageRect::FULL.contains(display).then_some(display),
            ViewMode::FullPage => to_local(display, self.region),
        }
    }

    /// Horizontal local-percent length in pixels.
    pub fn local_dx_to_px(&self, dx: f64) -> f64 {
        self.region_width_px() * dx / 100.0
    }

    pub fn region_width_px(&self) -> f64 {
        match self.view {
            ViewMode::Cropped => self.width_px,
            ViewMode::FullPage => self.region.width / 100.0 * self.width_px,
        }
    }

    pub fn region_height_px(&self) -> f64 {
        match self.view {
            ViewMode::Cropped => self.height_px,
            ViewMode::FullPage => self.region.height / 100.0 * self.height_px,
        }
    }

    /// Region bounds in surface pixels.
    pub fn region_px(&self) -> Rect {
        match self.view {
            ViewMode::Cropped => Rect::new(0.0, 0.0, self.width_px, self.height_px),
            ViewMode::FullPage => self.region.to_px(self.width_px, self.height_px),
        }
    }

    /// Page percent point in surface pixels. Only meaningful in full-page view.
    pub fn page_to_px(&self, page: Point) -> Point {
        Point::new(page.x / 100.0 * self.width_px, page.y / 100.0 * self.height_px)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/space.rs"]
mod tests;
