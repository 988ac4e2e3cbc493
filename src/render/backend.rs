use crate::foundation::error::OvermarkResult;
use crate::render::raster::RasterBackend;
use crate::render::scene::{PageImage, Scene};
use crate::render::vector::{SvgCoordinates, VectorBackend};
use crate::text::fonts::FontBook;

/// Turns a [`Scene`] into pixels.
///
/// Every backend consumes the same display list, so outputs for one scene differ only by
/// anti-aliasing.
pub trait RenderBackend {
    /// Draw `scene` and read back premultiplied RGBA8 pixels.
    fn render_scene(&mut self, scene: &Scene, fonts: &mut FontBook) -> OvermarkResult<PageImage>;
}

/// Available backend kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// `vello_cpu` raster backend used for export.
    #[default]
    Raster,
    /// SVG output rasterized through `resvg`, the live-view path.
    Vector,
}

/// Create a rendering backend implementation.
pub fn create_backend(kind: BackendKind) -> Box<dyn RenderBackend> {
    match kind {
        BackendKind::Raster => Box::new(RasterBackend::new()),
        BackendKind::Vector => Box::new(VectorBackend::new(SvgCoordinates::Pixels)),
    }
}
