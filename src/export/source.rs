use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::Size;
use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::foundation::math::premultiply_in_place;
use crate::render::scene::PageImage;

/// A4 in points, the nominal size of a page at scale 1.
pub const A4_POINTS: Size = Size::new(595.0, 842.0);

/// Page-rasterization collaborator. Page numbers start at 1.
pub trait PageSource {
    fn page_count(&self) -> u32;

    fn page(&mut self, number: u32) -> OvermarkResult<Box<dyn PageHandle>>;
}

/// One page ready to be rasterized.
pub trait PageHandle {
    /// Surface size in pixels when rendered at `scale`.
    fn viewport_size(&self, scale: f64) -> Size;

    /// Rasterize onto a `width` x `height` surface.
    fn render_into(&self, width: u32, height: u32) -> OvermarkResult<PageImage>;
}

fn check_number(number: u32, count: u32) -> OvermarkResult<()> {
    if number == 0 || number > count {
        return Err(OvermarkError::rasterization(format!(
            "page {number} does not exist (document has {count} pages)"
        )));
    }
    Ok(())
}

/// Uniformly colored pages, for documents that are graded without a scan.
#[derive(Clone, Debug)]
pub struct BlankPages {
    count: u32,
    size: Size,
    rgba: [u8; 4],
}

impl BlankPages {
    pub fn new(count: u32) -> Self {
        Self {
            count,
            size: A4_POINTS,
            rgba: [255, 255, 255, 255],
        }
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    pub fn with_color(mut self, rgba: [u8; 4]) -> Self {
        self.rgba = rgba;
        self
    }
}

struct BlankPage {
    size: Size,
    rgba: [u8; 4],
}

impl PageSource for BlankPages {
    fn page_count(&self) -> u32 {
        self.count
    }

    fn page(&mut self, number: u32) -> OvermarkResult<Box<dyn PageHandle>> {
        check_number(number, self.count)?;
        Ok(Box::new(BlankPage {
            size: self.size,
            rgba: self.rgba,
        }))
    }
}

impl PageHandle for BlankPage {
    fn viewport_size(&self, scale: f64) -> Size {
        self.size * scale
    }

    fn render_into(&self, width: u32, height: u32) -> OvermarkResult<PageImage> {
        let mut rgba = self.rgba;
        premultiply_in_place(&mut rgba);
        Ok(PageImage::new_filled(width, height, rgba))
    }
}

/// Pages read from a directory of images, one file per page in file-name order.
///
/// Images are taken to be scans at `native_scale` (2 by default), so an image of
/// 1190x1684 pixels has the nominal size of an A4 page.
#[derive(Clone, Debug)]
pub struct ImagePages {
    files: Vec<PathBuf>,
    native_scale: f64,
}

impl ImagePages {
    pub fn from_dir(dir: &Path) -> OvermarkResult<Self> {
        let rd = std::fs::read_dir(dir)
            .with_context(|| format!("read page directory '{}'", dir.display()))?;
        let mut files: Vec<PathBuf> = rd
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_page_image(p))
            .collect();
        files.sort();
        tracing::debug!(dir = %dir.display(), pages = files.len(), "page images found");
        Ok(Self {
            files,
            native_scale: 2.0,
        })
    }

    pub fn from_files(files: Vec<PathBuf>) -> Self {
        Self {
            files,
            native_scale: 2.0,
        }
    }

    pub fn with_native_scale(mut self, scale: f64) -> Self {
        if scale.is_finite() && scale > 0.0 {
            self.native_scale = scale;
        }
        self
    }
}

fn is_page_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| matches!(e.as_str(), "png" | "jpg" | "jpeg"))
}

struct ImagePage {
    image: Arc<image::RgbaImage>,
    native_scale: f64,
}

impl PageSource for ImagePages {
    fn page_count(&self) -> u32 {
        u32::try_from(self.files.len()).unwrap_or(u32::MAX)
    }

    fn page(&mut self, number: u32) -> OvermarkResult<Box<dyn PageHandle>> {
        check_number(number, self.page_count())?;
        let path = &self.files[number as usize - 1];
        let image = image::open(path)
            .map_err(|e| {
                OvermarkError::rasterization(format!("decode '{}': {e}", path.display()))
            })?
            .to_rgba8();
        Ok(Box::new(ImagePage {
            image: Arc::new(image),
            native_scale: self.native_scale,
        }))
    }
}

impl PageHandle for ImagePage {
    fn viewport_size(&self, scale: f64) -> Size {
        let (w, h) = self.image.dimensions();
        Size::new(f64::from(w), f64::from(h)) * (scale / self.native_scale)
    }

    fn render_into(&self, width: u32, height: u32) -> OvermarkResult<PageImage> {
        if width == 0 || height == 0 {
            return Err(OvermarkError::rasterization("page surface has zero size"));
        }
        let pixels = if self.image.dimensions() == (width, height) {
            self.image.as_raw().clone()
        } else {
            image::imageops::resize(
                self.image.as_ref(),
                width,
                height,
                image::imageops::FilterType::Triangle,
            )
            .into_raw()
        };
        let mut data = pixels;
        premultiply_in_place(&mut data);
        Ok(PageImage {
            width,
            height,
            data,
            premultiplied: true,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/source.rs"]
mod tests;
