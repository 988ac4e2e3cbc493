use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::foundation::math::unpremultiply_in_place;
use crate::render::scene::PageImage;

/// Where an exported page came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageMeta {
    /// Index into the project's students; `None` for model-solution pages.
    pub student_index: Option<usize>,
    /// Absolute page number in the source document.
    pub source_page: u32,
    /// Page within the student's document, starting at 1.
    pub page_in_student: u32,
}

/// Document-sink collaborator.
///
/// Ordering contract: `push_page` is called in student-then-page order between one `begin`
/// and its `end`. After `abort` the current document is partial and must be discarded.
pub trait DocumentSink {
    fn begin(&mut self, name: &str) -> OvermarkResult<()>;

    fn push_page(&mut self, page: &PageImage, meta: &PageMeta) -> OvermarkResult<()>;

    fn end(&mut self) -> OvermarkResult<()>;

    fn abort(&mut self);
}

/// A document collected by [`InMemorySink`].
#[derive(Clone, Debug, Default)]
pub struct CollectedDocument {
    pub name: String,
    pub pages: Vec<(PageMeta, PageImage)>,
    /// Set by `end`; stays false for aborted documents.
    pub complete: bool,
}

/// In-memory sink for tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    documents: Vec<CollectedDocument>,
    open: bool,
    aborted: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> &[CollectedDocument] {
        &self.documents
    }

    pub fn was_aborted(&self) -> bool {
        self.aborted
    }

    fn current(&mut self) -> OvermarkResult<&mut CollectedDocument> {
        match self.documents.last_mut() {
            Some(doc) if self.open => Ok(doc),
            _ => Err(OvermarkError::validation("no document is open")),
        }
    }
}

impl DocumentSink for InMemorySink {
    fn begin(&mut self, name: &str) -> OvermarkResult<()> {
        self.documents.push(CollectedDocument {
            name: name.to_owned(),
            ..CollectedDocument::default()
        });
        self.open = true;
        Ok(())
    }

    fn push_page(&mut self, page: &PageImage, meta: &PageMeta) -> OvermarkResult<()> {
        self.current()?.pages.push((meta.clone(), page.clone()));
        Ok(())
    }

    fn end(&mut self) -> OvermarkResult<()> {
        self.current()?.complete = true;
        self.open = false;
        Ok(())
    }

    fn abort(&mut self) {
        self.open = false;
        self.aborted = true;
    }
}

/// Writes each document as a directory of `page-NNN.png` files under `root`.
#[derive(Debug)]
pub struct PngDirSink {
    root: PathBuf,
    current: Option<(PathBuf, u32)>,
    written: Vec<PathBuf>,
}

impl PngDirSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            current: None,
            written: Vec::new(),
        }
    }

    /// Completed document directories.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

/// File-system safe document name; empty names become `document`.
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "document".to_owned()
    } else {
        cleaned
    }
}

fn write_png(path: &Path, page: &PageImage) -> OvermarkResult<()> {
    page.check_len()?;
    let mut data = page.data.clone();
    if page.premultiplied {
        unpremultiply_in_place(&mut data);
    }
    let img = image::RgbaImage::from_raw(page.width, page.height, data)
        .ok_or_else(|| OvermarkError::rasterization("page buffer does not match its size"))?;
    img.save(path)
        .with_context(|| format!("write page image '{}'", path.display()))?;
    Ok(())
}

impl DocumentSink for PngDirSink {
    fn begin(&mut self, name: &str) -> OvermarkResult<()> {
        let dir = self.root.join(sanitize_name(name));
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create output directory '{}'", dir.display()))?;
        tracing::debug!(dir = %dir.display(), "document started");
        self.current = Some((dir, 0));
        Ok(())
    }

    fn push_page(&mut self, page: &PageImage, _meta: &PageMeta) -> OvermarkResult<()> {
        let (dir, n) = self
            .current
            .as_mut()
            .ok_or_else(|| OvermarkError::validation("no document is open"))?;
        *n += 1;
        write_png(&dir.join(format!("page-{:03}.png", *n)), page)
    }

    fn end(&mut self) -> OvermarkResult<()> {
        let (dir, pages) = self
            .current
            .take()
            .ok_or_else(|| OvermarkError::validation("no document is open"))?;
        tracing::info!(dir = %dir.display(), pages, "document written");
        self.written.push(dir);
        Ok(())
    }

    fn abort(&mut self) {
        if let Some((dir, _)) = self.current.take()
            && let Err(err) = std::fs::remove_dir_all(&dir)
        {
            tracing::warn!(dir = %dir.display(), %err, "could not remove partial export");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/sink.rs"]
mod tests;
