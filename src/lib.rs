//! Overmark lays grading annotations over task regions of a paginated document.
//!
//! Annotations are stored in region-local percent coordinates, partitioned by correction pass
//! (first grader, second grader, model solution). The same display list drives both renderers:
//!
//! - an SVG backend for the live view, and
//! - a raster backend for exports,
//!
//! so an exported page shows what the grader saw.
//!
//! Typical flow:
//! - Load a [`Project`]
//! - Edit through a [`GradingSession`]
//! - Export with an [`ExportJob`] into a [`DocumentSink`]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Project documents and annotation records.
pub mod model;
/// Scene building and the vector and raster backends.
pub mod render;

pub(crate) mod foundation;

/// Layer selection per viewer.
pub mod compose;
/// Multi-page export.
pub mod export;
/// Page and region coordinate spaces.
pub mod geometry;
/// Grade tables and score formatting.
pub mod grading;
/// Gesture drafts and eraser hit-testing.
pub mod interact;
/// Live grading session.
pub mod session;
/// Text measurement, fitting and fonts.
pub mod text;

pub use crate::foundation::core::{
    BezPath, CssColor, PageRect, Point, Rect, RenderContext, Rgba8, Size, Vec2,
};
pub use crate::foundation::error::{OvermarkError, OvermarkResult};

pub use crate::compose::layers::{LayerRequest, LayerToggles, visible_layers};
pub use crate::export::paginator::{
    CancelToken, ExportJob, ExportMode, ExportOptions, ExportReport, ExportState, SkippedPage,
};
pub use crate::export::sink::{DocumentSink, InMemorySink, PageMeta, PngDirSink};
pub use crate::export::source::{BlankPages, ImagePages, PageHandle, PageSource};
pub use crate::geometry::space::{SurfaceMapping, ViewMode, aspect_correction_factor};
pub use crate::grading::table::{CorrectionMark, GradeTable};
pub use crate::model::annotation::{
    Annotation, Mark, PenStroke, Role, TextAnchor, TextNote, Underline, UnderlineStyle,
};
pub use crate::model::log::{AnnotationId, AnnotationLog};
pub use crate::model::project::Project;
pub use crate::model::region::{ScoreFields, TaskRegion};
pub use crate::model::solution::ModelSolutionSet;
pub use crate::model::student::{GradeEntry, SecondLayer, StudentRecord};
pub use crate::render::backend::{BackendKind, RenderBackend, create_backend};
pub use crate::render::scene::{PageImage, Scene};
pub use crate::render::vector::{SvgCoordinates, VectorBackend};
pub use crate::session::grading_session::GradingSession;
pub use crate::text::fonts::{FontBook, FontSpec};
