use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::compose::layers::{DEFAULT_SOLUTION_OPACITY, LayerRequest, LayerToggles, task_paint_list};
use crate::export::sink::{DocumentSink, PageMeta};
use crate::export::source::PageSource;
use crate::foundation::core::RenderContext;
use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::foundation::math::finite_or;
use crate::geometry::space::{SurfaceMapping, ViewMode};
use crate::model::annotation::Role;
use crate::model::project::Project;
use crate::render::annotations::push_annotations;
use crate::render::backend::{BackendKind, RenderBackend, create_backend};
use crate::render::decorations::{
    ScoreSummary, default_badge_anchor, push_points_badge, push_score_summary,
};
use crate::render::scene::{PageImage, Scene};
use crate::text::fonts::{FontBook, FontReadiness, FontSpec, GRADE_FONT_FAMILY, TOTAL_FONT_FAMILY};

/// Scale of the reference export raster; decorations are drawn at their nominal size here.
pub const REFERENCE_EXPORT_SCALE: f64 = 2.0;

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// How students are split into output documents.
pub enum ExportMode {
    /// One document holding every student.
    #[default]
    Collective,
    /// One document per student, named after the student.
    Individual,
}

#[derive(Clone, Debug)]
/// Options for [`ExportJob`].
pub struct ExportOptions {
    /// Page raster scale; 2.0 is the reference resolution.
    pub scale: f64,
    /// Document split.
    pub mode: ExportMode,
    /// Draw the model solution beneath the corrections.
    pub include_solution: bool,
    /// Underlay opacity of the model solution.
    pub solution_opacity: f64,
    /// Append model-solution-only pages.
    pub append_solution_pages: bool,
    /// Whose corrections and points are exported.
    pub viewer: Role,
    /// Also draw the other grader's annotations, subject to project permission.
    pub include_other_role: bool,
    /// Backend that rasterizes each page.
    pub backend: BackendKind,
    /// Checked between pages.
    pub cancel: CancelToken,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            scale: REFERENCE_EXPORT_SCALE,
            mode: ExportMode::Collective,
            include_solution: false,
            solution_opacity: DEFAULT_SOLUTION_OPACITY,
            append_solution_pages: false,
            viewer: Role::First,
            include_other_role: true,
            backend: BackendKind::Raster,
            cancel: CancelToken::new(),
        }
    }
}

impl ExportOptions {
    /// Options for `viewer`. The first grader's export shows both graders by default; the
    /// second grader's shows only their own layer.
    pub fn for_viewer(viewer: Role) -> Self {
        Self {
            viewer,
            include_other_role: viewer == Role::First,
            ..Self::default()
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_mode(mut self, mode: ExportMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_solution(mut self, include: bool) -> Self {
        self.include_solution = include;
        self
    }

    pub fn with_solution_opacity(mut self, opacity: f64) -> Self {
        self.solution_opacity = opacity;
        self
    }

    pub fn with_solution_pages(mut self, append: bool) -> Self {
        self.append_solution_pages = append;
        self
    }

    pub fn with_other_role(mut self, include: bool) -> Self {
        self.include_other_role = include;
        self
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportState {
    #[default]
    Idle,
    /// `student_index` is `None` on model-solution pages.
    Rendering {
        student_index: Option<usize>,
        page_index: u32,
    },
    Finished,
    Failed,
    Cancelled,
}

/// A page left out of the export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedPage {
    /// `None` for model-solution pages.
    pub student_index: Option<usize>,
    pub source_page: u32,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub documents: usize,
    pub pages_written: usize,
    pub skipped: Vec<SkippedPage>,
}

/// One page to produce.
#[derive(Clone, Copy, Debug)]
struct PageJob {
    student_index: Option<usize>,
    source_page: u32,
    offset: u32,
}

/// Export over a snapshot of a project. Later edits to the live project are not seen.
#[derive(Debug)]
pub struct ExportJob {
    project: Project,
    opts: ExportOptions,
    state: ExportState,
}

impl ExportJob {
    pub fn new(project: &Project, opts: ExportOptions) -> Self {
        Self {
            project: project.clone(),
            opts,
            state: ExportState::Idle,
        }
    }

    pub fn state(&self) -> ExportState {
        self.state
    }

    pub fn options(&self) -> &ExportOptions {
        &self.opts
    }

    /// Render every page into `sink`.
    ///
    /// Pages the source cannot provide are skipped and reported. Sink errors fail the job;
    /// cancellation aborts the sink and returns [`OvermarkError::Cancelled`]. `progress`
    /// receives a non-decreasing percentage.
    #[tracing::instrument(
        skip_all,
        fields(students = self.project.students.len(), mode = ?self.opts.mode)
    )]
    pub fn run(
        &mut self,
        pages: &mut dyn PageSource,
        fonts: &mut FontBook,
        sink: &mut dyn DocumentSink,
        progress: &mut dyn FnMut(f64),
    ) -> OvermarkResult<ExportReport> {
        let documents = self.plan();
        let total: usize = documents.iter().map(|(_, jobs)| jobs.len()).sum();
        let mut backend = create_backend(self.opts.backend);
        let mut report = ExportReport::default();
        let mut done = 0usize;
        progress(0.0);

        for (name, jobs) in documents {
            if let Err(err) = sink.begin(&name) {
                self.state = ExportState::Failed;
                return Err(err);
            }
            for job in jobs {
                if self.opts.cancel.is_cancelled() {
                    tracing::info!(pages_written = report.pages_written, "export cancelled");
                    sink.abort();
                    self.state = ExportState::Cancelled;
                    return Err(OvermarkError::Cancelled);
                }
                self.state = ExportState::Rendering {
                    student_index: job.student_index,
                    page_index: job.offset,
                };

                match self.render_page(&job, pages, fonts, backend.as_mut()) {
                    Ok(image) => {
                        let meta = PageMeta {
                            student_index: job.student_index,
                            source_page: job.source_page,
                            page_in_student: job.offset + 1,
                        };
                        if let Err(err) = sink.push_page(&image, &meta) {
                            sink.abort();
                            self.state = ExportState::Failed;
                            return Err(err);
                        }
                        report.pages_written += 1;
                    }
                    Err(err) if err.is_recoverable() => {
                        tracing::warn!(page = job.source_page, %err, "page skipped");
                        report.skipped.push(SkippedPage {
                            student_index: job.student_index,
                            source_page: job.source_page,
                            reason: err.to_string(),
                        });
                    }
                    Err(err) => {
                        sink.abort();
                        self.state = ExportState::Failed;
                        return Err(err);
                    }
                }

                done += 1;
                progress(done as f64 / total.max(1) as f64 * 100.0);
            }
            if let Err(err) = sink.end() {
                self.state = ExportState::Failed;
                return Err(err);
            }
            report.documents += 1;
        }

        progress(100.0);
        self.state = ExportState::Finished;
        tracing::info!(
            pages_written = report.pages_written,
            skipped = report.skipped.len(),
            "export finished"
        );
        Ok(report)
    }

    /// Documents in output order with their pages in student-then-page order.
    fn plan(&self) -> Vec<(String, Vec<PageJob>)> {
        let per = self.project.pages_per_student;
        let student_pages = |index: usize, start: u32| {
            (0..per).map(move |offset| PageJob {
                student_index: Some(index),
                source_page: start.saturating_add(offset),
                offset,
            })
        };
        let solution_pages = || {
            (0..per).map(|offset| PageJob {
                student_index: None,
                source_page: 1 + offset,
                offset,
            })
        };
        let with_solution = self.opts.append_solution_pages;

        match self.opts.mode {
            ExportMode::Collective => {
                let mut jobs: Vec<PageJob> = self
                    .project
                    .students
                    .iter()
                    .enumerate()
                    .flat_map(|(i, s)| student_pages(i, s.page_start))
                    .collect();
                if with_solution {
                    jobs.extend(solution_pages());
                }
                let name = if self.project.title.trim().is_empty() {
                    "export".to_owned()
                } else {
                    self.project.title.clone()
                };
                vec![(name, jobs)]
            }
            ExportMode::Individual => self
                .project
                .students
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    let mut jobs: Vec<PageJob> = student_pages(i, s.page_start).collect();
                    if with_solution {
                        jobs.extend(solution_pages());
                    }
                    (s.display_name(i), jobs)
                })
                .collect(),
        }
    }

    #[tracing::instrument(skip(self, pages, fonts, backend))]
    fn render_page(
        &self,
        job: &PageJob,
        pages: &mut dyn PageSource,
        fonts: &mut FontBook,
        backend: &mut dyn RenderBackend,
    ) -> OvermarkResult<PageImage> {
        let count = pages.page_count();
        if job.source_page > count {
            return Err(OvermarkError::rasterization(format!(
                "page {} is beyond the document ({count} pages)",
                job.source_page
            )));
        }
        let handle = pages.page(job.source_page)?;
        let size = handle.viewport_size(self.opts.scale);
        let (width, height) = (surface_px(size.width)?, surface_px(size.height)?);
        let page = handle.render_into(width, height)?;

        if let Err(err) = fonts.ensure_loaded(&export_fonts()) {
            tracing::debug!(%err, "rendering with fallback font metrics");
        }

        let ctx = RenderContext::new(f64::from(width), f64::from(height))
            .with_scale(self.opts.scale / REFERENCE_EXPORT_SCALE);
        let mut scene = Scene::new(width, height).with_background(Arc::new(page));
        self.push_tasks(&mut scene, job, &ctx, fonts);

        if let Some(index) = job.student_index
            && job.offset == 0
        {
            let student = &self.project.students[index];
            let total = student.total(&self.project.tasks, self.opts.viewer);
            let max = self.project.max_points();
            let summary = ScoreSummary::new(
                total,
                max,
                self.project.grade_table.display_grade(total, max),
            );
            let fields = &self.project.score_fields;
            push_score_summary(
                &mut scene,
                &summary,
                fields.total_field,
                fields.grade_field,
                &ctx,
                fonts,
            );
        }

        backend.render_scene(&scene, fonts)
    }

    fn push_tasks(
        &self,
        scene: &mut Scene,
        job: &PageJob,
        ctx: &RenderContext,
        fonts: &mut FontBook,
    ) {
        let student = job.student_index.and_then(|i| self.project.students.get(i));
        let req = LayerRequest::new(self.opts.viewer)
            .with_toggles(LayerToggles {
                show_other_role: self.opts.include_other_role,
                show_solution: self.opts.include_solution || student.is_none(),
            })
            .with_allow_second_view_first(self.project.allow_second_view_first);
        let opacity =
            finite_or(self.opts.solution_opacity, DEFAULT_SOLUTION_OPACITY).clamp(0.0, 1.0);

        for task in self.project.tasks_on_page(job.offset + 1) {
            let mapping = match SurfaceMapping::new(task.region, ViewMode::FullPage, ctx) {
                Ok(m) => m,
                Err(err) => {
                    tracing::warn!(task = %task.id, %err, "task skipped");
                    continue;
                }
            };
            let solutions = &self.project.model_solutions;
            let list = task_paint_list(&req, student, solutions, &task.id, opacity);
            push_annotations(scene, &list, &mapping, ctx, fonts);

            if let Some(points) = student.and_then(|s| s.points(&task.id, self.opts.viewer)) {
                let anchor = match self.project.task_point_positions.get(&task.id) {
                    Some(p) => mapping.page_to_px(*p),
                    None => default_badge_anchor(mapping.region_px(), ctx),
                };
                push_points_badge(scene, points, task.max_points, anchor, ctx, fonts);
            }
        }
    }
}

fn export_fonts() -> [FontSpec; 4] {
    [
        FontSpec::sans(),
        FontSpec::sans_bold(),
        FontSpec::named(TOTAL_FONT_FAMILY, 400),
        FontSpec::named(GRADE_FONT_FAMILY, 400),
    ]
}

fn surface_px(v: f64) -> OvermarkResult<u32> {
    let px = v.round();
    if !(px.is_finite() && px >= 1.0 && px <= f64::from(u16::MAX)) {
        return Err(OvermarkError::rasterization(format!("page surface of {v}px is unusable")));
    }
    Ok(px as u32)
}

#[cfg(test)]
#[path = "../../tests/unit/export/paginator.rs"]
mod tests;
