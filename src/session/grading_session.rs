use std::sync::Arc;

use crate::compose::layers::{
    DEFAULT_SOLUTION_OPACITY, LayerContent, LayerRequest, LayerToggles, can_toggle_other_role,
    task_paint_list,
};
use crate::foundation::core::{Point, RenderContext, Rgba8};
use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::geometry::space::{SurfaceMapping, ViewMode};
use crate::interact::gesture::hit_test;
use crate::model::annotation::{Annotation, Role};
use crate::model::log::AnnotationId;
use crate::model::project::Project;
use crate::model::region::TaskRegion;
use crate::model::student::StudentRecord;
use crate::render::annotations::push_annotations;
use crate::render::backend::{BackendKind, RenderBackend, create_backend};
use crate::render::decorations::{default_badge_anchor, push_points_badge};
use crate::render::scene::{DrawCmd, PageImage, Scene};
use crate::render::vector::{SvgCoordinates, VectorBackend};
use crate::text::fonts::FontBook;

/// Outline of the active region in full-page view.
pub const REGION_OUTLINE: Rgba8 = Rgba8::rgb(0x25, 0x63, 0xeb);

/// One grader's live view over a project.
///
/// Edits go to the current student's log for the current task, or to the model solution while
/// solution editing is on. Rendering always reads the state held here.
#[derive(Clone, Debug)]
pub struct GradingSession {
    project: Project,
    student_index: usize,
    task_index: usize,
    viewer: Role,
    toggles: LayerToggles,
    editing_solution: bool,
    view: ViewMode,
    ctx: RenderContext,
    page: Option<Arc<PageImage>>,
}

impl GradingSession {
    pub fn new(project: Project, viewer: Role) -> OvermarkResult<Self> {
        if viewer == Role::Solution {
            return Err(OvermarkError::validation(
                "sessions are opened as first or second grader",
            ));
        }
        project.validate()?;
        Ok(Self {
            project,
            student_index: 0,
            task_index: 0,
            viewer,
            toggles: LayerToggles::default(),
            editing_solution: false,
            view: ViewMode::Cropped,
            ctx: RenderContext::new(0.0, 0.0),
            page: None,
        })
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Copy for an export job, detached from further live edits.
    pub fn snapshot(&self) -> Project {
        self.project.clone()
    }

    pub fn into_project(self) -> Project {
        self.project
    }

    pub fn viewer(&self) -> Role {
        self.viewer
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view
    }

    pub fn toggles(&self) -> LayerToggles {
        self.toggles
    }

    pub fn is_editing_solution(&self) -> bool {
        self.editing_solution
    }

    pub fn select_student(&mut self, index: usize) -> OvermarkResult<()> {
        if index >= self.project.students.len() {
            return Err(OvermarkError::validation(format!(
                "student index {index} out of range ({} students)",
                self.project.students.len()
            )));
        }
        self.student_index = index;
        self.page = None;
        Ok(())
    }

    pub fn select_task(&mut self, task_id: &str) -> OvermarkResult<()> {
        let index = self
            .project
            .tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| OvermarkError::validation(format!("unknown task \"{task_id}\"")))?;
        if self.task(index).page != self.current_task()?.page {
            self.page = None;
        }
        self.task_index = index;
        Ok(())
    }

    pub fn set_view_mode(&mut self, view: ViewMode) {
        self.view = view;
    }

    pub fn set_toggles(&mut self, toggles: LayerToggles) {
        self.toggles = toggles;
    }

    /// Isolated model-solution editing. Only the first grader may turn it on.
    pub fn set_editing_solution(&mut self, on: bool) -> OvermarkResult<()> {
        if on && self.viewer != Role::First {
            return Err(OvermarkError::validation(
                "only the first grader edits the model solution",
            ));
        }
        self.editing_solution = on;
        Ok(())
    }

    pub fn set_render_context(&mut self, ctx: RenderContext) {
        self.ctx = ctx;
    }

    pub fn render_context(&self) -> RenderContext {
        self.ctx
    }

    /// Rendered page the current task sits on, at any resolution.
    pub fn set_page_image(&mut self, page: Arc<PageImage>) {
        self.page = Some(page);
    }

    pub fn current_task(&self) -> OvermarkResult<&TaskRegion> {
        self.project
            .tasks
            .get(self.task_index)
            .ok_or_else(|| OvermarkError::validation("project has no tasks"))
    }

    pub fn current_student(&self) -> OvermarkResult<&StudentRecord> {
        self.project
            .students
            .get(self.student_index)
            .ok_or_else(|| OvermarkError::validation("project has no students"))
    }

    fn task(&self, index: usize) -> &TaskRegion {
        &self.project.tasks[index]
    }

    fn current_task_id(&self) -> OvermarkResult<String> {
        Ok(self.current_task()?.id.clone())
    }

    fn current_student_mut(&mut self) -> OvermarkResult<&mut StudentRecord> {
        self.project
            .students
            .get_mut(self.student_index)
            .ok_or_else(|| OvermarkError::validation("project has no students"))
    }

    pub fn layer_request(&self) -> LayerRequest {
        LayerRequest::new(self.viewer)
            .with_toggles(self.toggles)
            .with_editing_solution(self.editing_solution)
            .with_allow_second_view_first(self.project.allow_second_view_first)
    }

    pub fn can_toggle_other_role(&self) -> bool {
        let (Ok(task), Ok(student)) = (self.current_task(), self.current_student()) else {
            return false;
        };
        let content = LayerContent::for_task(
            Some(student),
            &self.project.model_solutions,
            &task.id,
            self.viewer,
        );
        can_toggle_other_role(&self.layer_request(), &content)
    }

    pub fn mapping(&self) -> OvermarkResult<SurfaceMapping> {
        SurfaceMapping::new(self.current_task()?.region, self.view, &self.ctx)
    }

    /// Commit an annotation drawn by the viewer. Rejected annotations return `Ok(None)`.
    pub fn append(&mut self, annotation: Annotation) -> OvermarkResult<Option<AnnotationId>> {
        let task_id = self.current_task_id()?;
        if self.editing_solution {
            return self
                .project
                .model_solutions
                .append(&task_id, annotation, self.viewer);
        }
        let role = self.viewer;
        let id = self
            .current_student_mut()?
            .log_mut(&task_id)
            .append(annotation.with_role(role));
        Ok(id)
    }

    /// Remove the viewer's most recent annotation on the current task.
    pub fn undo(&mut self) -> OvermarkResult<Option<Annotation>> {
        let task_id = self.current_task_id()?;
        if self.editing_solution {
            return self.project.model_solutions.undo(&task_id, self.viewer);
        }
        let role = self.viewer;
        Ok(self
            .current_student_mut()?
            .log_mut(&task_id)
            .undo_last_of_role(role))
    }

    /// Eraser at a region-local point; only the viewer's own layer is touched.
    pub fn erase_at(&mut self, local: Point) -> OvermarkResult<Option<Annotation>> {
        let task_id = self.current_task_id()?;
        if self.editing_solution {
            let Some(log) = self.project.model_solutions.log(&task_id) else {
                return Ok(None);
            };
            let Some(id) = hit_test(log, Role::Solution, local) else {
                return Ok(None);
            };
            return self.project.model_solutions.remove(&task_id, id, self.viewer);
        }
        let role = self.viewer;
        let log = self.current_student_mut()?.log_mut(&task_id);
        Ok(hit_test(log, role, local).and_then(|id| log.remove(id)))
    }

    /// Eraser at a surface pixel. Misses outside the active region.
    pub fn erase_at_px(&mut self, px: Point) -> OvermarkResult<Option<Annotation>> {
        match self.mapping()?.px_to_local(px) {
            Some(local) => self.erase_at(local),
            None => Ok(None),
        }
    }

    pub fn set_points(&mut self, value: f64) -> OvermarkResult<f64> {
        let task = self.current_task()?.clone();
        let role = self.viewer;
        self.current_student_mut()?.set_points(&task, role, value)
    }

    /// Defer the current task.
    pub fn skip(&mut self) -> OvermarkResult<()> {
        let task_id = self.current_task_id()?;
        self.current_student_mut()?.skip(&task_id);
        Ok(())
    }

    /// Display list for the current task at the current render context.
    pub fn build_scene(&self, fonts: &mut FontBook) -> OvermarkResult<Scene> {
        let task = self.current_task()?;
        let mapping = self.mapping()?;
        let width = surface_dim(self.ctx.container_width_px)?;
        let height = surface_dim(self.ctx.container_height_px)?;
        let mut scene = Scene::new(width, height).with_clear(Rgba8::WHITE);

        if let Some(page) = &self.page {
            let background = match self.view {
                ViewMode::FullPage => Some(Arc::clone(page)),
                ViewMode::Cropped => page
                    .crop(task.region.to_px(f64::from(page.width), f64::from(page.height)))
                    .map(Arc::new),
            };
            if let Some(bg) = background {
                scene = scene.with_background(bg);
            }
        }

        if self.view == ViewMode::FullPage {
            scene.push(DrawCmd::StrokeRect {
                rect: mapping.region_px(),
                width: 2.0 * self.ctx.decoration_scale(),
                color: REGION_OUTLINE,
            });
        }

        let student = self.current_student().ok();
        let opacity = self.project.solution_opacity_or(DEFAULT_SOLUTION_OPACITY);
        let list = task_paint_list(
            &self.layer_request(),
            student,
            &self.project.model_solutions,
            &task.id,
            opacity,
        );
        push_annotations(&mut scene, &list, &mapping, &self.ctx, fonts);

        if !self.editing_solution
            && let Some(points) = student.and_then(|s| s.points(&task.id, self.viewer))
        {
            let anchor = default_badge_anchor(mapping.region_px(), &self.ctx);
            push_points_badge(&mut scene, points, task.max_points, anchor, &self.ctx, fonts);
        }
        Ok(scene)
    }

    /// Live-view overlay markup.
    pub fn render_svg(
        &self,
        fonts: &mut FontBook,
        coords: SvgCoordinates,
    ) -> OvermarkResult<String> {
        let scene = self.build_scene(fonts)?;
        Ok(VectorBackend::new(coords).to_svg(&scene, fonts))
    }

    /// Raster preview of the current task.
    pub fn render_raster(
        &self,
        kind: BackendKind,
        fonts: &mut FontBook,
    ) -> OvermarkResult<PageImage> {
        let scene = self.build_scene(fonts)?;
        create_backend(kind).render_scene(&scene, fonts)
    }
}

fn surface_dim(v: f64) -> OvermarkResult<u32> {
    if !(v.is_finite() && v >= 1.0 && v <= f64::from(u16::MAX)) {
        return Err(OvermarkError::geometry(format!("surface dimension {v} is unusable")));
    }
    Ok(v.round() as u32)
}

#[cfg(test)]
#[path = "../../tests/unit/session/grading_session.rs"]
mod tests;
