//! Which annotation layers a viewer sees, and in which order they are painted.

use smallvec::SmallVec;

use crate::foundation::core::Rgba8;
use crate::model::annotation::{Annotation, Role};
use crate::model::log::AnnotationLog;
use crate::model::solution::ModelSolutionSet;
use crate::model::student::StudentRecord;

/// Fixed grey used for the model-solution underlay.
pub const SOLUTION_UNDERLAY_RGB: Rgba8 = Rgba8::rgb(107, 114, 128);

/// Default opacity of the model-solution underlay.
pub const DEFAULT_SOLUTION_OPACITY: f64 = 0.35;

/// Viewer-controlled visibility switches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayerToggles {
    pub show_other_role: bool,
    pub show_solution: bool,
}

/// Who is looking and under which project permission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerRequest {
    pub viewer: Role,
    pub toggles: LayerToggles,
    pub editing_solution: bool,
    pub allow_second_view_first: bool,
}

impl LayerRequest {
    pub fn new(viewer: Role) -> Self {
        Self {
            viewer,
            toggles: LayerToggles::default(),
            editing_solution: false,
            allow_second_view_first: false,
        }
    }

    pub fn with_toggles(mut self, toggles: LayerToggles) -> Self {
        self.toggles = toggles;
        self
    }

    pub fn with_editing_solution(mut self, on: bool) -> Self {
        self.editing_solution = on;
        self
    }

    pub fn with_allow_second_view_first(mut self, allow: bool) -> Self {
        self.allow_second_view_first = allow;
        self
    }

    fn permits_other_role(&self) -> bool {
        match self.viewer {
            Role::First => true,
            Role::Second => self.allow_second_view_first,
            Role::Solution => false,
        }
    }
}

/// Which optional layers actually have content for one student and task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayerContent {
    pub other_role: bool,
    pub solution: bool,
}

impl LayerContent {
    pub fn for_task(
        student: Option<&StudentRecord>,
        solutions: &ModelSolutionSet,
        task_id: &str,
        viewer: Role,
    ) -> Self {
        let other_role = match (student, viewer.opposing()) {
            (Some(s), Some(other)) => s.has_content(task_id, other),
            _ => false,
        };
        Self {
            other_role,
            solution: solutions.has_content(task_id),
        }
    }
}

/// Layers to draw, bottom first. The solution layer is always first when present.
pub fn visible_layers(req: &LayerRequest, content: &LayerContent) -> SmallVec<[Role; 3]> {
    let mut out = SmallVec::new();
    if req.editing_solution {
        out.push(Role::Solution);
        return out;
    }
    if req.toggles.show_solution && content.solution {
        out.push(Role::Solution);
    }
    if req.viewer != Role::Solution {
        out.push(req.viewer);
    }
    if let Some(other) = req.viewer.opposing()
        && can_toggle_other_role(req, content)
        && req.toggles.show_other_role
    {
        out.push(other);
    }
    out
}

/// Whether the "show other grader" switch should be enabled at all.
pub fn can_toggle_other_role(req: &LayerRequest, content: &LayerContent) -> bool {
    !req.editing_solution && content.other_role && req.permits_other_role()
}

/// How a composited annotation is painted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayerPaint {
    /// The annotation's own color and opacity.
    Stored,
    /// Reference underlay: fixed color, stored color ignored.
    Underlay { color: Rgba8, opacity: f64 },
}

impl LayerPaint {
    pub fn underlay(opacity: f64) -> Self {
        Self::Underlay {
            color: SOLUTION_UNDERLAY_RGB,
            opacity,
        }
    }
}

/// One entry of the paint list.
#[derive(Clone, Copy, Debug)]
pub struct Layered<'a> {
    pub annotation: &'a Annotation,
    pub paint: LayerPaint,
}

/// Ordered paint list: model solution first, then the student's correction annotations in
/// stored order, filtered to the visible roles.
pub fn composite<'a>(
    layers: &[Role],
    student_log: Option<&'a AnnotationLog>,
    solution_log: Option<&'a AnnotationLog>,
    editing_solution: bool,
    solution_opacity: f64,
) -> Vec<Layered<'a>> {
    let mut out = Vec::new();
    if layers.contains(&Role::Solution)
        && let Some(log) = solution_log
    {
        let paint = if editing_solution {
            LayerPaint::Stored
        } else {
            LayerPaint::underlay(solution_opacity)
        };
        out.extend(log.annotations().map(|annotation| Layered { annotation, paint }));
    }

    let corrections: SmallVec<[Role; 2]> = layers
        .iter()
        .copied()
        .filter(|r| *r != Role::Solution)
        .collect();
    if let Some(log) = student_log
        && !corrections.is_empty()
    {
        out.extend(
            log.annotations()
                .filter(|a| corrections.contains(&a.role()))
                .map(|annotation| Layered {
                    annotation,
                    paint: LayerPaint::Stored,
                }),
        );
    }
    out
}

/// [`visible_layers`] and [`composite`] for one student and task.
pub fn task_paint_list<'a>(
    req: &LayerRequest,
    student: Option<&'a StudentRecord>,
    solutions: &'a ModelSolutionSet,
    task_id: &str,
    solution_opacity: f64,
) -> Vec<Layered<'a>> {
    let content = LayerContent::for_task(student, solutions, task_id, req.viewer);
    let layers = visible_layers(req, &content);
    composite(
        &layers,
        student.and_then(|s| s.log(task_id)),
        solutions.log(task_id),
        req.editing_solution,
        solution_opacity,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/compose/layers.rs"]
mod tests;
