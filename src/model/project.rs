use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::grading::table::{CorrectionMark, GradeTable, default_correction_marks};
use crate::model::region::{ScoreFields, TaskPointPositions, TaskRegion};
use crate::model::solution::ModelSolutionSet;
use crate::model::student::StudentRecord;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// A grading project: the task layout shared by all students plus each student's record.
///
/// The JSON form uses camelCase keys and is the interchange format with storage and the
/// second-opinion tooling.
pub struct Project {
    /// Title shown on exports.
    #[serde(default)]
    pub title: String,
    /// Number of document pages per student.
    pub pages_per_student: u32,
    /// Task regions.
    pub tasks: Vec<TaskRegion>,
    /// Students in document order.
    #[serde(default)]
    pub students: Vec<StudentRecord>,
    /// Percent-to-grade mapping.
    #[serde(default)]
    pub grade_table: GradeTable,
    /// Symbols offered by the mark tool.
    #[serde(default = "default_correction_marks")]
    pub correction_marks: Vec<CorrectionMark>,
    /// Optional first-page total and grade boxes.
    #[serde(default)]
    pub score_fields: ScoreFields,
    /// Stored anchors of per-task points badges.
    #[serde(default)]
    pub task_point_positions: TaskPointPositions,
    /// Shared model solution.
    #[serde(default)]
    pub model_solutions: ModelSolutionSet,
    /// Opacity of the model-solution underlay.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_solution_opacity: Option<f64>,
    /// Whether second graders may see the first grader's marks.
    #[serde(default)]
    pub allow_second_view_first: bool,
}

impl Project {
    pub fn new(pages_per_student: u32, tasks: Vec<TaskRegion>) -> Self {
        Self {
            title: String::new(),
            pages_per_student,
            tasks,
            students: Vec::new(),
            grade_table: GradeTable::default(),
            correction_marks: default_correction_marks(),
            score_fields: ScoreFields::default(),
            task_point_positions: TaskPointPositions::new(),
            model_solutions: ModelSolutionSet::new(),
            model_solution_opacity: None,
            allow_second_view_first: false,
        }
    }

    /// Students for a document of `page_count` pages, `pages_per_student` pages each.
    pub fn with_students_for_pages(mut self, page_count: u32) -> Self {
        let per = self.pages_per_student.max(1);
        let count = page_count.div_ceil(per);
        self.students = (0..count)
            .map(|i| StudentRecord::new(format!("s_{i}"), i * per + 1))
            .collect();
        self
    }

    pub fn from_json(s: &str) -> OvermarkResult<Self> {
        let project: Self = serde_json::from_str(s)?;
        project.validate()?;
        Ok(project)
    }

    pub fn from_path(path: &Path) -> OvermarkResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read project from '{}'", path.display()))?;
        Self::from_json(&text)
    }

    pub fn to_json_pretty(&self) -> OvermarkResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Structural checks. Region bounds are not checked; renderers clip.
    pub fn validate(&self) -> OvermarkResult<()> {
        if self.pages_per_student == 0 {
            return Err(OvermarkError::validation("pagesPerStudent must be >= 1"));
        }
        let mut seen = BTreeSet::new();
        for t in &self.tasks {
            if !seen.insert(t.id.as_str()) {
                return Err(OvermarkError::validation(format!("duplicate task id \"{}\"", t.id)));
            }
            if t.page == 0 || t.page > self.pages_per_student {
                return Err(OvermarkError::validation(format!(
                    "task \"{}\" is on page {}, expected 1..={}",
                    t.id, t.page, self.pages_per_student
                )));
            }
            if !t.max_points.is_finite() || t.max_points < 0.0 {
                return Err(OvermarkError::validation(format!(
                    "task \"{}\" has invalid maxPoints",
                    t.id
                )));
            }
        }
        for s in &self.students {
            if s.page_start == 0 {
                return Err(OvermarkError::validation(format!(
                    "student \"{}\" has pageStart 0",
                    s.id
                )));
            }
        }
        Ok(())
    }

    pub fn task(&self, id: &str) -> Option<&TaskRegion> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks on the 1-based student page `page`, in declaration order.
    pub fn tasks_on_page(&self, page: u32) -> impl Iterator<Item = &TaskRegion> + '_ {
        self.tasks.iter().filter(move |t| t.page == page)
    }

    pub fn max_points(&self) -> f64 {
        self.tasks.iter().map(|t| t.max_points).sum()
    }

    /// Underlay opacity: `OVERMARK_SOLUTION_OPACITY`, then the stored value, then `default`.
    pub fn solution_opacity_or(&self, default: f64) -> f64 {
        std::env::var("OVERMARK_SOLUTION_OPACITY")
            .ok()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .or(self.model_solution_opacity)
            .filter(|v| v.is_finite())
            .map_or(default, |v| v.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/project.rs"]
mod tests;
