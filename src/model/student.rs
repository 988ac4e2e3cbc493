use std::collections::{BTreeMap, BTreeSet};

use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::model::annotation::{Annotation, Role};
use crate::model::log::AnnotationLog;
use crate::model::region::TaskRegion;

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Points awarded to one task by each correction pass.
pub struct GradeEntry {
    /// First grader's points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>,
    /// Second grader's points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_points: Option<f64>,
}

impl GradeEntry {
    pub fn get(&self, role: Role) -> Option<f64> {
        match role {
            Role::First => self.points,
            Role::Second => self.second_points,
            Role::Solution => None,
        }
    }

    fn slot(&mut self, role: Role) -> Option<&mut Option<f64>> {
        match role {
            Role::First => Some(&mut self.points),
            Role::Second => Some(&mut self.second_points),
            Role::Solution => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_none() && self.second_points.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// One student's slice of the scanned document plus everything graded on it.
pub struct StudentRecord {
    /// Stable id.
    pub id: String,
    /// Display name, may be empty.
    #[serde(default)]
    pub name: String,
    /// Absolute document page of the student's first page, starting at 1.
    pub page_start: u32,
    /// Points per task id.
    #[serde(default)]
    pub grades: BTreeMap<String, GradeEntry>,
    /// Annotations per task id.
    #[serde(default)]
    pub annotations: BTreeMap<String, AnnotationLog>,
    /// Tasks explicitly deferred by the grader.
    #[serde(default)]
    pub pending: BTreeSet<String>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Second-grader results for one student, as exchanged with the second-opinion package.
pub struct SecondLayer {
    /// Second points per task id.
    #[serde(default)]
    pub grades: BTreeMap<String, f64>,
    /// Second-role annotations per task id.
    #[serde(default)]
    pub annotations: BTreeMap<String, Vec<Annotation>>,
}

impl StudentRecord {
    pub fn new(id: impl Into<String>, page_start: u32) -> Self {
        Self {
            id: id.into(),
            page_start,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Name for display and file names; falls back to a 1-based ordinal.
    pub fn display_name(&self, index: usize) -> String {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            format!("student_{}", index + 1)
        } else {
            trimmed.to_owned()
        }
    }

    pub fn points(&self, task_id: &str, role: Role) -> Option<f64> {
        self.grades.get(task_id).and_then(|g| g.get(role))
    }

    /// Record points for `role`, clamped to `[0, max_points]`. Clears the pending flag.
    pub fn set_points(&mut self, task: &TaskRegion, role: Role, value: f64) -> OvermarkResult<f64> {
        if !value.is_finite() {
            return Err(OvermarkError::validation(format!(
                "points for task {} must be finite",
                task.id
            )));
        }
        let clamped = value.clamp(0.0, task.max_points.max(0.0));
        let entry = self.grades.entry(task.id.clone()).or_default();
        let slot = entry.slot(role).ok_or_else(|| {
            OvermarkError::validation("the solution layer does not carry points")
        })?;
        *slot = Some(clamped);
        self.pending.remove(&task.id);
        Ok(clamped)
    }

    pub fn skip(&mut self, task_id: &str) {
        self.pending.insert(task_id.to_owned());
    }

    pub fn is_pending(&self, task_id: &str) -> bool {
        self.pending.contains(task_id)
    }

    pub fn total(&self, tasks: &[TaskRegion], role: Role) -> f64 {
        tasks
            .iter()
            .filter_map(|t| self.points(&t.id, role))
            .sum()
    }

    /// Every task has points for `role` and none is deferred.
    pub fn is_complete(&self, tasks: &[TaskRegion], role: Role) -> bool {
        tasks
            .iter()
            .all(|t| self.points(&t.id, role).is_some() && !self.is_pending(&t.id))
    }

    pub fn log(&self, task_id: &str) -> Option<&AnnotationLog> {
        self.annotations.get(task_id)
    }

    pub fn log_mut(&mut self, task_id: &str) -> &mut AnnotationLog {
        self.annotations.entry(task_id.to_owned()).or_default()
    }

    /// True when `role` has annotations or a grade entry for the task.
    pub fn has_content(&self, task_id: &str, role: Role) -> bool {
        self.points(task_id, role).is_some()
            || self.log(task_id).is_some_and(|log| log.has_role(role))
    }

    /// Copy handed to a second grader: second points always dropped, first-grader data only
    /// when `include_first`.
    pub fn second_opinion_view(&self, include_first: bool) -> StudentRecord {
        let mut out = self.clone();
        for entry in out.grades.values_mut() {
            entry.second_points = None;
            if !include_first {
                entry.points = None;
            }
        }
        out.grades.retain(|_, g| !g.is_empty());
        if !include_first {
            for log in out.annotations.values_mut() {
                log.clear_role(Role::First);
            }
        }
        out.annotations.retain(|_, log| !log.is_empty());
        out
    }

    pub fn second_layer(&self) -> SecondLayer {
        let grades = self
            .grades
            .iter()
            .filter_map(|(k, g)| g.second_points.map(|p| (k.clone(), p)))
            .collect();
        let annotations = self
            .annotations
            .iter()
            .filter_map(|(k, log)| {
                let v: Vec<Annotation> = log
                    .filter_by_role(&[Role::Second])
                    .map(|(_, a)| a.clone())
                    .collect();
                (!v.is_empty()).then(|| (k.clone(), v))
            })
            .collect();
        SecondLayer {
            grades,
            annotations,
        }
    }

    /// Replace the second layer with imported results. Imported annotations are forced to the
    /// second role; invalid ones are dropped.
    pub fn merge_second_layer(&mut self, layer: SecondLayer) {
        for log in self.annotations.values_mut() {
            log.clear_role(Role::Second);
        }
        for entry in self.grades.values_mut() {
            entry.second_points = None;
        }
        for (task_id, annotations) in layer.annotations {
            let log = self.log_mut(&task_id);
            for a in annotations {
                log.append(a.with_role(Role::Second));
            }
        }
        for (task_id, pts) in layer.grades {
            if pts.is_finite() {
                self.grades.entry(task_id).or_default().second_points = Some(pts);
            }
        }
        self.grades.retain(|_, g| !g.is_empty());
        self.annotations.retain(|_, log| !log.is_empty());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/student.rs"]
mod tests;
