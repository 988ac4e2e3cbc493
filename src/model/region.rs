use std::collections::BTreeMap;

use crate::foundation::core::{PageRect, Point};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// A gradable rectangle on one page of every student's document.
pub struct TaskRegion {
    /// Stable id used as key for grades and annotations.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Page within a student's document, starting at 1.
    pub page: u32,
    /// Bounds in page percent. Not clamped; renderers clip.
    pub region: PageRect,
    /// Maximum achievable points.
    #[serde(default)]
    pub max_points: f64,
}

impl TaskRegion {
    pub fn new(id: impl Into<String>, page: u32, region: PageRect, max_points: f64) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            page,
            region,
            max_points,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// True when the region lies within the page; edited regions may not.
    pub fn is_within_page(&self) -> bool {
        let r = self.region;
        r.x >= 0.0 && r.y >= 0.0 && r.right() <= 100.0 && r.bottom() <= 100.0
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Optional placement of the total and grade on each student's first page.
pub struct ScoreFields {
    /// Box for the "points / max" label.
    #[serde(default)]
    pub total_field: Option<PageRect>,
    /// Box for the grade.
    #[serde(default)]
    pub grade_field: Option<PageRect>,
}

impl ScoreFields {
    pub fn is_empty(&self) -> bool {
        self.total_field.is_none() && self.grade_field.is_none()
    }
}

/// Stored page-percent anchors for the per-task points badge.
pub type TaskPointPositions = BTreeMap<String, Point>;
