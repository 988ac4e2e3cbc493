use std::collections::BTreeMap;

use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::model::annotation::{Annotation, Role};
use crate::model::log::{AnnotationId, AnnotationLog};

/// Project-wide model solution, one log per task. Entries always carry [`Role::Solution`].
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct ModelSolutionSet {
    by_task: BTreeMap<String, AnnotationLog>,
}

impl ModelSolutionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self, task_id: &str) -> Option<&AnnotationLog> {
        self.by_task.get(task_id)
    }

    pub fn has_content(&self, task_id: &str) -> bool {
        self.log(task_id).is_some_and(|l| !l.is_empty())
    }

    pub fn task_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.by_task.keys().map(String::as_str)
    }

    /// Append on behalf of `editor`. Only the primary grader edits the model solution.
    pub fn append(
        &mut self,
        task_id: &str,
        annotation: Annotation,
        editor: Role,
    ) -> OvermarkResult<Option<AnnotationId>> {
        ensure_editor(editor)?;
        let log = self.by_task.entry(task_id.to_owned()).or_default();
        Ok(log.append(annotation.with_role(Role::Solution)))
    }

    pub fn remove(
        &mut self,
        task_id: &str,
        id: AnnotationId,
        editor: Role,
    ) -> OvermarkResult<Option<Annotation>> {
        ensure_editor(editor)?;
        Ok(self.by_task.get_mut(task_id).and_then(|l| l.remove(id)))
    }

    pub fn undo(&mut self, task_id: &str, editor: Role) -> OvermarkResult<Option<Annotation>> {
        ensure_editor(editor)?;
        Ok(self.by_task.get_mut(task_id).and_then(AnnotationLog::pop))
    }
}

impl<'de> serde::Deserialize<'de> for ModelSolutionSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw: BTreeMap<String, Vec<Annotation>> =
            serde::Deserialize::deserialize(deserializer)?;
        let by_task = raw
            .into_iter()
            .map(|(task, entries)| {
                let log = AnnotationLog::from_annotations(
                    entries.into_iter().map(|a| a.with_role(Role::Solution)),
                );
                (task, log)
            })
            .collect();
        Ok(Self { by_task })
    }
}

fn ensure_editor(editor: Role) -> OvermarkResult<()> {
    if editor != Role::First {
        return Err(OvermarkError::validation(format!(
            "model solution can only be edited by the first grader, not {}",
            editor.as_str()
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/model/solution.rs"]
mod tests;
