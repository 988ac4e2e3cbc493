//! Append-only annotation collection with stable handles.

use crate::model::annotation::{Annotation, Role};

/// Stable handle to one annotation inside an [`AnnotationLog`].
///
/// Handles are never reused within a log, so two strokes with identical values stay
/// distinguishable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationId(u64);

#[derive(Clone, Debug)]
struct Entry {
    id: AnnotationId,
    annotation: Annotation,
}

/// Ordered annotations of one student and task (or one model solution).
///
/// Insertion order is paint order. Entries are never edited in place; they are appended,
/// removed by handle, or undone.
#[derive(Clone, Debug, Default)]
pub struct AnnotationLog {
    entries: Vec<Entry>,
    next_id: u64,
}

impl AnnotationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load already-committed records without re-validating them.
    pub fn from_annotations(annotations: impl IntoIterator<Item = Annotation>) -> Self {
        let mut log = Self::new();
        for annotation in annotations {
            log.push_unchecked(annotation);
        }
        log
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate and append. Rejected annotations are dropped and `None` is returned.
    pub fn append(&mut self, annotation: Annotation) -> Option<AnnotationId> {
        match annotation.validate() {
            Ok(()) => Some(self.push_unchecked(annotation)),
            Err(err) => {
                tracing::debug!(kind = annotation.kind(), %err, "annotation discarded");
                None
            }
        }
    }

    fn push_unchecked(&mut self, annotation: Annotation) -> AnnotationId {
        let id = AnnotationId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, annotation });
        id
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| &e.annotation)
    }

    /// Remove by identity. Other entries keep their order.
    pub fn remove(&mut self, id: AnnotationId) -> Option<Annotation> {
        let idx = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(idx).annotation)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (AnnotationId, &Annotation)> + '_ {
        self.entries.iter().map(|e| (e.id, &e.annotation))
    }

    /// Entries whose role is in `roles`, in stored order.
    pub fn filter_by_role<'a>(
        &'a self,
        roles: &'a [Role],
    ) -> impl Iterator<Item = (AnnotationId, &'a Annotation)> + 'a {
        self.iter().filter(move |(_, a)| roles.contains(&a.role()))
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.entries.iter().any(|e| e.annotation.role() == role)
    }

    pub fn last_of_role(&self, role: Role) -> Option<AnnotationId> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.annotation.role() == role)
            .map(|e| e.id)
    }

    pub fn undo_last_of_role(&mut self, role: Role) -> Option<Annotation> {
        let id = self.last_of_role(role)?;
        self.remove(id)
    }

    /// Remove the most recent entry regardless of role.
    pub fn pop(&mut self) -> Option<Annotation> {
        self.entries.pop().map(|e| e.annotation)
    }

    /// Drop every entry of `role`; returns how many were removed.
    pub fn clear_role(&mut self, role: Role) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.annotation.role() != role);
        before - self.entries.len()
    }

    pub fn annotations(&self) -> impl DoubleEndedIterator<Item = &Annotation> + '_ {
        self.entries.iter().map(|e| &e.annotation)
    }

    pub fn to_vec(&self) -> Vec<Annotation> {
        self.annotations().cloned().collect()
    }
}

impl PartialEq for AnnotationLog {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .annotations()
                .zip(other.annotations())
                .all(|(a, b)| a == b)
    }
}

impl serde::Serialize for AnnotationLog {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.annotations())
    }
}

impl<'de> serde::Deserialize<'de> for AnnotationLog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let v = <Vec<Annotation> as serde::Deserialize>::deserialize(deserializer)?;
        Ok(Self::from_annotations(v))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/log.rs"]
mod tests;
