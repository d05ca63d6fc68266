//! Ordered membership of task ids inside a column.
//!
//! The sequence is the single source of truth for display order. Read access
//! is public; splicing is crate-private so that every mutation goes through
//! the transactional store primitives.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskSequence(Vec<String>);

impl TaskSequence {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub(crate) fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub(crate) fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Removes every occurrence of `task_id`. Returns whether anything was removed.
    pub(crate) fn remove(&mut self, task_id: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|id| id != task_id);
        self.0.len() != before
    }

    /// Places `task_id` at `index`, clamped to `[0, len]`, after dropping any
    /// existing occurrence. Returns the final position.
    pub(crate) fn insert(&mut self, task_id: &str, index: usize) -> usize {
        self.remove(task_id);
        let at = index.min(self.0.len());
        self.0.insert(at, task_id.to_string());
        at
    }
}

impl<S: Into<String>> FromIterator<S> for TaskSequence {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
