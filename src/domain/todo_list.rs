use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Text given to a task created without explicit text.
pub const DEFAULT_TASK_TEXT: &str = "New task";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ListId(pub i64);

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn new(text: impl Into<String>) -> Self { Self { text: text.into(), completed: false } }
}

/// A named, ordered list of tasks. `id` and `last_modified` belong to the store:
/// both are written by `ListStore::save` and never set by callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoList {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ListId>,
    pub title: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_modified: DateTime<Utc>,
}

impl TodoList {
    /// An unsaved list with no tasks.
    pub fn new(title: impl Into<String>) -> Self {
        Self { id: None, title: title.into(), tasks: Vec::new(), last_modified: DateTime::<Utc>::default() }
    }

    pub fn task(&self, index: usize) -> Option<&Task> { self.tasks.get(index) }

    pub fn completed_count(&self) -> usize { self.tasks.iter().filter(|t| t.completed).count() }
}

/// Uppercases the first character and leaves the rest untouched.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The form in which a title or task text is stored: trimmed, then capitalized.
pub fn normalize_text(s: &str) -> String { capitalize(s.trim()) }

pub fn is_blank(s: &str) -> bool { s.trim().is_empty() }
