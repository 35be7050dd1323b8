/// A field that accepts keystrokes or dictation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldTarget {
    Title,
    Task(usize),
}

impl FieldTarget {
    /// Where this target points after the task at `removed` is deleted, or `None`
    /// if it pointed at the removed task.
    pub fn after_task_removed(self, removed: usize) -> Option<FieldTarget> {
        match self {
            FieldTarget::Task(i) if i == removed => None,
            FieldTarget::Task(i) if i > removed => Some(FieldTarget::Task(i - 1)),
            other => Some(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditFocus {
    #[default]
    None,
    Editing(FieldTarget),
}

/// The field currently in edit focus: its live text and the value it had when
/// editing started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveEdit {
    pub target: FieldTarget,
    pub snapshot: String,
    pub field: String,
}

impl ActiveEdit {
    pub fn new(target: FieldTarget, text: &str) -> Self {
        Self { target, snapshot: text.to_string(), field: text.to_string() }
    }
}
