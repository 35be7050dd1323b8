//! The working copy of the open list and the edit/dictation state machine around it.
//!
//! Every change to the working copy is written straight through to the
//! [`ListStore`]. At most one field is in edit focus and at most one field is bound
//! to dictation; both are plain values on the session, so callers (and tests) can
//! inspect them directly.

use crate::domain::{
    error::{TodoError, TodoResult},
    repository::{ListStore, PreferenceStore},
    settings::{DrawerPosition, Settings},
    speech::{RecognitionEvent, RecognizerConfig, SpeechRecognizer},
    todo_list::{is_blank, normalize_text, ListId, Task, TodoList, DEFAULT_TASK_TEXT},
};

use super::dictation::{DictationAdapter, DictationOutcome, DictationState};
use super::focus::{ActiveEdit, EditFocus, FieldTarget};
use super::gesture::GestureAction;

pub struct ListSession<S: ListStore, P: PreferenceStore, R: SpeechRecognizer> {
    store: S,
    prefs: P,
    dictation: DictationAdapter<R>,
    settings: Settings,
    current_list: Option<TodoList>,
    active_list_id: Option<ListId>,
    edit: Option<ActiveEdit>,
}

impl<S: ListStore, P: PreferenceStore, R: SpeechRecognizer> ListSession<S, P, R> {
    /// Settings are read here once and cached for the life of the session.
    pub fn new(store: S, prefs: P, recognizer: R, speech: RecognizerConfig) -> Self {
        let settings = prefs.settings();
        Self {
            store,
            prefs,
            dictation: DictationAdapter::new(recognizer, speech),
            settings,
            current_list: None,
            active_list_id: None,
            edit: None,
        }
    }

    pub fn current_list(&self) -> Option<&TodoList> { self.current_list.as_ref() }

    pub fn active_list_id(&self) -> Option<ListId> { self.active_list_id }

    pub fn focus(&self) -> EditFocus {
        match &self.edit {
            Some(edit) => EditFocus::Editing(edit.target),
            None => EditFocus::None,
        }
    }

    pub fn active_edit(&self) -> Option<&ActiveEdit> { self.edit.as_ref() }

    pub fn settings(&self) -> &Settings { &self.settings }

    pub fn dictation_supported(&self) -> bool { self.dictation.is_supported() }

    pub fn dictation_state(&self) -> DictationState { self.dictation.state() }

    pub fn dictation_target(&self) -> Option<FieldTarget> { self.dictation.target() }

    pub fn dictation(&self) -> &DictationAdapter<R> { &self.dictation }

    /// All stored lists, most recently modified first.
    pub async fn lists(&self) -> TodoResult<Vec<TodoList>> {
        let mut lists = self.store.list_all().await?;
        lists.sort_by(|a, b| b.last_modified.cmp(&a.last_modified).then_with(|| b.id.cmp(&a.id)));
        Ok(lists)
    }

    /// Opens the list remembered from the previous run. A pointer to a list that
    /// no longer exists is cleared.
    pub async fn restore_active_list(&mut self) -> TodoResult<Option<ListId>> {
        let Some(id) = self.prefs.active_list_id() else { return Ok(None) };
        match self.open_list(id).await {
            Ok(()) => Ok(Some(id)),
            Err(e) if e.is_not_found() => {
                tracing::warn!(%id, "remembered list is gone, clearing pointer");
                self.prefs.set_active_list_id(None);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn open_list(&mut self, id: ListId) -> TodoResult<()> {
        let list = self.store.get(id).await?;
        self.leave_edit();
        tracing::info!(%id, title = %list.title, "list opened");
        self.current_list = Some(list);
        self.active_list_id = Some(id);
        self.prefs.set_active_list_id(Some(id));
        Ok(())
    }

    pub async fn create_list(&mut self, title: &str) -> TodoResult<ListId> {
        if is_blank(title) {
            return Err(TodoError::Validation("list title cannot be empty".into()));
        }
        let mut list = TodoList::new(normalize_text(title));
        let id = self.store.save(&mut list).await?;
        tracing::info!(%id, title = %list.title, "list created");
        self.active_list_id = Some(id);
        self.prefs.set_active_list_id(Some(id));
        self.open_list(id).await?;
        Ok(id)
    }

    pub async fn rename_list(&mut self, new_title: &str) -> TodoResult<()> {
        if is_blank(new_title) {
            return Err(TodoError::Validation("list title cannot be empty".into()));
        }
        self.list_mut()?.title = normalize_text(new_title);
        self.persist().await
    }

    pub async fn delete_list(&mut self, id: ListId) -> TodoResult<()> {
        self.store.delete(id).await?;
        tracing::info!(%id, "list deleted");
        if self.active_list_id == Some(id) {
            self.close_working_copy();
        } else if self.prefs.active_list_id() == Some(id) {
            self.prefs.set_active_list_id(None);
        }
        Ok(())
    }

    /// Appends a task (the placeholder text when `text` is `None`) and returns its index.
    pub async fn add_task(&mut self, text: Option<&str>) -> TodoResult<usize> {
        let text = text.unwrap_or(DEFAULT_TASK_TEXT);
        if is_blank(text) {
            return Err(TodoError::Validation("task text cannot be empty".into()));
        }
        let list = self.list_mut()?;
        list.tasks.push(Task::new(normalize_text(text)));
        let index = list.tasks.len() - 1;
        self.persist().await?;
        Ok(index)
    }

    /// Flips completion and returns the new state, or `None` for an index that
    /// does not exist.
    pub async fn toggle_task_complete(&mut self, index: usize) -> TodoResult<Option<bool>> {
        let Some(task) = self.list_mut()?.tasks.get_mut(index) else {
            tracing::warn!(index, "toggle ignored, no such task");
            return Ok(None);
        };
        task.completed = !task.completed;
        let completed = task.completed;
        self.persist().await?;
        Ok(Some(completed))
    }

    /// Removes a task. Returns `false` when the index does not exist.
    pub async fn delete_task(&mut self, index: usize) -> TodoResult<bool> {
        let list = self.list_mut()?;
        if index >= list.tasks.len() {
            return Ok(false);
        }
        list.tasks.remove(index);

        if let Some(edit) = self.edit.as_mut() {
            match edit.target.after_task_removed(index) {
                Some(target) => edit.target = target,
                None => self.edit = None,
            }
        }
        self.dictation.task_removed(index);

        self.persist().await?;
        Ok(true)
    }

    pub async fn apply_gesture(&mut self, index: usize, action: GestureAction) -> TodoResult<()> {
        match action {
            GestureAction::ToggleComplete => { self.toggle_task_complete(index).await?; }
            GestureAction::Delete => { self.delete_task(index).await?; }
            GestureAction::Edit => self.start_task_edit(index).await?,
            GestureAction::SnapBack => {}
        }
        Ok(())
    }

    pub async fn start_task_edit(&mut self, index: usize) -> TodoResult<()> { self.begin_edit(FieldTarget::Task(index)).await }

    /// Auto-save path for each keystroke on a task.
    pub async fn edit_task_text(&mut self, index: usize, text: &str) -> TodoResult<bool> {
        self.type_into(FieldTarget::Task(index), text).await
    }

    pub async fn commit_task_edit(&mut self, index: usize) -> TodoResult<()> { self.commit_edit(FieldTarget::Task(index)).await }

    pub async fn cancel_task_edit(&mut self, index: usize) -> TodoResult<()> { self.cancel_edit(FieldTarget::Task(index)).await }

    pub async fn start_title_edit(&mut self) -> TodoResult<()> { self.begin_edit(FieldTarget::Title).await }

    /// Auto-save path for each keystroke on the title.
    pub async fn edit_title_text(&mut self, text: &str) -> TodoResult<bool> { self.type_into(FieldTarget::Title, text).await }

    pub async fn commit_title_edit(&mut self) -> TodoResult<()> { self.commit_edit(FieldTarget::Title).await }

    pub async fn cancel_title_edit(&mut self) -> TodoResult<()> { self.cancel_edit(FieldTarget::Title).await }

    /// Commits whatever edit is in progress.
    pub async fn finish_edit(&mut self) -> TodoResult<()> {
        match self.edit.as_ref().map(|e| e.target) {
            Some(target) => self.commit_edit(target).await,
            None => Ok(()),
        }
    }

    /// Puts `target` in edit focus, committing any other field first.
    pub async fn begin_edit(&mut self, target: FieldTarget) -> TodoResult<()> {
        self.stored_text(target)?;
        if self.focus() == EditFocus::Editing(target) {
            return Ok(());
        }
        self.finish_edit().await?;
        let text = self.stored_text(target)?.to_string();
        tracing::debug!(?target, "edit started");
        self.edit = Some(ActiveEdit::new(target, &text));
        Ok(())
    }

    async fn type_into(&mut self, target: FieldTarget, text: &str) -> TodoResult<bool> {
        self.begin_edit(target).await?;
        if let Some(edit) = self.edit.as_mut() {
            edit.field = text.to_string();
        }
        self.autosave(target).await
    }

    /// Writes the live field into the working copy and the store when it holds
    /// something new. Blank input waits for commit or cancel.
    async fn autosave(&mut self, target: FieldTarget) -> TodoResult<bool> {
        let Some(edit) = self.edit.as_ref().filter(|e| e.target == target) else { return Ok(false) };
        if is_blank(&edit.field) {
            return Ok(false);
        }
        let text = normalize_text(&edit.field);
        if self.stored_text(target)? == text {
            return Ok(false);
        }
        self.set_stored_text(target, text)?;
        tracing::debug!(?target, "auto-saving edit");
        self.persist().await?;
        Ok(true)
    }

    async fn commit_edit(&mut self, target: FieldTarget) -> TodoResult<()> {
        let edit = self.take_edit(target);
        self.stop_dictation().await?;
        let Some(edit) = edit else { return Ok(()) };
        if is_blank(&edit.field) {
            tracing::debug!(?target, "blank commit, keeping last saved text");
            return Ok(());
        }
        let text = normalize_text(&edit.field);
        if self.stored_text(target)? != text {
            self.set_stored_text(target, text)?;
            self.persist().await?;
        }
        tracing::debug!(?target, "edit committed");
        Ok(())
    }

    /// Puts back the text the field had when editing started, in memory and in
    /// the store, undoing any auto-saves made during the edit.
    async fn cancel_edit(&mut self, target: FieldTarget) -> TodoResult<()> {
        let edit = self.take_edit(target);
        self.stop_dictation().await?;
        let Some(edit) = edit else { return Ok(()) };
        if self.stored_text(target)? != edit.snapshot {
            self.set_stored_text(target, edit.snapshot)?;
            self.persist().await?;
        }
        tracing::debug!(?target, "edit cancelled");
        Ok(())
    }

    fn take_edit(&mut self, target: FieldTarget) -> Option<ActiveEdit> {
        if self.edit.as_ref().is_some_and(|e| e.target == target) { self.edit.take() } else { None }
    }

    /// Drops focus and dictation without saving anything further.
    fn leave_edit(&mut self) {
        self.edit = None;
        self.dictation.abandon();
    }

    /// Puts `target` in edit focus and starts dictating into it.
    pub async fn start_dictation(&mut self, target: FieldTarget) -> TodoResult<()> {
        if !self.dictation.is_supported() {
            tracing::warn!("dictation requested but not supported");
            return Err(TodoError::DictationUnavailable);
        }
        self.begin_edit(target).await?;
        for outcome in self.dictation.start_listening(target) {
            self.apply_dictation(outcome).await?;
        }
        Ok(())
    }

    pub async fn stop_dictation(&mut self) -> TodoResult<()> {
        if let Some(outcome) = self.dictation.stop_listening() {
            self.apply_dictation(outcome).await?;
        }
        Ok(())
    }

    /// Feeds one platform event through the adapter and applies its outcome.
    pub async fn handle_dictation_event(&mut self, event: RecognitionEvent) -> TodoResult<Option<DictationOutcome>> {
        let Some(outcome) = self.dictation.handle_event(event) else { return Ok(None) };
        self.apply_dictation(outcome.clone()).await?;
        Ok(Some(outcome))
    }

    async fn apply_dictation(&mut self, outcome: DictationOutcome) -> TodoResult<()> {
        match outcome {
            DictationOutcome::Interim { target, text } => {
                if let Some(edit) = self.edit.as_mut().filter(|e| e.target == target) {
                    edit.field = text;
                }
                Ok(())
            }
            DictationOutcome::Final { target, text } => {
                match self.edit.as_mut().filter(|e| e.target == target) {
                    Some(edit) => edit.field = text,
                    None => {
                        tracing::debug!(?target, "final transcript for a field no longer in focus");
                        return Ok(());
                    }
                }
                self.autosave(target).await?;
                Ok(())
            }
            DictationOutcome::Failed { code, .. } => Err(TodoError::Dictation(code)),
            DictationOutcome::Ended { target } => {
                self.autosave(target).await?;
                Ok(())
            }
        }
    }

    pub fn set_drawer_position(&mut self, position: DrawerPosition) {
        self.settings.drawer_position = position;
        self.prefs.save_settings(&self.settings);
    }

    pub fn toggle_drawer_position(&mut self) -> DrawerPosition {
        let position = self.settings.drawer_position.flipped();
        self.set_drawer_position(position);
        position
    }

    fn list(&self) -> TodoResult<&TodoList> { self.current_list.as_ref().ok_or(TodoError::NoListOpen) }

    fn list_mut(&mut self) -> TodoResult<&mut TodoList> { self.current_list.as_mut().ok_or(TodoError::NoListOpen) }

    fn stored_text(&self, target: FieldTarget) -> TodoResult<&str> {
        let list = self.list()?;
        match target {
            FieldTarget::Title => Ok(&list.title),
            FieldTarget::Task(i) => list.task(i).map(|t| t.text.as_str()).ok_or_else(|| TodoError::task_not_found(i)),
        }
    }

    fn set_stored_text(&mut self, target: FieldTarget, text: String) -> TodoResult<()> {
        let list = self.list_mut()?;
        match target {
            FieldTarget::Title => list.title = text,
            FieldTarget::Task(i) => list.tasks.get_mut(i).ok_or_else(|| TodoError::task_not_found(i))?.text = text,
        }
        Ok(())
    }

    /// Saves the working copy. If the store no longer has the list, the working
    /// copy is dropped rather than written back.
    async fn persist(&mut self) -> TodoResult<()> {
        let Some(list) = self.current_list.as_mut() else { return Err(TodoError::NoListOpen) };
        match self.store.save(list).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => {
                tracing::warn!(error = %e, "open list was deleted elsewhere, closing it");
                self.close_working_copy();
                Err(e)
            }
            Err(e) => {
                tracing::error!(error = %e, "could not save list");
                Err(e)
            }
        }
    }

    fn close_working_copy(&mut self) {
        self.leave_edit();
        self.current_list = None;
        self.active_list_id = None;
        self.prefs.set_active_list_id(None);
    }
}
