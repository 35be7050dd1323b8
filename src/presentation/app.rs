use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{layout::Rect, widgets::ListState};

use crate::application::{
    focus::{EditFocus, FieldTarget},
    gesture::{GestureConfig, SwipeTracker},
    ListSession,
};
use crate::domain::{
    error::{TodoError, TodoResult},
    repository::{ListStore, PreferenceStore},
    settings::DrawerPosition,
    speech::{RecognitionEvent, SpeechRecognizer},
    todo_list::{ListId, TodoList},
};

const NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Pane { Drawer, Tasks }

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Mode {
    Browse,
    /// Typing the title of a list that does not exist yet.
    NewList(String),
    /// Waiting for the user to confirm deleting a list.
    ConfirmDelete(ListId),
}

#[derive(Clone, Debug)]
pub struct Notice {
    pub message: String,
    pub is_error: bool,
    expires: Instant,
}

pub struct App<S: ListStore, P: PreferenceStore, R: SpeechRecognizer> {
    pub session: ListSession<S, P, R>,
    pub lists: Vec<TodoList>,
    pub pane: Pane,
    pub mode: Mode,
    pub drawer_selected: usize,
    pub task_selected: usize,
    /// Selection and scroll position of the task rows, kept across frames.
    pub task_state: ListState,
    pub notice: Option<Notice>,
    pub swipe: SwipeTracker,
    /// Where the task rows were last drawn, for mapping mouse positions to rows.
    pub task_area: Rect,
    pub quit: bool,
}

impl<S: ListStore, P: PreferenceStore, R: SpeechRecognizer> App<S, P, R> {
    pub fn new(session: ListSession<S, P, R>, gesture: GestureConfig) -> Self {
        Self {
            session,
            lists: Vec::new(),
            pane: Pane::Drawer,
            mode: Mode::Browse,
            drawer_selected: 0,
            task_selected: 0,
            task_state: ListState::default(),
            notice: None,
            swipe: SwipeTracker::new(gesture),
            task_area: Rect::default(),
            quit: false,
        }
    }

    /// Loads the list overview and reopens the list from the previous run.
    pub async fn start(&mut self) {
        if !self.session.dictation_supported() {
            self.error("Voice dictation is not available on this system");
        }
        let restored = self.session.restore_active_list().await;
        match restored {
            Ok(Some(_)) => self.pane = Pane::Tasks,
            Ok(None) => {}
            Err(e) => self.report(e),
        }
        self.refresh_lists().await;
    }

    pub async fn refresh_lists(&mut self) {
        match self.session.lists().await {
            Ok(lists) => self.lists = lists,
            Err(e) => {
                tracing::error!(error = %e, "could not load lists");
                self.error("Could not load lists");
            }
        }
        if let Some(active) = self.session.active_list_id() {
            if let Some(pos) = self.lists.iter().position(|l| l.id == Some(active)) {
                self.drawer_selected = pos;
            }
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        self.drawer_selected = self.drawer_selected.min(self.lists.len().saturating_sub(1));
        let tasks = self.session.current_list().map_or(0, |l| l.tasks.len());
        self.task_selected = self.task_selected.min(tasks.saturating_sub(1));
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice { message: message.into(), is_error: false, expires: Instant::now() + NOTICE_TTL });
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice { message: message.into(), is_error: true, expires: Instant::now() + NOTICE_TTL });
    }

    fn report(&mut self, e: TodoError) {
        tracing::debug!(error = %e, "operation failed");
        let message = match &e {
            TodoError::NotFound(_) => format!("{}. Refreshing lists.", capitalized(&e.to_string())),
            _ => capitalized(&e.to_string()),
        };
        self.error(message);
    }

    /// Runs an operation and turns its failure into a notice.
    async fn settle<T>(&mut self, result: TodoResult<T>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                let stale = e.is_not_found();
                self.report(e);
                if stale { self.refresh_lists().await; }
                None
            }
        }
    }

    /// Periodic work: expire notices and fire long presses.
    pub async fn tick(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|n| n.expires <= now) {
            self.notice = None;
        }
        if let Some((index, action)) = self.swipe.poll(now) {
            let result = self.session.apply_gesture(index, action).await;
            if self.settle(result).await.is_some() { self.task_selected = index; }
        }
    }

    pub async fn on_dictation_event(&mut self, event: RecognitionEvent) {
        let result = self.session.handle_dictation_event(event).await;
        self.settle(result).await;
    }

    pub async fn on_key(&mut self, key: KeyEvent) {
        // Ignore repeats and releases to prevent duplicate input.
        if key.kind != KeyEventKind::Press { return; }
        self.swipe.cancel();

        if let Mode::ConfirmDelete(id) = self.mode {
            match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.mode = Mode::Browse;
                    let leaving = self.session.active_list_id() == Some(id);
                    let result = self.session.delete_list(id).await;
                    if self.settle(result).await.is_some() {
                        self.success("List deleted");
                        if leaving { self.pane = Pane::Drawer; }
                    }
                    self.refresh_lists().await;
                }
                KeyCode::Esc | KeyCode::Char('n') => self.mode = Mode::Browse,
                _ => {}
            }
            return;
        }

        if let Mode::NewList(draft) = &mut self.mode {
            match key.code {
                KeyCode::Esc => self.mode = Mode::Browse,
                KeyCode::Enter => {
                    let title = draft.clone();
                    let result = self.session.create_list(&title).await;
                    if self.settle(result).await.is_some() {
                        self.mode = Mode::Browse;
                        self.pane = Pane::Tasks;
                        self.task_selected = 0;
                        self.success("List created");
                        self.refresh_lists().await;
                    }
                }
                KeyCode::Backspace => { draft.pop(); }
                KeyCode::Char(c) => draft.push(c),
                _ => {}
            }
            return;
        }

        if let EditFocus::Editing(target) = self.session.focus() {
            self.on_edit_key(target, key.code).await;
            return;
        }

        match (self.pane, key.code) {
            (_, KeyCode::Char('q')) => self.quit = true,
            (_, KeyCode::Tab) => self.pane = match self.pane { Pane::Drawer => Pane::Tasks, Pane::Tasks => Pane::Drawer },
            (_, KeyCode::Char('p')) => {
                let side = match self.session.toggle_drawer_position() { DrawerPosition::Left => "left", DrawerPosition::Right => "right" };
                self.success(format!("Drawer moved to the {side}"));
            }
            (_, KeyCode::Char('n')) => self.mode = Mode::NewList(String::new()),
            (Pane::Drawer, code) => self.on_drawer_key(code).await,
            (Pane::Tasks, code) => self.on_tasks_key(code).await,
        }
    }

    async fn on_drawer_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => self.drawer_selected = self.drawer_selected.saturating_sub(1),
            KeyCode::Down => { if self.drawer_selected + 1 < self.lists.len() { self.drawer_selected += 1; } }
            KeyCode::Enter => {
                if let Some(id) = self.selected_list_id() {
                    let result = self.session.open_list(id).await;
                    if self.settle(result).await.is_some() {
                        self.pane = Pane::Tasks;
                        self.task_selected = 0;
                    }
                }
            }
            KeyCode::Char('D') | KeyCode::Delete => {
                if let Some(id) = self.selected_list_id() { self.mode = Mode::ConfirmDelete(id); }
            }
            _ => {}
        }
    }

    async fn on_tasks_key(&mut self, code: KeyCode) {
        if self.session.current_list().is_none() { return; }
        let index = self.task_selected;
        match code {
            KeyCode::Up => self.task_selected = self.task_selected.saturating_sub(1),
            KeyCode::Down => { if index + 1 < self.task_count() { self.task_selected += 1; } }
            KeyCode::Char(' ') | KeyCode::Enter => {
                let result = self.session.toggle_task_complete(index).await;
                self.settle(result).await;
            }
            KeyCode::Char('a') => {
                let result = self.session.add_task(None).await;
                if let Some(new_index) = self.settle(result).await {
                    self.task_selected = new_index;
                    // Start from an empty field; committing it blank keeps the placeholder.
                    let result = self.session.edit_task_text(new_index, "").await;
                    self.settle(result).await;
                }
            }
            KeyCode::Char('e') => {
                let result = self.session.start_task_edit(index).await;
                self.settle(result).await;
            }
            KeyCode::Char('t') => {
                let result = self.session.start_title_edit().await;
                self.settle(result).await;
            }
            KeyCode::Char('v') if self.session.dictation_supported() => {
                let result = self.session.start_dictation(FieldTarget::Task(index)).await;
                self.settle(result).await;
            }
            KeyCode::Char('V') if self.session.dictation_supported() => {
                let result = self.session.start_dictation(FieldTarget::Title).await;
                self.settle(result).await;
            }
            KeyCode::Char('x') | KeyCode::Delete => {
                let result = self.session.delete_task(index).await;
                self.settle(result).await;
            }
            KeyCode::Char('D') => {
                if let Some(id) = self.session.active_list_id() { self.mode = Mode::ConfirmDelete(id); }
            }
            _ => {}
        }
        self.clamp_selection();
    }

    async fn on_edit_key(&mut self, target: FieldTarget, code: KeyCode) {
        let mut field = self.session.active_edit().map(|e| e.field.clone()).unwrap_or_default();
        let result = match code {
            KeyCode::Enter => self.session.finish_edit().await,
            KeyCode::Esc => match target {
                FieldTarget::Title => self.session.cancel_title_edit().await,
                FieldTarget::Task(i) => self.session.cancel_task_edit(i).await,
            },
            KeyCode::Backspace => {
                field.pop();
                self.type_text(target, &field).await
            }
            KeyCode::Char(c) => {
                field.push(c);
                self.type_text(target, &field).await
            }
            _ => Ok(()),
        };
        self.settle(result).await;
        if matches!(code, KeyCode::Enter | KeyCode::Esc) {
            self.refresh_lists().await;
        }
    }

    async fn type_text(&mut self, target: FieldTarget, text: &str) -> TodoResult<()> {
        match target {
            FieldTarget::Title => self.session.edit_title_text(text).await.map(|_| ()),
            FieldTarget::Task(i) => self.session.edit_task_text(i, text).await.map(|_| ()),
        }
    }

    pub async fn on_mouse(&mut self, mouse: MouseEvent) {
        if self.session.focus() != EditFocus::None || self.mode != Mode::Browse { return; }
        let x = f32::from(mouse.column);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(index) = self.row_at(mouse.column, mouse.row) {
                    self.pane = Pane::Tasks;
                    self.task_selected = index;
                    self.swipe.press(index, x, Instant::now());
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => self.swipe.drag(x),
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some((index, action)) = self.swipe.release(x) {
                    let result = self.session.apply_gesture(index, action).await;
                    self.settle(result).await;
                    self.clamp_selection();
                }
            }
            _ => {}
        }
    }

    fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.task_area;
        let inside = column >= area.x && column < area.x + area.width && row >= area.y && row < area.y + area.height;
        if !inside { return None; }
        let index = self.task_state.offset() + usize::from(row - area.y);
        (index < self.task_count()).then_some(index)
    }

    fn task_count(&self) -> usize { self.session.current_list().map_or(0, |l| l.tasks.len()) }

    fn selected_list_id(&self) -> Option<ListId> { self.lists.get(self.drawer_selected).and_then(|l| l.id) }
}

fn capitalized(s: &str) -> String { crate::domain::todo_list::capitalize(s) }
