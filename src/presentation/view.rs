use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::application::{
    dictation::DictationState,
    focus::{EditFocus, FieldTarget},
    gesture::{classify_swipe, GestureAction},
};
use crate::domain::{
    repository::{ListStore, PreferenceStore},
    settings::DrawerPosition,
    speech::SpeechRecognizer,
};

use super::app::{App, Mode, Pane};

pub fn draw<S: ListStore, P: PreferenceStore, R: SpeechRecognizer>(f: &mut Frame, app: &mut App<S, P, R>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(3)])
        .split(f.size());

    let help = if app.session.dictation_supported() {
        "n: new list, Enter: open/toggle, a: add, e: edit, t: title, v/V: dictate, x: delete task, D: delete list, p: drawer side, Tab: pane, q: quit"
    } else {
        "n: new list, Enter: open/toggle, a: add, e: edit, t: title, x: delete task, D: delete list, p: drawer side, Tab: pane, q: quit"
    };
    let header = Paragraph::new(help).block(Block::default().borders(Borders::ALL).title("solo-dilo"));
    f.render_widget(header, chunks[0]);

    let (drawer_width, tasks_width) = (Constraint::Percentage(30), Constraint::Percentage(70));
    let body = match app.session.settings().drawer_position {
        DrawerPosition::Left => Layout::default().direction(Direction::Horizontal).constraints([drawer_width, tasks_width]).split(chunks[1]),
        DrawerPosition::Right => Layout::default().direction(Direction::Horizontal).constraints([tasks_width, drawer_width]).split(chunks[1]),
    };
    let (drawer_area, tasks_area) = match app.session.settings().drawer_position {
        DrawerPosition::Left => (body[0], body[1]),
        DrawerPosition::Right => (body[1], body[0]),
    };

    draw_drawer(f, app, drawer_area);
    draw_tasks(f, app, tasks_area);
    draw_footer(f, app, chunks[2]);
}

fn highlight(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    }
}

fn draw_drawer<S: ListStore, P: PreferenceStore, R: SpeechRecognizer>(f: &mut Frame, app: &App<S, P, R>, area: Rect) {
    let active = app.session.active_list_id();
    let items: Vec<ListItem> = if app.lists.is_empty() {
        vec![ListItem::new("No lists yet (n to create one)")]
    } else {
        app.lists
            .iter()
            .map(|l| {
                let marker = if l.id.is_some() && l.id == active { "● " } else { "  " };
                ListItem::new(format!("{marker}{} ({}/{})", l.title, l.completed_count(), l.tasks.len()))
            })
            .collect()
    };
    let mut state = ListState::default();
    if !app.lists.is_empty() { state.select(Some(app.drawer_selected)); }
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("lists"))
        .highlight_style(highlight(app.pane == Pane::Drawer))
        .highlight_symbol(">> ");
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_tasks<S: ListStore, P: PreferenceStore, R: SpeechRecognizer>(f: &mut Frame, app: &mut App<S, P, R>, area: Rect) {
    let focus = app.session.focus();
    let listening = app.session.dictation_state() == DictationState::Listening;
    let field = app.session.active_edit().map(|e| e.field.clone()).unwrap_or_default();
    let mic = |target: FieldTarget| if listening && app.session.dictation_target() == Some(target) { " [listening]" } else { "" };

    let Some(list) = app.session.current_list() else {
        let empty = Paragraph::new("Select a list or create a new one to get started")
            .block(Block::default().borders(Borders::ALL).title("tasks"));
        f.render_widget(empty, area);
        app.task_area = Rect::default();
        app.task_state = ListState::default();
        return;
    };

    let title = match focus {
        EditFocus::Editing(FieldTarget::Title) => format!("{field}_{}", mic(FieldTarget::Title)),
        _ => list.title.clone(),
    };

    let swipe = app.swipe.offset();
    let threshold = app.swipe.config().swipe_threshold;
    let items: Vec<ListItem> = if list.tasks.is_empty() {
        vec![ListItem::new("No tasks in this list (a to add one)")]
    } else {
        list.tasks
            .iter()
            .enumerate()
            .map(|(i, task)| {
                let mark = if task.completed { "[x]" } else { "[ ]" };
                let text = match focus {
                    EditFocus::Editing(FieldTarget::Task(j)) if j == i => format!("{field}_{}", mic(FieldTarget::Task(i))),
                    _ => task.text.clone(),
                };
                let hint = match swipe {
                    Some((row, dx)) if row == i => match classify_swipe(dx, threshold) {
                        GestureAction::ToggleComplete => "  >> release to toggle",
                        GestureAction::Delete => "  << release to delete",
                        _ => "",
                    },
                    _ => "",
                };
                let style = if task.completed { Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT) } else { Style::default() };
                ListItem::new(format!("{mark} {text}{hint}")).style(style)
            })
            .collect()
    };

    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    app.task_state.select((!list.tasks.is_empty()).then_some(app.task_selected));
    let rendered = List::new(items)
        .block(block)
        .highlight_style(highlight(app.pane == Pane::Tasks))
        .highlight_symbol(">> ");
    // Rendering scrolls the state so the selection stays visible; mouse rows are
    // mapped through the same offset.
    f.render_stateful_widget(rendered, area, &mut app.task_state);
    app.task_area = inner;
}

fn draw_footer<S: ListStore, P: PreferenceStore, R: SpeechRecognizer>(f: &mut Frame, app: &App<S, P, R>, area: Rect) {
    let (text, style, title) = if let Some(notice) = &app.notice {
        let color = if notice.is_error { Color::Red } else { Color::Green };
        (notice.message.clone(), Style::default().fg(color), "notice")
    } else {
        match (&app.mode, app.session.focus()) {
            (Mode::ConfirmDelete(id), _) => {
                let title = app.lists.iter().find(|l| l.id == Some(*id)).map_or("this list", |l| l.title.as_str());
                (format!("Delete \"{title}\" and all its tasks?  |  y/Enter to delete, Esc to keep"), Style::default().fg(Color::Yellow), "confirm")
            }
            (Mode::NewList(draft), _) => (format!("New list: {draft}_  |  Enter to create, Esc to cancel"), Style::default(), "create"),
            (_, EditFocus::Editing(_)) => ("Typing saves as you go  |  Enter to finish, Esc to undo".to_string(), Style::default(), "edit"),
            _ => (String::new(), Style::default(), "info"),
        }
    };
    let footer = Paragraph::new(text).style(style).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(footer, area);
}
