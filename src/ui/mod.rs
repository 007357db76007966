pub mod catalog;
pub mod components;
pub mod users;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{ActiveScreen, ActiveTab, AppState, InputMode, ModalState};

pub fn render(f: &mut Frame, app: &mut AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)].as_ref())
        .split(f.area());
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
        .split(root[1]);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(4)].as_ref())
        .split(body[1]);

    render_header(f, root[0], app);

    match app.active_tab() {
        ActiveTab::Users => {
            users::render_users_table(f, body[0], app);
            users::render_user_form(f, right[0], app);
            users::render_user_details(f, right[1], app);
        }
        ActiveTab::Catalog => {
            catalog::render_books_table(f, body[0], app);
            catalog::render_book_form(f, right[0], app);
            catalog::render_book_details(f, right[1], app);
        }
    }

    components::render_status_bar(f, root[2], app);

    if let Some(state) = app.modal.clone() {
        render_modal(f, f.area(), app, &state);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &AppState) {
    let tabs = match app.active_tab() {
        ActiveTab::Users => "[Users]  Catalog",
        ActiveTab::Catalog => "Users  [Catalog]",
    };
    let (search, shown, total) = match &app.screen {
        ActiveScreen::Users(s) => (&s.core.search, s.core.visible().len(), s.core.store.len()),
        ActiveScreen::Catalog(s) => (&s.core.search, s.core.visible().len(), s.core.store.len()),
    };
    let prompt = match app.input_mode {
        InputMode::Search => format!("  Search: {search}▏"),
        _ if !search.is_empty() => format!("  Search: {search}"),
        _ => String::new(),
    };
    let p = Paragraph::new(format!(
        "{tabs}{prompt}  shown:{shown}/{total}  Tab: switch; /: search; n: add; e: edit; d: delete; r: refresh; ?: help; q: quit"
    ))
    .block(
        Block::default()
            .title(format!("bookhub ({})", app.source))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    )
    .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(p, area);
}

fn render_modal(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    match state {
        ModalState::DeleteConfirm { .. } => components::render_delete_modal(f, area, app, state),
        ModalState::Help { scroll } => components::render_help_modal(f, area, app, *scroll),
    }
}
