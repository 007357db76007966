//! Shared UI components (status bar, form panel, modal helpers).
//!
//! Small building blocks reused by the users and catalog screens.
//!
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};

use crate::app::keymap::{KeyAction, format_action};
use crate::app::{AppState, InputMode, ModalState, NoticeLevel, Theme};

/// Render the bottom status bar with mode, pending requests and the last notice.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = match app.input_mode {
        InputMode::Normal => "NORMAL",
        InputMode::Search => "SEARCH",
        InputMode::Form => "FORM",
        InputMode::Modal => "MODAL",
    };
    let pending = match app.in_flight() {
        0 => String::new(),
        n => format!("  syncing({n})"),
    };
    let mut spans = vec![Span::raw(format!(
        "mode: {mode}  rows/page:{}{pending}  ",
        app.rows_per_page
    ))];
    if let Some(notice) = &app.notice {
        let color = match notice.level {
            NoticeLevel::Success => app.theme.ok,
            NoticeLevel::Info => app.theme.status_fg,
            NoticeLevel::Error => app.theme.err,
        };
        spans.push(Span::styled(
            notice.message.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }
    let p = Paragraph::new(Line::from(spans)).style(
        Style::default()
            .fg(app.theme.status_fg)
            .bg(app.theme.status_bg),
    );
    f.render_widget(p, area);
}

/// One labelled input of a form panel.
pub struct FormField<'a> {
    pub label: &'a str,
    pub value: &'a str,
    pub focused: bool,
}

/// Render a titled form; the focused field gets a cursor while the form has input focus.
pub fn render_form(f: &mut Frame, area: Rect, app: &AppState, title: &str, fields: &[FormField<'_>]) {
    let active = app.input_mode == InputMode::Form;
    let border = if active { app.theme.focus } else { app.theme.border };
    let lines: Vec<Line> = fields
        .iter()
        .map(|field| {
            let marker = if active && field.focused { "▶ " } else { "  " };
            let cursor = if active && field.focused { "▏" } else { "" };
            let label_style = if active && field.focused {
                Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(app.theme.muted)
            };
            Line::from(vec![
                Span::styled(format!("{marker}{:<8}", field.label), label_style),
                Span::styled(format!("{}{cursor}", field.value), Style::default().fg(app.theme.text)),
            ])
        })
        .collect();
    let hint = if active {
        "Enter: save  Tab: next field  Esc: leave"
    } else {
        "n: fill in"
    };
    let p = Paragraph::new(lines).block(
        Block::default()
            .title(title.to_string())
            .title_bottom(hint)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(p, area);
}

/// Contents of one list table.
pub struct TableView<'a> {
    pub title: String,
    pub header: &'a [&'static str],
    pub widths: &'a [Constraint],
    pub rows: Vec<Vec<String>>,
}

/// Render a paginated table with the selected row highlighted.
///
/// Updates `rows_per_page` from the available height, like the list screens expect.
pub fn render_paged_table(
    f: &mut Frame,
    area: Rect,
    theme: &Theme,
    rows_per_page: &mut usize,
    view: TableView<'_>,
    selected: usize,
) {
    let TableView {
        title,
        header,
        widths,
        rows,
    } = view;
    let body_height = area.height.saturating_sub(3) as usize;
    if body_height > 0 {
        *rows_per_page = body_height;
    }
    let rpp = (*rows_per_page).max(1);

    let start = (selected / rpp) * rpp;
    let end = (start + rpp).min(rows.len());
    let slice = rows.get(start..end).unwrap_or(&[]);

    let body = slice.iter().enumerate().map(|(i, cells)| {
        let style = if start + i == selected {
            Style::default()
                .fg(theme.highlight_fg)
                .bg(theme.highlight_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text)
        };
        Row::new(cells.iter().cloned().map(Cell::from).collect::<Vec<_>>()).style(style)
    });

    let header = Row::new(header.to_vec()).style(
        Style::default()
            .fg(theme.title)
            .add_modifier(Modifier::BOLD),
    );

    let table = Table::new(body, widths.to_vec())
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border)),
        )
        .column_spacing(1);

    f.render_widget(table, area);
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render the delete confirmation dialog.
pub fn render_delete_modal(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    if let ModalState::DeleteConfirm { label, selected, .. } = state {
        let rect = centered_rect(46, 7, area);
        let option = |idx: usize, text: &'static str| {
            if *selected == idx {
                Span::styled(
                    format!("[{text}]"),
                    Style::default()
                        .fg(app.theme.highlight_fg)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED),
                )
            } else {
                Span::raw(format!(" {text} "))
            }
        };
        let lines = vec![
            Line::from(format!("Delete '{label}'?")),
            Line::from(""),
            Line::from(vec![option(0, "Yes"), Span::raw("   "), option(1, "No")]),
        ];
        let p = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
            Block::default()
                .title("Confirm delete")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.err)),
        );
        f.render_widget(Clear, rect);
        f.render_widget(p, rect);
    }
}

/// Render the keybindings reference.
pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState, scroll: u16) {
    let rect = centered_rect(60, 22, area);
    let heading = Style::default()
        .fg(app.theme.title)
        .add_modifier(Modifier::BOLD);
    let mut lines = vec![Line::from(Span::styled("Normal mode", heading))];
    let actions = [
        (KeyAction::SwitchTab, "switch Users/Catalog"),
        (KeyAction::StartSearch, "search"),
        (KeyAction::NewRecord, "add (focus form)"),
        (KeyAction::EditSelection, "edit selected user"),
        (KeyAction::DeleteSelection, "delete selected"),
        (KeyAction::Refresh, "reload list"),
        (KeyAction::MoveUp, "up"),
        (KeyAction::MoveDown, "down"),
        (KeyAction::PageUp, "page up"),
        (KeyAction::PageDown, "page down"),
        (KeyAction::OpenHelp, "this help"),
        (KeyAction::Quit, "quit"),
    ];
    for (action, what) in actions {
        let keys = app.keymap.keys_for(action).join(", ");
        lines.push(Line::from(format!(
            "  {:<18} {:<16} {what}",
            keys,
            format_action(action)
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Search / form", heading)));
    lines.push(Line::from("  type to edit, Backspace deletes"));
    lines.push(Line::from("  Enter  keep search / save form"));
    lines.push(Line::from("  Esc    clear search / leave form (cancels an edit)"));
    lines.push(Line::from("  Tab    next form field"));

    let p = Paragraph::new(lines).scroll((scroll, 0)).block(
        Block::default()
            .title("Help (Esc to close)")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn paged_table_tracks_height_and_shows_selected_page() {
        let mut terminal = Terminal::new(TestBackend::new(40, 6)).expect("terminal");
        let mut rows_per_page = 10;
        let rows = (1..=7).map(|n| vec![n.to_string(), format!("Book {n}")]).collect();
        terminal
            .draw(|f| {
                let area = f.area();
                render_paged_table(
                    f,
                    area,
                    &Theme::mocha(),
                    &mut rows_per_page,
                    TableView {
                        title: "Catalog".into(),
                        header: &["ID", "TITLE"],
                        widths: &[Constraint::Length(4), Constraint::Min(10)],
                        rows,
                    },
                    4,
                );
            })
            .expect("draw");

        assert_eq!(rows_per_page, 3);
        let text = screen_text(&terminal);
        assert!(text.contains("Catalog"));
        assert!(text.contains("TITLE"));
        assert!(text.contains("Book 4") && text.contains("Book 6"));
        assert!(!text.contains("Book 3") && !text.contains("Book 7"));
    }

    #[test]
    fn centered_rect_fits_inside_small_areas() {
        let area = Rect::new(0, 0, 20, 5);
        assert_eq!(centered_rect(60, 22, area), Rect::new(0, 0, 20, 5));
        assert_eq!(centered_rect(10, 3, area), Rect::new(5, 1, 10, 3));
    }
}
