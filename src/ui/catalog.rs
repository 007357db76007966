use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{ActiveScreen, AppState};
use crate::form::BookField;
use crate::ui::components::{FormField, TableView, render_form, render_paged_table};

pub fn render_books_table(f: &mut Frame, area: Rect, app: &mut AppState) {
    let ActiveScreen::Catalog(screen) = &app.screen else {
        return;
    };
    let rows = screen
        .core
        .visible()
        .into_iter()
        .map(|b| {
            vec![
                b.id.to_string(),
                b.title.clone(),
                b.author.clone(),
                b.isbn.clone(),
                if b.available { "yes".into() } else { "no".into() },
            ]
        })
        .collect();
    let title = if screen.core.store.is_empty() && screen.core.in_flight() > 0 {
        "Catalog (loading…)".to_string()
    } else {
        "Catalog".to_string()
    };
    let widths = [
        Constraint::Length(6),
        Constraint::Percentage(35),
        Constraint::Percentage(25),
        Constraint::Length(14),
        Constraint::Length(9),
    ];
    render_paged_table(
        f,
        area,
        &app.theme,
        &mut app.rows_per_page,
        TableView {
            title,
            header: &["ID", "TITLE", "AUTHOR", "ISBN", "AVAILABLE"],
            widths: &widths,
            rows,
        },
        screen.core.selected,
    );
}

pub fn render_book_form(f: &mut Frame, area: Rect, app: &AppState) {
    let ActiveScreen::Catalog(screen) = &app.screen else {
        return;
    };
    let form = &screen.form;
    let fields = [
        FormField {
            label: "Title",
            value: &form.title,
            focused: form.focus == BookField::Title,
        },
        FormField {
            label: "Author",
            value: &form.author,
            focused: form.focus == BookField::Author,
        },
    ];
    render_form(f, area, app, "Add Book", &fields);
}

pub fn render_book_details(f: &mut Frame, area: Rect, app: &AppState) {
    let ActiveScreen::Catalog(screen) = &app.screen else {
        return;
    };
    let text = match screen.core.selected_record() {
        Some(b) => format!(
            "ID: {}\nTitle: {}\nAuthor: {}\nISBN: {}\nAvailable: {}",
            b.id,
            b.title,
            b.author,
            b.isbn,
            if b.available { "yes" } else { "no" }
        ),
        None => "No book selected".to_string(),
    };
    let p = Paragraph::new(text).style(Style::default().fg(app.theme.text)).block(
        Block::default()
            .title("Details")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(p, area);
}
