use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{ActiveScreen, AppState};
use crate::form::UserField;
use crate::ui::components::{FormField, TableView, render_form, render_paged_table};

pub fn render_users_table(f: &mut Frame, area: Rect, app: &mut AppState) {
    let ActiveScreen::Users(screen) = &app.screen else {
        return;
    };
    let editing = screen.form.editing_id();
    let rows = screen
        .core
        .visible()
        .into_iter()
        .map(|u| {
            let marker = if Some(&u.id) == editing { "✎" } else { "" };
            vec![
                format!("{marker}{}", u.id),
                u.name.clone(),
                u.email.clone(),
                if u.is_librarian { "yes".into() } else { String::new() },
            ]
        })
        .collect();
    let title = if screen.core.store.is_empty() && screen.core.in_flight() > 0 {
        "Users (loading…)".to_string()
    } else {
        "Users".to_string()
    };
    let widths = [
        Constraint::Length(8),
        Constraint::Percentage(35),
        Constraint::Percentage(45),
        Constraint::Length(10),
    ];
    render_paged_table(
        f,
        area,
        &app.theme,
        &mut app.rows_per_page,
        TableView {
            title,
            header: &["ID", "NAME", "EMAIL", "LIBRARIAN"],
            widths: &widths,
            rows,
        },
        screen.core.selected,
    );
}

pub fn render_user_form(f: &mut Frame, area: Rect, app: &AppState) {
    let ActiveScreen::Users(screen) = &app.screen else {
        return;
    };
    let form = &screen.form;
    let title = if form.is_editing() { "Update User" } else { "Add User" };
    let fields = [
        FormField {
            label: "Name",
            value: &form.name,
            focused: form.focus == UserField::Name,
        },
        FormField {
            label: "Email",
            value: &form.email,
            focused: form.focus == UserField::Email,
        },
    ];
    render_form(f, area, app, title, &fields);
}

pub fn render_user_details(f: &mut Frame, area: Rect, app: &AppState) {
    let ActiveScreen::Users(screen) = &app.screen else {
        return;
    };
    let text = match screen.core.selected_record() {
        Some(u) => format!(
            "ID: {}\nName: {}\nEmail: {}\nLibrarian: {}",
            u.id,
            u.name,
            u.email,
            if u.is_librarian { "yes" } else { "no" }
        ),
        None => "No user selected".to_string(),
    };
    let p = Paragraph::new(text).style(Style::default().fg(app.theme.text)).block(
        Block::default()
            .title("Details")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(p, area);
}
