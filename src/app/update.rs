use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::app::keymap::KeyAction;
use crate::app::{ActiveScreen, AppState, InputMode, ModalState, Notice};
use crate::ui;

const TICK: Duration = Duration::from_millis(100);

/// Draw, apply finished requests, and dispatch keys until the user quits.
///
/// Must run on a multi-threaded tokio runtime: terminal polling blocks the
/// current worker while requests progress on the others.
pub async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    mut app: AppState,
) -> Result<()> {
    loop {
        app.pump();
        terminal.draw(|f| {
            ui::render(f, &mut app);
        })?;

        let polled = tokio::task::block_in_place(|| -> std::io::Result<Option<Event>> {
            if event::poll(TICK)? {
                Ok(Some(event::read()?))
            } else {
                Ok(None)
            }
        })?;

        if let Some(Event::Key(key)) = polled {
            if key.kind == KeyEventKind::Press && !handle_key(&mut app, key) {
                break;
            }
        }
    }
    Ok(())
}

/// Dispatch one key press. Returns `false` when the app should exit.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return false;
    }
    match app.input_mode {
        InputMode::Normal => return handle_normal(app, key),
        InputMode::Search => handle_search(app, key),
        InputMode::Form => handle_form(app, key),
        InputMode::Modal => handle_modal(app, key),
    }
    true
}

fn handle_normal(app: &mut AppState, key: KeyEvent) -> bool {
    let Some(action) = app.keymap.resolve(&key) else {
        return true;
    };
    match action {
        KeyAction::Quit => return false,
        KeyAction::SwitchTab => app.switch_tab(),
        KeyAction::StartSearch => app.input_mode = InputMode::Search,
        KeyAction::NewRecord => app.input_mode = InputMode::Form,
        KeyAction::EditSelection => match &mut app.screen {
            ActiveScreen::Users(s) => {
                if s.edit_selected() {
                    app.input_mode = InputMode::Form;
                }
            }
            ActiveScreen::Catalog(_) => {
                app.notice = Some(Notice::info("Books cannot be edited."));
            }
        },
        KeyAction::DeleteSelection => open_delete_confirm(app),
        KeyAction::Refresh => match &mut app.screen {
            ActiveScreen::Users(s) => s.core.refresh(),
            ActiveScreen::Catalog(s) => s.core.refresh(),
        },
        KeyAction::OpenHelp => {
            app.modal = Some(ModalState::Help { scroll: 0 });
            app.input_mode = InputMode::Modal;
        }
        KeyAction::MoveUp => move_selection(app, -1),
        KeyAction::MoveDown => move_selection(app, 1),
        KeyAction::PageUp => {
            let step = page(app);
            move_selection(app, -step);
        }
        KeyAction::PageDown => {
            let step = page(app);
            move_selection(app, step);
        }
        KeyAction::Ignore => {}
    }
    true
}

fn page(app: &AppState) -> isize {
    isize::try_from(app.rows_per_page.max(1)).unwrap_or(isize::MAX)
}

fn move_selection(app: &mut AppState, delta: isize) {
    match &mut app.screen {
        ActiveScreen::Users(s) => s.core.move_by(delta),
        ActiveScreen::Catalog(s) => s.core.move_by(delta),
    }
}

fn open_delete_confirm(app: &mut AppState) {
    let target = match &app.screen {
        ActiveScreen::Users(s) => s
            .core
            .selected_record()
            .map(|u| (u.id.clone(), u.name.clone())),
        ActiveScreen::Catalog(s) => s
            .core
            .selected_record()
            .map(|b| (b.id.clone(), b.title.clone())),
    };
    if let Some((id, label)) = target {
        app.modal = Some(ModalState::DeleteConfirm {
            id,
            label,
            selected: 1,
        });
        app.input_mode = InputMode::Modal;
    }
}

fn handle_search(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.input_mode = InputMode::Normal,
        KeyCode::Esc => {
            edit_search(app, String::clear);
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => edit_search(app, |t| {
            t.pop();
        }),
        KeyCode::Char(c) => edit_search(app, |t| t.push(c)),
        _ => {}
    }
}

/// Filtering is recomputed from the store on every change; no request is made.
fn edit_search(app: &mut AppState, edit: impl FnOnce(&mut String)) {
    match &mut app.screen {
        ActiveScreen::Users(s) => {
            let mut term = std::mem::take(&mut s.core.search);
            edit(&mut term);
            s.core.set_search(term);
        }
        ActiveScreen::Catalog(s) => {
            let mut term = std::mem::take(&mut s.core.search);
            edit(&mut term);
            s.core.set_search(term);
        }
    }
}

fn handle_form(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            if let ActiveScreen::Users(s) = &mut app.screen {
                if s.form.is_editing() {
                    s.cancel_edit();
                    app.notice = Some(Notice::info("Edit cancelled."));
                }
            }
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => match &mut app.screen {
            ActiveScreen::Users(s) => s.form.next_field(),
            ActiveScreen::Catalog(s) => s.form.next_field(),
        },
        KeyCode::Backspace => {
            match &mut app.screen {
                ActiveScreen::Users(s) => s.form.focused_mut().pop(),
                ActiveScreen::Catalog(s) => s.form.focused_mut().pop(),
            };
        }
        KeyCode::Char(c) => match &mut app.screen {
            ActiveScreen::Users(s) => s.form.focused_mut().push(c),
            ActiveScreen::Catalog(s) => s.form.focused_mut().push(c),
        },
        KeyCode::Enter => {
            let submitted = match &mut app.screen {
                ActiveScreen::Users(s) => s.submit(),
                ActiveScreen::Catalog(s) => s.submit(),
            };
            match submitted {
                Ok(()) => app.input_mode = InputMode::Normal,
                Err(e) => app.notice = Some(Notice::error(e.to_string())),
            }
        }
        _ => {}
    }
}

fn handle_modal(app: &mut AppState, key: KeyEvent) {
    let Some(modal) = app.modal.as_mut() else {
        app.input_mode = InputMode::Normal;
        return;
    };
    match modal {
        ModalState::DeleteConfirm { id, selected, .. } => match key.code {
            KeyCode::Esc | KeyCode::Char('n') => close_modal(app),
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => *selected = 1 - *selected,
            KeyCode::Char('y') => {
                let id = id.clone();
                confirm_delete(app, id);
            }
            KeyCode::Enter => {
                if *selected == 0 {
                    let id = id.clone();
                    confirm_delete(app, id);
                } else {
                    close_modal(app);
                }
            }
            _ => {}
        },
        ModalState::Help { scroll } => match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('?') => {
                close_modal(app)
            }
            KeyCode::Up | KeyCode::Char('k') => *scroll = scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => *scroll = scroll.saturating_add(1),
            _ => {}
        },
    }
}

fn confirm_delete(app: &mut AppState, id: crate::api::RecordId) {
    match &mut app.screen {
        ActiveScreen::Users(s) => s.delete(id),
        ActiveScreen::Catalog(s) => s.delete(id),
    }
    close_modal(app);
}

fn close_modal(app: &mut AppState) {
    app.modal = None;
    app.input_mode = InputMode::Normal;
}
