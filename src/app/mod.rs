//! Application state types and entry glue.
//!
//! Defines the enums and structs that model the TUI state, the screen
//! controllers that keep each tab in sync with the backend, and the event
//! loop (re-exported as `run`).
//!
pub mod catalog;
pub mod config;
pub mod keymap;
pub mod screen;
pub mod update;
pub mod users;

use std::path::PathBuf;
use std::str::FromStr;

use ratatui::style::Color;

use crate::api::{Gateways, RecordId};
use catalog::CatalogScreen;
use keymap::Keymap;
use screen::ScreenController;
use users::UsersScreen;

/// Top-level tab in the UI.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ActiveTab {
    #[default]
    Users,
    Catalog,
}

impl ActiveTab {
    pub fn as_str(self) -> &'static str {
        match self {
            ActiveTab::Users => "users",
            ActiveTab::Catalog => "catalog",
        }
    }

    pub fn other(self) -> Self {
        match self {
            ActiveTab::Users => ActiveTab::Catalog,
            ActiveTab::Catalog => ActiveTab::Users,
        }
    }
}

impl FromStr for ActiveTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "users" | "user" => Ok(ActiveTab::Users),
            "catalog" | "books" | "book" => Ok(ActiveTab::Catalog),
            other => Err(format!("unknown tab '{other}' (expected users|catalog)")),
        }
    }
}

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Form,
    Modal,
}

/// Color palette for theming the TUI (Catppuccin Mocha).
#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub border: Color,
    pub focus: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub ok: Color,
    pub err: Color,
}

impl Theme {
    pub fn mocha() -> Self {
        // Palette reference: https://github.com/catppuccin/catppuccin
        Self {
            text: Color::Rgb(0xcd, 0xd6, 0xf4),
            muted: Color::Rgb(0x7f, 0x84, 0x9c),
            title: Color::Rgb(0x89, 0xb4, 0xfa),
            border: Color::Rgb(0x58, 0x5b, 0x70),
            focus: Color::Rgb(0xcb, 0xa6, 0xf7),
            header_bg: Color::Rgb(0x31, 0x32, 0x44),
            header_fg: Color::Rgb(0xb4, 0xbe, 0xfe),
            status_bg: Color::Rgb(0x45, 0x47, 0x5a),
            status_fg: Color::Rgb(0xcd, 0xd6, 0xf4),
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf),
            highlight_bg: Color::Rgb(0x45, 0x47, 0x5a),
            ok: Color::Rgb(0xa6, 0xe3, 0xa1),
            err: Color::Rgb(0xf3, 0x8b, 0xa8),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::mocha()
    }
}

/// Modal dialogs layered over the active screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModalState {
    DeleteConfirm {
        id: RecordId,
        label: String,
        /// 0 = Yes, 1 = No
        selected: usize,
    },
    Help {
        scroll: u16,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// One-line message shown in the status bar after an action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// The mounted screen. Only one exists at a time; switching tabs drops the
/// old one together with its in-flight requests.
pub enum ActiveScreen {
    Users(UsersScreen),
    Catalog(CatalogScreen),
}

impl ActiveScreen {
    pub fn mount(tab: ActiveTab, gateways: &Gateways) -> Self {
        match tab {
            ActiveTab::Users => ActiveScreen::Users(UsersScreen::mount(gateways.users.clone())),
            ActiveTab::Catalog => {
                ActiveScreen::Catalog(CatalogScreen::mount(gateways.books.clone()))
            }
        }
    }

    pub fn tab(&self) -> ActiveTab {
        match self {
            ActiveScreen::Users(_) => ActiveTab::Users,
            ActiveScreen::Catalog(_) => ActiveTab::Catalog,
        }
    }
}

pub struct AppState {
    pub gateways: Gateways,
    pub screen: ActiveScreen,
    pub input_mode: InputMode,
    pub theme: Theme,
    pub keymap: Keymap,
    pub modal: Option<ModalState>,
    pub notice: Option<Notice>,
    pub rows_per_page: usize,
    /// Where the data comes from, shown in the header.
    pub source: String,
}

impl AppState {
    /// Mount `tab` and request its first list. Must run inside a tokio runtime.
    pub fn new(gateways: Gateways, tab: ActiveTab, keymap: Keymap, source: String) -> Self {
        let screen = ActiveScreen::mount(tab, &gateways);
        Self {
            gateways,
            screen,
            input_mode: InputMode::Normal,
            theme: Theme::mocha(),
            keymap,
            modal: None,
            notice: None,
            rows_per_page: 10,
            source,
        }
    }

    pub fn active_tab(&self) -> ActiveTab {
        self.screen.tab()
    }

    /// Tear down the current screen and mount the other one.
    pub fn switch_tab(&mut self) {
        let next = self.active_tab().other();
        self.screen = ActiveScreen::mount(next, &self.gateways);
        self.input_mode = InputMode::Normal;
        self.modal = None;
    }

    /// Apply finished requests of the mounted screen; the last notice wins.
    pub fn pump(&mut self) {
        let notices = match &mut self.screen {
            ActiveScreen::Users(s) => s.poll(),
            ActiveScreen::Catalog(s) => s.poll(),
        };
        if let Some(last) = notices.into_iter().last() {
            self.notice = Some(last);
        }
    }

    pub fn in_flight(&self) -> usize {
        match &self.screen {
            ActiveScreen::Users(s) => s.core().in_flight(),
            ActiveScreen::Catalog(s) => s.core().in_flight(),
        }
    }
}

/// Directory for per-user config files (`$XDG_CONFIG_HOME/bookhub` or `~/.config/bookhub`).
pub fn config_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(xdg).join("bookhub"));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config").join("bookhub"))
}

/// Locate an existing config file: working directory first, then [`config_dir`].
pub fn config_file_read_path(name: &str) -> Option<String> {
    let local = PathBuf::from(name);
    if local.exists() {
        return Some(local.to_string_lossy().into_owned());
    }
    let candidate = config_dir()?.join(name);
    candidate
        .exists()
        .then(|| candidate.to_string_lossy().into_owned())
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;
