//! Library crate for bookhub-tui.
//!
//! This crate exposes the building blocks of the TUI:
//! - Record types and the remote gateway (`api`)
//! - Application state, screen controllers and update loop (`app`)
//! - Error and result types (`error`)
//! - Form state and validation (`form`)
//! - In-memory search helpers (`search`)
//! - The refresh-guarded list cache (`store`)
//! - UI rendering and widgets (`ui`)
//!
//! It is used by the `bookhub-tui` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod api;
pub mod app;
pub mod error;
pub mod form;
pub mod search;
pub mod store;
pub mod ui;

/// Convenient result type shared across the crate.
pub use error::Result;
