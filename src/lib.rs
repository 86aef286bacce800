//! Modal dialogs for a terminal forum client.
//!
//! The reusable piece is [`ui::ModalBase`]: chrome, loading and alert state,
//! and the protocol that turns API validation errors into an alert plus field
//! focus. The rest of the crate is the shell that drives it.

pub mod api;
pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dialogs;
pub mod theme;
pub mod tui;
pub mod ui;

pub use theme::Theme;
