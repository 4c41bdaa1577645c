//! Ratatui front end: tabs for the Bible reader, the hymnal, scores, music and
//! favorites.

mod app;
mod helpers;
mod screens;
mod terminal;

pub use app::{App, AppMessage};
pub use terminal::run_app;
