//! `taskdeck` application library: store worker, live query composer,
//! preferences, configuration, and the terminal UI.

pub mod app;
pub mod config;
pub mod prefs;
pub mod query;
pub mod store;
pub mod ui;
