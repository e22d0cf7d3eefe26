//! Sketchboard Application
//!
//! The application shell: window and GPU lifecycle, the egui panels around
//! the canvas, keyboard shortcuts, platform file picking and configuration.

mod app;
mod config;
mod file_ops;
mod header;
mod shortcuts;
mod ui;

pub use app::App;
pub use config::{AppConfig, ConfigError, ConfigKey};
pub use header::{HeaderAction, HeaderState};
pub use shortcuts::{Shortcut, ShortcutRegistry};
pub use ui::{GenerationStatus, UiAction, UiState, render_ui};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::run_wasm;
