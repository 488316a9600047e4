// Library surface for the binary, headless/integration tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod diff;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod recorder;
pub mod runtime;
pub mod session;
pub mod style;
pub mod text_source;
pub mod ui;
pub mod word_picker;
