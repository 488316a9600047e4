use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::app_dirs::AppDirs;

const DEFAULT_DIRECTIVE: &str = "info";

/// Install the global subscriber. The terminal belongs to the UI, so events
/// go to the log file in the state dir, or nowhere if it can't be opened.
/// Returns the log file path when one is in use.
pub fn init() -> Option<PathBuf> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false);

    let path = AppDirs::log_path();
    let file = path.as_deref().and_then(open_log);
    let in_use = file.is_some();

    let installed = match file {
        Some(file) => builder.with_writer(Mutex::new(file)).try_init(),
        None => builder.with_writer(std::io::sink).try_init(),
    };

    match (installed, in_use) {
        (Ok(()), true) => path,
        _ => None,
    }
}

fn open_log(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}
