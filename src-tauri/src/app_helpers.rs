use std::{path::PathBuf, sync::OnceLock};

use crate::{logging, runtime_paths, DESKTOP_LOG_FILE, DESKTOP_LOG_MAX_BYTES, LOG_BACKUP_COUNT};

static DESKTOP_LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

pub(crate) fn desktop_log_path() -> &'static PathBuf {
    DESKTOP_LOG_PATH.get_or_init(|| {
        logging::resolve_desktop_log_path(runtime_paths::default_data_dir(), DESKTOP_LOG_FILE)
    })
}

fn append_categorized_log(category: &str, message: &str) {
    let line = logging::format_log_line(category, message);
    eprintln!("{line}");
    if let Err(error) = logging::append_log_line(
        desktop_log_path(),
        &line,
        DESKTOP_LOG_MAX_BYTES,
        LOG_BACKUP_COUNT,
    ) {
        eprintln!("failed to write desktop log: {error}");
    }
}

pub(crate) fn append_desktop_log(message: &str) {
    append_categorized_log("desktop", message);
}

pub(crate) fn append_startup_log(message: &str) {
    append_categorized_log("startup", message);
}

pub(crate) fn append_shutdown_log(message: &str) {
    append_categorized_log("shutdown", message);
}

pub(crate) fn append_rpc_log(message: &str) {
    append_categorized_log("rpc", message);
}
