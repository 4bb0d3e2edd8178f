use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, OnceLock},
};

use chrono::Local;

static LOG_WRITE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

pub(crate) fn resolve_desktop_log_path(data_dir: Option<PathBuf>, file_name: &str) -> PathBuf {
    match crate::runtime_paths::logs_dir(data_dir.as_deref()) {
        Some(dir) => dir.join(file_name),
        None => std::env::temp_dir().join("pylife").join(file_name),
    }
}

pub(crate) fn format_log_line(category: &str, message: &str) -> String {
    format!(
        "[{}] [{}] {}",
        Local::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, false),
        category,
        message
    )
}

fn backup_path(path: &Path, index: usize) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

/// Shifts `file.log` to `file.log.1`, `file.log.1` to `file.log.2` and so on,
/// dropping whatever falls past `backup_count`.
pub(crate) fn rotate_log_if_needed(
    path: &Path,
    max_bytes: u64,
    backup_count: usize,
) -> Result<bool, String> {
    let size = match fs::metadata(path) {
        Ok(metadata) => metadata.len(),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(error) => {
            return Err(format!(
                "Failed to stat log file {}: {}",
                path.display(),
                error
            ))
        }
    };
    if size < max_bytes {
        return Ok(false);
    }

    if backup_count == 0 {
        fs::remove_file(path)
            .map_err(|error| format!("Failed to truncate log {}: {}", path.display(), error))?;
        return Ok(true);
    }

    let oldest = backup_path(path, backup_count);
    if oldest.exists() {
        fs::remove_file(&oldest).map_err(|error| {
            format!("Failed to remove old log {}: {}", oldest.display(), error)
        })?;
    }
    for index in (1..backup_count).rev() {
        let from = backup_path(path, index);
        if from.exists() {
            let to = backup_path(path, index + 1);
            fs::rename(&from, &to).map_err(|error| {
                format!(
                    "Failed to rotate log {} -> {}: {}",
                    from.display(),
                    to.display(),
                    error
                )
            })?;
        }
    }
    let first = backup_path(path, 1);
    fs::rename(path, &first).map_err(|error| {
        format!(
            "Failed to rotate log {} -> {}: {}",
            path.display(),
            first.display(),
            error
        )
    })?;
    Ok(true)
}

pub(crate) fn append_log_line(
    path: &Path,
    line: &str,
    max_bytes: u64,
    backup_count: usize,
) -> Result<(), String> {
    let lock = LOG_WRITE_LOCK.get_or_init(|| Mutex::new(()));
    let _guard = lock.lock().unwrap_or_else(|error| error.into_inner());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|error| {
            format!(
                "Failed to create log directory {}: {}",
                parent.display(),
                error
            )
        })?;
    }
    rotate_log_if_needed(path, max_bytes, backup_count)?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|error| format!("Failed to open log {}: {}", path.display(), error))?;
    writeln!(file, "{line}")
        .map_err(|error| format!("Failed to write log {}: {}", path.display(), error))
}
