use std::{
    env,
    path::{Path, PathBuf},
};

use tauri::{AppHandle, Manager};

use crate::{DATA_DIR_ENV, DEFAULT_DATA_DIR_NAME, ROOT_DIR_ENV};

fn env_path(key: &str) -> Option<PathBuf> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

pub(crate) fn workspace_root_dir() -> PathBuf {
    let candidate = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..");
    candidate.canonicalize().unwrap_or(candidate)
}

/// Directory holding logs and other per-user state, `~/.pylife` by default.
pub(crate) fn default_data_dir() -> Option<PathBuf> {
    env_path(DATA_DIR_ENV).or_else(|| home::home_dir().map(|home| home.join(DEFAULT_DATA_DIR_NAME)))
}

pub(crate) fn logs_dir(data_dir: Option<&Path>) -> Option<PathBuf> {
    data_dir.map(|root| root.join("logs"))
}

/// The directory the backend locator searches: an explicit override, then the
/// bundle resource dir when it carries a backend, then the source checkout.
/// Release builds never fall back to the checkout they were compiled from.
pub(crate) fn resolve_install_root(
    resource_dir: Option<PathBuf>,
    dist_folder: &str,
    source_folder: &str,
) -> PathBuf {
    if let Some(root) = env_path(ROOT_DIR_ENV) {
        return root;
    }

    pick_install_root(
        resource_dir,
        cfg!(debug_assertions).then(workspace_root_dir),
        dist_folder,
        source_folder,
    )
}

fn pick_install_root(
    resource_dir: Option<PathBuf>,
    workspace_root: Option<PathBuf>,
    dist_folder: &str,
    source_folder: &str,
) -> PathBuf {
    if let Some(resource_dir) = &resource_dir {
        if resource_dir.join(dist_folder).is_dir() || resource_dir.join(source_folder).is_dir() {
            return resource_dir.clone();
        }
    }
    workspace_root
        .or(resource_dir)
        .or_else(|| {
            env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(Path::to_path_buf))
        })
        .unwrap_or_else(|| PathBuf::from("."))
}

pub(crate) fn app_install_root(app_handle: &AppHandle, dist_folder: &str, source_folder: &str) -> PathBuf {
    resolve_install_root(app_handle.path().resource_dir().ok(), dist_folder, source_folder)
}
