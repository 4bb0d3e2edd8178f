use std::path::{Path, PathBuf};

use crate::{platform::Platform, shell_config::ShellConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendPath {
    /// `<source>/<module>.py`, run through the Python runtime.
    SourceScript(PathBuf),
    /// `<dist>/<module>/<module>[.exe]`, run directly.
    PackagedExecutable(PathBuf),
}

impl BackendPath {
    pub fn path(&self) -> &Path {
        match self {
            Self::SourceScript(path) | Self::PackagedExecutable(path) => path,
        }
    }

    pub fn is_packaged(&self) -> bool {
        matches!(self, Self::PackagedExecutable(_))
    }
}

pub fn is_packaged(root: &Path, config: &ShellConfig) -> bool {
    root.join(&config.dist_folder).is_dir()
}

pub fn backend_path_for(
    root: &Path,
    config: &ShellConfig,
    platform: Platform,
    packaged: bool,
) -> BackendPath {
    let module = &config.module_name;
    if !packaged {
        return BackendPath::SourceScript(
            root.join(&config.source_folder).join(format!("{module}.py")),
        );
    }

    BackendPath::PackagedExecutable(
        root.join(&config.dist_folder)
            .join(module)
            .join(format!("{module}{}", platform.executable_suffix())),
    )
}

/// Never fails: a missing file only surfaces once the backend is spawned.
pub fn resolve_backend_path(root: &Path, config: &ShellConfig, platform: Platform) -> BackendPath {
    backend_path_for(root, config, platform, is_packaged(root, config))
}
