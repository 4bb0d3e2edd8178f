use std::path::{Path, PathBuf};

use crate::{backend_path::BackendPath, shell_config::ShellConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub cmd: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub log_path: Option<PathBuf>,
    pub packaged_mode: bool,
}

/// The port is always the last positional argument; the backend reads it as
/// its listen port.
pub fn build_launch_plan(
    backend: &BackendPath,
    config: &ShellConfig,
    port: u16,
    cwd: &Path,
    log_path: Option<PathBuf>,
) -> Result<LaunchPlan, String> {
    let port_arg = port.to_string();

    if let Some(custom) = &config.custom_command {
        let mut pieces = custom.clone();
        if pieces.is_empty() {
            return Err("Custom backend command is empty.".to_string());
        }
        let cmd = pieces.remove(0);
        pieces.push(port_arg);
        return Ok(LaunchPlan {
            cmd,
            args: pieces,
            cwd: cwd.to_path_buf(),
            log_path,
            packaged_mode: false,
        });
    }

    let plan = match backend {
        BackendPath::PackagedExecutable(executable) => LaunchPlan {
            cmd: executable.to_string_lossy().to_string(),
            args: vec![port_arg],
            cwd: cwd.to_path_buf(),
            log_path,
            packaged_mode: true,
        },
        BackendPath::SourceScript(script) => LaunchPlan {
            cmd: config.python.clone(),
            args: vec![script.to_string_lossy().to_string(), port_arg],
            cwd: cwd.to_path_buf(),
            log_path,
            packaged_mode: false,
        },
    };
    Ok(plan)
}

pub fn build_debug_command(plan: &LaunchPlan) -> Vec<String> {
    let mut parts = vec![plan.cmd.clone()];
    parts.extend(plan.args.clone());
    parts
}
