use std::{
    fs::{self, OpenOptions},
    process::{Child, Command, Stdio},
};

use crate::launch_plan::{build_debug_command, LaunchPlan};

#[cfg(target_os = "windows")]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// A spawned backend the supervisor can poll and terminate.
pub trait BackendProcess: Send {
    fn id(&self) -> u32;

    /// `Ok(Some(status))` once the process has exited, without blocking.
    fn try_wait(&mut self) -> Result<Option<String>, String>;

    /// Sends one termination request. Does not wait for the exit.
    fn terminate(&mut self) -> Result<(), String>;
}

pub trait ProcessLauncher: Send {
    fn launch(&self, plan: &LaunchPlan) -> Result<Box<dyn BackendProcess>, String>;
}

impl BackendProcess for Child {
    fn id(&self) -> u32 {
        Child::id(self)
    }

    fn try_wait(&mut self) -> Result<Option<String>, String> {
        Child::try_wait(self)
            .map(|status| status.map(|status| status.to_string()))
            .map_err(|error| format!("Failed to poll backend process status: {error}"))
    }

    fn terminate(&mut self) -> Result<(), String> {
        stop_child_process(self)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StdProcessLauncher;

impl ProcessLauncher for StdProcessLauncher {
    fn launch(&self, plan: &LaunchPlan) -> Result<Box<dyn BackendProcess>, String> {
        let mut command = Command::new(&plan.cmd);
        command
            .args(&plan.args)
            .current_dir(&plan.cwd)
            .stdin(Stdio::null())
            .env("PYTHONUNBUFFERED", "1");

        #[cfg(target_os = "windows")]
        {
            use std::os::windows::process::CommandExt;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        match plan.log_path.as_deref() {
            Some(log_path) => {
                if let Some(log_parent) = log_path.parent() {
                    fs::create_dir_all(log_parent).map_err(|error| {
                        format!(
                            "Failed to create backend log directory {}: {}",
                            log_parent.display(),
                            error
                        )
                    })?;
                }
                let stdout_file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(log_path)
                    .map_err(|error| {
                        format!("Failed to open backend log {}: {}", log_path.display(), error)
                    })?;
                let stderr_file = stdout_file
                    .try_clone()
                    .map_err(|error| format!("Failed to clone backend log handle: {error}"))?;
                command.stdout(Stdio::from(stdout_file));
                command.stderr(Stdio::from(stderr_file));
            }
            None => {
                command.stdout(Stdio::null());
                command.stderr(Stdio::null());
            }
        }

        let child = command.spawn().map_err(|error| {
            format!(
                "Failed to spawn backend process with command {:?}: {}",
                build_debug_command(plan),
                error
            )
        })?;
        Ok(Box::new(child))
    }
}

fn stop_child_process(child: &mut Child) -> Result<(), String> {
    #[cfg(target_os = "windows")]
    {
        use std::os::windows::process::CommandExt;

        // A frozen interpreter may have children of its own; take the tree down.
        let status = Command::new("taskkill")
            .args(["/pid", &child.id().to_string(), "/t", "/f"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .stdin(Stdio::null())
            .creation_flags(CREATE_NO_WINDOW)
            .status();
        let _ = child.try_wait();
        return match status {
            Ok(_) => Ok(()),
            Err(error) => Err(format!("Failed to run taskkill: {error}")),
        };
    }

    #[cfg(unix)]
    {
        // Already reaped: the pid may belong to someone else by now.
        if let Ok(Some(_)) = child.try_wait() {
            return Ok(());
        }
        let pid = libc::pid_t::try_from(child.id())
            .map_err(|error| format!("Backend pid {} is out of range: {}", child.id(), error))?;

        // One SIGTERM, never followed by SIGKILL.
        let sent = unsafe { libc::kill(pid, libc::SIGTERM) };
        let result = if sent == 0 {
            Ok(())
        } else {
            let error = std::io::Error::last_os_error();
            if error.raw_os_error() == Some(libc::ESRCH) {
                Ok(())
            } else {
                Err(format!("Failed to send SIGTERM to backend process: {error}"))
            }
        };
        let _ = child.try_wait();
        result
    }

    #[cfg(not(any(unix, target_os = "windows")))]
    {
        let result = match child.kill() {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::InvalidInput => Ok(()),
            Err(error) => Err(format!("Failed to kill backend process: {error}")),
        };
        let _ = child.try_wait();
        result
    }
}
