use std::path::{Path, PathBuf};

use crate::{
    backend_path,
    backend_supervisor::BackendSupervisor,
    main_window::{WindowHandle, WindowHost, WindowManager, WindowSpec},
    platform::Platform,
    process_control::ProcessLauncher,
    rpc_client::RpcEndpoint,
    shell_config::ShellConfig,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyReport {
    pub window: Option<WindowHandle>,
    pub backend_pid: Option<u32>,
    pub backend_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllClosedDecision {
    Quit,
    StayResident,
}

/// The four application-level events the shell reacts to.
pub trait LifecycleHandler {
    fn on_ready<H: WindowHost>(&mut self, host: &H) -> ReadyReport;
    fn on_all_closed(&mut self) -> AllClosedDecision;
    fn on_activate<H: WindowHost>(&mut self, host: &H) -> Option<WindowHandle>;
    fn on_will_quit(&mut self);
}

pub struct LifecycleCoordinator<L: ProcessLauncher> {
    config: ShellConfig,
    platform: Platform,
    install_root: PathBuf,
    backend_log_path: Option<PathBuf>,
    windows: WindowManager,
    supervisor: BackendSupervisor<L>,
    window_closed_notice: bool,
    quitting: bool,
    log: fn(&str),
}

impl<L: ProcessLauncher> LifecycleCoordinator<L> {
    pub fn new(
        config: ShellConfig,
        platform: Platform,
        install_root: PathBuf,
        backend_log_path: Option<PathBuf>,
        launcher: L,
        log: fn(&str),
    ) -> Self {
        Self {
            config,
            platform,
            install_root,
            backend_log_path,
            windows: WindowManager::new(WindowSpec::main()),
            supervisor: BackendSupervisor::new(launcher, log),
            window_closed_notice: false,
            quitting: false,
            log,
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    pub fn endpoint(&self) -> RpcEndpoint {
        RpcEndpoint::loopback(self.config.port)
    }

    pub fn windows(&self) -> &WindowManager {
        &self.windows
    }

    pub fn supervisor(&self) -> &BackendSupervisor<L> {
        &self.supervisor
    }

    pub fn supervisor_mut(&mut self) -> &mut BackendSupervisor<L> {
        &mut self.supervisor
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    /// The toolkit reported a window destroyed.
    pub fn on_window_closed(&mut self, label: &str) {
        if self.windows.mark_closed(label) {
            self.window_closed_notice = true;
            (self.log)(&format!("window '{label}' closed"));
        }
    }

    /// Whether a tracked window closed since the last call. The toolkit's
    /// "exit requested" signal only means "all windows closed" when this is set.
    pub fn take_window_closed_notice(&mut self) -> bool {
        std::mem::take(&mut self.window_closed_notice)
    }

    fn create_window<H: WindowHost>(&mut self, host: &H) -> Option<WindowHandle> {
        match self.windows.create(host) {
            Ok(handle) => {
                (self.log)(&format!("window '{}' created", handle.label));
                Some(handle)
            }
            Err(error) => {
                (self.log)(&format!("failed to create main window: {error}"));
                None
            }
        }
    }

    fn start_backend(&mut self) -> Result<u32, String> {
        let backend =
            backend_path::resolve_backend_path(&self.install_root, &self.config, self.platform);
        (self.log)(&format!(
            "resolved backend path: {} (packaged={})",
            backend.path().display(),
            backend.is_packaged()
        ));
        self.supervisor.start(
            &backend,
            &self.config,
            self.config.port,
            &self.install_root,
            self.backend_log_path.clone(),
        )
    }
}

impl<L: ProcessLauncher> LifecycleHandler for LifecycleCoordinator<L> {
    fn on_ready<H: WindowHost>(&mut self, host: &H) -> ReadyReport {
        let window = self.create_window(host);
        let (backend_pid, backend_error) = match self.start_backend() {
            Ok(pid) => (Some(pid), None),
            Err(error) => {
                (self.log)(&format!("backend startup failed: {error}"));
                (None, Some(error))
            }
        };

        ReadyReport {
            window,
            backend_pid,
            backend_error,
        }
    }

    fn on_all_closed(&mut self) -> AllClosedDecision {
        if self.platform.stays_resident_without_windows() {
            (self.log)("all windows closed, staying resident");
            return AllClosedDecision::StayResident;
        }
        (self.log)("all windows closed, quitting");
        AllClosedDecision::Quit
    }

    fn on_activate<H: WindowHost>(&mut self, host: &H) -> Option<WindowHandle> {
        if let Some(existing) = self.windows.current().cloned() {
            if let Err(error) = host.focus_window(&existing) {
                (self.log)(&format!("failed to focus existing window: {error}"));
            }
            return Some(existing);
        }
        self.create_window(host)
    }

    fn on_will_quit(&mut self) {
        self.quitting = true;
        self.supervisor.stop();
    }
}
