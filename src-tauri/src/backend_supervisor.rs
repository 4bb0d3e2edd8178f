use std::path::{Path, PathBuf};

use crate::{
    backend_path::BackendPath,
    launch_plan::{build_debug_command, build_launch_plan, LaunchPlan},
    process_control::{BackendProcess, ProcessLauncher},
    shell_config::ShellConfig,
};

fn describe_spawn(pid: u32, port: u16, plan: &LaunchPlan) -> String {
    format!(
        "backend process spawned (pid={pid}, packaged={}) on port {port}: {:?}",
        plan.packaged_mode,
        build_debug_command(plan)
    )
}

struct RunningBackend {
    process: Box<dyn BackendProcess>,
    port: u16,
}

/// Owns the single backend process handle.
pub struct BackendSupervisor<L: ProcessLauncher> {
    launcher: L,
    running: Option<RunningBackend>,
    log: fn(&str),
}

impl<L: ProcessLauncher> BackendSupervisor<L> {
    pub fn new(launcher: L, log: fn(&str)) -> Self {
        Self {
            launcher,
            running: None,
            log,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn current_pid(&self) -> Option<u32> {
        self.running.as_ref().map(|running| running.process.id())
    }

    pub fn port(&self) -> Option<u16> {
        self.running.as_ref().map(|running| running.port)
    }

    /// Spawns the backend unless one is already alive, in which case the
    /// existing pid is returned.
    pub fn start(
        &mut self,
        backend: &BackendPath,
        config: &ShellConfig,
        port: u16,
        cwd: &Path,
        log_path: Option<PathBuf>,
    ) -> Result<u32, String> {
        if self.poll_exit().is_none() {
            if let Some(pid) = self.current_pid() {
                (self.log)(&format!(
                    "backend process already running (pid={pid}), skipping spawn"
                ));
                return Ok(pid);
            }
        }

        let plan = build_launch_plan(backend, config, port, cwd, log_path)?;
        let process = self.launcher.launch(&plan)?;
        let pid = process.id();
        self.running = Some(RunningBackend { process, port });
        (self.log)(&describe_spawn(pid, port, &plan));
        Ok(pid)
    }

    /// Terminates and forgets the backend. A no-op when nothing was started
    /// or the handle was already cleared.
    pub fn stop(&mut self) {
        let Some(mut running) = self.running.take() else {
            (self.log)("no backend process to stop");
            return;
        };

        let pid = running.process.id();
        match running.process.try_wait() {
            Ok(Some(status)) => {
                (self.log)(&format!(
                    "backend process (pid={pid}) already exited: {status}"
                ));
                return;
            }
            Ok(None) => {}
            Err(error) => (self.log)(&error),
        }

        match running.process.terminate() {
            Ok(()) => (self.log)(&format!("backend process (pid={pid}) terminated")),
            Err(error) => (self.log)(&format!(
                "failed to terminate backend process (pid={pid}): {error}"
            )),
        }
    }

    /// Clears the handle if the process has exited on its own.
    pub fn poll_exit(&mut self) -> Option<String> {
        let running = self.running.as_mut()?;
        match running.process.try_wait() {
            Ok(Some(status)) => {
                let pid = running.process.id();
                self.running = None;
                (self.log)(&format!("backend process (pid={pid}) exited: {status}"));
                Some(status)
            }
            Ok(None) => None,
            Err(error) => {
                (self.log)(&error);
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{Arc, Mutex};

    use crate::{
        launch_plan::LaunchPlan,
        process_control::{BackendProcess, ProcessLauncher},
    };

    #[derive(Debug, Default)]
    pub(crate) struct FakeProcessState {
        pub(crate) exit_status: Option<String>,
        pub(crate) terminate_calls: usize,
    }

    pub(crate) struct FakeProcess {
        pid: u32,
        state: Arc<Mutex<FakeProcessState>>,
    }

    impl BackendProcess for FakeProcess {
        fn id(&self) -> u32 {
            self.pid
        }

        fn try_wait(&mut self) -> Result<Option<String>, String> {
            Ok(self.state.lock().expect("fake state").exit_status.clone())
        }

        fn terminate(&mut self) -> Result<(), String> {
            let mut state = self.state.lock().expect("fake state");
            state.terminate_calls += 1;
            state.exit_status = Some("signal: 9 (SIGKILL)".to_string());
            Ok(())
        }
    }

    /// Records every plan it is asked to launch and hands out fake processes
    /// whose state the test can flip.
    #[derive(Clone, Default)]
    pub(crate) struct FakeLauncher {
        pub(crate) plans: Arc<Mutex<Vec<LaunchPlan>>>,
        pub(crate) processes: Arc<Mutex<Vec<Arc<Mutex<FakeProcessState>>>>>,
        pub(crate) fail_with: Option<String>,
    }

    impl FakeLauncher {
        pub(crate) fn failing(reason: &str) -> Self {
            Self {
                fail_with: Some(reason.to_string()),
                ..Self::default()
            }
        }

        pub(crate) fn launched(&self) -> Vec<LaunchPlan> {
            self.plans.lock().expect("fake plans").clone()
        }

        pub(crate) fn process(&self, index: usize) -> Arc<Mutex<FakeProcessState>> {
            self.processes.lock().expect("fake processes")[index].clone()
        }
    }

    impl ProcessLauncher for FakeLauncher {
        fn launch(&self, plan: &LaunchPlan) -> Result<Box<dyn BackendProcess>, String> {
            if let Some(reason) = &self.fail_with {
                return Err(reason.clone());
            }
            let mut plans = self.plans.lock().expect("fake plans");
            plans.push(plan.clone());
            let state = Arc::new(Mutex::new(FakeProcessState::default()));
            self.processes
                .lock()
                .expect("fake processes")
                .push(state.clone());
            Ok(Box::new(FakeProcess {
                pid: 1000 + plans.len() as u32,
                state,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::{test_support::FakeLauncher, *};

    fn source_backend() -> BackendPath {
        BackendPath::SourceScript(PathBuf::from("/app/pylife/api.py"))
    }

    fn supervisor(launcher: &FakeLauncher) -> BackendSupervisor<FakeLauncher> {
        BackendSupervisor::new(launcher.clone(), |_| {})
    }

    #[test]
    fn spawn_line_reports_packaging_and_command() {
        let plan = LaunchPlan {
            cmd: "/app/pylifedist/api/api".to_string(),
            args: vec!["4242".to_string()],
            cwd: PathBuf::from("/app"),
            log_path: None,
            packaged_mode: true,
        };

        let line = describe_spawn(1001, 4242, &plan);

        assert!(line.contains("pid=1001"));
        assert!(line.contains("packaged=true"));
        assert!(line.contains("/app/pylifedist/api/api"));
        assert!(line.ends_with("[\"/app/pylifedist/api/api\", \"4242\"]"));
    }

    #[test]
    fn start_stores_handle_and_port() {
        let launcher = FakeLauncher::default();
        let mut supervisor = supervisor(&launcher);

        let pid = supervisor
            .start(&source_backend(), &ShellConfig::default(), 4242, Path::new("/app"), None)
            .expect("start backend");

        assert_eq!(pid, 1001);
        assert!(supervisor.is_running());
        assert_eq!(supervisor.current_pid(), Some(1001));
        assert_eq!(supervisor.port(), Some(4242));
    }

    #[test]
    fn start_twice_keeps_a_single_process() {
        let launcher = FakeLauncher::default();
        let mut supervisor = supervisor(&launcher);
        let config = ShellConfig::default();

        let first = supervisor
            .start(&source_backend(), &config, 4242, Path::new("/app"), None)
            .expect("first start");
        let second = supervisor
            .start(&source_backend(), &config, 4242, Path::new("/app"), None)
            .expect("second start");

        assert_eq!(first, second);
        assert_eq!(launcher.launched().len(), 1);
    }

    #[test]
    fn start_replaces_a_handle_whose_process_already_exited() {
        let launcher = FakeLauncher::default();
        let mut supervisor = supervisor(&launcher);
        let config = ShellConfig::default();

        supervisor
            .start(&source_backend(), &config, 4242, Path::new("/app"), None)
            .expect("first start");
        launcher.process(0).lock().expect("state").exit_status = Some("exit status: 1".to_string());

        let pid = supervisor
            .start(&source_backend(), &config, 4242, Path::new("/app"), None)
            .expect("restart");
        assert_eq!(pid, 1002);
        assert_eq!(launcher.launched().len(), 2);
    }

    #[test]
    fn stop_terminates_and_clears_handle() {
        let launcher = FakeLauncher::default();
        let mut supervisor = supervisor(&launcher);
        supervisor
            .start(&source_backend(), &ShellConfig::default(), 4242, Path::new("/app"), None)
            .expect("start backend");

        supervisor.stop();

        assert!(!supervisor.is_running());
        assert_eq!(supervisor.current_pid(), None);
        assert_eq!(launcher.process(0).lock().expect("state").terminate_calls, 1);
    }

    #[test]
    fn start_after_stop_has_no_residual_state() {
        let launcher = FakeLauncher::default();
        let mut supervisor = supervisor(&launcher);
        let config = ShellConfig::default();

        supervisor
            .start(&source_backend(), &config, 4242, Path::new("/app"), None)
            .expect("first start");
        supervisor.stop();
        let pid = supervisor
            .start(&source_backend(), &config, 5151, Path::new("/app"), None)
            .expect("second start");

        assert_eq!(pid, 1002);
        assert_eq!(supervisor.port(), Some(5151));
        assert_eq!(launcher.process(1).lock().expect("state").terminate_calls, 0);
    }

    #[test]
    fn stop_without_start_does_not_panic() {
        let launcher = FakeLauncher::default();
        let mut supervisor = supervisor(&launcher);

        supervisor.stop();
        supervisor.stop();

        assert!(!supervisor.is_running());
    }

    #[test]
    fn stop_skips_terminate_for_an_exited_process() {
        let launcher = FakeLauncher::default();
        let mut supervisor = supervisor(&launcher);
        supervisor
            .start(&source_backend(), &ShellConfig::default(), 4242, Path::new("/app"), None)
            .expect("start backend");
        launcher.process(0).lock().expect("state").exit_status = Some("exit status: 0".to_string());

        supervisor.stop();

        assert!(!supervisor.is_running());
        assert_eq!(launcher.process(0).lock().expect("state").terminate_calls, 0);
    }

    #[test]
    fn poll_exit_clears_handle_once_the_process_dies() {
        let launcher = FakeLauncher::default();
        let mut supervisor = supervisor(&launcher);
        supervisor
            .start(&source_backend(), &ShellConfig::default(), 4242, Path::new("/app"), None)
            .expect("start backend");

        assert_eq!(supervisor.poll_exit(), None);
        assert!(supervisor.is_running());

        launcher.process(0).lock().expect("state").exit_status = Some("exit status: 2".to_string());
        assert_eq!(supervisor.poll_exit(), Some("exit status: 2".to_string()));
        assert!(!supervisor.is_running());
    }

    #[test]
    fn spawn_failure_leaves_no_handle() {
        let launcher = FakeLauncher::failing("Failed to spawn backend process: not found");
        let mut supervisor = supervisor(&launcher);

        let result =
            supervisor.start(&source_backend(), &ShellConfig::default(), 4242, Path::new("/app"), None);

        assert!(result.is_err());
        assert!(!supervisor.is_running());
    }
}
