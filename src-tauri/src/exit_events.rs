use tauri::{AppHandle, ExitRequestApi, Manager};

use crate::{
    append_desktop_log, append_shutdown_log, append_startup_log,
    lifecycle::{AllClosedDecision, LifecycleHandler},
    main_window::TauriWindowHost,
    startup_task, ShellState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitRequestDecision {
    AllowExit,
    PreventExit,
}

/// An explicit exit code means someone asked to quit; only the implicit
/// request raised after the last window closed is up for debate.
fn decide_exit_request(
    code: Option<i32>,
    window_just_closed: bool,
    all_closed: impl FnOnce() -> AllClosedDecision,
) -> ExitRequestDecision {
    if code.is_some() || !window_just_closed {
        return ExitRequestDecision::AllowExit;
    }
    match all_closed() {
        AllClosedDecision::Quit => ExitRequestDecision::AllowExit,
        AllClosedDecision::StayResident => ExitRequestDecision::PreventExit,
    }
}

pub(crate) fn handle_ready(app_handle: &AppHandle) {
    let Some(state) = app_handle.try_state::<ShellState>() else {
        append_startup_log("ready event skipped: shell state is not managed");
        return;
    };

    state.readiness.begin();
    let report = {
        let mut coordinator = state.lock_coordinator();
        append_startup_log(&format!(
            "install root: {}",
            coordinator.install_root().display()
        ));
        coordinator.on_ready(&TauriWindowHost::new(app_handle))
    };

    match report.backend_pid {
        Some(pid) => {
            append_startup_log(&format!("backend started with pid {pid}"));
            startup_task::spawn_startup_task(app_handle.clone(), append_startup_log);
        }
        None => {
            let reason = report
                .backend_error
                .unwrap_or_else(|| "Backend process was not started.".to_string());
            let result = Err(reason);
            state.readiness.finish(&result);
            startup_task::emit_backend_ready(app_handle, &result, append_startup_log);
        }
    }
}

pub(crate) fn handle_activate(app_handle: &AppHandle) {
    let Some(state) = app_handle.try_state::<ShellState>() else {
        return;
    };
    let mut coordinator = state.lock_coordinator();
    if coordinator.is_quitting() {
        append_desktop_log("activate ignored: application is quitting");
        return;
    }
    coordinator.on_activate(&TauriWindowHost::new(app_handle));
}

pub(crate) fn handle_window_destroyed(app_handle: &AppHandle, label: &str) {
    let Some(state) = app_handle.try_state::<ShellState>() else {
        return;
    };
    state.lock_coordinator().on_window_closed(label);
}

pub(crate) fn handle_exit_requested(app_handle: &AppHandle, code: Option<i32>, api: &ExitRequestApi) {
    let Some(state) = app_handle.try_state::<ShellState>() else {
        return;
    };

    let decision = {
        let mut coordinator = state.lock_coordinator();
        let window_just_closed = coordinator.take_window_closed_notice();
        decide_exit_request(code, window_just_closed, || coordinator.on_all_closed())
    };

    match decision {
        ExitRequestDecision::AllowExit => {
            append_shutdown_log(&format!("exit requested (code={code:?}), allowing exit"));
        }
        ExitRequestDecision::PreventExit => {
            api.prevent_exit();
        }
    }
}

pub(crate) fn handle_exit_event(app_handle: &AppHandle) {
    let Some(state) = app_handle.try_state::<ShellState>() else {
        return;
    };
    append_shutdown_log("application will quit, stopping backend");
    state.lock_coordinator().on_will_quit();
}
