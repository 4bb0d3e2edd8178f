use std::thread;

use tauri::{AppHandle, Emitter, Manager};

use crate::{
    backend_readiness::{self, ReadyStats},
    rpc_client::TcpJsonRpcClient,
    BackendReadyPayload, ShellState, BACKEND_READY_EVENT, MAIN_WINDOW_LABEL,
};

fn ready_payload(result: &Result<ReadyStats, String>) -> BackendReadyPayload {
    match result {
        Ok(stats) => BackendReadyPayload {
            ok: true,
            reason: None,
            attempts: stats.attempts,
            elapsed_ms: stats.elapsed.as_millis() as u64,
        },
        Err(reason) => BackendReadyPayload {
            ok: false,
            reason: Some(reason.clone()),
            attempts: 0,
            elapsed_ms: 0,
        },
    }
}

pub(crate) fn emit_backend_ready<F>(app_handle: &AppHandle, result: &Result<ReadyStats, String>, log: F)
where
    F: Fn(&str),
{
    if let Err(error) = app_handle.emit_to(MAIN_WINDOW_LABEL, BACKEND_READY_EVENT, ready_payload(result)) {
        log(&format!("failed to emit backend ready event: {error}"));
    }
}

/// Waits on a background thread for the freshly spawned backend to answer the
/// liveness probe. The readiness gate must already be in `Waiting`.
pub(crate) fn spawn_startup_task(app_handle: AppHandle, log: fn(&str)) {
    let Some(state) = app_handle.try_state::<ShellState>() else {
        log("startup task skipped: shell state is not ready");
        return;
    };

    let task_handle = app_handle.clone();
    let spawn_result = thread::Builder::new()
        .name("pylife-startup".to_string())
        .spawn(move || {
            let app_handle = task_handle;
            let Some(state) = app_handle.try_state::<ShellState>() else {
                return;
            };
            let (endpoint, policy) = {
                let coordinator = state.lock_coordinator();
                (coordinator.endpoint(), coordinator.config().readiness)
            };
            log(&format!("waiting for backend at {endpoint}"));

            let client = TcpJsonRpcClient::new(endpoint, policy.probe_timeout);
            let result = backend_readiness::wait_for_backend(
                &client,
                &policy,
                || {
                    let mut coordinator = state.lock_coordinator();
                    if let Some(status) = coordinator.supervisor_mut().poll_exit() {
                        return Err(format!(
                            "Backend process exited before becoming reachable: {status}"
                        ));
                    }
                    if !coordinator.supervisor().is_running() {
                        return Err("Backend process is not running.".to_string());
                    }
                    Ok(())
                },
                log,
            );

            if let Err(error) = &result {
                log(&format!("backend readiness failed: {error}"));
            }
            state.readiness.finish(&result);
            emit_backend_ready(&app_handle, &result, log);
        });

    if let Err(error) = spawn_result {
        let reason = format!("Failed to spawn startup task: {error}");
        log(&reason);
        state.readiness.finish(&Err(reason));
    }
}
