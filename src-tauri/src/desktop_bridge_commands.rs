use tauri::{AppHandle, Manager};

use crate::{
    append_rpc_log,
    rpc_bootstrap::{self, LivenessReport},
    rpc_client::{RpcClient, TcpJsonRpcClient},
    app_types::BackendReadinessView,
    BackendBridgeState, BackendEchoResult, ShellState,
};

fn backend_client(app_handle: &AppHandle) -> Result<TcpJsonRpcClient, String> {
    let state = app_handle
        .try_state::<ShellState>()
        .ok_or_else(|| "Shell state is not ready.".to_string())?;
    let coordinator = state.lock_coordinator();
    let client = TcpJsonRpcClient::new(
        coordinator.endpoint(),
        coordinator.config().readiness.probe_timeout,
    );
    Ok(client)
}

#[tauri::command]
pub(crate) fn pylife_get_backend_state(app_handle: AppHandle) -> Result<BackendBridgeState, String> {
    let state = app_handle
        .try_state::<ShellState>()
        .ok_or_else(|| "Shell state is not ready.".to_string())?;
    let readiness = BackendReadinessView::from(&state.readiness.status());
    let mut coordinator = state.lock_coordinator();
    coordinator.supervisor_mut().poll_exit();

    let bridge_state = BackendBridgeState {
        running: coordinator.supervisor().is_running(),
        pid: coordinator.supervisor().current_pid(),
        port: coordinator
            .supervisor()
            .port()
            .unwrap_or(coordinator.config().port),
        endpoint: coordinator.endpoint().to_string(),
        window_open: coordinator.windows().current().is_some(),
        readiness,
    };
    Ok(bridge_state)
}

#[tauri::command]
pub(crate) async fn pylife_backend_echo(app_handle: AppHandle, message: String) -> BackendEchoResult {
    let client = match backend_client(&app_handle) {
        Ok(client) => client,
        Err(reason) => {
            return BackendEchoResult {
                ok: false,
                reason: Some(reason),
                reply: None,
            }
        }
    };

    let joined = tauri::async_runtime::spawn_blocking(move || client.echo(&message)).await;
    match joined {
        Ok(Ok(reply)) => BackendEchoResult {
            ok: true,
            reason: None,
            reply: Some(reply),
        },
        Ok(Err(error)) => {
            append_rpc_log(&format!("echo from page failed: {error}"));
            BackendEchoResult {
                ok: false,
                reason: Some(error.to_string()),
                reply: None,
            }
        }
        Err(error) => BackendEchoResult {
            ok: false,
            reason: Some(format!("Echo task failed: {error}")),
            reply: None,
        },
    }
}

#[tauri::command]
pub(crate) async fn pylife_check_backend(app_handle: AppHandle) -> LivenessReport {
    let client = match backend_client(&app_handle) {
        Ok(client) => client,
        Err(reason) => {
            return LivenessReport {
                ok: false,
                reason: Some(reason),
            }
        }
    };

    let joined = tauri::async_runtime::spawn_blocking(move || {
        rpc_bootstrap::check_backend_ready(&client, append_rpc_log)
    })
    .await;
    match joined {
        Ok(outcome) => outcome.to_report(),
        Err(error) => LivenessReport {
            ok: false,
            reason: Some(format!("Liveness task failed: {error}")),
        },
    }
}
