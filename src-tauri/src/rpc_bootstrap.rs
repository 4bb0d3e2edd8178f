use std::{thread, time::Duration};

use serde::Serialize;
use tauri::{AppHandle, Emitter, Manager};
use url::Url;

use crate::{
    append_rpc_log,
    rpc_client::{RpcClient, TcpJsonRpcClient},
    ShellState, BACKEND_LIVENESS_EVENT, LIVENESS_ECHO_PAYLOAD, MAIN_WINDOW_LABEL,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LivenessOutcome {
    Ready,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LivenessReport {
    pub ok: bool,
    pub reason: Option<String>,
}

impl LivenessOutcome {
    pub fn to_report(&self) -> LivenessReport {
        match self {
            Self::Ready => LivenessReport {
                ok: true,
                reason: None,
            },
            Self::Failed { reason } => LivenessReport {
                ok: false,
                reason: Some(reason.clone()),
            },
        }
    }
}

/// Only pages served from the bundled frontend get a liveness probe.
pub fn should_check_liveness(page_url: &Url) -> bool {
    let bundled_scheme = matches!(page_url.scheme(), "tauri" | "http" | "https");
    let bundled_host = matches!(page_url.host_str(), Some("localhost" | "tauri.localhost"));
    bundled_scheme && bundled_host
}

/// Sends a single echo and reports what came back. Failures are logged and
/// returned, never raised.
pub fn check_backend_ready<C, F>(client: &C, log: F) -> LivenessOutcome
where
    C: RpcClient + ?Sized,
    F: Fn(&str),
{
    match client.echo(LIVENESS_ECHO_PAYLOAD) {
        Ok(reply) if reply == LIVENESS_ECHO_PAYLOAD => {
            log("Server is ready.");
            LivenessOutcome::Ready
        }
        Ok(reply) => {
            let reason = format!(
                "unexpected liveness reply: expected {LIVENESS_ECHO_PAYLOAD:?}, got {reply:?}"
            );
            log(&reason);
            LivenessOutcome::Failed { reason }
        }
        Err(error) => {
            let reason = error.to_string();
            log(&reason);
            LivenessOutcome::Failed { reason }
        }
    }
}

/// Runs the liveness check for a freshly loaded page off the main thread and
/// reports the outcome to it. Waits for the startup readiness poll to settle
/// first so the probe does not race the backend bind.
pub(crate) fn spawn_page_liveness_check(app_handle: AppHandle) {
    let spawn_result = thread::Builder::new()
        .name("pylife-liveness".to_string())
        .spawn(move || {
            let Some(state) = app_handle.try_state::<ShellState>() else {
                append_rpc_log("liveness check skipped: shell state is not ready");
                return;
            };
            let (endpoint, policy) = {
                let coordinator = state.lock_coordinator();
                (coordinator.endpoint(), coordinator.config().readiness)
            };
            let settled = state
                .readiness
                .wait_settled(policy.timeout + Duration::from_secs(1));
            append_rpc_log(&format!(
                "checking backend liveness at {endpoint} (startup readiness: {settled})"
            ));

            let client = TcpJsonRpcClient::new(endpoint, policy.probe_timeout);
            let outcome = check_backend_ready(&client, append_rpc_log);
            if let Err(error) =
                app_handle.emit_to(MAIN_WINDOW_LABEL, BACKEND_LIVENESS_EVENT, outcome.to_report())
            {
                append_rpc_log(&format!("failed to emit liveness outcome: {error}"));
            }
        });

    if let Err(error) = spawn_result {
        append_rpc_log(&format!("failed to spawn liveness check thread: {error}"));
    }
}
