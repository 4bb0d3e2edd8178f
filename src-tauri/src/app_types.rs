use std::sync::{Mutex, MutexGuard};

use crate::{
    append_desktop_log,
    backend_readiness::{ReadinessGate, ReadinessStatus},
    lifecycle::LifecycleCoordinator,
    process_control::StdProcessLauncher,
};

pub(crate) type ShellCoordinator = LifecycleCoordinator<StdProcessLauncher>;

/// Everything the running shell owns, managed by Tauri.
pub(crate) struct ShellState {
    coordinator: Mutex<ShellCoordinator>,
    pub(crate) readiness: ReadinessGate,
}

impl ShellState {
    pub(crate) fn new(coordinator: ShellCoordinator) -> Self {
        Self {
            coordinator: Mutex::new(coordinator),
            readiness: ReadinessGate::default(),
        }
    }

    pub(crate) fn lock_coordinator(&self) -> MutexGuard<'_, ShellCoordinator> {
        match self.coordinator.lock() {
            Ok(guard) => guard,
            Err(error) => {
                append_desktop_log(&format!("lifecycle state lock poisoned: {error}"));
                error.into_inner()
            }
        }
    }
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BackendBridgeState {
    pub(crate) running: bool,
    pub(crate) pid: Option<u32>,
    pub(crate) port: u16,
    pub(crate) endpoint: String,
    pub(crate) window_open: bool,
    pub(crate) readiness: BackendReadinessView,
}

/// Startup readiness as the page renders it. Lets a page that loaded after
/// `pylife://backend-ready` was emitted still learn the outcome.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub(crate) struct BackendReadinessView {
    pub(crate) phase: &'static str,
    pub(crate) reason: Option<String>,
}

impl From<&ReadinessStatus> for BackendReadinessView {
    fn from(status: &ReadinessStatus) -> Self {
        let (phase, reason) = match status {
            ReadinessStatus::NotStarted => ("notStarted", None),
            ReadinessStatus::Waiting => ("waiting", None),
            ReadinessStatus::Ready => ("ready", None),
            ReadinessStatus::Failed(reason) => ("failed", Some(reason.clone())),
        };
        Self { phase, reason }
    }
}

#[derive(Debug, serde::Serialize)]
pub(crate) struct BackendEchoResult {
    pub(crate) ok: bool,
    pub(crate) reason: Option<String>,
    pub(crate) reply: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BackendReadyPayload {
    pub(crate) ok: bool,
    pub(crate) reason: Option<String>,
    pub(crate) attempts: u32,
    pub(crate) elapsed_ms: u64,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn bridge_state_serializes_in_camel_case() {
        let state = BackendBridgeState {
            running: true,
            pid: Some(42),
            port: 4242,
            endpoint: "tcp://127.0.0.1:4242".to_string(),
            window_open: true,
            readiness: BackendReadinessView::from(&ReadinessStatus::Ready),
        };

        assert_eq!(
            serde_json::to_value(&state).expect("serialize state"),
            json!({
                "running": true,
                "pid": 42,
                "port": 4242,
                "endpoint": "tcp://127.0.0.1:4242",
                "windowOpen": true,
                "readiness": { "phase": "ready", "reason": null }
            })
        );
    }

    #[test]
    fn readiness_view_carries_the_failure_reason() {
        let failed = ReadinessStatus::Failed("Failed to spawn backend process".to_string());
        assert_eq!(
            serde_json::to_value(BackendReadinessView::from(&failed)).expect("serialize view"),
            json!({ "phase": "failed", "reason": "Failed to spawn backend process" })
        );

        for (status, phase) in [
            (ReadinessStatus::NotStarted, "notStarted"),
            (ReadinessStatus::Waiting, "waiting"),
            (ReadinessStatus::Ready, "ready"),
        ] {
            let view = BackendReadinessView::from(&status);
            assert_eq!(view.phase, phase);
            assert!(view.reason.is_none());
        }
    }

    #[test]
    fn ready_payload_reports_elapsed_in_millis() {
        let payload = BackendReadyPayload {
            ok: false,
            reason: Some("spawn failed".to_string()),
            attempts: 0,
            elapsed_ms: 0,
        };
        let value = serde_json::to_value(&payload).expect("serialize payload");
        assert_eq!(value["elapsedMs"], 0);
        assert_eq!(value["reason"], "spawn failed");
    }
}
