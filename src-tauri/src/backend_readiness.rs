use std::{
    fmt,
    sync::{Condvar, Mutex},
    thread,
    time::{Duration, Instant},
};

use crate::{rpc_client::RpcClient, shell_config::ReadinessPolicy, LIVENESS_ECHO_PAYLOAD};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyStats {
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Polls the echo probe until the backend answers, the process dies, or the
/// policy timeout passes.
pub fn wait_for_backend<C, A, F>(
    client: &C,
    policy: &ReadinessPolicy,
    mut ensure_alive: A,
    log: F,
) -> Result<ReadyStats, String>
where
    C: RpcClient + ?Sized,
    A: FnMut() -> Result<(), String>,
    F: Fn(&str),
{
    let start_time = Instant::now();
    let mut attempts = 0_u32;

    loop {
        attempts += 1;
        let last_error = match client.echo(LIVENESS_ECHO_PAYLOAD) {
            Ok(reply) if reply == LIVENESS_ECHO_PAYLOAD => {
                let stats = ReadyStats {
                    attempts,
                    elapsed: start_time.elapsed(),
                };
                log(&format!(
                    "backend reachable after {} attempt(s), {}ms",
                    stats.attempts,
                    stats.elapsed.as_millis()
                ));
                return Ok(stats);
            }
            Ok(reply) => format!("unexpected echo reply {reply:?}"),
            Err(error) => error.to_string(),
        };

        ensure_alive()?;

        if start_time.elapsed() >= policy.timeout {
            return Err(format!(
                "Timed out after {}ms waiting for backend startup ({} attempts, last error: {}).",
                policy.timeout.as_millis(),
                attempts,
                last_error
            ));
        }

        thread::sleep(policy.poll_interval);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessStatus {
    NotStarted,
    Waiting,
    Ready,
    Failed(String),
}

impl fmt::Display for ReadinessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => f.write_str("not started"),
            Self::Waiting => f.write_str("waiting"),
            Self::Ready => f.write_str("ready"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Lets other threads block until the startup readiness poll has an answer.
#[derive(Debug)]
pub struct ReadinessGate {
    status: Mutex<ReadinessStatus>,
    changed: Condvar,
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self {
            status: Mutex::new(ReadinessStatus::NotStarted),
            changed: Condvar::new(),
        }
    }
}

impl ReadinessGate {
    fn set(&self, next: ReadinessStatus) {
        let mut status = self
            .status
            .lock()
            .unwrap_or_else(|error| error.into_inner());
        *status = next;
        self.changed.notify_all();
    }

    pub fn begin(&self) {
        self.set(ReadinessStatus::Waiting);
    }

    pub fn finish(&self, result: &Result<ReadyStats, String>) {
        self.set(match result {
            Ok(_) => ReadinessStatus::Ready,
            Err(reason) => ReadinessStatus::Failed(reason.clone()),
        });
    }

    pub fn status(&self) -> ReadinessStatus {
        self.status
            .lock()
            .unwrap_or_else(|error| error.into_inner())
            .clone()
    }

    /// Returns as soon as the status is anything but `Waiting`, or after
    /// `timeout` with whatever the status is then.
    pub fn wait_settled(&self, timeout: Duration) -> ReadinessStatus {
        let guard = self
            .status
            .lock()
            .unwrap_or_else(|error| error.into_inner());
        let (guard, _) = self
            .changed
            .wait_timeout_while(guard, timeout, |status| *status == ReadinessStatus::Waiting)
            .unwrap_or_else(|error| error.into_inner());
        guard.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, sync::Arc};

    use serde_json::Value;

    use super::*;
    use crate::rpc_client::{test_support::ScriptedRpcClient, RpcError};

    fn fast_policy(timeout_ms: u64) -> ReadinessPolicy {
        ReadinessPolicy {
            timeout: Duration::from_millis(timeout_ms),
            poll_interval: Duration::from_millis(1),
            probe_timeout: Duration::from_millis(50),
        }
    }

    fn refused() -> Result<Value, RpcError> {
        Err(RpcError::Transport("connection refused".to_string()))
    }

    fn ready() -> Result<Value, RpcError> {
        Ok(Value::String("Server ready.".to_string()))
    }

    #[test]
    fn wait_for_backend_retries_until_the_echo_matches() {
        let client = ScriptedRpcClient::new(
            vec![refused(), refused(), Ok(Value::String("booting".to_string()))],
            ready(),
        );

        let stats = wait_for_backend(&client, &fast_policy(5_000), || Ok(()), |_| {})
            .expect("backend becomes ready");

        assert_eq!(stats.attempts, 4);
        assert_eq!(client.call_count(), 4);
    }

    #[test]
    fn wait_for_backend_stops_when_the_process_exits() {
        let client = ScriptedRpcClient::always(refused());
        let checks = Cell::new(0);

        let error = wait_for_backend(
            &client,
            &fast_policy(5_000),
            || {
                checks.set(checks.get() + 1);
                if checks.get() >= 3 {
                    Err("backend process exited before becoming reachable: exit status: 1".to_string())
                } else {
                    Ok(())
                }
            },
            |_| {},
        )
        .expect_err("backend never becomes ready");

        assert!(error.contains("exited before becoming reachable"));
        assert_eq!(client.call_count(), 3);
    }

    #[test]
    fn wait_for_backend_gives_up_after_the_timeout() {
        let client = ScriptedRpcClient::always(refused());

        let error = wait_for_backend(&client, &fast_policy(30), || Ok(()), |_| {})
            .expect_err("backend never becomes ready");

        assert!(error.contains("Timed out after 30ms"));
        assert!(error.contains("connection refused"));
    }

    #[test]
    fn gate_reports_settled_status_immediately_when_not_waiting() {
        let gate = ReadinessGate::default();
        assert_eq!(gate.wait_settled(Duration::from_secs(5)), ReadinessStatus::NotStarted);

        gate.finish(&Err("spawn failed".to_string()));
        assert_eq!(
            gate.wait_settled(Duration::from_secs(5)),
            ReadinessStatus::Failed("spawn failed".to_string())
        );
    }

    #[test]
    fn gate_wakes_waiters_when_readiness_finishes() {
        let gate = Arc::new(ReadinessGate::default());
        gate.begin();

        let finisher = {
            let gate = gate.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                gate.finish(&Ok(ReadyStats {
                    attempts: 1,
                    elapsed: Duration::from_millis(20),
                }));
            })
        };

        assert_eq!(gate.wait_settled(Duration::from_secs(5)), ReadinessStatus::Ready);
        finisher.join().expect("finisher thread");
    }

    #[test]
    fn gate_times_out_while_still_waiting() {
        let gate = ReadinessGate::default();
        gate.begin();
        assert_eq!(gate.wait_settled(Duration::from_millis(10)), ReadinessStatus::Waiting);
        assert_eq!(gate.status(), ReadinessStatus::Waiting);
    }
}
