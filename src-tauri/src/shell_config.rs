use std::{env, time::Duration};

use crate::{
    BACKEND_CMD_ENV, BACKEND_PING_TIMEOUT_ENV, BACKEND_PING_TIMEOUT_MAX_MS,
    BACKEND_PING_TIMEOUT_MIN_MS, BACKEND_PORT_ENV, BACKEND_READY_POLL_INTERVAL_ENV,
    BACKEND_READY_POLL_INTERVAL_MAX_MS, BACKEND_READY_POLL_INTERVAL_MIN_MS,
    BACKEND_READY_TIMEOUT_ENV, BACKEND_READY_TIMEOUT_MAX_MS, BACKEND_READY_TIMEOUT_MIN_MS,
    DEFAULT_BACKEND_PING_TIMEOUT_MS, DEFAULT_BACKEND_PORT, DEFAULT_BACKEND_READY_POLL_INTERVAL_MS,
    DEFAULT_BACKEND_READY_TIMEOUT_MS, DEFAULT_DIST_FOLDER, DEFAULT_MODULE_NAME,
    DEFAULT_PYTHON_RUNTIME, DEFAULT_SOURCE_FOLDER, PYTHON_RUNTIME_ENV,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub probe_timeout: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_BACKEND_READY_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_BACKEND_READY_POLL_INTERVAL_MS),
            probe_timeout: Duration::from_millis(DEFAULT_BACKEND_PING_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub port: u16,
    pub dist_folder: String,
    pub source_folder: String,
    pub module_name: String,
    pub python: String,
    /// Replaces the resolved backend launch entirely; the port is still appended.
    pub custom_command: Option<Vec<String>>,
    pub readiness: ReadinessPolicy,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_BACKEND_PORT,
            dist_folder: DEFAULT_DIST_FOLDER.to_string(),
            source_folder: DEFAULT_SOURCE_FOLDER.to_string(),
            module_name: DEFAULT_MODULE_NAME.to_string(),
            python: DEFAULT_PYTHON_RUNTIME.to_string(),
            custom_command: None,
            readiness: ReadinessPolicy::default(),
        }
    }
}

impl ShellConfig {
    pub fn from_env<F>(log: F) -> Self
    where
        F: Fn(&str),
    {
        Self::from_lookup(|key| env::var(key).ok(), log)
    }

    pub fn from_lookup<L, F>(lookup: L, log: F) -> Self
    where
        L: Fn(&str) -> Option<String>,
        F: Fn(&str),
    {
        let mut config = Self::default();
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(raw) = read(BACKEND_PORT_ENV) {
            match parse_port(&raw) {
                Some(port) => config.port = port,
                None => log(&format!(
                    "invalid {BACKEND_PORT_ENV}='{raw}', falling back to {}",
                    config.port
                )),
            }
        }

        if let Some(python) = read(PYTHON_RUNTIME_ENV) {
            config.python = python;
        }

        if let Some(raw) = read(BACKEND_CMD_ENV) {
            match shlex::split(&raw) {
                Some(pieces) if !pieces.is_empty() => config.custom_command = Some(pieces),
                _ => log(&format!("invalid {BACKEND_CMD_ENV}: {raw}; ignoring")),
            }
        }

        config.readiness.timeout = resolve_duration_ms(
            read(BACKEND_READY_TIMEOUT_ENV).as_deref(),
            DEFAULT_BACKEND_READY_TIMEOUT_MS,
            BACKEND_READY_TIMEOUT_MIN_MS,
            BACKEND_READY_TIMEOUT_MAX_MS,
            BACKEND_READY_TIMEOUT_ENV,
            &log,
        );
        config.readiness.poll_interval = resolve_duration_ms(
            read(BACKEND_READY_POLL_INTERVAL_ENV).as_deref(),
            DEFAULT_BACKEND_READY_POLL_INTERVAL_MS,
            BACKEND_READY_POLL_INTERVAL_MIN_MS,
            BACKEND_READY_POLL_INTERVAL_MAX_MS,
            BACKEND_READY_POLL_INTERVAL_ENV,
            &log,
        );
        config.readiness.probe_timeout = resolve_duration_ms(
            read(BACKEND_PING_TIMEOUT_ENV).as_deref(),
            DEFAULT_BACKEND_PING_TIMEOUT_MS,
            BACKEND_PING_TIMEOUT_MIN_MS,
            BACKEND_PING_TIMEOUT_MAX_MS,
            BACKEND_PING_TIMEOUT_ENV,
            &log,
        );

        config
    }
}

fn parse_port(raw: &str) -> Option<u16> {
    raw.parse::<u16>().ok().filter(|port| *port != 0)
}

fn resolve_duration_ms<F>(
    raw: Option<&str>,
    default_ms: u64,
    min_ms: u64,
    max_ms: u64,
    env_name: &str,
    log: F,
) -> Duration
where
    F: Fn(&str),
{
    let Some(raw) = raw else {
        return Duration::from_millis(default_ms);
    };

    match raw.parse::<u64>() {
        Ok(value) => {
            let clamped = value.clamp(min_ms, max_ms);
            if clamped != value {
                log(&format!(
                    "{env_name}={value} is out of range, clamped to {clamped}ms"
                ));
            }
            Duration::from_millis(clamped)
        }
        Err(_) => {
            log(&format!(
                "invalid {env_name}='{raw}', falling back to {default_ms}ms"
            ));
            Duration::from_millis(default_ms)
        }
    }
}
