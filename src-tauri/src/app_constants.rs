pub(crate) const DEFAULT_BACKEND_PORT: u16 = 4242;
pub(crate) const DEFAULT_DIST_FOLDER: &str = "pylifedist";
pub(crate) const DEFAULT_SOURCE_FOLDER: &str = "pylife";
pub(crate) const DEFAULT_MODULE_NAME: &str = "api";
pub(crate) const DEFAULT_PYTHON_RUNTIME: &str = "python";
pub(crate) const RPC_LOOPBACK_HOST: &str = "127.0.0.1";

pub(crate) const MAIN_WINDOW_LABEL: &str = "main";
pub(crate) const MAIN_WINDOW_TITLE: &str = "PyLife";
pub(crate) const MAIN_WINDOW_WIDTH: f64 = 800.0;
pub(crate) const MAIN_WINDOW_HEIGHT: f64 = 600.0;
pub(crate) const PRESENTATION_ENTRY_FILE: &str = "index.html";

pub(crate) const LIVENESS_ECHO_PAYLOAD: &str = "Server ready.";
pub(crate) const BACKEND_LIVENESS_EVENT: &str = "pylife://backend-liveness";
pub(crate) const BACKEND_READY_EVENT: &str = "pylife://backend-ready";

pub(crate) const ROOT_DIR_ENV: &str = "PYLIFE_ROOT";
pub(crate) const DATA_DIR_ENV: &str = "PYLIFE_DATA_DIR";
pub(crate) const BACKEND_PORT_ENV: &str = "PYLIFE_BACKEND_PORT";
pub(crate) const PYTHON_RUNTIME_ENV: &str = "PYLIFE_PYTHON";
pub(crate) const BACKEND_CMD_ENV: &str = "PYLIFE_BACKEND_CMD";
pub(crate) const BACKEND_READY_TIMEOUT_ENV: &str = "PYLIFE_BACKEND_READY_TIMEOUT_MS";
pub(crate) const BACKEND_READY_POLL_INTERVAL_ENV: &str = "PYLIFE_BACKEND_READY_POLL_INTERVAL_MS";
pub(crate) const BACKEND_PING_TIMEOUT_ENV: &str = "PYLIFE_BACKEND_PING_TIMEOUT_MS";

pub(crate) const DEFAULT_BACKEND_READY_TIMEOUT_MS: u64 = 20_000;
pub(crate) const BACKEND_READY_TIMEOUT_MIN_MS: u64 = 500;
pub(crate) const BACKEND_READY_TIMEOUT_MAX_MS: u64 = 5 * 60 * 1000;
pub(crate) const DEFAULT_BACKEND_READY_POLL_INTERVAL_MS: u64 = 300;
pub(crate) const BACKEND_READY_POLL_INTERVAL_MIN_MS: u64 = 50;
pub(crate) const BACKEND_READY_POLL_INTERVAL_MAX_MS: u64 = 10_000;
pub(crate) const DEFAULT_BACKEND_PING_TIMEOUT_MS: u64 = 800;
pub(crate) const BACKEND_PING_TIMEOUT_MIN_MS: u64 = 50;
pub(crate) const BACKEND_PING_TIMEOUT_MAX_MS: u64 = 30_000;

pub(crate) const DEFAULT_DATA_DIR_NAME: &str = ".pylife";
pub(crate) const DESKTOP_LOG_FILE: &str = "desktop.log";
pub(crate) const BACKEND_LOG_FILE: &str = "backend.log";
pub(crate) const DESKTOP_LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;
pub(crate) const LOG_BACKUP_COUNT: usize = 5;
