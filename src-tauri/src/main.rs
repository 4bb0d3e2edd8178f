#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app_constants;
mod app_helpers;
mod app_runtime;
mod app_types;
mod backend_path;
mod backend_readiness;
mod backend_supervisor;
mod desktop_bridge_commands;
mod exit_events;
mod launch_plan;
mod lifecycle;
mod logging;
mod main_window;
mod platform;
mod process_control;
mod rpc_bootstrap;
mod rpc_client;
mod runtime_paths;
mod shell_config;
mod startup_task;

pub(crate) use app_constants::*;
pub(crate) use app_helpers::{
    append_desktop_log, append_rpc_log, append_shutdown_log, append_startup_log,
    desktop_log_path,
};
pub(crate) use app_types::{BackendBridgeState, BackendEchoResult, BackendReadyPayload, ShellState};

fn main() {
    app_runtime::run();
}
