use tauri::{webview::PageLoadEvent, Manager, RunEvent, WindowEvent};

use crate::{
    append_desktop_log, append_startup_log, desktop_log_path, exit_events,
    lifecycle::LifecycleCoordinator, platform::Platform, process_control::StdProcessLauncher,
    rpc_bootstrap, runtime_paths, shell_config::ShellConfig, ShellState, BACKEND_LOG_FILE,
    MAIN_WINDOW_LABEL,
};

pub(crate) fn run() {
    append_startup_log("desktop process starting");
    append_startup_log(&format!("desktop log path: {}", desktop_log_path().display()));
    let config = ShellConfig::from_env(append_startup_log);
    append_startup_log(&format!(
        "backend port {}, runtime '{}', platform {}",
        config.port,
        config.python,
        Platform::current()
    ));

    tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|app, args, _cwd| {
            append_desktop_log(&format!(
                "second instance launched with {args:?}, activating existing window"
            ));
            exit_events::handle_activate(app);
        }))
        .invoke_handler(tauri::generate_handler![
            crate::desktop_bridge_commands::pylife_get_backend_state,
            crate::desktop_bridge_commands::pylife_backend_echo,
            crate::desktop_bridge_commands::pylife_check_backend,
        ])
        .on_window_event(|window, event| {
            if let WindowEvent::Destroyed = event {
                exit_events::handle_window_destroyed(window.app_handle(), window.label());
            }
        })
        .on_page_load(|webview, payload| {
            if webview.label() != MAIN_WINDOW_LABEL {
                return;
            }
            match payload.event() {
                PageLoadEvent::Started => {
                    append_desktop_log(&format!("page-load started: {}", payload.url()));
                }
                PageLoadEvent::Finished => {
                    append_desktop_log(&format!("page-load finished: {}", payload.url()));
                    if rpc_bootstrap::should_check_liveness(payload.url()) {
                        rpc_bootstrap::spawn_page_liveness_check(webview.app_handle().clone());
                    }
                }
            }
        })
        .setup(move |app| {
            let app_handle = app.handle().clone();
            let install_root = runtime_paths::app_install_root(
                &app_handle,
                &config.dist_folder,
                &config.source_folder,
            );
            let backend_log_path =
                runtime_paths::logs_dir(runtime_paths::default_data_dir().as_deref())
                    .map(|dir| dir.join(BACKEND_LOG_FILE));
            let coordinator = LifecycleCoordinator::new(
                config,
                Platform::current(),
                install_root,
                backend_log_path,
                StdProcessLauncher,
                append_desktop_log,
            );
            app.manage(ShellState::new(coordinator));

            exit_events::handle_ready(&app_handle);
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app_handle, event| match event {
            RunEvent::ExitRequested { code, api, .. } => {
                exit_events::handle_exit_requested(app_handle, code, &api);
            }
            RunEvent::Exit => {
                exit_events::handle_exit_event(app_handle);
            }
            #[cfg(target_os = "macos")]
            RunEvent::Reopen { .. } => {
                exit_events::handle_activate(app_handle);
            }
            _ => {}
        });
}
