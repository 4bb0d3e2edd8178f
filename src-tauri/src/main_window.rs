use std::path::PathBuf;

use tauri::{AppHandle, Manager, WebviewUrl, WebviewWindowBuilder};

use crate::{
    MAIN_WINDOW_HEIGHT, MAIN_WINDOW_LABEL, MAIN_WINDOW_TITLE, MAIN_WINDOW_WIDTH,
    PRESENTATION_ENTRY_FILE,
};

#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub label: String,
    pub title: String,
    pub width: f64,
    pub height: f64,
    pub entry: PathBuf,
    pub maximized: bool,
}

impl WindowSpec {
    pub fn main() -> Self {
        Self {
            label: MAIN_WINDOW_LABEL.to_string(),
            title: MAIN_WINDOW_TITLE.to_string(),
            width: MAIN_WINDOW_WIDTH,
            height: MAIN_WINDOW_HEIGHT,
            entry: PathBuf::from(PRESENTATION_ENTRY_FILE),
            maximized: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowHandle {
    pub label: String,
}

/// What the lifecycle needs from the GUI toolkit.
pub trait WindowHost {
    fn create_window(&self, spec: &WindowSpec) -> Result<WindowHandle, String>;
    fn focus_window(&self, handle: &WindowHandle) -> Result<(), String>;
}

/// Tracks the one live window. The handle is dropped when the toolkit reports
/// the window destroyed.
#[derive(Debug)]
pub struct WindowManager {
    spec: WindowSpec,
    current: Option<WindowHandle>,
}

impl WindowManager {
    pub fn new(spec: WindowSpec) -> Self {
        Self {
            spec,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&WindowHandle> {
        self.current.as_ref()
    }

    pub fn create<H: WindowHost>(&mut self, host: &H) -> Result<WindowHandle, String> {
        if let Some(existing) = &self.current {
            return Err(format!("Window '{}' is already open.", existing.label));
        }

        let handle = host.create_window(&self.spec)?;
        self.current = Some(handle.clone());
        Ok(handle)
    }

    /// Returns whether the closed window was the tracked one.
    pub fn mark_closed(&mut self, label: &str) -> bool {
        match &self.current {
            Some(handle) if handle.label == label => {
                self.current = None;
                true
            }
            _ => false,
        }
    }
}

pub struct TauriWindowHost<'a> {
    app_handle: &'a AppHandle,
}

impl<'a> TauriWindowHost<'a> {
    pub fn new(app_handle: &'a AppHandle) -> Self {
        Self { app_handle }
    }
}

impl WindowHost for TauriWindowHost<'_> {
    fn create_window(&self, spec: &WindowSpec) -> Result<WindowHandle, String> {
        let window = WebviewWindowBuilder::new(
            self.app_handle,
            spec.label.as_str(),
            WebviewUrl::App(spec.entry.clone()),
        )
        .title(spec.title.as_str())
        .inner_size(spec.width, spec.height)
        .build()
        .map_err(|error| format!("Failed to create window '{}': {}", spec.label, error))?;

        if spec.maximized {
            window
                .maximize()
                .map_err(|error| format!("Failed to maximize window '{}': {}", spec.label, error))?;
        }

        Ok(WindowHandle {
            label: window.label().to_string(),
        })
    }

    fn focus_window(&self, handle: &WindowHandle) -> Result<(), String> {
        let Some(window) = self.app_handle.get_webview_window(&handle.label) else {
            return Err(format!("Window '{}' not found.", handle.label));
        };

        if let Err(error) = window.unminimize() {
            return Err(format!("Failed to unminimize window '{}': {}", handle.label, error));
        }
        if let Err(error) = window.show() {
            return Err(format!("Failed to show window '{}': {}", handle.label, error));
        }
        window
            .set_focus()
            .map_err(|error| format!("Failed to focus window '{}': {}", handle.label, error))
    }
}


#[cfg(test)]
mod tests {
    use super::{test_support::FakeWindowHost, *};

    #[test]
    fn main_spec_loads_index_maximized() {
        let spec = WindowSpec::main();
        assert_eq!(spec.label, "main");
        assert_eq!(spec.entry, PathBuf::from("index.html"));
        assert_eq!((spec.width, spec.height), (800.0, 600.0));
        assert!(spec.maximized);
    }

    #[test]
    fn create_stores_the_handle() {
        let host = FakeWindowHost::default();
        let mut manager = WindowManager::new(WindowSpec::main());

        let handle = manager.create(&host).expect("create window");

        assert_eq!(handle.label, "main");
        assert_eq!(manager.current(), Some(&handle));
        assert_eq!(host.created.borrow().len(), 1);
    }

    #[test]
    fn create_refuses_a_second_live_window() {
        let host = FakeWindowHost::default();
        let mut manager = WindowManager::new(WindowSpec::main());
        manager.create(&host).expect("create window");

        assert!(manager.create(&host).is_err());
        assert_eq!(host.created.borrow().len(), 1);
    }

    #[test]
    fn mark_closed_only_clears_the_tracked_window() {
        let host = FakeWindowHost::default();
        let mut manager = WindowManager::new(WindowSpec::main());
        manager.create(&host).expect("create window");

        assert!(!manager.mark_closed("devtools"));
        assert!(manager.current().is_some());
        assert!(manager.mark_closed("main"));
        assert!(manager.current().is_none());

        manager.create(&host).expect("recreate window");
        assert_eq!(host.created.borrow().len(), 2);
    }

    #[test]
    fn failed_create_leaves_no_handle() {
        let host = FakeWindowHost::default();
        host.fail_create.set(true);
        let mut manager = WindowManager::new(WindowSpec::main());

        assert!(manager.create(&host).is_err());
        assert!(manager.current().is_none());
    }
}
