//! System tray icon management.
//!
//! Shows the current default output device as the tooltip and offers an
//! "Exit" item. The tray is a passive display: it receives status updates
//! and reports only the exit request back to the host.

use crate::platform::icons::{generate_headphone_icon, ICON_SIZE};
use thiserror::Error;
use tray_icon::{
    menu::{Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem},
    Icon, TrayIcon, TrayIconBuilder,
};

const APP_TITLE: &str = "Headphone Max";

/// Events from the system tray.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayEvent {
    /// "Exit" menu item selected
    Exit,
}

/// Tray service error types.
#[derive(Debug, Error)]
pub enum TrayError {
    #[error("Failed to create tray icon: {0}")]
    CreateFailed(String),

    #[error("Failed to load icon resource")]
    IconLoadFailed,

    #[error("Tray icon not initialized")]
    NotInitialized,

    #[error("Failed to create menu: {0}")]
    MenuFailed(String),
}

/// System tray manager.
pub struct TrayManager {
    tray_icon: Option<TrayIcon>,
    device_item: Option<MenuItem>,
    exit_menu_id: Option<MenuId>,
}

impl TrayManager {
    /// Create a new TrayManager.
    pub fn new() -> Self {
        Self {
            tray_icon: None,
            device_item: None,
            exit_menu_id: None,
        }
    }

    /// Create and show the tray icon.
    pub fn create(&mut self, device_label: &str) -> Result<(), TrayError> {
        let icon = Self::create_icon()?;

        let menu = Menu::new();

        // Disabled item mirroring the tooltip
        let device_item = MenuItem::new(device_label, false, None);
        menu.append(&device_item)
            .map_err(|e| TrayError::MenuFailed(e.to_string()))?;

        menu.append(&PredefinedMenuItem::separator())
            .map_err(|e| TrayError::MenuFailed(e.to_string()))?;

        let exit_item = MenuItem::new("Exit", true, None);
        self.exit_menu_id = Some(exit_item.id().clone());
        menu.append(&exit_item)
            .map_err(|e| TrayError::MenuFailed(e.to_string()))?;

        let tray_icon = TrayIconBuilder::new()
            .with_icon(icon)
            .with_tooltip(Self::tooltip(device_label))
            .with_menu(Box::new(menu))
            .build()
            .map_err(|e| TrayError::CreateFailed(e.to_string()))?;

        self.device_item = Some(device_item);
        self.tray_icon = Some(tray_icon);

        Ok(())
    }

    /// Poll for a tray event. Call this from the message loop.
    pub fn poll_event(&self) -> Option<TrayEvent> {
        let event = MenuEvent::receiver().try_recv().ok()?;
        if Some(&event.id) == self.exit_menu_id.as_ref() {
            Some(TrayEvent::Exit)
        } else {
            None
        }
    }

    /// Show a new default device name.
    pub fn set_device(&mut self, device_label: &str) -> Result<(), TrayError> {
        let tray = self.tray_icon.as_mut().ok_or(TrayError::NotInitialized)?;
        tray.set_tooltip(Some(Self::tooltip(device_label)))
            .map_err(|e| TrayError::CreateFailed(e.to_string()))?;

        if let Some(item) = &self.device_item {
            item.set_text(device_label);
        }
        Ok(())
    }

    /// Destroy the tray icon.
    pub fn destroy(&mut self) {
        self.tray_icon = None;
        self.device_item = None;
    }

    fn tooltip(device_label: &str) -> String {
        format!("{APP_TITLE}: {device_label}")
    }

    fn create_icon() -> Result<Icon, TrayError> {
        Icon::from_rgba(generate_headphone_icon(), ICON_SIZE, ICON_SIZE)
            .map_err(|_| TrayError::IconLoadFailed)
    }
}

impl Default for TrayManager {
    fn default() -> Self {
        Self::new()
    }
}
