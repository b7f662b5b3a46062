//! UI module for the status display.
//!
//! The status channel is platform independent; the tray icon is Windows only.

pub mod status;
#[cfg(target_os = "windows")]
pub mod tray;

pub use status::{ChannelStatus, StatusSink, StatusUpdate};
#[cfg(target_os = "windows")]
pub use tray::{TrayError, TrayEvent, TrayManager};
