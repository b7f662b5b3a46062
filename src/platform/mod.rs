//! Platform-specific module for Windows utilities.
//!
//! Console interrupt routing and tray icon generation.

#[cfg(target_os = "windows")]
pub mod console;
pub mod icons;
