//! Headphone Max - Library
//!
//! A background utility that maximizes output volume whenever a headphone
//! device becomes the default Windows render device.
//!
//! ## Features
//!
//! - Reacts to Core Audio endpoint notifications (default device changes)
//! - Re-queries the current default device instead of trusting event payloads
//! - Case-insensitive name matching, swappable without touching the reactor
//! - Optional tray icon showing the current default device
//! - Graceful shutdown on Ctrl+C or the tray "Exit" item

#[cfg(target_os = "windows")]
pub mod app;
pub mod audio;
pub mod config;
pub mod logging;
pub mod platform;
pub mod reactor;
pub mod ui;

#[cfg(target_os = "windows")]
pub use app::{App, ShutdownReason};
pub use audio::{
    AudioError, DeviceChangeEvent, DeviceDescriptor, DeviceDirectory, DeviceId, DeviceRole,
    NotificationSource, VolumeActuator, VolumeLevel,
};
pub use config::Settings;
pub use reactor::{EventOutcome, EventReactor, MatchRule, ReactorConfig, ReactorState};
pub use ui::{StatusSink, StatusUpdate};
