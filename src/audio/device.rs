//! Audio endpoint data models.
//!
//! Defines the identifiers, descriptors, events and errors shared by the
//! device directory, the volume actuator and the event reactor.

use std::fmt;
use thiserror::Error;

/// Session-scoped endpoint ID (opaque string from IMMDevice::GetId).
///
/// Not stable across reboots or re-enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Direction of audio flow for an endpoint (maps to Windows EDataFlow).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum DataFlow {
    /// Playback endpoints (speakers, headphones)
    Render = 0,

    /// Recording endpoints (microphones)
    Capture = 1,

    /// Either direction
    All = 2,
}

/// Audio device role (maps to Windows ERole enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DeviceRole {
    /// Used by games, system sounds, most general applications
    Console = 0,

    /// Used by music players, video players
    Multimedia = 1,

    /// Used by Teams, Zoom, Discord, and other VoIP applications
    Communications = 2,
}

/// Windows device state flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// Device is active and available for use
    Active,

    /// Device is disabled in Windows Sound settings
    Disabled,

    /// Device is not present (driver issue)
    NotPresent,

    /// Device is unplugged (for pluggable devices)
    Unplugged,
}

impl DeviceState {
    /// Convert a raw `DEVICE_STATE_*` flag value.
    pub fn from_flags(flags: u32) -> Self {
        match flags {
            1 => DeviceState::Active,
            2 => DeviceState::Disabled,
            8 => DeviceState::Unplugged,
            _ => DeviceState::NotPresent,
        }
    }
}

/// Identifies a device property (mirrors Windows PROPERTYKEY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyKey {
    pub fmtid: u128,
    pub pid: u32,
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{:032x}}},{}", self.fmtid, self.pid)
    }
}

/// Events delivered by the OS endpoint notification subsystem.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceChangeEvent {
    /// Default device changed for a flow/role pair
    DefaultDeviceChanged {
        flow: DataFlow,
        role: DeviceRole,
        device_id: Option<DeviceId>, // None if no default device remains
    },

    /// A new audio endpoint was connected
    DeviceAdded { device_id: DeviceId },

    /// An audio endpoint was disconnected
    DeviceRemoved { device_id: DeviceId },

    /// Endpoint state changed (active, disabled, not present, unplugged)
    DeviceStateChanged {
        device_id: DeviceId,
        new_state: DeviceState,
    },

    /// A property in the endpoint's property store changed
    PropertyChanged {
        device_id: DeviceId,
        key: PropertyKey,
    },
}

/// Resolved metadata for an endpoint. Fetched on demand, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Endpoint the descriptor was resolved from
    pub id: DeviceId,

    /// Human-readable device name (PKEY_Device_FriendlyName)
    pub friendly_name: String,
}

impl DeviceDescriptor {
    pub fn new(id: impl Into<DeviceId>, friendly_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            friendly_name: friendly_name.into(),
        }
    }
}

/// Normalized output gain in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct VolumeLevel(f32);

impl VolumeLevel {
    /// Silence.
    pub const MIN: VolumeLevel = VolumeLevel(0.0);

    /// Full-scale output.
    pub const MAX: VolumeLevel = VolumeLevel(1.0);

    /// Validate a scalar level. NaN and values outside `[0.0, 1.0]` are rejected.
    pub fn new(level: f32) -> Result<Self, AudioError> {
        if (0.0..=1.0).contains(&level) {
            Ok(Self(level))
        } else {
            Err(AudioError::OutOfRange { level })
        }
    }

    pub fn scalar(self) -> f32 {
        self.0
    }

    /// Level as percentage (0-100).
    pub fn percent(self) -> u8 {
        (self.0 * 100.0).round() as u8
    }
}

impl fmt::Display for VolumeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// Audio service error types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AudioError {
    #[error("Audio subsystem initialization failed: {reason}")]
    InitializationFailed { reason: String },

    #[error("Failed to subscribe to endpoint notifications: {reason}")]
    SubscriptionFailed { reason: String },

    #[error("No default render device available")]
    DeviceUnavailable,

    #[error("Friendly name unavailable for {device_id}: {reason}")]
    PropertyUnavailable { device_id: DeviceId, reason: String },

    #[error("Volume control activation failed for {device_id}: {reason}")]
    ActivationFailed { device_id: DeviceId, reason: String },

    #[error("Volume level {level} is outside [0.0, 1.0]")]
    OutOfRange { level: f32 },
}

impl AudioError {
    /// Fatal errors abort startup; everything else is scoped to one event.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AudioError::InitializationFailed { .. } | AudioError::SubscriptionFailed { .. }
        )
    }
}
