use std::sync::Arc;

use super::device::{AudioError, DeviceChangeEvent, DeviceDescriptor, DeviceId, VolumeLevel};

/// Read-only queries against the OS endpoint directory.
pub trait DeviceDirectory: Send + Sync {
    /// Resolve the current default render endpoint (console role) and its friendly name.
    fn resolve_default_render_descriptor(&self) -> Result<DeviceDescriptor, AudioError>;
}

/// Sets the master output level of an endpoint.
pub trait VolumeActuator: Send + Sync {
    /// Set the scalar volume of `device_id`. Setting the same level twice is a no-op.
    fn set_device_volume(&self, device_id: &DeviceId, level: VolumeLevel)
        -> Result<(), AudioError>;
}

/// Receives endpoint change events. Invoked on OS callback threads,
/// possibly concurrently with itself.
pub trait DeviceEventHandler: Send + Sync {
    fn on_event(&self, event: DeviceChangeEvent);
}

/// Opaque token identifying one subscription on a [`NotificationSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// A source of endpoint change events.
pub trait NotificationSource {
    /// Start delivering events to `handler` until [`unsubscribe`](Self::unsubscribe).
    fn subscribe(
        &self,
        handler: Arc<dyn DeviceEventHandler>,
    ) -> Result<SubscriptionHandle, AudioError>;

    /// Stop delivering events for `handle`. Callbacks already running complete normally.
    fn unsubscribe(&self, handle: SubscriptionHandle) -> Result<(), AudioError>;
}
