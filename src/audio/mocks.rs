use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::device::{AudioError, DeviceChangeEvent, DeviceDescriptor, DeviceId, VolumeLevel};
use super::traits::{
    DeviceDirectory, DeviceEventHandler, NotificationSource, SubscriptionHandle, VolumeActuator,
};
use crate::ui::status::{StatusSink, StatusUpdate};

/// Mock endpoint directory - the current default device is controllable
pub struct MockDirectory {
    pub default_device: Mutex<Option<DeviceDescriptor>>,
    pub scripted_failures: Mutex<VecDeque<AudioError>>,
    pub resolve_calls: AtomicUsize,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self {
            default_device: Mutex::new(None),
            scripted_failures: Mutex::new(VecDeque::new()),
            resolve_calls: AtomicUsize::new(0),
        }
    }

    /// Create a directory whose default render device is already set
    pub fn with_default(id: &str, friendly_name: &str) -> Self {
        let directory = Self::new();
        directory.set_default(Some(DeviceDescriptor::new(id, friendly_name)));
        directory
    }

    /// Set (or clear) the current default render device
    pub fn set_default(&self, device: Option<DeviceDescriptor>) {
        *self.default_device.lock().unwrap() = device;
    }

    /// Make the next resolution fail with `error`
    pub fn fail_next(&self, error: AudioError) {
        self.scripted_failures.lock().unwrap().push_back(error);
    }

    pub fn resolve_count(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceDirectory for MockDirectory {
    fn resolve_default_render_descriptor(&self) -> Result<DeviceDescriptor, AudioError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.scripted_failures.lock().unwrap().pop_front() {
            return Err(error);
        }

        self.default_device
            .lock()
            .unwrap()
            .clone()
            .ok_or(AudioError::DeviceUnavailable)
    }
}

/// Mock volume actuator - records every call and the resulting volume per device
pub struct MockActuator {
    pub set_volume_calls: Mutex<Vec<(DeviceId, VolumeLevel)>>,
    pub volumes: Mutex<HashMap<DeviceId, VolumeLevel>>,
    pub removed_devices: Mutex<HashSet<DeviceId>>,
}

impl MockActuator {
    pub fn new() -> Self {
        Self {
            set_volume_calls: Mutex::new(Vec::new()),
            volumes: Mutex::new(HashMap::new()),
            removed_devices: Mutex::new(HashSet::new()),
        }
    }

    /// Simulate an endpoint disappearing; activation for it fails afterwards
    pub fn remove_device(&self, device_id: &str) {
        self.removed_devices
            .lock()
            .unwrap()
            .insert(DeviceId::from(device_id));
    }

    /// Bring a removed endpoint back
    pub fn restore_device(&self, device_id: &str) {
        self.removed_devices
            .lock()
            .unwrap()
            .remove(&DeviceId::from(device_id));
    }

    /// All set-volume calls that were made, including failed ones
    pub fn calls(&self) -> Vec<(DeviceId, VolumeLevel)> {
        self.set_volume_calls.lock().unwrap().clone()
    }

    pub fn volume_of(&self, device_id: &str) -> Option<VolumeLevel> {
        self.volumes
            .lock()
            .unwrap()
            .get(&DeviceId::from(device_id))
            .copied()
    }
}

impl Default for MockActuator {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeActuator for MockActuator {
    fn set_device_volume(
        &self,
        device_id: &DeviceId,
        level: VolumeLevel,
    ) -> Result<(), AudioError> {
        self.set_volume_calls
            .lock()
            .unwrap()
            .push((device_id.clone(), level));

        if self.removed_devices.lock().unwrap().contains(device_id) {
            return Err(AudioError::ActivationFailed {
                device_id: device_id.clone(),
                reason: "Mock device removed".to_string(),
            });
        }

        self.volumes
            .lock()
            .unwrap()
            .insert(device_id.clone(), level);
        Ok(())
    }
}

/// Mock notification source - synthetic events are pushed with [`emit`](Self::emit)
pub struct MockNotificationSource {
    pub handlers: Mutex<HashMap<SubscriptionHandle, Arc<dyn DeviceEventHandler>>>,
    pub should_fail_subscribe: Mutex<bool>,
    next_handle: AtomicU64,
}

impl MockNotificationSource {
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(HashMap::new()),
            should_fail_subscribe: Mutex::new(false),
            next_handle: AtomicU64::new(1),
        }
    }

    /// Configure the mock to fail subscription
    pub fn set_subscribe_failure(&self, should_fail: bool) {
        *self.should_fail_subscribe.lock().unwrap() = should_fail;
    }

    /// Deliver an event to every subscribed handler
    pub fn emit(&self, event: DeviceChangeEvent) {
        let handlers: Vec<_> = self.handlers.lock().unwrap().values().cloned().collect();
        for handler in handlers {
            handler.on_event(event.clone());
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.lock().unwrap().len()
    }
}

impl Default for MockNotificationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSource for MockNotificationSource {
    fn subscribe(
        &self,
        handler: Arc<dyn DeviceEventHandler>,
    ) -> Result<SubscriptionHandle, AudioError> {
        if *self.should_fail_subscribe.lock().unwrap() {
            return Err(AudioError::SubscriptionFailed {
                reason: "Mock subscribe failure".to_string(),
            });
        }

        let handle = SubscriptionHandle::new(self.next_handle.fetch_add(1, Ordering::SeqCst));
        self.handlers.lock().unwrap().insert(handle, handler);
        Ok(handle)
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) -> Result<(), AudioError> {
        self.handlers.lock().unwrap().remove(&handle);
        Ok(())
    }
}

/// Status sink that records every update it receives
#[derive(Default)]
pub struct RecordingStatus {
    pub updates: Mutex<Vec<StatusUpdate>>,
}

impl RecordingStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<StatusUpdate> {
        self.updates.lock().unwrap().clone()
    }
}

impl StatusSink for RecordingStatus {
    fn publish(&self, update: StatusUpdate) {
        self.updates.lock().unwrap().push(update);
    }
}
