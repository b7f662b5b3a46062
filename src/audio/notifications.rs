//! Device change notifications using IMMNotificationClient.
//!
//! Each subscription wraps a [`DeviceEventHandler`] in a COM notification
//! client. Raw callback arguments are converted to [`DeviceChangeEvent`]
//! values and handed to the handler inline on the callback thread.

use super::device::{
    AudioError, DataFlow, DeviceChangeEvent, DeviceId, DeviceRole, DeviceState, PropertyKey,
};
use super::enumerator::DeviceEnumerator;
use super::traits::{DeviceEventHandler, NotificationSource, SubscriptionHandle};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};
use windows::core::{implement, PCWSTR};
use windows::Win32::Media::Audio::{
    eCapture, eCommunications, eConsole, eRender, EDataFlow, ERole, IMMNotificationClient,
    IMMNotificationClient_Impl, DEVICE_STATE,
};
use windows::Win32::UI::Shell::PropertiesSystem::PROPERTYKEY;
// Re-export windows_core so the implement macro can find it
#[allow(unused_imports)]
use windows_core;

/// Notification client that forwards converted events to a handler.
#[implement(IMMNotificationClient)]
struct DeviceNotificationClient {
    handler: Arc<dyn DeviceEventHandler>,
}

impl DeviceNotificationClient {
    fn convert_flow(flow: EDataFlow) -> DataFlow {
        if flow == eRender {
            DataFlow::Render
        } else if flow == eCapture {
            DataFlow::Capture
        } else {
            DataFlow::All
        }
    }

    fn convert_role(role: ERole) -> DeviceRole {
        if role == eConsole {
            DeviceRole::Console
        } else if role == eCommunications {
            DeviceRole::Communications
        } else {
            DeviceRole::Multimedia
        }
    }

    fn convert_id(id: &PCWSTR) -> Option<DeviceId> {
        if id.is_null() {
            return None;
        }
        unsafe { id.to_string().ok().map(DeviceId::from) }
    }
}

impl IMMNotificationClient_Impl for DeviceNotificationClient_Impl {
    fn OnDeviceStateChanged(
        &self,
        pwstrdeviceid: &PCWSTR,
        dwnewstate: DEVICE_STATE,
    ) -> windows::core::Result<()> {
        if let Some(device_id) = DeviceNotificationClient::convert_id(pwstrdeviceid) {
            self.handler.on_event(DeviceChangeEvent::DeviceStateChanged {
                device_id,
                new_state: DeviceState::from_flags(dwnewstate.0),
            });
        }
        Ok(())
    }

    fn OnDeviceAdded(&self, pwstrdeviceid: &PCWSTR) -> windows::core::Result<()> {
        if let Some(device_id) = DeviceNotificationClient::convert_id(pwstrdeviceid) {
            self.handler
                .on_event(DeviceChangeEvent::DeviceAdded { device_id });
        }
        Ok(())
    }

    fn OnDeviceRemoved(&self, pwstrdeviceid: &PCWSTR) -> windows::core::Result<()> {
        if let Some(device_id) = DeviceNotificationClient::convert_id(pwstrdeviceid) {
            self.handler
                .on_event(DeviceChangeEvent::DeviceRemoved { device_id });
        }
        Ok(())
    }

    fn OnDefaultDeviceChanged(
        &self,
        flow: EDataFlow,
        role: ERole,
        pwstrdefaultdeviceid: &PCWSTR,
    ) -> windows::core::Result<()> {
        self.handler.on_event(DeviceChangeEvent::DefaultDeviceChanged {
            flow: DeviceNotificationClient::convert_flow(flow),
            role: DeviceNotificationClient::convert_role(role),
            device_id: DeviceNotificationClient::convert_id(pwstrdefaultdeviceid),
        });
        Ok(())
    }

    fn OnPropertyValueChanged(
        &self,
        pwstrdeviceid: &PCWSTR,
        key: &PROPERTYKEY,
    ) -> windows::core::Result<()> {
        if let Some(device_id) = DeviceNotificationClient::convert_id(pwstrdeviceid) {
            self.handler.on_event(DeviceChangeEvent::PropertyChanged {
                device_id,
                key: PropertyKey {
                    fmtid: key.fmtid.to_u128(),
                    pid: key.pid,
                },
            });
        }
        Ok(())
    }
}

/// Endpoint notification source backed by `RegisterEndpointNotificationCallback`.
pub struct EndpointNotifications {
    enumerator: DeviceEnumerator,
    clients: Mutex<HashMap<SubscriptionHandle, IMMNotificationClient>>,
    next_handle: AtomicU64,
}

impl EndpointNotifications {
    pub fn new(enumerator: DeviceEnumerator) -> Self {
        Self {
            enumerator,
            clients: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
        }
    }
}

impl NotificationSource for EndpointNotifications {
    fn subscribe(
        &self,
        handler: Arc<dyn DeviceEventHandler>,
    ) -> Result<SubscriptionHandle, AudioError> {
        let client: IMMNotificationClient = DeviceNotificationClient { handler }.into();

        unsafe {
            self.enumerator
                .raw_enumerator()
                .RegisterEndpointNotificationCallback(&client)
                .map_err(|e| AudioError::SubscriptionFailed {
                    reason: format!("RegisterEndpointNotificationCallback: {e}"),
                })?;
        }

        let handle = SubscriptionHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed));
        self.clients
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(handle, client);

        debug!(handle = handle.raw(), "Endpoint notification client registered");
        Ok(handle)
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) -> Result<(), AudioError> {
        let client = self
            .clients
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&handle);

        if let Some(client) = client {
            unsafe {
                self.enumerator
                    .raw_enumerator()
                    .UnregisterEndpointNotificationCallback(&client)
                    .map_err(|e| AudioError::SubscriptionFailed {
                        reason: format!("UnregisterEndpointNotificationCallback: {e}"),
                    })?;
            }
            debug!(handle = handle.raw(), "Endpoint notification client unregistered");
        }
        Ok(())
    }
}

impl Drop for EndpointNotifications {
    fn drop(&mut self) {
        let clients = self.clients.get_mut().unwrap_or_else(|e| e.into_inner());
        for (handle, client) in clients.drain() {
            unsafe {
                if let Err(e) = self
                    .enumerator
                    .raw_enumerator()
                    .UnregisterEndpointNotificationCallback(&client)
                {
                    warn!(handle = handle.raw(), error = %e, "Failed to unregister notification client");
                }
            }
        }
    }
}
