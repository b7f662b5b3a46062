//! Endpoint directory using the Windows MMDevice API.
//!
//! Provides COM initialization and the process-wide `IMMDeviceEnumerator`
//! binding shared by the directory, the volume actuator and the
//! notification source.

use super::device::{AudioError, DeviceDescriptor, DeviceId};
use super::traits::DeviceDirectory;
use tracing::debug;
use windows::core::{PCWSTR, PWSTR};
use windows::Win32::Devices::Properties::DEVPKEY_Device_FriendlyName;
use windows::Win32::Media::Audio::{
    eConsole, eRender, IMMDevice, IMMDeviceEnumerator, MMDeviceEnumerator,
};
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoTaskMemFree, CoUninitialize, CLSCTX_ALL,
    COINIT_MULTITHREADED, STGM,
};
use windows::Win32::UI::Shell::PropertiesSystem::PROPERTYKEY;

/// COM initialization guard that uninitializes COM on drop.
pub struct ComGuard {
    initialized: bool,
}

impl ComGuard {
    /// Initialize COM for the current thread.
    pub fn new() -> Result<Self, AudioError> {
        unsafe {
            // Multithreaded: endpoint callbacks arrive on OS worker threads
            CoInitializeEx(None, COINIT_MULTITHREADED)
                .ok()
                .map_err(|e| AudioError::InitializationFailed {
                    reason: format!("CoInitializeEx: {e}"),
                })?;
        }
        Ok(Self { initialized: true })
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        if self.initialized {
            unsafe {
                CoUninitialize();
            }
        }
    }
}

/// Device enumerator using Windows MMDevice API.
#[derive(Clone)]
pub struct DeviceEnumerator {
    enumerator: IMMDeviceEnumerator,
}

// SAFETY: MMDeviceEnumerator is registered with ThreadingModel=Both and the
// process apartment is multithreaded, so the interface pointer may be used
// from the notification callback threads.
unsafe impl Send for DeviceEnumerator {}
unsafe impl Sync for DeviceEnumerator {}

impl DeviceEnumerator {
    /// Create a new DeviceEnumerator.
    ///
    /// Note: COM must be initialized before calling this function.
    pub fn new() -> Result<Self, AudioError> {
        unsafe {
            let enumerator: IMMDeviceEnumerator =
                CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL).map_err(|e| {
                    AudioError::InitializationFailed {
                        reason: format!("CoCreateInstance(MMDeviceEnumerator): {e}"),
                    }
                })?;

            Ok(Self { enumerator })
        }
    }

    /// Look up an endpoint by ID. A fresh interface is returned on each call.
    pub fn get_device(&self, device_id: &DeviceId) -> windows::core::Result<IMMDevice> {
        let device_id_wide: Vec<u16> = device_id
            .as_str()
            .encode_utf16()
            .chain(std::iter::once(0))
            .collect();

        unsafe {
            self.enumerator
                .GetDevice(PCWSTR::from_raw(device_id_wide.as_ptr()))
        }
    }

    /// Get the raw IMMDeviceEnumerator for notification registration.
    pub fn raw_enumerator(&self) -> &IMMDeviceEnumerator {
        &self.enumerator
    }

    fn device_id(device: &IMMDevice) -> Result<DeviceId, AudioError> {
        unsafe {
            let id: PWSTR = device.GetId().map_err(|_| AudioError::DeviceUnavailable)?;
            let converted = id.to_string();
            CoTaskMemFree(Some(id.0 as *const _));

            converted
                .map(DeviceId::from)
                .map_err(|_| AudioError::DeviceUnavailable)
        }
    }

    /// Get the friendly name of a device from its property store.
    fn friendly_name(device: &IMMDevice, device_id: &DeviceId) -> Result<String, AudioError> {
        let unavailable = |reason: String| AudioError::PropertyUnavailable {
            device_id: device_id.clone(),
            reason,
        };

        unsafe {
            // STGM_READ
            let props = device
                .OpenPropertyStore(STGM(0))
                .map_err(|e| unavailable(format!("OpenPropertyStore: {e}")))?;

            // Convert DEVPROPKEY to PROPERTYKEY
            let key = PROPERTYKEY {
                fmtid: DEVPKEY_Device_FriendlyName.fmtid,
                pid: DEVPKEY_Device_FriendlyName.pid,
            };

            let prop = props
                .GetValue(&key)
                .map_err(|e| unavailable(format!("GetValue: {e}")))?;

            let name = prop.to_string();
            if name.is_empty() {
                Err(unavailable("empty friendly name".to_string()))
            } else {
                Ok(name)
            }
        }
    }
}

impl DeviceDirectory for DeviceEnumerator {
    fn resolve_default_render_descriptor(&self) -> Result<DeviceDescriptor, AudioError> {
        let device = unsafe { self.enumerator.GetDefaultAudioEndpoint(eRender, eConsole) }
            .map_err(|_| AudioError::DeviceUnavailable)?;

        let id = Self::device_id(&device)?;
        let friendly_name = Self::friendly_name(&device, &id)?;
        debug!(device_id = %id, name = %friendly_name, "Resolved default render device");

        Ok(DeviceDescriptor { id, friendly_name })
    }
}
