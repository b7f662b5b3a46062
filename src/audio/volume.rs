//! Volume control using IAudioEndpointVolume.

use super::device::{AudioError, DeviceId, VolumeLevel};
use super::enumerator::DeviceEnumerator;
use super::traits::VolumeActuator;
use tracing::debug;
use windows::Win32::Media::Audio::Endpoints::IAudioEndpointVolume;
use windows::Win32::System::Com::CLSCTX_ALL;

/// Sets endpoint volume. Interfaces are activated per call and released on return.
#[derive(Clone)]
pub struct VolumeController {
    enumerator: DeviceEnumerator,
}

impl VolumeController {
    pub fn new(enumerator: DeviceEnumerator) -> Self {
        Self { enumerator }
    }

    fn activate(&self, device_id: &DeviceId) -> Result<IAudioEndpointVolume, AudioError> {
        let failed = |reason: String| AudioError::ActivationFailed {
            device_id: device_id.clone(),
            reason,
        };

        // The device may have been removed since it was resolved
        let device = self
            .enumerator
            .get_device(device_id)
            .map_err(|e| failed(format!("GetDevice: {e}")))?;

        unsafe {
            device
                .Activate::<IAudioEndpointVolume>(CLSCTX_ALL, None)
                .map_err(|e| failed(format!("Activate(IAudioEndpointVolume): {e}")))
        }
    }
}

impl VolumeActuator for VolumeController {
    fn set_device_volume(
        &self,
        device_id: &DeviceId,
        level: VolumeLevel,
    ) -> Result<(), AudioError> {
        let endpoint_volume = self.activate(device_id)?;

        unsafe {
            endpoint_volume
                .SetMasterVolumeLevelScalar(level.scalar(), std::ptr::null())
                .map_err(|e| AudioError::ActivationFailed {
                    device_id: device_id.clone(),
                    reason: format!("SetMasterVolumeLevelScalar: {e}"),
                })?;
        }

        debug!(device_id = %device_id, level = %level, "Endpoint volume set");
        Ok(())
    }
}
