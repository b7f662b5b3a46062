//! Audio module for Windows Core Audio API interactions.
//!
//! The data model and the directory/actuator/notification traits are
//! platform independent; their Core Audio implementations are only built
//! on Windows.

pub mod device;
pub mod traits;

#[cfg(target_os = "windows")]
pub mod enumerator;
#[cfg(target_os = "windows")]
pub mod notifications;
#[cfg(target_os = "windows")]
pub mod volume;

#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

pub use device::{
    AudioError, DataFlow, DeviceChangeEvent, DeviceDescriptor, DeviceId, DeviceRole, DeviceState,
    PropertyKey, VolumeLevel,
};
pub use traits::{
    DeviceDirectory, DeviceEventHandler, NotificationSource, SubscriptionHandle, VolumeActuator,
};

#[cfg(target_os = "windows")]
pub use enumerator::{ComGuard, DeviceEnumerator};
#[cfg(target_os = "windows")]
pub use notifications::EndpointNotifications;
#[cfg(target_os = "windows")]
pub use volume::VolumeController;
