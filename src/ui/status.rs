//! One-way status updates from the reactor to the display surface.
//!
//! Publishing never blocks: updates are queued on an unbounded channel and
//! drained by the thread that owns the tray.

use std::sync::mpsc::{channel, Receiver, Sender};

/// Text shown when no output device is available.
pub const NO_DEVICE_LABEL: &str = "No output device";

/// What the status display should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    /// Friendly name of the current default render device
    DefaultDevice(String),

    /// No default render device exists
    NoDevice,
}

impl StatusUpdate {
    /// Tooltip text for this update.
    pub fn label(&self) -> &str {
        match self {
            StatusUpdate::DefaultDevice(name) => name,
            StatusUpdate::NoDevice => NO_DEVICE_LABEL,
        }
    }
}

/// A passive observer of the current default device.
pub trait StatusSink: Send + Sync {
    fn publish(&self, update: StatusUpdate);
}

/// Channel-backed status sink.
#[derive(Clone)]
pub struct ChannelStatus {
    sender: Sender<StatusUpdate>,
}

impl ChannelStatus {
    /// Create a sink and the receiver the display drains.
    pub fn new() -> (Self, Receiver<StatusUpdate>) {
        let (sender, receiver) = channel();
        (Self { sender }, receiver)
    }
}

impl StatusSink for ChannelStatus {
    fn publish(&self, update: StatusUpdate) {
        // Display may already be gone during shutdown
        let _ = self.sender.send(update);
    }
}

/// Drain pending updates, keeping only the most recent one.
pub fn latest(receiver: &Receiver<StatusUpdate>) -> Option<StatusUpdate> {
    receiver.try_iter().last()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_keeps_last_update() {
        let (status, receiver) = ChannelStatus::new();
        status.publish(StatusUpdate::DefaultDevice("Built-in Speakers".to_string()));
        status.publish(StatusUpdate::NoDevice);
        status.publish(StatusUpdate::DefaultDevice("Studio Headphones".to_string()));

        assert_eq!(
            latest(&receiver),
            Some(StatusUpdate::DefaultDevice("Studio Headphones".to_string()))
        );
        assert_eq!(latest(&receiver), None);
    }

    #[test]
    fn test_publish_after_receiver_dropped() {
        let (status, receiver) = ChannelStatus::new();
        drop(receiver);
        status.publish(StatusUpdate::NoDevice);
    }

    #[test]
    fn test_labels() {
        assert_eq!(StatusUpdate::NoDevice.label(), NO_DEVICE_LABEL);
        assert_eq!(
            StatusUpdate::DefaultDevice("Headphones".to_string()).label(),
            "Headphones"
        );
    }
}
