//! Device-change event reactor.
//!
//! Subscribes to endpoint notifications and maximizes the volume of the
//! default render device whenever a console-role default change leaves a
//! matching device (headphones, by default) in place.
//!
//! Handlers run on OS callback threads and may overlap. Each event is
//! handled independently: the directory is re-queried for the current
//! default device instead of trusting the event payload, and no state is
//! carried from one event to the next. The only mutable state is the
//! registration lifecycle.

pub mod rule;

use crate::audio::{
    AudioError, DeviceChangeEvent, DeviceDirectory, DeviceEventHandler, DeviceId, DeviceRole,
    NotificationSource, SubscriptionHandle, VolumeActuator, VolumeLevel,
};
use crate::ui::status::{StatusSink, StatusUpdate};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, trace, warn};

pub use rule::{MatchRule, DEFAULT_MATCH_FRAGMENT};

/// What the reactor does when a matching device becomes the default.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactorConfig {
    /// Which devices trigger the volume change
    pub rule: MatchRule,

    /// Level applied to a matching device
    pub level: VolumeLevel,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self {
            rule: MatchRule::default(),
            level: VolumeLevel::MAX,
        }
    }
}

/// Registration lifecycle. Events are only processed while `Registered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReactorState {
    Uninitialized = 0,
    Registered = 1,
    Unregistered = 2,
}

impl ReactorState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ReactorState::Registered,
            2 => ReactorState::Unregistered,
            _ => ReactorState::Uninitialized,
        }
    }
}

/// Result of handling a single event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// Reactor was not registered; the event was dropped
    Ignored,

    /// Event acknowledged, no action warranted
    Acknowledged,

    /// Default device resolved but its name did not match
    NoMatch { device_id: DeviceId },

    /// Volume was set on the resolved default device
    VolumeSet { device_id: DeviceId },

    /// Resolution or actuation failed; the reactor stays registered
    Failed(AudioError),
}

pub struct EventReactor<D, A> {
    directory: Arc<D>,
    actuator: Arc<A>,
    config: ReactorConfig,
    status: Option<Arc<dyn StatusSink>>,
    state: AtomicU8,
    subscription: Mutex<Option<SubscriptionHandle>>,
}

impl<D, A> EventReactor<D, A>
where
    D: DeviceDirectory,
    A: VolumeActuator,
{
    pub fn new(directory: Arc<D>, actuator: Arc<A>, config: ReactorConfig) -> Self {
        Self {
            directory,
            actuator,
            config,
            status: None,
            state: AtomicU8::new(ReactorState::Uninitialized as u8),
            subscription: Mutex::new(None),
        }
    }

    /// Push the resolved default device name to `status` on every console change.
    pub fn with_status(mut self, status: Arc<dyn StatusSink>) -> Self {
        self.status = Some(status);
        self
    }

    pub fn state(&self) -> ReactorState {
        ReactorState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn config(&self) -> &ReactorConfig {
        &self.config
    }

    /// Subscribe to `source` and start processing events.
    pub fn register<S>(self: &Arc<Self>, source: &S) -> Result<(), AudioError>
    where
        S: NotificationSource + ?Sized,
        D: 'static,
        A: 'static,
    {
        let mut subscription = self.subscription.lock().unwrap_or_else(|e| e.into_inner());

        let state = self.state();
        if state != ReactorState::Uninitialized {
            return Err(AudioError::SubscriptionFailed {
                reason: format!("reactor cannot register from state {state:?}"),
            });
        }

        let handler: Arc<dyn DeviceEventHandler> = self.clone();
        let handle = source.subscribe(handler)?;

        *subscription = Some(handle);
        self.state
            .store(ReactorState::Registered as u8, Ordering::Release);

        info!(
            rule = self.config.rule.fragment(),
            level = %self.config.level,
            "Event reactor registered"
        );
        Ok(())
    }

    /// Stop processing events and unsubscribe. No-op unless registered.
    ///
    /// Callbacks already in progress complete normally.
    pub fn unregister<S>(&self, source: &S) -> Result<(), AudioError>
    where
        S: NotificationSource + ?Sized,
    {
        let mut subscription = self.subscription.lock().unwrap_or_else(|e| e.into_inner());

        if self.state() != ReactorState::Registered {
            return Ok(());
        }

        self.state
            .store(ReactorState::Unregistered as u8, Ordering::Release);

        if let Some(handle) = subscription.take() {
            source.unsubscribe(handle)?;
        }

        info!("Event reactor unregistered");
        Ok(())
    }

    /// Handle one event. Never fails: errors are logged and reported in the outcome.
    pub fn handle_event(&self, event: DeviceChangeEvent) -> EventOutcome {
        if self.state() != ReactorState::Registered {
            trace!(?event, "Reactor not registered, event ignored");
            return EventOutcome::Ignored;
        }

        match event {
            DeviceChangeEvent::DefaultDeviceChanged {
                flow,
                role,
                device_id,
            } => {
                info!(
                    ?flow,
                    ?role,
                    device_id = device_id.as_ref().map(DeviceId::as_str).unwrap_or("<none>"),
                    "Default device changed"
                );

                // Flow is not filtered: any console-role change re-queries the render default
                if role != DeviceRole::Console {
                    return EventOutcome::Acknowledged;
                }

                match self.apply_default_change() {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!(error = %e, "Failed to handle default device change");
                        EventOutcome::Failed(e)
                    }
                }
            }
            DeviceChangeEvent::DeviceAdded { device_id } => {
                info!(device_id = %device_id, "Device added");
                EventOutcome::Acknowledged
            }
            DeviceChangeEvent::DeviceRemoved { device_id } => {
                info!(device_id = %device_id, "Device removed");
                EventOutcome::Acknowledged
            }
            DeviceChangeEvent::DeviceStateChanged {
                device_id,
                new_state,
            } => {
                trace!(device_id = %device_id, ?new_state, "Device state changed");
                EventOutcome::Acknowledged
            }
            DeviceChangeEvent::PropertyChanged { device_id, key } => {
                trace!(device_id = %device_id, key = %key, "Device property changed");
                EventOutcome::Acknowledged
            }
        }
    }

    /// Resolve the current default device and publish its name without acting on it.
    pub fn refresh_status(&self) -> Result<(), AudioError> {
        self.resolve_and_publish().map(|_| ())
    }

    fn apply_default_change(&self) -> Result<EventOutcome, AudioError> {
        let descriptor = self.resolve_and_publish()?;

        if !self.config.rule.matches(&descriptor.friendly_name) {
            debug!(
                name = %descriptor.friendly_name,
                rule = self.config.rule.fragment(),
                "Default device does not match"
            );
            return Ok(EventOutcome::NoMatch {
                device_id: descriptor.id,
            });
        }

        info!(
            name = %descriptor.friendly_name,
            level = %self.config.level,
            "Headphones detected, setting volume"
        );
        self.actuator
            .set_device_volume(&descriptor.id, self.config.level)?;

        Ok(EventOutcome::VolumeSet {
            device_id: descriptor.id,
        })
    }

    fn resolve_and_publish(&self) -> Result<crate::audio::DeviceDescriptor, AudioError> {
        match self.directory.resolve_default_render_descriptor() {
            Ok(descriptor) => {
                self.publish(StatusUpdate::DefaultDevice(
                    descriptor.friendly_name.clone(),
                ));
                Ok(descriptor)
            }
            Err(e) => {
                if e == AudioError::DeviceUnavailable {
                    self.publish(StatusUpdate::NoDevice);
                }
                Err(e)
            }
        }
    }

    fn publish(&self, update: StatusUpdate) {
        if let Some(status) = &self.status {
            status.publish(update);
        }
    }
}

impl<D, A> DeviceEventHandler for EventReactor<D, A>
where
    D: DeviceDirectory,
    A: VolumeActuator,
{
    fn on_event(&self, event: DeviceChangeEvent) {
        self.handle_event(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::mocks::{MockActuator, MockDirectory, MockNotificationSource};
    use crate::audio::DataFlow;

    fn reactor(
        directory: MockDirectory,
    ) -> (
        Arc<EventReactor<MockDirectory, MockActuator>>,
        Arc<MockActuator>,
    ) {
        let actuator = Arc::new(MockActuator::new());
        let reactor = Arc::new(EventReactor::new(
            Arc::new(directory),
            actuator.clone(),
            ReactorConfig::default(),
        ));
        (reactor, actuator)
    }

    fn console_change(id: &str) -> DeviceChangeEvent {
        DeviceChangeEvent::DefaultDeviceChanged {
            flow: DataFlow::Render,
            role: DeviceRole::Console,
            device_id: Some(DeviceId::from(id)),
        }
    }

    #[test]
    fn test_events_ignored_before_registration() {
        let (reactor, actuator) = reactor(MockDirectory::with_default("hp", "Headphones"));

        assert_eq!(reactor.state(), ReactorState::Uninitialized);
        assert_eq!(reactor.handle_event(console_change("hp")), EventOutcome::Ignored);
        assert!(actuator.calls().is_empty());
    }

    #[test]
    fn test_lifecycle_transitions() {
        let (reactor, _) = reactor(MockDirectory::new());
        let source = MockNotificationSource::new();

        reactor.register(&source).unwrap();
        assert_eq!(reactor.state(), ReactorState::Registered);
        assert_eq!(source.subscriber_count(), 1);

        reactor.unregister(&source).unwrap();
        assert_eq!(reactor.state(), ReactorState::Unregistered);
        assert_eq!(source.subscriber_count(), 0);

        // Unregistering again is a no-op, re-registering is refused
        reactor.unregister(&source).unwrap();
        assert!(matches!(
            reactor.register(&source),
            Err(AudioError::SubscriptionFailed { .. })
        ));
    }

    #[test]
    fn test_register_twice_is_refused() {
        let (reactor, _) = reactor(MockDirectory::new());
        let source = MockNotificationSource::new();

        reactor.register(&source).unwrap();
        let err = reactor.register(&source).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(source.subscriber_count(), 1);
    }

    #[test]
    fn test_subscription_failure_leaves_reactor_uninitialized() {
        let (reactor, _) = reactor(MockDirectory::new());
        let source = MockNotificationSource::new();
        source.set_subscribe_failure(true);

        let err = reactor.register(&source).unwrap_err();
        assert!(matches!(err, AudioError::SubscriptionFailed { .. }));
        assert_eq!(reactor.state(), ReactorState::Uninitialized);
    }

    #[test]
    fn test_events_ignored_after_unregistration() {
        let (reactor, actuator) = reactor(MockDirectory::with_default("hp", "Headphones"));
        let source = MockNotificationSource::new();

        reactor.register(&source).unwrap();
        reactor.unregister(&source).unwrap();

        assert_eq!(reactor.handle_event(console_change("hp")), EventOutcome::Ignored);
        assert!(actuator.calls().is_empty());
    }

    #[test]
    fn test_refresh_status_does_not_actuate() {
        let status = Arc::new(crate::audio::mocks::RecordingStatus::new());
        let actuator = Arc::new(MockActuator::new());
        let reactor = EventReactor::new(
            Arc::new(MockDirectory::with_default("hp", "Studio Headphones")),
            actuator.clone(),
            ReactorConfig::default(),
        )
        .with_status(status.clone());

        reactor.refresh_status().unwrap();

        assert_eq!(
            status.updates(),
            vec![StatusUpdate::DefaultDevice("Studio Headphones".to_string())]
        );
        assert!(actuator.calls().is_empty());
    }
}
