use headphone_max_rs::audio::mocks::{
    MockActuator, MockDirectory, MockNotificationSource, RecordingStatus,
};
use headphone_max_rs::audio::{DataFlow, DeviceState, PropertyKey};
use headphone_max_rs::{
    AudioError, DeviceChangeEvent, DeviceDescriptor, DeviceId, DeviceRole, EventOutcome,
    EventReactor, MatchRule, ReactorConfig, ReactorState, StatusUpdate, VolumeActuator,
    VolumeLevel,
};
use std::sync::Arc;
use std::thread;

/// Reactor wired to fakes and registered on a mock notification source
struct ReactorFixture {
    directory: Arc<MockDirectory>,
    actuator: Arc<MockActuator>,
    status: Arc<RecordingStatus>,
    source: MockNotificationSource,
    reactor: Arc<EventReactor<MockDirectory, MockActuator>>,
}

impl ReactorFixture {
    fn new() -> Self {
        Self::with_config(ReactorConfig::default())
    }

    fn with_config(config: ReactorConfig) -> Self {
        let directory = Arc::new(MockDirectory::new());
        let actuator = Arc::new(MockActuator::new());
        let status = Arc::new(RecordingStatus::new());
        let source = MockNotificationSource::new();

        let reactor = Arc::new(
            EventReactor::new(directory.clone(), actuator.clone(), config)
                .with_status(status.clone()),
        );
        reactor.register(&source).unwrap();

        Self {
            directory,
            actuator,
            status,
            source,
            reactor,
        }
    }

    fn set_default(&self, id: &str, name: &str) {
        self.directory
            .set_default(Some(DeviceDescriptor::new(id, name)));
    }
}

fn default_changed(flow: DataFlow, role: DeviceRole, id: &str) -> DeviceChangeEvent {
    DeviceChangeEvent::DefaultDeviceChanged {
        flow,
        role,
        device_id: Some(DeviceId::from(id)),
    }
}

#[test]
fn test_headphones_become_default_volume_maximized() {
    let fixture = ReactorFixture::new();
    fixture.set_default("{0.0.0.00000000}.{shanling}", "Shanling M3X Headphones");

    let outcome = fixture
        .reactor
        .handle_event(default_changed(DataFlow::Render, DeviceRole::Console, "X"));

    // The current default is acted on, not the id carried by the event
    let current = DeviceId::from("{0.0.0.00000000}.{shanling}");
    assert_eq!(
        outcome,
        EventOutcome::VolumeSet {
            device_id: current.clone()
        }
    );
    assert_eq!(fixture.actuator.calls(), vec![(current, VolumeLevel::MAX)]);
}

#[test]
fn test_speakers_become_default_no_volume_change() {
    let fixture = ReactorFixture::new();
    fixture.set_default("speakers", "Built-in Speakers");

    let outcome = fixture
        .reactor
        .handle_event(default_changed(DataFlow::Render, DeviceRole::Console, "Y"));

    assert_eq!(
        outcome,
        EventOutcome::NoMatch {
            device_id: DeviceId::from("speakers")
        }
    );
    assert!(fixture.actuator.calls().is_empty());
}

#[test]
fn test_non_console_roles_never_actuate() {
    let fixture = ReactorFixture::new();
    fixture.set_default("hp", "Studio Headphones");

    for role in [DeviceRole::Multimedia, DeviceRole::Communications] {
        for flow in [DataFlow::Render, DataFlow::Capture, DataFlow::All] {
            let outcome = fixture
                .reactor
                .handle_event(default_changed(flow, role, "hp"));
            assert_eq!(outcome, EventOutcome::Acknowledged);
        }
    }

    assert!(fixture.actuator.calls().is_empty());
    assert_eq!(fixture.directory.resolve_count(), 0);
}

#[test]
fn test_capture_flow_console_change_still_evaluated() {
    let fixture = ReactorFixture::new();
    fixture.set_default("hp", "USB Headphones");

    let outcome = fixture
        .reactor
        .handle_event(default_changed(DataFlow::Capture, DeviceRole::Console, "Z"));

    assert_eq!(
        outcome,
        EventOutcome::VolumeSet {
            device_id: DeviceId::from("hp")
        }
    );
    assert_eq!(fixture.actuator.calls().len(), 1);
}

#[test]
fn test_missing_event_device_id_still_resolves_current_default() {
    let fixture = ReactorFixture::new();
    fixture.set_default("hp", "Headphones (Realtek Audio)");

    let outcome = fixture
        .reactor
        .handle_event(DeviceChangeEvent::DefaultDeviceChanged {
            flow: DataFlow::Render,
            role: DeviceRole::Console,
            device_id: None,
        });

    assert!(matches!(outcome, EventOutcome::VolumeSet { .. }));
}

#[test]
fn test_other_event_kinds_are_acknowledged_without_action() {
    let fixture = ReactorFixture::new();
    fixture.set_default("hp", "Headphones");

    let events = vec![
        DeviceChangeEvent::DeviceAdded {
            device_id: DeviceId::from("hp"),
        },
        DeviceChangeEvent::DeviceRemoved {
            device_id: DeviceId::from("hp"),
        },
        DeviceChangeEvent::DeviceStateChanged {
            device_id: DeviceId::from("hp"),
            new_state: DeviceState::Unplugged,
        },
        DeviceChangeEvent::PropertyChanged {
            device_id: DeviceId::from("hp"),
            key: PropertyKey {
                fmtid: 0xa45c254e_df1c_4efd_8020_67d146a850e0,
                pid: 14,
            },
        },
    ];

    for event in events {
        assert_eq!(fixture.reactor.handle_event(event), EventOutcome::Acknowledged);
    }

    assert_eq!(fixture.directory.resolve_count(), 0);
    assert!(fixture.actuator.calls().is_empty());
}

#[test]
fn test_actuator_is_idempotent() {
    let actuator = MockActuator::new();
    let device = DeviceId::from("hp");
    let half = VolumeLevel::new(0.5).unwrap();

    actuator.set_device_volume(&device, half).unwrap();
    let once = actuator.volume_of("hp");
    actuator.set_device_volume(&device, half).unwrap();

    assert_eq!(actuator.volume_of("hp"), once);
    assert_eq!(once, Some(half));
}

#[test]
fn test_directory_failure_does_not_stop_processing() {
    let fixture = ReactorFixture::new();
    fixture.set_default("hp", "Headphones");
    fixture.directory.fail_next(AudioError::DeviceUnavailable);

    let first = fixture
        .reactor
        .handle_event(default_changed(DataFlow::Render, DeviceRole::Console, "hp"));
    assert_eq!(first, EventOutcome::Failed(AudioError::DeviceUnavailable));
    assert_eq!(fixture.reactor.state(), ReactorState::Registered);

    let second = fixture
        .reactor
        .handle_event(default_changed(DataFlow::Render, DeviceRole::Console, "hp"));
    assert_eq!(
        second,
        EventOutcome::VolumeSet {
            device_id: DeviceId::from("hp")
        }
    );
    assert_eq!(fixture.actuator.calls().len(), 1);
}

#[test]
fn test_property_failure_is_event_scoped() {
    let fixture = ReactorFixture::new();
    fixture.set_default("hp", "Headphones");
    fixture.directory.fail_next(AudioError::PropertyUnavailable {
        device_id: DeviceId::from("hp"),
        reason: "GetValue failed".to_string(),
    });

    let outcome = fixture
        .reactor
        .handle_event(default_changed(DataFlow::Render, DeviceRole::Console, "hp"));

    match outcome {
        EventOutcome::Failed(e) => assert!(!e.is_fatal()),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(fixture.actuator.calls().is_empty());
    assert_eq!(fixture.reactor.state(), ReactorState::Registered);
}

#[test]
fn test_device_removed_mid_handling_reports_activation_failure() {
    let fixture = ReactorFixture::new();
    fixture.set_default("hp", "Headphones");
    fixture.actuator.remove_device("hp");

    let outcome = fixture
        .reactor
        .handle_event(default_changed(DataFlow::Render, DeviceRole::Console, "hp"));

    assert!(matches!(
        outcome,
        EventOutcome::Failed(AudioError::ActivationFailed { ref device_id, .. })
            if device_id.as_str() == "hp"
    ));
    assert_eq!(fixture.reactor.state(), ReactorState::Registered);

    // Device reconnects; the next event is the implicit retry
    fixture.actuator.restore_device("hp");
    let outcome = fixture
        .reactor
        .handle_event(default_changed(DataFlow::Render, DeviceRole::Console, "hp"));
    assert!(matches!(outcome, EventOutcome::VolumeSet { .. }));
    assert_eq!(fixture.actuator.volume_of("hp"), Some(VolumeLevel::MAX));
}

#[test]
fn test_events_delivered_through_subscription() {
    let fixture = ReactorFixture::new();
    fixture.set_default("hp", "Headphones");

    fixture
        .source
        .emit(default_changed(DataFlow::Render, DeviceRole::Console, "hp"));
    assert_eq!(fixture.actuator.calls().len(), 1);

    fixture.reactor.unregister(&fixture.source).unwrap();
    assert_eq!(fixture.source.subscriber_count(), 0);

    fixture
        .source
        .emit(default_changed(DataFlow::Render, DeviceRole::Console, "hp"));
    assert_eq!(fixture.actuator.calls().len(), 1);
}

#[test]
fn test_overlapping_callbacks_each_handled_once() {
    let fixture = Arc::new(ReactorFixture::new());
    fixture.set_default("hp", "Headphones");

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let fixture = fixture.clone();
            thread::spawn(move || {
                for _ in 0..25 {
                    fixture
                        .source
                        .emit(default_changed(DataFlow::Render, DeviceRole::Console, "hp"));
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(fixture.actuator.calls().len(), 200);
    assert_eq!(fixture.directory.resolve_count(), 200);
    assert_eq!(fixture.reactor.state(), ReactorState::Registered);
}

#[test]
fn test_status_receives_resolved_names() {
    let fixture = ReactorFixture::new();

    fixture
        .reactor
        .handle_event(default_changed(DataFlow::Render, DeviceRole::Console, "gone"));
    fixture.set_default("spk", "Built-in Speakers");
    fixture
        .reactor
        .handle_event(default_changed(DataFlow::Render, DeviceRole::Console, "spk"));

    assert_eq!(
        fixture.status.updates(),
        vec![
            StatusUpdate::NoDevice,
            StatusUpdate::DefaultDevice("Built-in Speakers".to_string()),
        ]
    );
}

#[test]
fn test_match_rule_is_swappable() {
    let fixture = ReactorFixture::with_config(ReactorConfig {
        rule: MatchRule::new("Shanling"),
        level: VolumeLevel::new(0.8).unwrap(),
    });

    fixture.set_default("ua2", "Speakers (SHANLING UA2)");
    fixture
        .reactor
        .handle_event(default_changed(DataFlow::Render, DeviceRole::Console, "ua2"));

    fixture.set_default("hp", "Studio Headphones");
    fixture
        .reactor
        .handle_event(default_changed(DataFlow::Render, DeviceRole::Console, "hp"));

    assert_eq!(
        fixture.actuator.calls(),
        vec![(DeviceId::from("ua2"), VolumeLevel::new(0.8).unwrap())]
    );
}
