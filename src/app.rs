//! Application state and lifecycle management.
//!
//! Owns the COM apartment and the device enumerator binding, registers the
//! event reactor, and blocks until an interrupt or the tray "Exit" item.

use crate::audio::{
    AudioError, ComGuard, DeviceEnumerator, EndpointNotifications, VolumeController,
};
use crate::config::Settings;
use crate::platform::console;
use crate::reactor::EventReactor;
use crate::ui::status::{self, ChannelStatus, StatusUpdate, NO_DEVICE_LABEL};
use crate::ui::{TrayEvent, TrayManager};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use windows::Win32::UI::WindowsAndMessaging::{
    DispatchMessageW, PeekMessageW, TranslateMessage, MSG, PM_REMOVE,
};

/// How often the tray message loop wakes up.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

type Reactor = EventReactor<DeviceEnumerator, VolumeController>;

/// Why the host stopped waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Console interrupt (Ctrl+C, Ctrl+Break, window closed)
    Interrupt,

    /// "Exit" selected in the tray menu
    TrayExit,
}

/// Main application state.
///
/// Fields drop in declaration order: the reactor and notification clients
/// go first, COM is uninitialized last.
pub struct App {
    reactor: Arc<Reactor>,
    notifications: EndpointNotifications,
    tray: Option<TrayManager>,
    status_receiver: Option<Receiver<StatusUpdate>>,
    shutdown_receiver: Receiver<ShutdownReason>,
    // Kept so the channel never disconnects while the console handler is installed
    _shutdown_sender: Sender<ShutdownReason>,
    _enumerator: DeviceEnumerator,
    _com: ComGuard,
    stopped: bool,
}

impl App {
    /// Bind to the audio subsystem and register the reactor.
    ///
    /// Fails only with the fatal kinds: `InitializationFailed` or `SubscriptionFailed`.
    pub fn start(settings: Settings) -> Result<Self, AudioError> {
        let com = ComGuard::new()?;
        let enumerator = DeviceEnumerator::new()?;
        info!("Audio subsystem initialized");

        let (status, status_receiver) = ChannelStatus::new();
        let reactor = Arc::new(
            EventReactor::new(
                Arc::new(enumerator.clone()),
                Arc::new(VolumeController::new(enumerator.clone())),
                settings.reactor,
            )
            .with_status(Arc::new(status)),
        );

        let notifications = EndpointNotifications::new(enumerator.clone());
        reactor.register(&notifications)?;

        if let Err(e) = reactor.refresh_status() {
            warn!(error = %e, "Could not resolve the default render device");
        }

        let (shutdown_sender, shutdown_receiver) = channel();
        if let Err(e) = console::install_interrupt_handler(shutdown_sender.clone()) {
            warn!(error = %e, "Failed to install console interrupt handler");
        }

        let (tray, status_receiver) = if settings.show_tray {
            let label = status::latest(&status_receiver)
                .map(|update| update.label().to_string())
                .unwrap_or_else(|| NO_DEVICE_LABEL.to_string());

            let mut tray = TrayManager::new();
            match tray.create(&label) {
                Ok(()) => (Some(tray), Some(status_receiver)),
                Err(e) => {
                    warn!(error = %e, "Tray unavailable, continuing without it");
                    (None, None)
                }
            }
        } else {
            (None, None)
        };

        Ok(Self {
            reactor,
            notifications,
            tray,
            status_receiver,
            shutdown_receiver,
            _shutdown_sender: shutdown_sender,
            _enumerator: enumerator,
            _com: com,
            stopped: false,
        })
    }

    /// Block until a shutdown is requested.
    pub fn run(&mut self) -> ShutdownReason {
        info!("Waiting for device changes (Ctrl+C to quit)");

        if self.tray.is_none() {
            return self
                .shutdown_receiver
                .recv()
                .unwrap_or(ShutdownReason::Interrupt);
        }

        loop {
            pump_messages();
            self.update_tray();

            if let Some(TrayEvent::Exit) = self.tray.as_ref().and_then(TrayManager::poll_event) {
                info!("Exit selected from tray");
                return ShutdownReason::TrayExit;
            }

            match self.shutdown_receiver.recv_timeout(POLL_INTERVAL) {
                Ok(reason) => return reason,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return ShutdownReason::Interrupt,
            }
        }
    }

    /// Unregister the reactor and remove the tray. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;

        if let Err(e) = self.reactor.unregister(&self.notifications) {
            warn!(error = %e, "Failed to unregister event reactor");
        }

        if let Some(tray) = self.tray.as_mut() {
            tray.destroy();
        }
        info!("Done");
    }

    fn update_tray(&mut self) {
        let (Some(tray), Some(receiver)) = (self.tray.as_mut(), self.status_receiver.as_ref())
        else {
            return;
        };

        if let Some(update) = status::latest(receiver) {
            if let Err(e) = tray.set_device(update.label()) {
                warn!(error = %e, "Failed to update tray");
            }
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Dispatch pending window messages for the tray's hidden window.
fn pump_messages() {
    unsafe {
        let mut msg = MSG::default();
        while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
}
