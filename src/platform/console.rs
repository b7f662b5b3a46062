//! Console interrupt handling (Ctrl+C, Ctrl+Break, console close).

use crate::app::ShutdownReason;
use std::sync::mpsc::Sender;
use std::sync::OnceLock;
use tracing::{debug, info};
use windows::Win32::Foundation::{BOOL, FALSE, TRUE};
use windows::Win32::System::Console::{
    SetConsoleCtrlHandler, CTRL_BREAK_EVENT, CTRL_CLOSE_EVENT, CTRL_C_EVENT,
};

static SHUTDOWN_SENDER: OnceLock<Sender<ShutdownReason>> = OnceLock::new();

/// Route console interrupts to `sender`. Only the first installed sender is used.
pub fn install_interrupt_handler(sender: Sender<ShutdownReason>) -> windows::core::Result<()> {
    if SHUTDOWN_SENDER.set(sender).is_err() {
        debug!("Console interrupt handler already installed");
        return Ok(());
    }

    unsafe { SetConsoleCtrlHandler(Some(console_ctrl_handler), true) }
}

unsafe extern "system" fn console_ctrl_handler(ctrl_type: u32) -> BOOL {
    match ctrl_type {
        CTRL_C_EVENT | CTRL_BREAK_EVENT | CTRL_CLOSE_EVENT => {
            info!(ctrl_type, "Received keyboard interrupt");
            if let Some(sender) = SHUTDOWN_SENDER.get() {
                let _ = sender.send(ShutdownReason::Interrupt);
            }
            TRUE
        }
        _ => FALSE,
    }
}
