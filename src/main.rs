use std::process::ExitCode;
use tracing::error;

use headphone_max_rs::logging;

fn main() -> ExitCode {
    logging::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(target_os = "windows")]
fn run() -> anyhow::Result<()> {
    use anyhow::Context;
    use headphone_max_rs::{App, Settings};
    use tracing::info;

    let mut app = App::start(Settings::default()).context("Startup failed")?;
    let reason = app.run();
    info!(?reason, "Shutting down");
    app.shutdown();

    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn run() -> anyhow::Result<()> {
    anyhow::bail!("headphone-max-rs requires the Windows Core Audio API")
}
