//! Best-effort launch of the user's browser once the server is up.

use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("unsupported operating system: {0}")]
    UnsupportedPlatform(&'static str),

    #[error("failed to launch browser: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Platform opener for `url`.
pub fn opener_command(url: &str) -> Result<Command, BrowserError> {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut command = Command::new("rundll32");
        command.arg("url.dll,FileProtocolHandler");
        command
    } else if cfg!(any(
        target_os = "linux",
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd",
        target_os = "dragonfly"
    )) {
        Command::new("xdg-open")
    } else {
        return Err(BrowserError::UnsupportedPlatform(std::env::consts::OS));
    };

    command
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    Ok(command)
}

/// Starts the opener without waiting for it to finish.
pub fn open(url: &str) -> Result<(), BrowserError> {
    opener_command(url)?.spawn()?;
    Ok(())
}

/// Opens `url` after `delay` unless `cancel` fires first. Failures are only logged.
pub fn spawn_open(url: String, delay: Duration, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("browser launch cancelled");
            }
            _ = tokio::time::sleep(delay) => {
                match open(&url) {
                    Ok(()) => debug!(%url, "browser launched"),
                    Err(err) => warn!(%url, "could not open browser: {}", err),
                }
            }
        }
    })
}
