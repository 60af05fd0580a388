//! One-shot privilege escalation by relaunching the installer elevated.
//!
//! Success means the operating system accepted the launch request, not that
//! the user approved it; the replacement process runs the whole sequence
//! again from the top. The caller must exit immediately after a successful
//! request so the two instances never race on the target directory.

use std::path::Path;
use std::process::Command;

use log::info;

use crate::error::{InstallError, Result};

/// Escalation seam. Attempted exactly once, only in response to a
/// directory-creation failure.
pub trait Elevator: Send + Sync {
    fn relaunch_elevated(&self) -> Result<()>;
}

/// `Elevator` that relaunches the current executable with elevated rights
/// through the platform's escalation broker.
pub struct SelfElevator;

impl Elevator for SelfElevator {
    fn relaunch_elevated(&self) -> Result<()> {
        let exe = std::env::current_exe()
            .and_then(|path| path.canonicalize())
            .map_err(|err| InstallError::ElevationDeclined {
                reason: format!("cannot resolve installer path: {err}"),
            })?;
        info!("requesting elevated relaunch of {}", exe.display());
        spawn_elevated(&exe)
    }
}

#[cfg(unix)]
fn spawn_elevated(exe: &Path) -> Result<()> {
    let broker = which::which("pkexec").map_err(|_| InstallError::ElevationDeclined {
        reason: "pkexec is not available".to_string(),
    })?;
    Command::new(broker)
        .arg(exe)
        .spawn()
        .map(|_| ())
        .map_err(|err| InstallError::ElevationDeclined {
            reason: err.to_string(),
        })
}

#[cfg(windows)]
fn spawn_elevated(exe: &Path) -> Result<()> {
    // Start-Process -Verb RunAs raises the UAC prompt for the new instance.
    let command = format!(
        "Start-Process -FilePath '{}' -Verb RunAs",
        exe.display().to_string().replace('\'', "''")
    );
    Command::new("powershell")
        .args(["-NoProfile", "-ExecutionPolicy", "Bypass", "-Command", &command])
        .spawn()
        .map(|_| ())
        .map_err(|err| InstallError::ElevationDeclined {
            reason: err.to_string(),
        })
}
