//! Desktop launch shortcut creation.
//!
//! Dispatched as a detached task after the main extraction sequence; a
//! failure here never aborts the install, it surfaces as a separate warning
//! because the application files are already in place.

use std::path::{Path, PathBuf};

use crate::error::{InstallError, Result};

pub trait ShortcutFactory: Send + Sync {
    /// Create a desktop shortcut named `display_name` pointing at
    /// `target_executable`.
    fn create(&self, display_name: &str, target_executable: &Path) -> Result<()>;
}

/// `ShortcutFactory` writing into the user's desktop directory: a `.lnk`
/// link on Windows, an XDG `.desktop` entry elsewhere.
pub struct DesktopShortcutFactory {
    desktop_dir: Option<PathBuf>,
}

impl DesktopShortcutFactory {
    pub fn new(desktop_dir: Option<PathBuf>) -> Self {
        Self { desktop_dir }
    }

    fn desktop_dir(&self) -> Result<&Path> {
        self.desktop_dir
            .as_deref()
            .ok_or_else(|| InstallError::Shortcut {
                reason: "no desktop directory on this host".to_string(),
            })
    }
}

impl ShortcutFactory for DesktopShortcutFactory {
    #[cfg(windows)]
    fn create(&self, display_name: &str, target_executable: &Path) -> Result<()> {
        let link_path = self.desktop_dir()?.join(format!("{display_name}.lnk"));
        let link = mslnk::ShellLink::new(target_executable).map_err(|err| {
            InstallError::Shortcut {
                reason: err.to_string(),
            }
        })?;
        link.create_lnk(&link_path)
            .map_err(|err| InstallError::Shortcut {
                reason: err.to_string(),
            })
    }

    #[cfg(not(windows))]
    fn create(&self, display_name: &str, target_executable: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let entry_path = self.desktop_dir()?.join(format!("{display_name}.desktop"));
        let entry = format!(
            "[Desktop Entry]\nType=Application\nName={display_name}\nExec={}\nTerminal=false\n",
            target_executable.display()
        );
        std::fs::write(&entry_path, entry).map_err(|err| InstallError::Shortcut {
            reason: err.to_string(),
        })?;
        let mut perms = std::fs::metadata(&entry_path)
            .map_err(|err| InstallError::Shortcut {
                reason: err.to_string(),
            })?
            .permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&entry_path, perms).map_err(|err| InstallError::Shortcut {
            reason: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_desktop_dir_is_reported_not_panicked() {
        let factory = DesktopShortcutFactory::new(None);
        let err = factory
            .create("ForgeKit", Path::new("/opt/forgekit/ForgeKitWin64.exe"))
            .unwrap_err();
        assert!(matches!(err, InstallError::Shortcut { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn desktop_entry_points_at_target() {
        let dir = tempfile::tempdir().unwrap();
        let factory = DesktopShortcutFactory::new(Some(dir.path().to_path_buf()));
        factory
            .create("ForgeKit", Path::new("/opt/forgekit/ForgeKitWin64.exe"))
            .unwrap();

        let written = std::fs::read_to_string(dir.path().join("ForgeKit.desktop")).unwrap();
        assert!(written.contains("Name=ForgeKit"));
        assert!(written.contains("Exec=/opt/forgekit/ForgeKitWin64.exe"));
    }
}
