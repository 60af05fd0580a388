//! Host environment probing: install roots, the per-user data directory and
//! the system-drive check.
//!
//! Detected once at startup and passed into the orchestrator as a plain
//! value, so tests can point every path at a temp directory.

use std::path::{Path, PathBuf};

use crate::manifest::{APP_DISPLAY_NAME, DATA_SUBDIR};

#[derive(Debug, Clone)]
pub struct Environment {
    /// Default program-installation root the install-path prompt starts from.
    pub program_files: PathBuf,
    /// Private per-user data directory (`<data root>/forgekit`). Holds the
    /// obfuscated config, the sentinel backup and transient marker files.
    pub data_dir: PathBuf,
    /// Where the launch shortcut goes. `None` when the host has no desktop.
    pub desktop_dir: Option<PathBuf>,
    /// Drive prefix that requires elevation to write under, when the host
    /// reports one.
    pub system_drive: Option<String>,
}

impl Environment {
    pub fn detect() -> Self {
        let system_drive = std::env::var("SystemDrive").ok();
        Self {
            program_files: detect_program_files(system_drive.as_deref()),
            data_dir: detect_data_root().join(DATA_SUBDIR),
            desktop_dir: dirs::desktop_dir()
                .or_else(|| dirs::home_dir().map(|home| home.join("Desktop"))),
            system_drive,
        }
    }

    /// Default install directory offered by the path prompt.
    pub fn default_install_dir(&self) -> PathBuf {
        self.program_files.join(APP_DISPLAY_NAME)
    }

    /// Whether `path` sits on the system drive and therefore likely needs
    /// elevated rights to write.
    pub fn is_system_path(&self, path: &Path) -> bool {
        match &self.system_drive {
            Some(drive) => path.to_string_lossy().starts_with(drive.as_str()),
            None => false,
        }
    }
}

fn detect_data_root() -> PathBuf {
    // APPDATA takes precedence so a relocated profile is honored; the
    // platform data dir is the normal case.
    if let Ok(appdata) = std::env::var("APPDATA") {
        if !appdata.is_empty() {
            return PathBuf::from(appdata);
        }
    }
    dirs::data_dir().unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(windows)]
fn detect_program_files(system_drive: Option<&str>) -> PathBuf {
    let program_files = std::env::var("ProgramFiles")
        .unwrap_or_else(|_| String::from(r"C:\Program Files"));

    // Prefer a non-system drive when one exists, keeping the directory name.
    if let Some(drive) = system_drive {
        if program_files.starts_with(drive) {
            for letter in ('D'..='Z').map(|c| format!("{c}:")) {
                if letter.eq_ignore_ascii_case(drive) {
                    continue;
                }
                if Path::new(&format!("{letter}\\")).exists() {
                    return PathBuf::from(program_files.replacen(drive, &letter, 1));
                }
            }
        }
    }
    PathBuf::from(program_files)
}

#[cfg(not(windows))]
fn detect_program_files(_system_drive: Option<&str>) -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".local").join("opt"))
        .unwrap_or_else(|| PathBuf::from("/usr/local"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with_drive(drive: Option<&str>) -> Environment {
        Environment {
            program_files: PathBuf::from("/tmp/pf"),
            data_dir: PathBuf::from("/tmp/data"),
            desktop_dir: None,
            system_drive: drive.map(String::from),
        }
    }

    #[test]
    fn system_path_check_uses_drive_prefix() {
        let env = env_with_drive(Some("C:"));
        assert!(env.is_system_path(Path::new(r"C:\Program Files\ForgeKit")));
        assert!(!env.is_system_path(Path::new(r"D:\Games\ForgeKit")));
    }

    #[test]
    fn no_system_drive_means_no_elevation_hint() {
        let env = env_with_drive(None);
        assert!(!env.is_system_path(Path::new("/opt/forgekit")));
    }

    #[test]
    fn default_install_dir_appends_app_name() {
        let env = env_with_drive(None);
        assert_eq!(
            env.default_install_dir(),
            PathBuf::from("/tmp/pf").join("ForgeKit")
        );
    }
}
