//! Canonical names and embedded payloads for a ForgeKit install.
//!
//! Every fixed file name, process name and key salt the install sequence
//! touches lives here as a named constant. When the bundle layout changes,
//! update ONLY this module.

use std::borrow::Cow;
use std::time::Duration;

/// Display name used for the install directory and the desktop shortcut.
pub const APP_DISPLAY_NAME: &str = "ForgeKit";

/// The sentinel archive entry: extracted in plaintext to its destination and
/// additionally written as an obfuscated backup into the per-user data dir.
pub const PRIMARY_EXE: &str = "ForgeKit.exe";

/// GUI executable as named inside the app bundle archive.
pub const GUI_EXE: &str = "ForgeKitGui.exe";

/// Name the GUI executable is installed (and launched) under.
pub const GUI_EXE_INSTALLED: &str = "ForgeKitWin64.exe";

/// Executables that must not be running while the installer mutates files:
/// the ForgeKit client itself, the platform client and its helper process.
pub const GUARDED_PROCESSES: &[&str] = &["ForgeKit.exe", "steam.exe", "steamwebhelper.exe"];

/// Subdirectory of the install target preserved across re-installs.
pub const CACHE_DIR: &str = "webcache";

/// Stale runtime DLL replaced by the bundled runtime; removed before the
/// runtime stages when present.
pub const LEGACY_RUNTIME_DLL: &str = "chrome_elf.dll";

/// Temporary marker executables earlier installs may have left in the data
/// dir. Removed together with their `-` and `.bak` variants.
pub const TMP_MARKER_EXES: &[&str] = &["ForgeKit.tmp.exe", "ForgeKitGui.tmp.exe"];
pub const MARKER_SUFFIXES: &[&str] = &["", "-", ".bak"];

/// Per-user data subdirectory under the platform data root.
pub const DATA_SUBDIR: &str = "forgekit";

/// Obfuscated configuration file written into the data dir.
pub const CONFIG_FILE: &str = "config.json";

/// Salt prepended to the host name to derive the sentinel backup key.
pub const BACKUP_KEY_SALT: &str = "ForgeKitT00ls";

/// Suffix for the sentinel's obfuscated backup copy.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Entries of the user-data archive shipped obfuscation-suffixed and renamed
/// on extraction.
pub const USER_DATA_RENAMES: &[(&str, &str)] =
    &[("hid.dat.xor", "hid.dat"), ("hid64.dat.xor", "hid64.dat")];

/// Bundled decompression tool, extracted into the install dir by the
/// compression-tool stage.
pub const SEVENZIP_EXE: &str = "7z.exe";

/// System-wide fallback tool name resolved via PATH.
pub const SEVENZIP_SYSTEM: &str = "7z";

/// Staged on-disk names for the opaque payloads. `.dat` on purpose; the
/// staged copies are transient and deleted after extraction.
pub const STAGED_USER_DATA: &str = "appdata.zip";
pub const STAGED_TOOL: &str = "7z.dat";
pub const STAGED_RUNTIME: &str = "cef.dat";

/// Grace period between launching the installed application and exiting.
pub const LAUNCH_GRACE: Duration = Duration::from_secs(2);

/// Archive container formats the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Extracted natively.
    Zip,
    /// Opaque; handed to the external decompression tool.
    SevenZ,
}

/// One embedded archive payload. Read-only, bundled at build time.
#[derive(Debug, Clone)]
pub struct Payload {
    /// Logical name, used in log lines only.
    pub name: &'static str,
    pub format: ArchiveFormat,
    pub bytes: Cow<'static, [u8]>,
}

/// The complete payload bundle for one install attempt. Injectable so tests
/// can substitute constructed archives for the committed ones.
#[derive(Debug, Clone)]
pub struct PayloadSet {
    /// User-data archive, extracted into the per-user data dir.
    pub user_data: Payload,
    /// Application bundle: primary executable plus GUI.
    pub app_bundle: Payload,
    /// The decompression tool itself, zip-packed.
    pub compression_tool: Payload,
    /// Browser runtime, 7z-packed, extracted via the external tool.
    pub runtime: Payload,
    /// Default configuration, obfuscated with the host key before writing.
    pub default_config: Cow<'static, [u8]>,
}

impl PayloadSet {
    /// The payloads compiled into this installer binary.
    pub fn bundled() -> Self {
        Self {
            user_data: Payload {
                name: "user-data",
                format: ArchiveFormat::Zip,
                bytes: Cow::Borrowed(include_bytes!("../assets/payloads/appdata.zip")),
            },
            app_bundle: Payload {
                name: "app-bundle",
                format: ArchiveFormat::Zip,
                bytes: Cow::Borrowed(include_bytes!("../assets/payloads/forgekit-app.zip")),
            },
            compression_tool: Payload {
                name: "compression-tool",
                format: ArchiveFormat::Zip,
                bytes: Cow::Borrowed(include_bytes!("../assets/payloads/7z.zip")),
            },
            runtime: Payload {
                name: "runtime",
                format: ArchiveFormat::SevenZ,
                bytes: Cow::Borrowed(include_bytes!("../assets/payloads/cef-runtime.7z")),
            },
            default_config: Cow::Borrowed(include_bytes!("../assets/payloads/default-config.dat")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_payloads_are_present() {
        let set = PayloadSet::bundled();
        for payload in [
            &set.user_data,
            &set.app_bundle,
            &set.compression_tool,
            &set.runtime,
        ] {
            assert!(!payload.bytes.is_empty(), "{} payload is empty", payload.name);
        }
        assert!(!set.default_config.is_empty());
    }

    #[test]
    fn runtime_is_the_only_external_tool_payload() {
        let set = PayloadSet::bundled();
        assert_eq!(set.runtime.format, ArchiveFormat::SevenZ);
        assert_eq!(set.user_data.format, ArchiveFormat::Zip);
        assert_eq!(set.app_bundle.format, ArchiveFormat::Zip);
        assert_eq!(set.compression_tool.format, ArchiveFormat::Zip);
    }
}
