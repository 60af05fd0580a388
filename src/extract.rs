//! Archive extraction pipeline.
//!
//! Two formats: zip payloads are extracted natively, the runtime payload is
//! an opaque 7z container handed to an external decompression tool. Both go
//! through an `ExtractionPlan` built per archive immediately before
//! extraction and discarded after.
//!
//! Native extraction writes every ordinary entry to a temporary sibling
//! (`<dest>-`) and renames it over the final path, so an interrupted install
//! never leaves a half-written file under its real name. The sentinel entry
//! is the exception: it is buffered whole to produce both the plaintext
//! destination file and the obfuscated backup copy.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use log::{debug, info};
use zip::ZipArchive;

use crate::error::ExtractionError;
use crate::manifest::{BACKUP_SUFFIX, SEVENZIP_EXE, SEVENZIP_SYSTEM};
use crate::obfuscate::ObfuscationCodec;

/// Dual-output rule for the primary executable: plaintext at its resolved
/// destination plus an obfuscated copy at `<backup_dir>/<name>.bak`.
#[derive(Debug, Clone)]
pub struct SentinelRule {
    pub entry_name: &'static str,
    pub backup_dir: PathBuf,
    pub codec: ObfuscationCodec,
}

/// Per-archive extraction instructions. Transient; one per archive.
#[derive(Debug, Clone)]
pub struct ExtractionPlan {
    pub archive_path: PathBuf,
    pub dest_dir: PathBuf,
    pub rename_map: Option<HashMap<String, String>>,
    pub sentinel: Option<SentinelRule>,
}

impl ExtractionPlan {
    pub fn new(archive_path: impl Into<PathBuf>, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            archive_path: archive_path.into(),
            dest_dir: dest_dir.into(),
            rename_map: None,
            sentinel: None,
        }
    }

    pub fn with_renames<I, S>(mut self, renames: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        self.rename_map = Some(
            renames
                .into_iter()
                .map(|(from, to)| (from.into(), to.into()))
                .collect(),
        );
        self
    }

    pub fn with_sentinel(mut self, rule: SentinelRule) -> Self {
        self.sentinel = Some(rule);
        self
    }

    fn resolve_name<'a>(&'a self, original: &'a str) -> &'a str {
        self.rename_map
            .as_ref()
            .and_then(|map| map.get(original))
            .map(String::as_str)
            .unwrap_or(original)
    }
}

/// Extract a zip archive according to `plan`. Fail-fast: the first failing
/// entry aborts the remainder of the archive. The staged source archive is
/// deleted on success; it was copied out of an immutable embedded payload
/// and has no further use.
pub fn extract_zip(plan: &ExtractionPlan) -> Result<(), ExtractionError> {
    let file = File::open(&plan.archive_path).map_err(|err| ExtractionError::Open {
        path: plan.archive_path.clone(),
        source: err.into(),
    })?;
    let mut archive = ZipArchive::new(file).map_err(|err| ExtractionError::Open {
        path: plan.archive_path.clone(),
        source: err,
    })?;

    fs::create_dir_all(&plan.dest_dir).map_err(|err| ExtractionError::CreateDir {
        path: plan.dest_dir.clone(),
        source: err,
    })?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|err| ExtractionError::Entry {
            name: format!("#{index}"),
            source: err,
        })?;
        let original_name = entry.name().to_string();
        let out_path = safe_join(&plan.dest_dir, plan.resolve_name(&original_name))?;

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|err| ExtractionError::CreateDir {
                path: out_path,
                source: err,
            })?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|err| ExtractionError::CreateDir {
                path: parent.to_path_buf(),
                source: err,
            })?;
        }

        if let Some(rule) = plan
            .sentinel
            .as_ref()
            .filter(|rule| rule.entry_name == original_name)
        {
            write_sentinel(&mut entry, &original_name, &out_path, rule)?;
            continue;
        }

        // temp sibling first, then an atomic rename over the final name
        let tmp_path = temp_sibling(&out_path);
        let mut out = File::create(&tmp_path).map_err(|err| ExtractionError::Write {
            path: tmp_path.clone(),
            source: err,
        })?;
        io::copy(&mut entry, &mut out).map_err(|err| ExtractionError::Write {
            path: tmp_path.clone(),
            source: err,
        })?;
        drop(out);
        fs::rename(&tmp_path, &out_path).map_err(|err| ExtractionError::Rename {
            path: out_path,
            source: err,
        })?;
    }

    drop(archive);
    if let Err(err) = fs::remove_file(&plan.archive_path) {
        debug!(
            "staged archive {} not removed: {err}",
            plan.archive_path.display()
        );
    }
    Ok(())
}

fn write_sentinel(
    entry: &mut impl Read,
    original_name: &str,
    out_path: &Path,
    rule: &SentinelRule,
) -> Result<(), ExtractionError> {
    let mut plaintext = Vec::new();
    entry
        .read_to_end(&mut plaintext)
        .map_err(|err| ExtractionError::Write {
            path: out_path.to_path_buf(),
            source: err,
        })?;

    let backup_path = rule
        .backup_dir
        .join(format!("{original_name}{BACKUP_SUFFIX}"));
    if let Some(parent) = backup_path.parent() {
        fs::create_dir_all(parent).map_err(|err| ExtractionError::CreateDir {
            path: parent.to_path_buf(),
            source: err,
        })?;
    }
    fs::write(&backup_path, rule.codec.transform(&plaintext)).map_err(|err| {
        ExtractionError::Write {
            path: backup_path.clone(),
            source: err,
        }
    })?;
    info!("sentinel backup written to {}", backup_path.display());

    fs::write(out_path, &plaintext).map_err(|err| ExtractionError::Write {
        path: out_path.to_path_buf(),
        source: err,
    })
}

/// Resolve the decompression tool: the copy freshly extracted into the
/// install dir wins, a system-wide one on PATH is the fallback.
pub fn resolve_tool(install_dir: &Path) -> Result<PathBuf, ExtractionError> {
    let bundled = install_dir.join(SEVENZIP_EXE);
    if bundled.exists() {
        return Ok(bundled);
    }
    which::which(SEVENZIP_SYSTEM).map_err(|_| ExtractionError::ToolMissing)
}

/// Extract an opaque archive by invoking the external tool: overwrite
/// without prompting, multi-threaded, no empty-directory side effects. A
/// non-zero exit or a spawn failure is fatal, same as a native extraction
/// failure.
pub async fn extract_with_tool(
    archive_path: &Path,
    dest_dir: &Path,
    tool: &Path,
) -> Result<(), ExtractionError> {
    let mut command = tokio::process::Command::new(tool);
    command
        .arg("x")
        .arg(archive_path)
        .arg(format!("-o{}", dest_dir.display()))
        .args(["-y", "-mmt=on", "-aos"]);
    #[cfg(windows)]
    command.creation_flags(0x0800_0000); // CREATE_NO_WINDOW

    let status = command
        .status()
        .await
        .map_err(|err| ExtractionError::ToolLaunch {
            tool: tool.to_path_buf(),
            source: err,
        })?;
    if !status.success() {
        return Err(ExtractionError::ToolFailed {
            tool: tool.to_path_buf(),
            code: status.code(),
        });
    }

    if let Err(err) = fs::remove_file(archive_path) {
        debug!("staged archive {} not removed: {err}", archive_path.display());
    }
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push("-");
    path.with_file_name(name)
}

/// Join an archive entry name onto the destination, rejecting names that
/// would escape it.
fn safe_join(dest_dir: &Path, name: &str) -> Result<PathBuf, ExtractionError> {
    let relative = Path::new(name);
    let mut resolved = dest_dir.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            _ => {
                return Err(ExtractionError::UnsafePath {
                    name: name.to_string(),
                })
            }
        }
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_sibling_appends_dash_to_file_name() {
        assert_eq!(
            temp_sibling(Path::new("/x/locales/en-US.pak")),
            Path::new("/x/locales/en-US.pak-")
        );
    }

    #[test]
    fn safe_join_rejects_escapes() {
        let dest = Path::new("/install");
        assert_eq!(
            safe_join(dest, "sub/file.txt").unwrap(),
            Path::new("/install/sub/file.txt")
        );
        assert!(safe_join(dest, "../evil.txt").is_err());
        assert!(safe_join(dest, "/etc/passwd").is_err());
    }

    #[test]
    fn plan_resolves_renames_with_fallback() {
        let plan = ExtractionPlan::new("/tmp/a.zip", "/tmp/out")
            .with_renames([("hid.dat.xor", "hid.dat")]);
        assert_eq!(plan.resolve_name("hid.dat.xor"), "hid.dat");
        assert_eq!(plan.resolve_name("other.bin"), "other.bin");
    }
}
