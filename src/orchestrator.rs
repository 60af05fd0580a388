//! Install orchestration.
//!
//! The sequence is a linear state machine with no branching back:
//! `Cleaning → DirectoryReady → ProcessCheck → ConfigWritten → four archive
//! stages → ShortcutRequested → Launched → Done`. Any step can fail into the
//! terminal `Failure` outcome; the directory step is the one exception and
//! first attempts a single elevated relaunch. Transition order and progress
//! checkpoints are plain data on `Step`, separate from the effectful
//! executor, so the machine shape is testable on its own.
//!
//! The whole sequence runs on one background task. The only concurrency is
//! the detached shortcut task, whose result arrives on the event channel as
//! its own notification and is never joined here.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info, warn};

use crate::environment::Environment;
use crate::error::InstallError;
use crate::escalate::{Elevator, SelfElevator};
use crate::extract::{self, ExtractionPlan, SentinelRule};
use crate::locale::Catalog;
use crate::manifest::{self, ArchiveFormat, Payload, PayloadSet};
use crate::obfuscate::ObfuscationCodec;
use crate::process_guard::{ProcessProbe, SystemProcessGuard, first_running};
use crate::progress::{EventSender, InstallEvent, ProgressState};
use crate::shortcut::{DesktopShortcutFactory, ShortcutFactory};

/// Immutable per-attempt configuration, created once at UI-action time.
#[derive(Debug, Clone)]
pub struct InstallConfig {
    pub target_dir: PathBuf,
    pub locale_code: String,
}

/// Terminal result of one install attempt. `Handoff` means an elevated
/// instance was launched and this process must exit 0 immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Success,
    Handoff,
    Failure(String),
}

/// The four archive stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    UserData,
    AppBundle,
    CompressionTool,
    Runtime,
}

/// One state of the install sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Cleaning,
    DirectoryReady,
    ProcessCheck,
    ConfigWritten,
    Stage(StageKind),
    ShortcutRequested,
    Launched,
    Done,
}

impl Step {
    pub fn first() -> Self {
        Step::Cleaning
    }

    /// Successor state; `None` terminates the machine.
    pub fn next(self) -> Option<Self> {
        use StageKind::*;
        match self {
            Step::Cleaning => Some(Step::DirectoryReady),
            Step::DirectoryReady => Some(Step::ProcessCheck),
            Step::ProcessCheck => Some(Step::ConfigWritten),
            Step::ConfigWritten => Some(Step::Stage(UserData)),
            Step::Stage(UserData) => Some(Step::Stage(AppBundle)),
            Step::Stage(AppBundle) => Some(Step::Stage(CompressionTool)),
            Step::Stage(CompressionTool) => Some(Step::Stage(Runtime)),
            Step::Stage(Runtime) => Some(Step::ShortcutRequested),
            Step::ShortcutRequested => Some(Step::Launched),
            Step::Launched => Some(Step::Done),
            Step::Done => None,
        }
    }

    /// Progress checkpoint emitted after this step completes.
    pub fn checkpoint(self) -> Option<u8> {
        use StageKind::*;
        match self {
            Step::Cleaning => Some(2),
            Step::DirectoryReady => Some(6),
            Step::ProcessCheck => Some(10),
            Step::ConfigWritten => Some(20),
            Step::Stage(UserData) => Some(30),
            Step::Stage(AppBundle) => Some(40),
            Step::Stage(CompressionTool) => Some(50),
            Step::Stage(Runtime) => Some(60),
            Step::ShortcutRequested => None,
            Step::Launched => Some(100),
            Step::Done => None,
        }
    }
}

/// Launches the installed application. Seam so silent installs and tests can
/// skip the real spawn.
pub trait AppLauncher: Send + Sync {
    fn launch(&self, executable: &Path, locale_code: &str) -> crate::error::Result<()>;
}

/// Spawns the application detached with the locale and first-run flags.
pub struct DetachedLauncher;

impl AppLauncher for DetachedLauncher {
    fn launch(&self, executable: &Path, locale_code: &str) -> crate::error::Result<()> {
        std::process::Command::new(executable)
            .arg(format!("--language={locale_code}"))
            .arg("--first-run")
            .spawn()
            .map(|_| ())
            .map_err(|err| InstallError::Io {
                op: "launch",
                path: executable.to_path_buf(),
                source: err,
            })
    }
}

/// Logs instead of launching; selected by `--no-launch`.
pub struct NullLauncher;

impl AppLauncher for NullLauncher {
    fn launch(&self, executable: &Path, _locale_code: &str) -> crate::error::Result<()> {
        info!("launch of {} skipped", executable.display());
        Ok(())
    }
}

enum StepFailure {
    Fatal(String),
    Handoff,
}

/// Drives one install attempt end to end.
pub struct Installer {
    config: InstallConfig,
    env: Environment,
    catalog: Catalog,
    payloads: PayloadSet,
    host: String,
    guard: Box<dyn ProcessProbe>,
    elevator: Box<dyn Elevator>,
    shortcuts: Arc<dyn ShortcutFactory>,
    launcher: Box<dyn AppLauncher>,
    events: EventSender,
}

impl Installer {
    pub fn new(config: InstallConfig, env: Environment, catalog: Catalog, events: EventSender) -> Self {
        let shortcuts: Arc<dyn ShortcutFactory> =
            Arc::new(DesktopShortcutFactory::new(env.desktop_dir.clone()));
        Self {
            config,
            env,
            catalog,
            payloads: PayloadSet::bundled(),
            host: crate::host::host_name(),
            guard: Box::new(SystemProcessGuard),
            elevator: Box::new(SelfElevator),
            shortcuts,
            launcher: Box::new(DetachedLauncher),
            events,
        }
    }

    pub fn with_payloads(mut self, payloads: PayloadSet) -> Self {
        self.payloads = payloads;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_guard(mut self, guard: Box<dyn ProcessProbe>) -> Self {
        self.guard = guard;
        self
    }

    pub fn with_elevator(mut self, elevator: Box<dyn Elevator>) -> Self {
        self.elevator = elevator;
        self
    }

    pub fn with_shortcut_factory(mut self, shortcuts: Arc<dyn ShortcutFactory>) -> Self {
        self.shortcuts = shortcuts;
        self
    }

    pub fn with_launcher(mut self, launcher: Box<dyn AppLauncher>) -> Self {
        self.launcher = launcher;
        self
    }

    /// Run the sequence to a terminal outcome. Never panics out; every
    /// failure is composed into a localized user-facing message.
    pub async fn run(&self) -> InstallOutcome {
        info!(
            "installing to {} (locale {})",
            self.config.target_dir.display(),
            self.config.locale_code
        );
        let mut progress = ProgressState::new();
        let mut step = Step::first();
        loop {
            if let Err(failure) = self.execute(step).await {
                return match failure {
                    StepFailure::Handoff => InstallOutcome::Handoff,
                    StepFailure::Fatal(message) => {
                        warn!("install failed at {step:?}: {message}");
                        InstallOutcome::Failure(message)
                    }
                };
            }
            if let Some(checkpoint) = step.checkpoint() {
                let value = progress.advance(checkpoint);
                let _ = self.events.send(InstallEvent::Progress(value)).await;
            }
            step = match step.next() {
                Some(next) => next,
                None => return InstallOutcome::Success,
            };
        }
    }

    async fn execute(&self, step: Step) -> Result<(), StepFailure> {
        match step {
            Step::Cleaning => {
                self.clean_target();
                Ok(())
            }
            Step::DirectoryReady => self.ensure_target_dir(),
            Step::ProcessCheck => self.check_processes(),
            Step::ConfigWritten => {
                self.write_config();
                Ok(())
            }
            Step::Stage(kind) => self.run_stage(kind).await,
            Step::ShortcutRequested => {
                self.request_shortcut();
                Ok(())
            }
            Step::Launched => self.launch().await,
            Step::Done => Ok(()),
        }
    }

    /// Best-effort removal of everything in the target except the cache
    /// subdirectory. Idempotent; individual delete errors are ignored so a
    /// re-install over a broken tree still proceeds.
    fn clean_target(&self) {
        let Ok(entries) = fs::read_dir(&self.config.target_dir) else {
            return;
        };
        for entry in entries.flatten() {
            if entry.file_type().map(|kind| kind.is_dir()).unwrap_or(false) {
                if entry.file_name() == manifest::CACHE_DIR {
                    continue;
                }
                let _ = fs::remove_dir(entry.path());
            } else {
                let _ = fs::remove_file(entry.path());
            }
        }
    }

    fn ensure_target_dir(&self) -> Result<(), StepFailure> {
        match fs::create_dir_all(&self.config.target_dir) {
            Ok(()) => Ok(()),
            Err(err) => {
                let denied = InstallError::Permission {
                    path: self.config.target_dir.clone(),
                    source: err,
                };
                warn!("{denied}; attempting elevated relaunch");
                match self.elevator.relaunch_elevated() {
                    Ok(()) => {
                        info!("elevated instance launched, handing off");
                        Err(StepFailure::Handoff)
                    }
                    Err(elevation) => {
                        warn!("elevation unavailable: {elevation}");
                        Err(StepFailure::Fatal(format!(
                            "{} {} :{denied}",
                            self.catalog.text("Create Directory"),
                            self.catalog.text("Error"),
                        )))
                    }
                }
            }
        }
    }

    fn check_processes(&self) -> Result<(), StepFailure> {
        if let Some(name) = first_running(self.guard.as_ref(), manifest::GUARDED_PROCESSES) {
            let conflict = InstallError::ConflictingProcess {
                name: name.to_string(),
            };
            info!("{conflict}; aborting before any payload is written");
            return Err(StepFailure::Fatal(
                self.catalog
                    .text("Please exit the ForgeKit client and Steam before installing")
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Write the obfuscated default configuration. The one non-fatal write:
    /// the application regenerates its configuration on first run, so a
    /// failure here is logged and the install continues.
    fn write_config(&self) {
        if let Err(err) = fs::create_dir_all(&self.env.data_dir) {
            warn!("cannot create {}: {err}", self.env.data_dir.display());
        }
        let path = self.env.data_dir.join(manifest::CONFIG_FILE);
        match ObfuscationCodec::new(self.host.clone().into_bytes()) {
            Ok(codec) => {
                if let Err(err) = fs::write(&path, codec.transform(&self.payloads.default_config)) {
                    warn!(
                        "configuration not written to {}: {err}",
                        path.display()
                    );
                }
            }
            Err(err) => warn!("configuration obfuscation skipped: {err}"),
        }
    }

    async fn run_stage(&self, kind: StageKind) -> Result<(), StepFailure> {
        match kind {
            StageKind::UserData => {
                let renames: Vec<(String, String)> = manifest::USER_DATA_RENAMES
                    .iter()
                    .map(|(from, to)| (from.to_string(), to.to_string()))
                    .collect();
                self.stage_and_extract(
                    &self.payloads.user_data,
                    &self.env.data_dir,
                    manifest::STAGED_USER_DATA.to_string(),
                    Some(renames),
                )
                .await
            }
            StageKind::AppBundle => {
                let staged_name = format!("forgekit-app-{}.zip", unix_timestamp());
                let renames = vec![(
                    manifest::GUI_EXE.to_string(),
                    manifest::GUI_EXE_INSTALLED.to_string(),
                )];
                self.stage_and_extract(
                    &self.payloads.app_bundle,
                    &self.config.target_dir,
                    staged_name,
                    Some(renames),
                )
                .await
            }
            StageKind::CompressionTool => {
                // stale-artifact cleanup precedes the last two stages
                self.remove_stale_artifacts();
                self.stage_and_extract(
                    &self.payloads.compression_tool,
                    &self.config.target_dir,
                    manifest::STAGED_TOOL.to_string(),
                    None,
                )
                .await
            }
            StageKind::Runtime => {
                self.stage_and_extract(
                    &self.payloads.runtime,
                    &self.config.target_dir,
                    manifest::STAGED_RUNTIME.to_string(),
                    None,
                )
                .await
            }
        }
    }

    async fn stage_and_extract(
        &self,
        payload: &Payload,
        dest_dir: &Path,
        staged_name: String,
        renames: Option<Vec<(String, String)>>,
    ) -> Result<(), StepFailure> {
        let staged = self.stage_payload(payload, dest_dir, staged_name)?;
        match payload.format {
            ArchiveFormat::Zip => {
                let mut plan =
                    ExtractionPlan::new(&staged, dest_dir).with_sentinel(self.sentinel_rule());
                if let Some(renames) = renames {
                    plan = plan.with_renames(renames);
                }
                let result = tokio::task::spawn_blocking(move || extract::extract_zip(&plan)).await;
                match result {
                    Ok(Ok(())) => {
                        debug!("{} extracted into {}", payload.name, dest_dir.display());
                        Ok(())
                    }
                    Ok(Err(err)) => Err(StepFailure::Fatal(self.unzip_failure(
                        &staged,
                        &InstallError::from(err),
                        false,
                    ))),
                    Err(join) => Err(StepFailure::Fatal(self.unzip_failure(
                        &staged,
                        &InstallError::Task(join),
                        false,
                    ))),
                }
            }
            ArchiveFormat::SevenZ => {
                let tool = extract::resolve_tool(&self.config.target_dir).map_err(|err| {
                    StepFailure::Fatal(self.unzip_failure(&staged, &InstallError::from(err), true))
                })?;
                extract::extract_with_tool(&staged, dest_dir, &tool)
                    .await
                    .map_err(|err| {
                        StepFailure::Fatal(self.unzip_failure(&staged, &InstallError::from(err), true))
                    })?;
                debug!("{} extracted via {}", payload.name, tool.display());
                Ok(())
            }
        }
    }

    fn stage_payload(
        &self,
        payload: &Payload,
        dest_dir: &Path,
        staged_name: String,
    ) -> Result<PathBuf, StepFailure> {
        if let Err(err) = fs::create_dir_all(dest_dir) {
            return Err(StepFailure::Fatal(self.copy_failure(dest_dir, &err)));
        }
        let staged = dest_dir.join(staged_name);
        match fs::write(&staged, payload.bytes.as_ref()) {
            Ok(()) => {
                debug!(
                    "staged {} ({} bytes) at {}",
                    payload.name,
                    payload.bytes.len(),
                    staged.display()
                );
                Ok(staged)
            }
            Err(err) => Err(StepFailure::Fatal(self.copy_failure(&staged, &err))),
        }
    }

    fn remove_stale_artifacts(&self) {
        let legacy = self.config.target_dir.join(manifest::LEGACY_RUNTIME_DLL);
        if legacy.exists() {
            let _ = fs::remove_file(&legacy);
        }
        for marker in manifest::TMP_MARKER_EXES {
            for suffix in manifest::MARKER_SUFFIXES {
                let _ = fs::remove_file(self.env.data_dir.join(format!("{marker}{suffix}")));
            }
        }
    }

    fn sentinel_rule(&self) -> SentinelRule {
        SentinelRule {
            entry_name: manifest::PRIMARY_EXE,
            backup_dir: self.env.data_dir.clone(),
            codec: ObfuscationCodec::for_backup(&self.host),
        }
    }

    /// Fire the shortcut task and keep going. Its result comes back on the
    /// event channel as a `ShortcutResult`, possibly after the sequence has
    /// already reached its terminal state.
    fn request_shortcut(&self) {
        let factory = Arc::clone(&self.shortcuts);
        let events = self.events.clone();
        let target = self.config.target_dir.join(manifest::GUI_EXE_INSTALLED);
        tokio::spawn(async move {
            let result = factory
                .create(manifest::APP_DISPLAY_NAME, &target)
                .map_err(|err| err.to_string());
            let _ = events.send(InstallEvent::ShortcutResult(result)).await;
        });
    }

    async fn launch(&self) -> Result<(), StepFailure> {
        let executable = self.config.target_dir.join(manifest::GUI_EXE_INSTALLED);
        if let Err(err) = self.launcher.launch(&executable, &self.config.locale_code) {
            // files are installed either way; the user can start from the shortcut
            warn!("application launch failed: {err}");
        }
        tokio::time::sleep(manifest::LAUNCH_GRACE).await;
        Ok(())
    }

    fn copy_failure(&self, path: &Path, err: &dyn std::fmt::Display) -> String {
        format!(
            "{} {} {} {} :{err}\n{}",
            self.catalog.text("Copy"),
            self.catalog.text("File"),
            self.catalog.text("Error"),
            path.display(),
            self.catalog
                .text("You can try running the installer with administrator privileges"),
        )
    }

    fn unzip_failure(&self, path: &Path, err: &dyn std::fmt::Display, via_tool: bool) -> String {
        let marker = if via_tool { " (7z)" } else { "" };
        format!(
            "{} {} {}{marker} {} :{err}\n{}",
            self.catalog.text("Unzip"),
            self.catalog.text("File"),
            self.catalog.text("Error"),
            path.display(),
            self.catalog
                .text("You can try running the installer with administrator privileges"),
        )
    }
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn machine_is_linear_and_terminates() {
        let mut step = Step::first();
        let mut seen = vec![step];
        while let Some(next) = step.next() {
            step = next;
            seen.push(step);
        }
        assert_eq!(seen.first(), Some(&Step::Cleaning));
        assert_eq!(seen.last(), Some(&Step::Done));
        assert_eq!(seen.len(), 11);
    }

    #[test]
    fn checkpoints_are_monotonic_and_end_at_one_hundred() {
        let mut step = Step::first();
        let mut last = 0u8;
        let mut final_checkpoint = 0u8;
        loop {
            if let Some(value) = step.checkpoint() {
                assert!(value >= last, "checkpoint regressed at {step:?}");
                last = value;
                final_checkpoint = value;
            }
            match step.next() {
                Some(next) => step = next,
                None => break,
            }
        }
        assert_eq!(final_checkpoint, 100);
    }

    #[test]
    fn stages_run_in_bundle_order() {
        assert_eq!(
            Step::Stage(StageKind::UserData).next(),
            Some(Step::Stage(StageKind::AppBundle))
        );
        assert_eq!(
            Step::Stage(StageKind::AppBundle).next(),
            Some(Step::Stage(StageKind::CompressionTool))
        );
        assert_eq!(
            Step::Stage(StageKind::CompressionTool).next(),
            Some(Step::Stage(StageKind::Runtime))
        );
    }
}
