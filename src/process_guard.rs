//! Conflicting-process detection.
//!
//! The install sequence refuses to run while the ForgeKit client or the
//! platform client is alive; overwriting executables under a live process
//! is how half-broken installs happen. The check is a snapshot, not a lock:
//! it runs after directory setup and before the first payload write.

use sysinfo::System;

/// Process-table lookup seam. The production implementation snapshots the
/// live process list; tests substitute a fixed table.
pub trait ProcessProbe: Send + Sync {
    /// Case-insensitive exact match against running process names.
    fn is_running(&self, process_name: &str) -> bool;
}

/// `ProcessProbe` backed by the operating system's process table.
pub struct SystemProcessGuard;

impl ProcessProbe for SystemProcessGuard {
    fn is_running(&self, process_name: &str) -> bool {
        let mut sys = System::new();
        sys.refresh_processes();
        sys.processes()
            .values()
            .any(|process| process.name().eq_ignore_ascii_case(process_name))
    }
}

/// First guarded name that is currently running, if any.
pub fn first_running<'a>(probe: &dyn ProcessProbe, names: &'a [&'a str]) -> Option<&'a str> {
    names.iter().copied().find(|name| probe.is_running(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedTable(Vec<&'static str>);

    impl ProcessProbe for FixedTable {
        fn is_running(&self, process_name: &str) -> bool {
            self.0
                .iter()
                .any(|name| name.eq_ignore_ascii_case(process_name))
        }
    }

    #[test]
    fn match_is_case_insensitive_and_exact() {
        let table = FixedTable(vec!["Steam.exe", "explorer.exe"]);
        assert!(table.is_running("steam.exe"));
        assert!(table.is_running("STEAM.EXE"));
        assert!(!table.is_running("steam"));
    }

    #[test]
    fn first_running_respects_order() {
        let table = FixedTable(vec!["steamwebhelper.exe"]);
        let guarded = ["ForgeKit.exe", "steam.exe", "steamwebhelper.exe"];
        assert_eq!(first_running(&table, &guarded), Some("steamwebhelper.exe"));
        assert_eq!(first_running(&FixedTable(vec![]), &guarded), None);
    }

    #[test]
    fn system_probe_does_not_flag_a_nonsense_name() {
        assert!(!SystemProcessGuard.is_running("forgekit-definitely-not-running.exe"));
    }
}
