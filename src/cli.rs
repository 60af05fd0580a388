//! CLI argument parsing and mode detection for the installer.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for forgekit-installer
#[derive(Parser, Clone)]
#[command(name = "forgekit-installer")]
#[command(version, about = "Install the ForgeKit desktop companion application")]
pub struct Cli {
    /// Install directory (skips the interactive path prompt)
    #[arg(long)]
    pub install_dir: Option<PathBuf>,

    /// Locale code, e.g. "english" or "schinese" (skips the language prompt)
    #[arg(long)]
    pub language: Option<String>,

    /// Non-interactive mode for automated/silent installs
    ///
    /// Runs with defaults for anything not given on the command line and
    /// never prompts.
    #[arg(long)]
    pub no_interaction: bool,

    /// Don't launch the application after installing
    #[arg(long)]
    pub no_launch: bool,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Whether to skip the interactive wizard entirely. Explicit
    /// `--no-interaction` always wins; supplying both the path and the
    /// language also counts, since there is nothing left to ask.
    pub fn non_interactive(&self) -> bool {
        self.no_interaction || (self.install_dir.is_some() && self.language.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_specified_args_skip_the_wizard() {
        let cli = Cli::parse_from([
            "forgekit-installer",
            "--install-dir",
            "/tmp/forgekit",
            "--language",
            "english",
        ]);
        assert!(cli.non_interactive());
    }

    #[test]
    fn partial_args_still_prompt() {
        let cli = Cli::parse_from(["forgekit-installer", "--language", "english"]);
        assert!(!cli.non_interactive());
        let cli = Cli::parse_from(["forgekit-installer", "--no-interaction"]);
        assert!(cli.non_interactive());
    }
}
