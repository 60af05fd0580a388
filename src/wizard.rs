//! Interactive installation wizard.
//!
//! Thin presentation glue: a banner, a language selector, an install-path
//! prompt and a confirmation. Every decision it collects goes into an
//! immutable `InstallConfig`; nothing here talks to the filesystem.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use inquire::{Confirm, Select, Text};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::environment::Environment;
use crate::locale::{self, Catalog};
use crate::manifest::APP_DISPLAY_NAME;
use crate::orchestrator::InstallConfig;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Display welcome banner
pub fn show_welcome(catalog: &Catalog) {
    let mut stdout = StandardStream::stdout(ColorChoice::Always);

    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)));
    let _ = writeln!(stdout, "\n{RULE}");
    let _ = stdout.reset();

    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
    let _ = writeln!(stdout, "\n                    F O R G E K I T");
    let _ = stdout.reset();

    let _ = writeln!(
        stdout,
        "\n              {} — {}",
        APP_DISPLAY_NAME,
        catalog.text("Installer")
    );

    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)));
    let _ = writeln!(stdout, "\n{RULE}\n");
    let _ = stdout.reset();
}

/// Run the interactive wizard. Returns the catalog for the chosen language
/// together with the immutable per-attempt configuration.
pub fn run_wizard(
    env: &Environment,
    detected_locale: &str,
) -> Result<(Catalog, InstallConfig)> {
    let catalog = Catalog::load(detected_locale);
    show_welcome(&catalog);

    let names = locale::language_names();
    let language = Select::new(catalog.text("Language"), names)
        .with_starting_cursor(locale::index_of_code(catalog.code()))
        .prompt()
        .map_err(|err| anyhow::anyhow!("prompt cancelled: {err}"))?;
    let locale_code = locale::code_for_language(language).to_string();

    // re-resolve so the remaining prompts speak the chosen language
    let catalog = Catalog::load(&locale_code);

    let default_dir = env.default_install_dir();
    let target = Text::new(&format!("{}:", catalog.text("Installer Path")))
        .with_default(&default_dir.to_string_lossy())
        .prompt()
        .map_err(|err| anyhow::anyhow!("prompt cancelled: {err}"))?;
    let target_dir = PathBuf::from(target.trim());

    if env.is_system_path(&target_dir) {
        let mut stdout = StandardStream::stdout(ColorChoice::Always);
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
        let _ = writeln!(
            stdout,
            "  {}",
            catalog.text("You can try running the installer with administrator privileges")
        );
        let _ = stdout.reset();
    }

    let proceed = Confirm::new(&format!("{}?", catalog.text("Install")))
        .with_default(true)
        .with_help_message(catalog.text("Please exit the ForgeKit client and Steam before installing"))
        .prompt()
        .map_err(|err| anyhow::anyhow!("prompt cancelled: {err}"))?;
    if !proceed {
        return Err(anyhow::anyhow!("installation cancelled by user"));
    }

    Ok((
        catalog,
        InstallConfig {
            target_dir,
            locale_code,
        },
    ))
}

/// Display installation completion summary
pub fn show_completion(catalog: &Catalog, config: &InstallConfig) {
    let mut stdout = StandardStream::stdout(ColorChoice::Always);

    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    let _ = writeln!(stdout, "\n✓ {}", catalog.text("Installation complete"));
    let _ = stdout.reset();

    let _ = writeln!(stdout, "  {}", config.target_dir.display());
    let _ = writeln!(stdout, "  {}", catalog.text("Please start from the desktop"));
}

/// Modal-style error report for a failed attempt.
pub fn show_failure(catalog: &Catalog, message: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Always);

    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = writeln!(stderr, "\n✗ {}", catalog.text("Error"));
    let _ = stderr.reset();
    let _ = writeln!(stderr, "{message}");
}

/// Non-fatal warning for a failed shortcut; the install itself succeeded.
pub fn show_shortcut_warning(catalog: &Catalog, reason: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Always);

    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
    let _ = writeln!(
        stderr,
        "⚠ {}: {reason}",
        catalog.text("Create Shortcut Fail")
    );
    let _ = stderr.reset();
}
