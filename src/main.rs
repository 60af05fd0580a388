use std::path::PathBuf;

use anyhow::Result;
use log::{error, info};

use forgekit_installer::cli::Cli;
use forgekit_installer::environment::Environment;
use forgekit_installer::locale::Catalog;
use forgekit_installer::orchestrator::{InstallConfig, InstallOutcome, Installer, NullLauncher};
use forgekit_installer::progress::{self, InstallEvent};
use forgekit_installer::{host, wizard};

fn main() {
    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .filter_level(log::LevelFilter::Warn)
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("FATAL: failed to create Tokio runtime: {err}");
            std::process::exit(1);
        }
    };
    match rt.block_on(real_main()) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            error!("{err:#}");
            std::process::exit(1);
        }
    }
}

async fn real_main() -> Result<i32> {
    let args = Cli::parse_args();
    let env = Environment::detect();
    let detected_locale = host::ui_language();

    let (catalog, config) = if args.non_interactive() {
        let locale_code = args
            .language
            .clone()
            .unwrap_or_else(|| detected_locale.clone());
        let catalog = Catalog::load(&locale_code);
        let target_dir: PathBuf = args
            .install_dir
            .clone()
            .unwrap_or_else(|| env.default_install_dir());
        (
            catalog,
            InstallConfig {
                target_dir,
                locale_code,
            },
        )
    } else {
        wizard::run_wizard(&env, &detected_locale)?
    };

    let (events, mut receiver) = progress::channel();
    let mut installer = Installer::new(config.clone(), env, catalog.clone(), events);
    if args.no_launch {
        installer = installer.with_launcher(Box::new(NullLauncher));
    }

    let install_task = tokio::spawn(async move { installer.run().await });

    // Drive the progress bar from install events. The shortcut result can
    // arrive after the main sequence is done; it only ever produces a
    // warning line, never a different outcome.
    let bar_catalog = catalog.clone();
    let ui_task = tokio::spawn(async move {
        let bar = indicatif::ProgressBar::new(100);
        if let Ok(style) = indicatif::ProgressStyle::default_bar()
            .template("[{bar:50.cyan/blue}] {pos:>3}%  {msg}")
        {
            bar.set_style(style.progress_chars("█▓░"));
        }
        while let Some(event) = receiver.recv().await {
            match event {
                InstallEvent::Progress(value) => bar.set_position(u64::from(value)),
                InstallEvent::ShortcutResult(Ok(())) => {
                    info!("desktop shortcut created");
                }
                InstallEvent::ShortcutResult(Err(reason)) => {
                    bar.suspend(|| wizard::show_shortcut_warning(&bar_catalog, &reason));
                }
            }
        }
        bar.finish_and_clear();
    });

    let outcome = install_task
        .await
        .unwrap_or_else(|err| InstallOutcome::Failure(format!("install task failed: {err}")));

    // The channel stays open until the detached shortcut task finishes;
    // give it a moment, then stop caring.
    let _ = tokio::time::timeout(std::time::Duration::from_secs(3), ui_task).await;

    match outcome {
        InstallOutcome::Success => {
            wizard::show_completion(&catalog, &config);
            Ok(0)
        }
        // an elevated instance owns the install now; get out of its way
        InstallOutcome::Handoff => Ok(0),
        InstallOutcome::Failure(message) => {
            wizard::show_failure(&catalog, &message);
            Ok(1)
        }
    }
}
