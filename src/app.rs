//! Application orchestrator.
//! Loads and merges config, initializes logging, installs the Ctrl+C handler,
//! checks preconditions, then runs the pipeline and maps the outcome to an exit status.

use anyhow::{Context, Result, anyhow};
use std::process::ExitCode;
use tracing::{debug, error, info, warn};

use photo_organizer::cli::Args;
use photo_organizer::config::{CONFIG_ENV, create_template_config, load_config_file};
use photo_organizer::output as out;
use photo_organizer::{
    CancellationToken, ExifTool, OrganizerError, RunSummary, default_config_path, process_files,
};

use crate::logging::init_tracing;

const INSTALL_HINTS: &[&str] = &[
    "Install exiftool and make sure it is on PATH:",
    "  macOS:         brew install exiftool",
    "  Debian/Ubuntu: sudo apt install libimage-exiftool-perl",
    "  Fedora:        sudo dnf install perl-Image-ExifTool",
    "  Windows:       https://exiftool.org",
    "Or point --exiftool (or <exiftool> in config.xml) at the executable.",
];

pub fn run(args: Args) -> ExitCode {
    match run_inner(&args) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            out::print_error(&format!("{e:#}"));
            ExitCode::from(1)
        }
    }
}

fn run_inner(args: &Args) -> Result<u8> {
    let cfg_path = default_config_path();

    if args.print_config {
        print_config_location(cfg_path.as_deref());
        return Ok(0);
    }
    if args.init_config {
        let path = cfg_path.ok_or_else(|| anyhow!("Could not determine a config location"))?;
        create_template_config(&path)?;
        out::print_success(&format!("Config template written to {}", path.display()));
        return Ok(0);
    }

    let load = load_config_file(cfg_path.as_deref())?;
    for w in &load.warnings {
        out::print_warn(w);
    }
    let mut cfg = load.config;
    args.apply_overrides(&mut cfg);

    let _guard = init_tracing(cfg.log_level, cfg.log_file.as_deref(), cfg.json).inspect_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {e}"));
    })?;
    if let Some(src) = &load.source {
        debug!(path = %src.display(), "loaded config file");
    }
    debug!(?cfg, "effective configuration");

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || {
            cancel.cancel();
            out::print_warn("Interrupted; letting moves in progress finish...");
        })
        .context("install Ctrl+C handler")?;
    }

    if let Err(e) = cfg.validate() {
        return Ok(precondition_failed(&e));
    }

    let tool = ExifTool::new(&cfg.exiftool)
        .with_batch_size(cfg.batch_size)
        .with_timeout(cfg.exiftool_timeout);
    match tool.check_available() {
        Ok(version) => info!(%version, "Using exiftool"),
        Err(e) => {
            let code = precondition_failed(&e);
            for hint in INSTALL_HINTS {
                info!("{hint}");
            }
            return Ok(code);
        }
    }

    if cfg.dry_run {
        info!("DRY RUN: no files will be moved");
    }
    info!(input = %cfg.input.display(), output = %cfg.output.display(), "Organizing photos");

    let summary = process_files(&cfg, &tool, &cancel)?;
    report(&summary);
    Ok(summary.exit_code())
}

fn precondition_failed(e: &OrganizerError) -> u8 {
    error!(code = e.code(), "{e}");
    1
}

fn report(summary: &RunSummary) {
    if summary.interrupted {
        warn!(
            code = OrganizerError::Interrupted.code(),
            discarded = summary.discarded,
            "Stopped. Processed: {}, Errors: {}",
            summary.succeeded,
            summary.failed
        );
    } else {
        info!(
            skipped = summary.skipped,
            fallback = summary.fallback,
            "Done! Processed: {}, Errors: {}",
            summary.succeeded,
            summary.failed
        );
    }
}

fn print_config_location(path: Option<&std::path::Path>) {
    let from_env = std::env::var_os(CONFIG_ENV).is_some_and(|v| !v.is_empty());
    match path {
        Some(p) => {
            let origin = if from_env { CONFIG_ENV } else { "default location" };
            out::print_info(&format!("Config file ({origin}): {}", p.display()));
            if p.exists() {
                out::print_info("The file exists.");
            } else {
                out::print_info("No file there yet; run with --init-config to create a template.");
            }
        }
        None => out::print_error("Could not determine a config location"),
    }
}
