//! Command-line definition.
//! Flags override config.xml, which overrides built-in defaults.

use clap::{Parser, ValueHint};
use std::path::{Path, PathBuf};

use crate::config::{Config, LogLevel};
use crate::fs_ops::MAX_WORKERS;

/// Organize photos into date folders using their capture time.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Organize photos into date folders by capture time")]
pub struct Args {
    /// Folder containing the photos (not searched recursively).
    #[arg(value_name = "INPUT", value_hint = ValueHint::DirPath)]
    pub input: Option<PathBuf>,

    /// Root for the date folders [default: INPUT].
    #[arg(short, long, value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Put RAW files into <date>/!orig together with the JPEGs.
    #[arg(short = 'r', long)]
    pub raw_subfolder: bool,

    /// Show the planned moves without touching any file.
    #[arg(short, long)]
    pub dry_run: bool,

    /// Per-file detail (same as --log-level info).
    #[arg(short, long)]
    pub verbose: bool,

    /// Parallel moves.
    #[arg(
        short,
        long,
        value_name = "N",
        value_parser = clap::value_parser!(u16).range(1..=MAX_WORKERS as i64)
    )]
    pub workers: Option<u16>,

    /// One of: quiet, normal, info, debug.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Also append logs to this file.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub json: bool,

    /// exiftool program to run.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::ExecutablePath)]
    pub exiftool: Option<PathBuf>,

    /// Print the config file location and exit.
    #[arg(long)]
    pub print_config: bool,

    /// Write a commented config template to the config location and exit.
    #[arg(long, conflicts_with = "print_config")]
    pub init_config: bool,
}

impl Args {
    /// Precedence: --log-level, then --verbose, else keep the config value.
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        self.log_level
            .or_else(|| self.verbose.then_some(LogLevel::Info))
    }

    /// Apply flags on top of `cfg`. Input defaults to `.`, output to the input;
    /// both are made absolute without requiring them to exist.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        let input = self.input.clone().unwrap_or_else(|| PathBuf::from("."));
        let output = self.output.clone().unwrap_or_else(|| input.clone());
        cfg.input = absolutize(&input);
        cfg.output = absolutize(&output);

        if self.raw_subfolder {
            cfg.raw_to_orig = true;
        }
        if self.dry_run {
            cfg.dry_run = true;
        }
        if let Some(n) = self.workers {
            cfg.workers = usize::from(n);
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(p) = &self.log_file {
            cfg.log_file = Some(p.clone());
        }
        if self.json {
            cfg.json = true;
        }
        if let Some(p) = &self.exiftool {
            cfg.exiftool = p.clone();
        }
    }
}

fn absolutize(p: &Path) -> PathBuf {
    std::path::absolute(p).unwrap_or_else(|_| p.to_path_buf())
}

pub fn parse() -> Args {
    Args::parse()
}
