//! config.xml support (quick-xml + serde).
//!
//! Notes:
//! - A missing file is not an error; defaults apply.
//! - An unknown element is a hard error so typos do not silently fall back to defaults.
//! - Any other read/parse problem, or a value that does not parse, is reported as a
//!   warning and the affected settings keep their defaults.

use anyhow::{Context, Result, bail};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use super::paths::{default_log_path, path_has_symlink_ancestor};
use super::types::{Config, LogLevel};
use crate::fs_ops::MAX_WORKERS;
use crate::metadata::{EXIFTOOL_BATCH_SIZE, EXIFTOOL_TIMEOUT};
use crate::platform::{set_dir_mode_0700, write_config_secure_new_0600};

/// Mirror of the XML file. Values are kept as text and parsed after trimming.
#[derive(Debug, Default, Deserialize)]
#[serde(rename = "config", deny_unknown_fields)]
struct XmlConfig {
    raw_to_orig: Option<String>,
    workers: Option<String>,
    log_level: Option<String>,
    log_file: Option<String>,
    exiftool: Option<String>,
    exiftool_timeout_seconds: Option<String>,
    batch_size: Option<String>,
}

/// Result of reading the config file: the settings plus anything worth telling the user.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub source: Option<PathBuf>,
    pub warnings: Vec<String>,
}

/// Load settings from `path` with the lenient policy described above.
/// `None` (no resolvable location) behaves like a missing file.
pub fn load_config_file(path: Option<&Path>) -> Result<ConfigLoad> {
    let mut load = ConfigLoad {
        config: Config::default(),
        source: None,
        warnings: Vec::new(),
    };
    let Some(path) = path else {
        return Ok(load);
    };
    if !path.exists() {
        return Ok(load);
    }

    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            load.warnings
                .push(format!("Cannot read config {}: {e}; using defaults", path.display()));
            return Ok(load);
        }
    };

    match from_xml_str::<XmlConfig>(&content) {
        Ok(parsed) => {
            apply_xml(parsed, &mut load.config, &mut load.warnings);
            load.source = Some(path.to_path_buf());
        }
        Err(e) => {
            let msg = e.to_string();
            if msg.contains("unknown field") {
                bail!(
                    "Unknown field in config {}: {msg}. Refusing to start.",
                    path.display()
                );
            }
            load.warnings
                .push(format!("Failed to parse config {}: {msg}; using defaults", path.display()));
        }
    }
    Ok(load)
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn apply_xml(parsed: XmlConfig, cfg: &mut Config, warnings: &mut Vec<String>) {
    let mut invalid = |field: &str, value: &str| {
        warnings.push(format!("Ignoring invalid <{field}> value '{value}'"));
    };

    if let Some(v) = non_empty(parsed.raw_to_orig) {
        match parse_bool(&v) {
            Some(b) => cfg.raw_to_orig = b,
            None => invalid("raw_to_orig", &v),
        }
    }
    if let Some(v) = non_empty(parsed.workers) {
        match v.parse::<usize>() {
            Ok(n) => cfg.workers = n.clamp(1, MAX_WORKERS),
            Err(_) => invalid("workers", &v),
        }
    }
    if let Some(v) = non_empty(parsed.log_level) {
        match LogLevel::parse(&v) {
            Some(level) => cfg.log_level = level,
            None => invalid("log_level", &v),
        }
    }
    if let Some(v) = non_empty(parsed.log_file) {
        cfg.log_file = Some(PathBuf::from(v));
    }
    if let Some(v) = non_empty(parsed.exiftool) {
        cfg.exiftool = PathBuf::from(v);
    }
    if let Some(v) = non_empty(parsed.exiftool_timeout_seconds) {
        match v.parse::<u64>() {
            Ok(secs) if secs > 0 => cfg.exiftool_timeout = Duration::from_secs(secs),
            _ => invalid("exiftool_timeout_seconds", &v),
        }
    }
    if let Some(v) = non_empty(parsed.batch_size) {
        match v.parse::<usize>() {
            Ok(n) => cfg.batch_size = n.max(1),
            Err(_) => invalid("batch_size", &v),
        }
    }
}

/// Text written by `--init-config`.
pub fn template_contents() -> String {
    let suggested_log = default_log_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "/path/to/photo_organizer.log".into());
    format!(
        "<!--\n  photo_organizer configuration (XML)\n\n\
         \x20 raw_to_orig               -> true: RAW files go to <date>/!orig with the JPEGs\n\
         \x20 workers                   -> parallel moves, 1..{max}\n\
         \x20 log_level                 -> quiet | normal | info | debug\n\
         \x20 log_file                  -> optional log file (leave empty to disable)\n\
         \x20 exiftool                  -> exiftool program name or full path\n\
         \x20 exiftool_timeout_seconds  -> limit for one exiftool batch\n\
         \x20 batch_size                -> files per exiftool invocation\n\n\
         \x20 Command-line flags override these values.\n-->\n\
         <config>\n\
         \x20 <raw_to_orig>false</raw_to_orig>\n\
         \x20 <workers>{workers}</workers>\n\
         \x20 <log_level>normal</log_level>\n\
         \x20 <log_file>{suggested_log}</log_file>\n\
         \x20 <exiftool>exiftool</exiftool>\n\
         \x20 <exiftool_timeout_seconds>{timeout}</exiftool_timeout_seconds>\n\
         \x20 <batch_size>{batch}</batch_size>\n\
         </config>\n",
        max = MAX_WORKERS,
        workers = crate::fs_ops::DEFAULT_WORKERS,
        timeout = EXIFTOOL_TIMEOUT.as_secs(),
        batch = EXIFTOOL_BATCH_SIZE,
    )
}

/// Write the template to `path` (0600 on Unix). Refuses symlinked ancestors and existing files.
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        bail!(
            "Refusing to create config: an ancestor of {} is a symlink",
            path.display()
        );
    }
    if path.exists() {
        bail!("Config file already exists: {}", path.display());
    }
    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config dir '{}'", parent.display()))?;
        let _ = set_dir_mode_0700(parent);
    }

    write_config_secure_new_0600(path, template_contents().as_bytes())?;
    info!(path = %path.display(), "Created template config");
    Ok(())
}
