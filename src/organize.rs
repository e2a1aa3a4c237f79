//! The organize pipeline: discover, resolve dates, plan, allocate names, then move.
//!
//! Everything up to allocation is sequential and side-effect free, so a dry run
//! prints exactly the names a real run would use. Only the moves run in parallel.

use anyhow::Result;
use std::fs;
use tracing::{info, info_span, warn};

use crate::config::Config;
use crate::discovery::find_files;
use crate::errors::OrganizerError;
use crate::fs_ops::{
    FilenameAllocator, MoveTask, ensure_date_folders, execute_moves, io_error_with_help,
};
use crate::metadata::TimestampResolver;
use crate::output::{self as out, Progress};
use crate::plan::{Plan, plan_moves};
use crate::shutdown::CancellationToken;

/// Counts for one run. `skipped` files (no usable date) are not failures.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub found: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Dated from the modification time instead of metadata.
    pub fallback: usize,
    /// Never started because the run was cancelled.
    pub discarded: usize,
    pub interrupted: bool,
    pub dry_run: bool,
}

impl RunSummary {
    /// 130 when interrupted, 1 when any move failed, else 0.
    pub fn exit_code(&self) -> u8 {
        if self.interrupted {
            OrganizerError::Interrupted.code() as u8
        } else if self.failed > 0 {
            1
        } else {
            0
        }
    }
}

/// Claim final names for every planned move, strictly in plan order.
pub fn allocate_moves(plan: &Plan) -> Vec<MoveTask> {
    let mut allocator = FilenameAllocator::new();
    plan.moves
        .iter()
        .map(|m| {
            let name = allocator.allocate(&m.dest_folder, &m.proposed_name);
            MoveTask {
                source: m.file.path.clone(),
                dest: m.dest_folder.join(&name),
                deduplicated: name != m.proposed_name,
            }
        })
        .collect()
}

/// Organize `cfg.input` into `cfg.output`. Preconditions (input exists, paths are
/// safe, resolver usable) are the caller's job; this only fails if the output or
/// date folders cannot be created or the worker pool cannot start. Nothing is
/// created unless at least one move is planned.
pub fn process_files(
    cfg: &Config,
    resolver: &dyn TimestampResolver,
    cancel: &CancellationToken,
) -> Result<RunSummary> {
    let span = info_span!(
        "run",
        input = %cfg.input.display(),
        output = %cfg.output.display(),
        dry_run = cfg.dry_run
    );
    let _enter = span.enter();

    let mut summary = RunSummary {
        dry_run: cfg.dry_run,
        ..RunSummary::default()
    };

    let files = find_files(&cfg.input);
    summary.found = files.len();
    if files.is_empty() {
        info!("No image files found");
        summary.interrupted = cancel.is_cancelled();
        return Ok(summary);
    }
    info!("Found {} image files", files.len());

    let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
    let dates = resolver.resolve_timestamps(&paths);
    info!("Got dates from metadata: {}/{}", dates.len(), files.len());

    let plan = plan_moves(&files, &dates, &cfg.output, cfg.raw_to_orig);
    summary.fallback = plan.fallback_count;
    summary.skipped = plan.skipped_count;
    if plan.fallback_count > 0 {
        warn!("Using file modification date for {} files", plan.fallback_count);
    }
    if plan.skipped_count > 0 {
        warn!("Skipped {} files without any date", plan.skipped_count);
    }

    let tasks = allocate_moves(&plan);

    if cancel.is_cancelled() {
        summary.discarded = tasks.len();
        summary.interrupted = true;
        return Ok(summary);
    }

    if cfg.dry_run {
        info!("Dry run: {} files would be moved", tasks.len());
        for (planned, task) in plan.moves.iter().zip(&tasks) {
            out::print_user(&out::preview_line(&planned.file.name, &task.dest, task.deduplicated));
        }
        summary.succeeded = tasks.len();
        return Ok(summary);
    }

    if tasks.is_empty() {
        return Ok(summary);
    }

    fs::create_dir_all(&cfg.output).map_err(io_error_with_help("create output folder", &cfg.output))?;
    ensure_date_folders(&cfg.output, &plan.date_folders)?;

    let mut progress = Progress::new(tasks.len());
    let report = execute_moves(tasks, cfg.workers, cancel, |_| {
        progress.tick();
    })?;
    progress.finish();

    summary.succeeded = report.succeeded;
    summary.failed = report.failed;
    summary.discarded = report.discarded;
    summary.interrupted = report.interrupted;
    Ok(summary)
}
