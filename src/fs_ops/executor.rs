//! Parallel move execution.
//!
//! All tasks are queued on a bounded rayon pool; results come back over a channel
//! and are aggregated here, on the calling thread, in completion order.
//!
//! Cancellation is checked after each result. Once seen, a shared gate makes every
//! task that has not started yet report `Discarded` instead of moving, and the
//! coordinator then drains the channel so tasks already running finish before we return.

use anyhow::{Context, Result};
use rayon::ThreadPoolBuilder;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use tracing::{debug, error, warn};

use super::file_move::{MoveOutcome, MoveResult, MoveTask, move_single_file};
use crate::shutdown::CancellationToken;

/// Default worker count; suits SSD-backed moves.
pub const DEFAULT_WORKERS: usize = 8;
/// Upper bound for the worker pool.
pub const MAX_WORKERS: usize = 64;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionReport {
    pub succeeded: usize,
    /// Successful moves that landed under a de-duplicated name.
    pub renamed: usize,
    pub failed: usize,
    /// Tasks skipped because cancellation arrived before they started.
    pub discarded: usize,
    pub interrupted: bool,
}

enum TaskEvent {
    Finished(MoveResult),
    Discarded,
}

impl ExecutionReport {
    fn record(&mut self, event: TaskEvent, on_result: &mut impl FnMut(&MoveResult)) {
        let result = match event {
            TaskEvent::Discarded => {
                self.discarded += 1;
                return;
            }
            TaskEvent::Finished(r) => r,
        };
        match &result.outcome {
            MoveOutcome::Moved { dest, deduplicated } => {
                self.succeeded += 1;
                if *deduplicated {
                    self.renamed += 1;
                    let name = dest.file_name().unwrap_or_default().to_string_lossy();
                    debug!("Renamed duplicate: {} -> {}", result.source_name, name);
                }
                debug!(file = %result.source_name, dest = %dest.display(), "moved");
            }
            MoveOutcome::Failed { error } => {
                self.failed += 1;
                error!(file = %result.source_name, error = %error, "Failed to move");
            }
        }
        on_result(&result);
    }
}

/// Run `tasks` on up to `workers` threads, calling `on_result` for each completed move.
pub fn execute_moves<F>(
    tasks: Vec<MoveTask>,
    workers: usize,
    cancel: &CancellationToken,
    mut on_result: F,
) -> Result<ExecutionReport>
where
    F: FnMut(&MoveResult),
{
    let total = tasks.len();
    let mut report = ExecutionReport::default();
    if total == 0 {
        return Ok(report);
    }

    let workers = workers.clamp(1, MAX_WORKERS);
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("photo-mover-{i}"))
        .build()
        .context("build move worker pool")?;
    debug!(workers, total, "starting moves");

    let gate = Arc::new(AtomicBool::new(cancel.is_cancelled()));
    let (tx, rx) = mpsc::channel::<TaskEvent>();
    for task in tasks {
        let tx = tx.clone();
        let gate = Arc::clone(&gate);
        pool.spawn(move || {
            let event = if gate.load(Ordering::Relaxed) {
                TaskEvent::Discarded
            } else {
                TaskEvent::Finished(move_single_file(&task))
            };
            let _ = tx.send(event);
        });
    }
    drop(tx);

    // Phase 1: collect until everything reported or cancellation is seen.
    let mut received = 0usize;
    while received < total {
        let Ok(event) = rx.recv() else { break };
        received += 1;
        report.record(event, &mut on_result);
        if cancel.is_cancelled() {
            gate.store(true, Ordering::Relaxed);
            report.interrupted = true;
            warn!(pending = total - received, "Cancellation requested, waiting for running moves");
            break;
        }
    }

    // Phase 2: wait for in-flight tasks; not-yet-started ones come back as Discarded.
    if report.interrupted {
        for event in rx.iter() {
            report.record(event, &mut on_result);
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn make_tasks(root: &Path, n: usize) -> Vec<MoveTask> {
        let src_dir = root.join("in");
        let dest_dir = root.join("out");
        fs::create_dir_all(&src_dir).unwrap();
        fs::create_dir_all(&dest_dir).unwrap();
        (0..n)
            .map(|i| {
                let source = src_dir.join(format!("IMG_{i:03}.jpg"));
                fs::write(&source, format!("{i}")).unwrap();
                MoveTask { source, dest: dest_dir.join(format!("moved_{i:03}.jpg")), deduplicated: false }
            })
            .collect()
    }

    fn count(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn empty_task_list_is_a_no_op() {
        let r = execute_moves(Vec::new(), 4, &CancellationToken::new(), |_| {}).unwrap();
        assert_eq!(r, ExecutionReport::default());
    }

    #[test]
    fn moves_everything_and_reports_each_result_once() {
        let td = tempdir().unwrap();
        let tasks = make_tasks(td.path(), 40);
        let mut seen = Vec::new();
        let r = execute_moves(tasks, 8, &CancellationToken::new(), |res| {
            seen.push(res.source_name.clone())
        })
        .unwrap();

        assert_eq!((r.succeeded, r.failed, r.discarded), (40, 0, 0));
        assert!(!r.interrupted);
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 40);
        assert_eq!(count(&td.path().join("in")), 0);
        assert_eq!(count(&td.path().join("out")), 40);
    }

    #[test]
    fn failures_are_counted_without_stopping_the_run() {
        let td = tempdir().unwrap();
        let mut tasks = make_tasks(td.path(), 3);
        tasks.push(MoveTask {
            source: td.path().join("in").join("missing.jpg"),
            dest: td.path().join("out").join("missing.jpg"),
            deduplicated: false,
        });
        let r = execute_moves(tasks, 2, &CancellationToken::new(), |_| {}).unwrap();
        assert_eq!((r.succeeded, r.failed), (3, 1));
        assert!(!r.interrupted);
    }

    #[test]
    fn deduplicated_moves_are_counted() {
        let td = tempdir().unwrap();
        let mut tasks = make_tasks(td.path(), 3);
        tasks[1].deduplicated = true;
        let r = execute_moves(tasks, 2, &CancellationToken::new(), |_| {}).unwrap();
        assert_eq!((r.succeeded, r.renamed, r.failed), (3, 1, 0));
    }

    #[test]
    fn worker_count_is_clamped() {
        let td = tempdir().unwrap();
        let tasks = make_tasks(td.path(), 3);
        let r = execute_moves(tasks, 0, &CancellationToken::new(), |_| {}).unwrap();
        assert_eq!(r.succeeded, 3);
    }

    #[test]
    fn cancelled_before_start_moves_nothing() {
        let td = tempdir().unwrap();
        let tasks = make_tasks(td.path(), 10);
        let token = CancellationToken::new();
        token.cancel();
        let mut calls = 0;
        let r = execute_moves(tasks, 4, &token, |_| calls += 1).unwrap();

        assert!(r.interrupted);
        assert_eq!(r.discarded, 10);
        assert_eq!((r.succeeded, r.failed, calls), (0, 0, 0));
        assert_eq!(count(&td.path().join("in")), 10);
    }

    #[test]
    fn cancel_mid_run_accounts_for_every_task() {
        let td = tempdir().unwrap();
        let tasks = make_tasks(td.path(), 200);
        let token = CancellationToken::new();
        let r = execute_moves(tasks, 1, &token, |_| token.cancel()).unwrap();

        assert!(r.interrupted);
        assert!(r.succeeded >= 1);
        assert_eq!(r.succeeded + r.failed + r.discarded, 200);
        // Disk agrees with the report: moved files left the input, the rest stayed.
        assert_eq!(count(&td.path().join("out")), r.succeeded);
        assert_eq!(count(&td.path().join("in")), 200 - r.succeeded);
    }
}
