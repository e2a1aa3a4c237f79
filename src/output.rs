//! User-facing console output: prefixed status lines, dry-run previews and the
//! progress bar. Colors and the progress bar only appear when stdout is a TTY.

use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::path::Path;

fn is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

pub fn print_info(msg: &str) {
    if is_tty() {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {msg}");
    }
}

pub fn print_warn(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {msg}");
    }
}

pub fn print_error(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {msg}");
    }
}

pub fn print_success(msg: &str) {
    if is_tty() {
        println!("{} {}", "ok:".green().bold(), msg);
    } else {
        println!("ok: {msg}");
    }
}

/// Plain line, no prefix; used for output people may script against.
pub fn print_user(msg: &str) {
    println!("{msg}");
}

/// `  <name> -> <dest>`, plus ` (renamed: duplicate)` when the allocator changed the name.
pub fn preview_line(source_name: &str, dest: &Path, deduplicated: bool) -> String {
    let mut line = format!("  {} -> {}", source_name, dest.display());
    if deduplicated {
        line.push_str(" (renamed: duplicate)");
    }
    line
}

const BAR_WIDTH: usize = 40;

/// `[=====>    ]` body for `done` of `total`.
pub fn render_bar(done: usize, total: usize, width: usize) -> String {
    if total == 0 || done >= total {
        return "=".repeat(width);
    }
    let filled = width * done / total;
    format!("{}>{}", "=".repeat(filled), " ".repeat(width - filled - 1))
}

/// Single-line progress indicator, redrawn only when the whole percentage changes,
/// so a run prints at most about a hundred updates.
#[derive(Debug)]
pub struct Progress {
    total: usize,
    done: usize,
    last_percent: Option<usize>,
    enabled: bool,
}

impl Progress {
    /// Enabled only when stdout is a terminal.
    pub fn new(total: usize) -> Self {
        Self::with_enabled(total, is_tty())
    }

    pub fn with_enabled(total: usize, enabled: bool) -> Self {
        Self { total, done: 0, last_percent: None, enabled }
    }

    pub fn done(&self) -> usize {
        self.done
    }

    /// Count one finished item. Returns the rendered line when it changed.
    pub fn tick(&mut self) -> Option<String> {
        self.done = (self.done + 1).min(self.total);
        let percent = if self.total == 0 { 100 } else { self.done * 100 / self.total };
        if self.last_percent == Some(percent) {
            return None;
        }
        self.last_percent = Some(percent);
        let line = format!(
            "\rProgress: {:3}% [{}] {}/{}",
            percent,
            render_bar(self.done, self.total, BAR_WIDTH),
            self.done,
            self.total
        );
        if self.enabled {
            let mut stdout = io::stdout().lock();
            let _ = stdout.write_all(line.as_bytes());
            let _ = stdout.flush();
        }
        Some(line)
    }

    /// End the progress line.
    pub fn finish(&self) {
        if self.enabled && self.last_percent.is_some() {
            println!();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn preview_lines() {
        let dest = PathBuf::from("/out/2024_01_15/!orig/2024_01_15_143052_a.jpg");
        assert_eq!(
            preview_line("a.jpg", &dest, false),
            "  a.jpg -> /out/2024_01_15/!orig/2024_01_15_143052_a.jpg"
        );
        assert!(preview_line("a.jpg", &dest, true).ends_with(" (renamed: duplicate)"));
    }

    #[test]
    fn bar_shapes() {
        assert_eq!(render_bar(0, 10, 10), ">         ");
        assert_eq!(render_bar(5, 10, 10), "=====>    ");
        assert_eq!(render_bar(10, 10, 10), "==========");
        assert_eq!(render_bar(0, 0, 4), "====");
    }

    #[test]
    fn progress_updates_are_bounded() {
        let mut p = Progress::with_enabled(10_000, false);
        let updates = (0..10_000).filter_map(|_| p.tick()).count();
        assert!(updates <= 101, "updates = {updates}");
        assert_eq!(p.done(), 10_000);
    }

    #[test]
    fn progress_line_format() {
        let mut p = Progress::with_enabled(4, false);
        let first = p.tick().unwrap();
        assert!(first.starts_with("\rProgress:  25% ["));
        assert!(first.ends_with("] 1/4"));
        let last = (0..3).filter_map(|_| p.tick()).last().unwrap();
        assert!(last.contains("100%"));
        assert!(last.ends_with("4/4"));
    }
}
