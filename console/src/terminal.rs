//! Line-oriented terminal: stdin reader, y/N confirmation, and text
//! rendering of the view models.

use std::fmt::Write as _;
use std::io::{BufRead, Write as _};

use tokio::sync::mpsc;
use tracing::debug;

use vidrec_console::prompt::Confirm;
use vidrec_console::view::{
    DashboardView, Level, Notice, PlanPreview, PlaybackOverlay, ProgressView, SessionView,
};

const BAR_WIDTH: usize = 30;

/// Stdin lines, read on a background thread so the main loop can `select!`
/// on them alongside Ctrl-C.
pub struct Terminal {
    lines: mpsc::UnboundedReceiver<String>,
}

impl Terminal {
    pub fn spawn() -> Self {
        let (tx, lines) = mpsc::unbounded_channel();
        // Not tokio::io::stdin: a pending read there blocks runtime shutdown.
        std::thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        debug!("stdin closed: {e}");
                        break;
                    }
                }
            }
        });
        Self { lines }
    }

    /// `None` once stdin is closed.
    pub async fn next_line(&mut self) -> Option<String> {
        self.lines.recv().await
    }

    pub fn prompt(&self, label: &str) {
        print!("{label}> ");
        std::io::stdout().flush().ok();
    }
}

impl Confirm for Terminal {
    async fn confirm(&mut self, question: &str) -> bool {
        print!("{question} [y/N] ");
        std::io::stdout().flush().ok();
        match self.next_line().await {
            Some(answer) => is_yes(&answer),
            None => false,
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

// ─── rendering ───────────────────────────────────────────────────────────────

pub fn notice(n: &Notice) -> String {
    let tag = match n.level {
        Level::Info => "[info]",
        Level::Success => "[ ok ]",
        Level::Error => "[fail]",
    };
    format!("{tag} {}", n.text)
}

pub fn progress(p: &ProgressView) -> String {
    let filled = ((p.percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    let chunks = match p.expected_chunks {
        Some(expected) => format!("{}/{expected}", p.chunks_so_far),
        None => p.chunks_so_far.to_string(),
    };
    format!(
        "[{}{}] {:>3.0}%  {} / {}  chunks {chunks}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        p.percent,
        p.elapsed,
        p.total,
    )
}

pub fn plan(p: &PlanPreview) -> String {
    format!(
        "Expected chunks: {}  Total minutes: {}  ({})",
        p.expected_chunks, p.total_minutes, p.total
    )
}

pub fn session(v: &SessionView) -> String {
    let mut out = String::new();
    match &v.current_user {
        None => {
            out.push_str("Not logged in. Use `register <username>` or `login <username>`.");
        }
        Some(user) => {
            let _ = write!(out, "Logged in as {user}.");
            if v.stop_enabled {
                out.push_str(" Recording.");
                if let Some(p) = &v.progress {
                    let _ = write!(out, "\n{}", progress(p));
                }
            } else {
                out.push_str(" Idle. Use `start <total> [chunk]` to record.");
            }
        }
    }
    out
}

pub fn dashboard(v: &DashboardView) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Chunks: {}  Users: {}  Recorded: {}",
        v.stats.total_chunks, v.stats.total_users, v.stats.total_duration
    );
    if let Some(selected) = v.filter_options.iter().find(|o| o.selected) {
        let _ = writeln!(out, "Filter: {}", selected.label);
    }
    if let Some(message) = &v.empty_message {
        out.push_str(message);
        return out;
    }
    for card in &v.cards {
        let _ = writeln!(
            out,
            "#{:<5} {:<12} {:<8} (requested {}, chunk {})  {}",
            card.id,
            card.user_name,
            card.duration,
            card.requested,
            card.chunk_size,
            card.file_name,
        );
        let _ = writeln!(
            out,
            "       {} -> {}  recorded {}",
            card.start, card.end, card.recorded
        );
    }
    out.truncate(out.trim_end().len());
    out
}

pub fn users(v: &DashboardView) -> String {
    v.filter_options
        .iter()
        .map(|o| format!("{} {}", if o.selected { "*" } else { " " }, o.label))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn overlay(o: &PlaybackOverlay) -> String {
    format!(
        "{}\n  user {}  length {}  requested {}  chunk {}  recorded {}\n  {}",
        o.title, o.user_name, o.duration, o.requested, o.chunk_size, o.recorded, o.stream_url
    )
}
