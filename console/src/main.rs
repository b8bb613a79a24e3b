//! vidrec console – terminal front end for the recording backend: a
//! session view (login, start/stop, live progress) and a dashboard view
//! (browse, filter, play, download, delete chunks).

mod commands;
mod terminal;

use std::path::PathBuf;
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use vidrec_common::config::{self, Config};
use vidrec_console::api::ApiClient;
use vidrec_console::dashboard::DashboardController;
use vidrec_console::error::ActionError;
use vidrec_console::session::{SessionController, SessionEvent};
use vidrec_console::view::{Notice, PlaybackOverlay};

use commands::{DashboardCommand, SessionCommand, DASHBOARD_HELP, SESSION_HELP};
use terminal::Terminal;

enum Mode {
    Session,
    Dashboard,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    // ── arguments + config ───────────────────────────────────────────
    let mut args = std::env::args().skip(1);
    let mode = match args.next().as_deref() {
        None | Some("session") => Mode::Session,
        Some("dashboard") => Mode::Dashboard,
        Some(other) => bail!("Unknown view `{other}` (expected `session` or `dashboard`)"),
    };
    let config_path = args.next().map(PathBuf::from);
    let config = config::load_or_default(config_path.as_deref()).context("Config load failed")?;

    info!("vidrec console starting (api={})", config.api_base_url);

    let api = ApiClient::new(&config.api_base_url, config.request_timeout())
        .context("Cannot create API client")?;

    match api.health().await {
        Ok(health) => info!("Backend health: {}", health.status),
        Err(e) => {
            warn!("Backend health check failed: {e}");
            println!(
                "{}",
                terminal::notice(&Notice::error(format!(
                    "Backend at {} is not reachable; commands will fail until it is",
                    config.api_base_url
                )))
            );
        }
    }

    let mut term = Terminal::spawn();
    match mode {
        Mode::Session => run_session(&config, api, &mut term).await,
        Mode::Dashboard => run_dashboard(&config, api, &mut term).await,
    }
}

/// Wait for the next command line. `None` on Ctrl-C or end of input.
async fn read_command(term: &mut Terminal, label: &str) -> Option<String> {
    term.prompt(label);
    tokio::select! {
        line = term.next_line() => line,
        _ = tokio::signal::ctrl_c() => {
            println!();
            None
        }
    }
}

fn report(outcome: Result<Option<Notice>, ActionError>) {
    match outcome {
        Ok(Some(n)) => println!("{}", terminal::notice(&n)),
        Ok(None) => {}
        Err(e) => println!("{}", terminal::notice(&Notice::error(e.to_string()))),
    }
}

// ─── session view ────────────────────────────────────────────────────────────

async fn run_session(config: &Config, api: ApiClient, term: &mut Terminal) -> Result<()> {
    let (session, mut events) = SessionController::new(api, config.poll_interval());

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                SessionEvent::Progress(p) => println!("{}", terminal::progress(&p)),
                SessionEvent::Finished { notice, .. } => {
                    println!("{}", terminal::notice(&notice))
                }
            }
        }
    });

    println!("{}", terminal::session(&session.view()));
    println!("Type `help` for commands.");

    while let Some(line) = read_command(term, "session").await {
        let command = match SessionCommand::parse(&line) {
            Ok(Some(c)) => c,
            Ok(None) => continue,
            Err(usage) => {
                println!("{usage}");
                continue;
            }
        };

        let outcome = match command {
            SessionCommand::Register { username, email } => {
                session.register(&username, email.as_deref()).await.map(Some)
            }
            SessionCommand::Login { username } => session.login(&username).await.map(Some),
            SessionCommand::Logout => Ok(session.logout(term).await),
            SessionCommand::Plan {
                total_secs,
                chunk_secs,
            } => {
                println!("{}", terminal::plan(&session.plan(total_secs, chunk_secs)));
                Ok(None)
            }
            SessionCommand::Start {
                total_secs,
                chunk_secs,
            } => session.start_recording(total_secs, chunk_secs).await.map(Some),
            SessionCommand::Stop => session.stop_recording().await.map(Some),
            SessionCommand::Status => {
                println!("{}", terminal::session(&session.view()));
                Ok(None)
            }
            SessionCommand::Help => {
                println!("{SESSION_HELP}");
                Ok(None)
            }
            SessionCommand::Quit => break,
        };
        report(outcome);
    }

    if session.is_recording() {
        warn!("Exiting while recording; the backend keeps recording until its duration ends");
    }
    printer.abort();
    info!("Session view closed");
    Ok(())
}

// ─── dashboard view ──────────────────────────────────────────────────────────

async fn run_dashboard(config: &Config, api: ApiClient, term: &mut Terminal) -> Result<()> {
    let dashboard = DashboardController::new(api, config.download_dir.clone());

    if let Err(e) = dashboard.load_videos().await {
        report(Err(e));
    }
    if let Err(e) = dashboard.load_users().await {
        warn!("Initial user load failed: {e}");
    }
    let mut changes = dashboard.start_auto_refresh(config.refresh_interval());
    let printer = tokio::spawn(async move {
        while let Some(notice) = changes.recv().await {
            println!("{}  (`list` to show)", terminal::notice(&notice));
        }
    });

    println!("{}", terminal::dashboard(&dashboard.view()));
    println!("Type `help` for commands.");

    while let Some(line) = read_command(term, "dashboard").await {
        let command = match DashboardCommand::parse(&line) {
            Ok(Some(c)) => c,
            Ok(None) => continue,
            Err(usage) => {
                println!("{usage}");
                continue;
            }
        };

        match command {
            DashboardCommand::Videos => match dashboard.load_videos().await {
                Ok(_) => println!("{}", terminal::dashboard(&dashboard.view())),
                Err(e) => report(Err(e)),
            },
            DashboardCommand::List => println!("{}", terminal::dashboard(&dashboard.view())),
            DashboardCommand::Users => match dashboard.load_users().await {
                Ok(_) => println!("{}", terminal::users(&dashboard.view())),
                Err(e) => report(Err(e)),
            },
            DashboardCommand::Filter(username) => {
                let outcome = dashboard.apply_filter(&username).await;
                let ok = outcome.is_ok();
                report(outcome.map(Some));
                if ok {
                    println!("{}", terminal::dashboard(&dashboard.view()));
                }
            }
            DashboardCommand::Play(id) => match dashboard.play_video(id) {
                Ok(overlay) => {
                    println!("{}", terminal::overlay(&overlay));
                    if let Some(player) = &config.player_command {
                        launch_player(player, &overlay);
                    }
                }
                Err(e) => report(Err(e)),
            },
            DashboardCommand::Download(id) => {
                let name = dashboard.file_name_of(id).unwrap_or_default();
                report(dashboard.download_video(id, &name).await.map(Some));
            }
            DashboardCommand::Delete(id) => {
                let outcome = dashboard.delete_video(id, term).await;
                let deleted = matches!(outcome, Ok(Some(_)));
                report(outcome);
                if deleted {
                    println!("{}", terminal::dashboard(&dashboard.view()));
                }
            }
            DashboardCommand::Help => println!("{DASHBOARD_HELP}"),
            DashboardCommand::Quit => break,
        }
    }

    dashboard.stop_auto_refresh();
    printer.abort();
    info!("Dashboard view closed");
    Ok(())
}

/// Hand the stream URL to the configured player, detached. The command may
/// carry its own arguments, e.g. `mpv --force-window`.
fn launch_player(player: &str, overlay: &PlaybackOverlay) {
    let mut words = player.split_whitespace();
    let Some(program) = words.next() else {
        return;
    };
    let spawned = Command::new(program)
        .args(words)
        .arg(&overlay.stream_url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();
    match spawned {
        Ok(child) => info!("Started player {program} (pid {})", child.id()),
        Err(e) => println!(
            "{}",
            terminal::notice(&Notice::error(format!("Cannot start player `{program}`: {e}")))
        ),
    }
}
