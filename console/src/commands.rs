//! Console command lines for the two views.

use vidrec_common::plan::{parse_duration_secs, DEFAULT_CHUNK_SECS};

pub const SESSION_HELP: &str = "\
Commands:
  register <username> [email]   create an account
  login <username>              sign in
  logout                        sign out (asks first)
  plan <total> [chunk]          preview chunk count, e.g. `plan 15m 3m`
  start <total> [chunk]         start recording (chunk defaults to 180s)
  stop                          stop recording
  status                        show the session
  help                          this text
  quit                          exit";

pub const DASHBOARD_HELP: &str = "\
Commands:
  videos                        reload the chunk list
  list                          show the cached list
  users                         reload the user filter options
  filter [username]             show one user's chunks; no name clears
  play <id>                     open a chunk's stream
  download <id>                 save a chunk to the download directory
  delete <id>                   delete a chunk (asks first)
  help                          this text
  quit                          exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Register {
        username: String,
        email: Option<String>,
    },
    Login {
        username: String,
    },
    Logout,
    Plan {
        total_secs: i64,
        chunk_secs: i64,
    },
    Start {
        total_secs: i64,
        chunk_secs: i64,
    },
    Stop,
    Status,
    Help,
    Quit,
}

impl SessionCommand {
    /// `Ok(None)` for a blank line, `Err(usage)` for a malformed one.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match verb.to_ascii_lowercase().as_str() {
            "register" => match args.as_slice() {
                [username] => SessionCommand::Register {
                    username: username.to_string(),
                    email: None,
                },
                [username, email] => SessionCommand::Register {
                    username: username.to_string(),
                    email: Some(email.to_string()),
                },
                _ => return Err("usage: register <username> [email]".into()),
            },
            "login" => match args.as_slice() {
                [username] => SessionCommand::Login {
                    username: username.to_string(),
                },
                _ => return Err("usage: login <username>".into()),
            },
            "logout" => SessionCommand::Logout,
            "plan" | "start" => {
                let (total_secs, chunk_secs) = durations(&args)
                    .ok_or_else(|| format!("usage: {verb} <total> [chunk]"))?;
                if verb.eq_ignore_ascii_case("plan") {
                    SessionCommand::Plan {
                        total_secs,
                        chunk_secs,
                    }
                } else {
                    SessionCommand::Start {
                        total_secs,
                        chunk_secs,
                    }
                }
            }
            "stop" => SessionCommand::Stop,
            "status" => SessionCommand::Status,
            "help" | "?" => SessionCommand::Help,
            "quit" | "exit" => SessionCommand::Quit,
            other => return Err(format!("unknown command `{other}` (try `help`)")),
        };
        Ok(Some(command))
    }
}

/// Unparseable durations become 0 so the controller rejects them with its
/// own validation message.
fn durations(args: &[&str]) -> Option<(i64, i64)> {
    let seconds = |raw: &str| parse_duration_secs(raw).unwrap_or(0);
    match args {
        [total] => Some((seconds(total), DEFAULT_CHUNK_SECS as i64)),
        [total, chunk] => Some((seconds(total), seconds(chunk))),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardCommand {
    Videos,
    List,
    Users,
    /// Empty username clears the filter.
    Filter(String),
    Play(i64),
    Download(i64),
    Delete(i64),
    Help,
    Quit,
}

impl DashboardCommand {
    /// `Ok(None)` for a blank line, `Err(usage)` for a malformed one.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();
        let verb = verb.to_ascii_lowercase();

        let id = |verb: &str| -> Result<i64, String> {
            match args.as_slice() {
                [raw] => raw
                    .parse()
                    .map_err(|_| format!("`{raw}` is not a video id")),
                _ => Err(format!("usage: {verb} <id>")),
            }
        };

        let command = match verb.as_str() {
            "videos" | "refresh" => DashboardCommand::Videos,
            "list" | "ls" => DashboardCommand::List,
            "users" => DashboardCommand::Users,
            "filter" => match args.as_slice() {
                [] => DashboardCommand::Filter(String::new()),
                [username] => DashboardCommand::Filter(username.to_string()),
                _ => return Err("usage: filter [username]".into()),
            },
            "play" => DashboardCommand::Play(id("play")?),
            "download" => DashboardCommand::Download(id("download")?),
            "delete" | "rm" => DashboardCommand::Delete(id("delete")?),
            "help" | "?" => DashboardCommand::Help,
            "quit" | "exit" => DashboardCommand::Quit,
            other => return Err(format!("unknown command `{other}` (try `help`)")),
        };
        Ok(Some(command))
    }
}
