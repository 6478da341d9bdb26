use anyhow::{anyhow, bail, Result};
use regex::Regex;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::io::{self, BufRead, IsTerminal, Write};

use crate::api::ApiClient;
use crate::cli::GlobalArgs;
use crate::config::Config;
use crate::models::AuthState;
use crate::session::{AuthController, SessionStore, TokenStore};
use crate::sync::{Confirm, SyncError};

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

/// Everything a command needs to talk to the backend.
pub struct Connection {
    pub config: Config,
    pub api: ApiClient,
}

impl Connection {
    pub fn session(&self) -> &SessionStore {
        self.api.session()
    }

    pub fn auth(&self) -> AuthController {
        AuthController::new(self.api.clone())
    }
}

/// Loads config, applies command-line overrides and opens the stored session.
pub async fn connect(global: &GlobalArgs) -> Result<Connection> {
    let mut config = Config::load(global.config.clone())?;
    if let Some(api_base) = &global.api_base {
        config = config.with_api_base(api_base.clone());
    }
    if let Some(token_path) = &global.token_path {
        config = config.with_token_path(token_path.clone());
    }

    let session = SessionStore::open(TokenStore::new(config.token_path.clone())).await?;
    let api = ApiClient::new(config.api_base.clone(), session, config.request_timeout())?;
    Ok(Connection { config, api })
}

/// Verifies the stored token before an authenticated command runs.
pub async fn require_session(conn: &Connection) -> Result<()> {
    let state = conn.auth().restore().await.map_err(failure)?;
    if state != AuthState::Authenticated {
        bail!("Not signed in. Run 'padash login <email>' first.");
    }
    Ok(())
}

/// Converts a controller error into the message shown to the operator.
pub fn failure(error: SyncError) -> anyhow::Error {
    if error.is_auth() {
        return anyhow!(
            "{} Run 'padash login <email>' to sign in again.",
            error.user_message()
        );
    }
    anyhow!(error.user_message())
}

/// clap value parser for email arguments.
pub fn parse_email(input: &str) -> std::result::Result<String, String> {
    let email = input.trim();
    let pattern = Regex::new(EMAIL_PATTERN).map_err(|e| e.to_string())?;
    if pattern.is_match(email) {
        Ok(email.to_string())
    } else {
        Err(format!("{:?} is not an email address", input))
    }
}

/// Returns the given password or asks for one.
///
/// On a terminal the typed characters are not echoed; piped input is read as
/// one line.
pub fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => {
            eprint!("Password: ");
            io::stderr().flush()?;
            if io::stdin().is_terminal() {
                read_hidden()
            } else {
                read_line(&mut io::stdin().lock())
            }
        }
    }
}

enum Entry {
    Continue,
    Done,
    Cancelled,
}

fn edit_hidden(buffer: &mut String, key: KeyEvent) -> Entry {
    match key.code {
        KeyCode::Enter => Entry::Done,
        KeyCode::Esc => Entry::Cancelled,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Entry::Cancelled,
        KeyCode::Backspace => {
            buffer.pop();
            Entry::Continue
        }
        KeyCode::Char(c) => {
            buffer.push(c);
            Entry::Continue
        }
        _ => Entry::Continue,
    }
}

fn read_hidden() -> Result<String> {
    terminal::enable_raw_mode()?;
    let result = read_hidden_keys();
    terminal::disable_raw_mode()?;
    eprintln!();
    result
}

fn read_hidden_keys() -> Result<String> {
    let mut password = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match edit_hidden(&mut password, key) {
            Entry::Continue => {}
            Entry::Done => return Ok(password),
            Entry::Cancelled => bail!("Cancelled"),
        }
    }
}

fn read_line(input: &mut impl BufRead) -> Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Asks on the terminal; anything but y/yes declines.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        eprint!("{} [y/N] ", prompt);
        if io::stderr().flush().is_err() {
            return false;
        }
        read_line(&mut io::stdin().lock())
            .map(|answer| is_yes(&answer))
            .unwrap_or(false)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
