//! flowdeck - a terminal dashboard for workflow platform applications.
//!
//! Lists the applications the backend exposes, creates new ones and opens
//! them in the platform's own editor. Also usable as a plain CLI.

mod app;
mod ui;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use flowdeck_core::auth::{self, Credentials};
use flowdeck_core::links::{Launcher, LinkTarget, PlatformLinks, SystemLauncher};
use flowdeck_core::{ApiClient, Config, Settings};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file prefix inside the log directory
const LOG_FILE_PREFIX: &str = "flowdeck.log";

const USAGE: &str = "\
Usage: flowdeck [COMMAND]

Commands:
  (none)               Start the terminal dashboard
  login <token>        Verify a token and store it
  logout               Forget the stored session
  list                 List applications
  show <id>            Print one application as JSON
  open <id> [--overview]
                       Open an application on the platform
  run <id> [--inputs <json>]
                       Run an application and print its result
  home                 Open the platform home page";

fn env_filter() -> EnvFilter {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr (CLI commands)
fn init_stderr_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

/// Log to a daily rolling file; the terminal belongs to the UI.
fn init_file_tracing() -> WorkerGuard {
    let log_dir = Config::cache_dir()
        .unwrap_or_else(|_| PathBuf::from("./cache"))
        .join("logs");
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();
    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let settings = Config::load()?.resolve();
    let credentials = Credentials::new(settings.credential_store()?);

    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        init_stderr_tracing();
        return run_command(&settings, &credentials, &args).await;
    }

    let _log_guard = init_file_tracing();
    info!(api = %settings.api_base_url, "flowdeck starting");

    let mut app = App::new(settings, credentials, Arc::new(SystemLauncher))?;
    app.mount_dashboard();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("flowdeck shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

// ============================================================================
// CLI commands
// ============================================================================

async fn run_command(settings: &Settings, credentials: &Credentials, args: &[String]) -> Result<()> {
    let api = ApiClient::new(&settings.api_base_url, settings.request_timeout)?;
    let links = PlatformLinks::new(&settings.platform_url);
    let arg = |i: usize| args.get(i).map(String::as_str);

    match (arg(0), arg(1)) {
        (Some("login"), Some(token)) => {
            let user = auth::login(&api, credentials, token).await?;
            println!("Logged in as {}", user.display_name());
        }
        (Some("logout"), None) => {
            auth::logout(credentials)?;
            println!("Logged out");
        }
        (Some("list"), None) => list_apps(&api, credentials).await?,
        (Some("show"), Some(id)) => {
            let remote = authed(&api, credentials)?
                .fetch_app(id)
                .await
                .with_context(|| format!("Failed to fetch app {}", id))?;
            println!("{}", serde_json::to_string_pretty(&remote)?);
        }
        (Some("run"), Some(id)) => {
            let inputs = parse_inputs(&args[2..])?;
            let result = authed(&api, credentials)?
                .run_app(id, &inputs)
                .await
                .with_context(|| format!("Failed to run app {}", id))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        (Some("open"), Some(id)) => {
            let target = if args.iter().skip(2).any(|a| a == "--overview") {
                LinkTarget::Overview
            } else {
                LinkTarget::Editor
            };
            open_url(&links.app(id, target))?;
        }
        (Some("home"), None) => open_url(&links.home())?,
        (Some("help" | "--help" | "-h"), _) => println!("{}", USAGE),
        _ => {
            eprintln!("{}", USAGE);
            anyhow::bail!("Unrecognized command: {}", args.join(" "));
        }
    }
    Ok(())
}

/// Client bearing the stored token, or an error telling the user to log in.
fn authed(api: &ApiClient, credentials: &Credentials) -> Result<ApiClient> {
    let token = credentials
        .token()
        .ok_or_else(|| anyhow::anyhow!("Not logged in. Run `flowdeck login <token>` first."))?;
    Ok(api.with_token(token))
}

async fn list_apps(api: &ApiClient, credentials: &Credentials) -> Result<()> {
    let apps = authed(api, credentials)?
        .fetch_apps()
        .await
        .context("Failed to load apps")?;

    println!("Applications ({})", apps.len());
    for remote in &apps {
        println!(
            "  {:<12} {:<14} {:<11} {}",
            remote.short_id(),
            remote.mode.label(),
            remote.created_display(),
            remote.name
        );
    }
    Ok(())
}

/// Inputs from `--inputs <json>`; an empty object when absent.
fn parse_inputs(args: &[String]) -> Result<serde_json::Value> {
    let Some(pos) = args.iter().position(|a| a == "--inputs") else {
        return Ok(serde_json::Value::Object(serde_json::Map::new()));
    };
    let raw = args
        .get(pos + 1)
        .ok_or_else(|| anyhow::anyhow!("--inputs requires a JSON object"))?;
    let inputs: serde_json::Value = serde_json::from_str(raw).context("--inputs is not valid JSON")?;
    if !inputs.is_object() {
        anyhow::bail!("--inputs must be a JSON object");
    }
    Ok(inputs)
}

fn open_url(url: &str) -> Result<()> {
    SystemLauncher.open(url)?;
    println!("{}", url);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_inputs() {
        let empty = parse_inputs(&args(&[])).expect("no inputs");
        assert_eq!(empty, serde_json::json!({}));

        let inputs = parse_inputs(&args(&["--inputs", r#"{"query":"hi"}"#])).expect("inputs");
        assert_eq!(inputs["query"], "hi");

        assert!(parse_inputs(&args(&["--inputs"])).is_err());
        assert!(parse_inputs(&args(&["--inputs", "[1,2]"])).is_err());
        assert!(parse_inputs(&args(&["--inputs", "{oops"])).is_err());
    }
}
