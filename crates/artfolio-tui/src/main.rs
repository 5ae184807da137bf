//! Artfolio - a terminal client for the Artfolio image-sharing service.
//!
//! Browse the gallery, open artworks with their comments and likes, and
//! manage your own work and profile. Every screen change re-checks the stored
//! credential token with the service before showing user-specific content.

mod app;
mod ui;

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use artfolio_core::auth::MemoryTokenStore;
use artfolio_core::{
    ApiClient, Config, Navigator, Resolution, Route, SessionResolver, SessionStore, TokenStorage,
    TOKEN_KEY,
};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const LOG_FILE: &str = "artfolio.log";

fn env_filter() -> EnvFilter {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr; used by the one-shot CLI commands
fn init_cli_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

/// Log to a file so output does not tear the alternate screen.
/// The returned guard flushes the writer when dropped.
fn init_tui_tracing(config: &Config) -> Result<WorkerGuard> {
    let dir = config.log_dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, LOG_FILE));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();
    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--sign-in") => {
            init_cli_tracing();
            return sign_in_cli().await;
        }
        Some("--whoami") => {
            init_cli_tracing();
            let token = match args.get(2).map(String::as_str) {
                Some("--token") => Some(
                    args.get(3)
                        .cloned()
                        .ok_or_else(|| anyhow::anyhow!("--token needs a value"))?,
                ),
                _ => None,
            };
            return whoami(token).await;
        }
        Some(other) => {
            eprintln!("Unknown argument: {}", other);
            eprintln!("Usage: artfolio [--sign-in | --whoami [--token TOKEN]]");
            std::process::exit(2);
        }
        None => {}
    }

    let (config, load_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    let _log_guard = init_tui_tracing(&config)?;
    if let Some(e) = load_error {
        warn!(error = %e, "Failed to load config, using defaults");
    }

    let mut app = App::new(config)?;
    info!(api_url = app.api.base_url(), "Artfolio starting");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // The first navigation resolves the session and redirects if needed
    app.navigate(Route::Gallery);

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

    info!("Artfolio shutting down");
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

                if handle_input(app, key) {
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
// CLI Commands
// ============================================================================

fn prompt_username(default: Option<&str>) -> Result<String> {
    match default {
        Some(name) => print!("Username [{}]: ", name),
        None => print!("Username: "),
    }
    io::stdout().flush()?;

    let mut username = String::new();
    io::stdin().read_line(&mut username)?;
    let username = username.trim();
    Ok(match (username.is_empty(), default) {
        (true, Some(name)) => name.to_string(),
        _ => username.to_string(),
    })
}

/// Sign in from the terminal and store the token for later sessions
async fn sign_in_cli() -> Result<()> {
    let mut config = Config::load().context("Failed to load config")?;
    let api = ApiClient::new(&config.api_url())?;
    let tokens = config.token_storage()?;

    let username = prompt_username(config.last_username.as_deref())?;
    let password = rpassword::prompt_password("Password: ")?;
    if username.is_empty() || password.is_empty() {
        anyhow::bail!("Username and password required");
    }

    let outcome = api.sign_in(&username, &password).await?;
    tokens
        .write(TOKEN_KEY, &outcome.token)
        .context("Failed to store token")?;

    config.last_username = Some(username);
    config.save().context("Failed to save config")?;

    println!("{}", outcome.message);
    Ok(())
}

/// Headless navigator; the resolution result already names the target
struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect(&self, to: Route) {
        info!(%to, "Redirect requested");
    }
}

/// Run one resolution cycle and print who the token belongs to.
/// An explicit token is checked without touching stored credentials.
async fn whoami(token: Option<String>) -> Result<()> {
    let config = Config::load().context("Failed to load config")?;
    let api = ApiClient::new(&config.api_url())?;
    let storage: Arc<dyn TokenStorage> = match token {
        Some(token) => Arc::new(MemoryTokenStore::with_token(&token)),
        None => config.token_storage()?,
    };
    let resolver = SessionResolver::new(
        Arc::new(api),
        storage,
        Arc::new(LogNavigator),
        SessionStore::new(),
    );

    match resolver.resolve(&Route::Gallery).await? {
        Resolution::Authenticated(user) => {
            println!("{} (@{}) id={}", user.name, user.username, user.id);
        }
        Resolution::Redirected { to, reason } => {
            println!("Not signed in ({:?}); sign in at {}", reason, to);
            std::process::exit(1);
        }
        Resolution::Superseded => {}
    }
    Ok(())
}
