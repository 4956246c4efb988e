use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use newsman::api::{build_http_client, HttpArticleService};
use newsman::auth::{AuthContext, IdentityClient, SessionStore};
use newsman::browser::ArticleBrowser;
use newsman::config::Config;
use secrecy::SecretString;
use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;
use tokio::sync::mpsc;

mod app;
mod theme;
mod ui;

use app::{App, AppEvent};
use theme::ThemeVariant;

/// Get the config directory path (~/.config/newsman/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("newsman"))
}

#[derive(Parser, Debug)]
#[command(name = "newsman", about = "Terminal client for a categorised news backend")]
struct Args {
    /// Config file (default: ~/.config/newsman/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Backend base URL, overriding config and environment
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account; a confirmation email is sent
    Signup {
        #[arg(long)]
        email: String,
    },
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
    },
    /// Sign out and forget the stored session
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(&config_dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(&config_dir, perms) {
                    eprintln!(
                        "Warning: failed to set permissions on {}: {}",
                        config_dir.display(),
                        e
                    );
                }
            }
            Err(e) => eprintln!("Warning: cannot read {}: {}", config_dir.display(), e),
        }
    }

    init_tracing(&config_dir, args.command.is_none())?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?
        .with_env_overrides();
    if let Some(url) = args.api_url {
        config.api_base_url = url;
    }
    config.validate().context("Invalid configuration")?;

    let http = build_http_client(config.request_timeout()).context("Failed to build HTTP client")?;
    let identity = build_identity_client(&config, &http)?;
    let store = SessionStore::new(config_dir.join("session.json"));

    match args.command {
        Some(Command::Signup { email }) => {
            let client = identity.context(NOT_CONFIGURED_HINT)?;
            let password = read_password("Password: ")?;
            let message = client.sign_up(&email, &password).await?;
            println!("{}", message);
            Ok(())
        }
        Some(Command::Login { email }) => {
            let mut auth = AuthContext::new(Some(identity.context(NOT_CONFIGURED_HINT)?), store);
            auth.init().await?;
            let password = read_password("Password: ")?;
            let user = auth.sign_in(&email, &password).await?;
            println!("Signed in as {}", user.email.as_deref().unwrap_or(&user.id));
            auth.tear_down();
            Ok(())
        }
        Some(Command::Logout) => {
            let mut auth = AuthContext::new(identity, store);
            auth.init().await?;
            if auth.session().is_none() {
                println!("Not signed in.");
            } else {
                auth.sign_out().await?;
                println!("Signed out.");
            }
            auth.tear_down();
            Ok(())
        }
        None => run_tui(config, http, identity, store).await,
    }
}

const NOT_CONFIGURED_HINT: &str =
    "Sign-in is not configured: set [auth] url and anon_key in config.toml \
     or NEWSMAN_AUTH_URL and NEWSMAN_AUTH_ANON_KEY";

async fn run_tui(
    config: Config,
    http: reqwest::Client,
    identity: Option<IdentityClient>,
    store: SessionStore,
) -> Result<()> {
    let api_url = config.api_url().context("Invalid api_base_url")?;
    let service = HttpArticleService::new(http, api_url).with_process_path(config.process_path.clone());
    let browser = ArticleBrowser::new(service, config.articles_per_page);

    let mut auth = AuthContext::new(identity, store);
    if let Err(e) = auth.init().await {
        // Browsing works without a session
        tracing::warn!(error = %e, "Failed to restore session");
    }

    let theme_variant = ThemeVariant::from_str_name(&config.theme).unwrap_or_else(|| {
        tracing::warn!(theme = %config.theme, "Unknown theme, using dark");
        ThemeVariant::Dark
    });

    let mut app = App::new(browser.clone(), auth, theme_variant);
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    tokio::spawn(async move { browser.initialize().await });

    let result = ui::run(&mut app, event_tx, event_rx).await;
    app.auth.tear_down();
    result?;

    println!("Goodbye!");
    Ok(())
}

fn build_identity_client(config: &Config, http: &reqwest::Client) -> Result<Option<IdentityClient>> {
    let Some(url) = config.auth_url() else {
        return Ok(None);
    };
    let url = url.context("Invalid [auth] url")?;
    let key = config.auth.anon_key.clone().unwrap_or_default();
    Ok(Some(IdentityClient::new(http.clone(), url, SecretString::from(key))))
}

/// Log to a file while the TUI owns the terminal, to stderr otherwise.
fn init_tracing(config_dir: &std::path::Path, tui: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("newsman=info"));

    if tui {
        let log_path = config_dir.join("newsman.log");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

/// Prompt for a password without echo when stdin is a terminal.
fn read_password(prompt: &str) -> Result<String> {
    use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
    use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

    print!("{}", prompt);
    std::io::stdout().flush()?;

    if !std::io::stdin().is_terminal() {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        return Ok(line.trim_end_matches(['\r', '\n']).to_string());
    }

    enable_raw_mode()?;
    let mut password = String::new();
    let outcome = loop {
        match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Enter => break Ok(()),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    break Err(anyhow::anyhow!("Cancelled"));
                }
                KeyCode::Backspace => {
                    password.pop();
                }
                KeyCode::Char(c) => password.push(c),
                _ => {}
            },
            Ok(_) => {}
            Err(e) => break Err(e.into()),
        }
    };
    disable_raw_mode()?;
    println!();

    outcome.map(|()| password)
}
