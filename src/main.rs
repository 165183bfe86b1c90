//! Signup Desk CLI
//!
//! Command-line front end for the signup page:
//! - List activities
//! - Log in / log out as a teacher
//! - Register and unregister students
//! - Render the page as HTML

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use signup_desk::config::{generate_default_config, Config, LoggingConfig};
use signup_desk::view::{html, text};
use signup_desk::{ActionStatus, FileStorage, HttpActivityClient, PageView, SignupController};

#[derive(Parser)]
#[command(name = "signup-desk")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Register students for extracurricular activities")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Activities API URL (overrides config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Html,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List activities and their participants
    List,

    /// Log in as a teacher
    Login {
        /// Teacher username
        username: String,
        /// Password (read from stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Log out and forget the stored token
    Logout,

    /// Show whether the stored session is still valid
    Status,

    /// Register a student for an activity
    Signup {
        /// Activity name
        activity: String,
        /// Student email
        email: String,
    },

    /// Remove a student from an activity
    Unregister {
        /// Activity name
        activity: String,
        /// Student email
        email: String,
    },

    /// Render the full signup page as HTML
    Render {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("signup_desk={}", logging.level))
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn read_password() -> anyhow::Result<String> {
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn print_page(page: &PageView, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print!("{}", text::render_page_text(page)),
        OutputFormat::Html => println!("{}", html::render_page_html(page)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(page)?),
    }
    Ok(())
}

fn write_default_config(output: Option<&Path>) -> anyhow::Result<()> {
    let config = generate_default_config();
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &config)?;
            println!("Config written to {:?}", path);
        }
        None => print!("{}", config),
    }
    Ok(())
}

fn exit_on_failure(status: ActionStatus) {
    if !status.is_success() {
        std::process::exit(1);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    init_logging(&config.logging);
    tracing::debug!(api = %config.api.base_url, "Signup Desk v{}", env!("CARGO_PKG_VERSION"));

    let api = HttpActivityClient::new(config.api.client_config())
        .context("failed to build HTTP client")?;
    let storage = FileStorage::new(&config.session.storage_path);
    let desk = SignupController::new(api, storage, config.ui.controller_options());

    let status = match cli.command {
        Commands::List => {
            desk.init().await;
            None
        }
        Commands::Login { username, password } => {
            let password = match password {
                Some(p) => p,
                None => read_password()?,
            };
            Some(desk.login(&username, &password).await)
        }
        Commands::Logout => {
            desk.logout().await;
            None
        }
        Commands::Status => {
            let authenticated = desk.verify().await;
            let page = desk.render(chrono::Utc::now()).await;
            match cli.format {
                OutputFormat::Json => {
                    let session = desk.session().await;
                    println!("{}", serde_json::to_string_pretty(&session)?);
                }
                _ => println!("{}", page.auth.text),
            }
            if !authenticated {
                std::process::exit(1);
            }
            return Ok(());
        }
        Commands::Signup { activity, email } => {
            desk.verify().await;
            let status = desk.signup(&activity, &email).await;
            if !status.is_success() {
                desk.refresh().await;
            }
            Some(status)
        }
        Commands::Unregister { activity, email } => {
            desk.verify().await;
            let status = desk.unregister(&activity, &email).await;
            if !status.is_success() {
                desk.refresh().await;
            }
            Some(status)
        }
        Commands::Render { output } => {
            desk.init().await;
            let page = desk.render(chrono::Utc::now()).await;
            let html = html::render_page_html(&page)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, html)?;
                    println!("Page written to {:?}", path);
                }
                None => println!("{}", html),
            }
            return Ok(());
        }
        Commands::Config { output } => return write_default_config(output.as_deref()),
    };

    let page = desk.render(chrono::Utc::now()).await;
    print_page(&page, cli.format)?;

    if let Some(status) = status {
        exit_on_failure(status);
    }
    Ok(())
}
