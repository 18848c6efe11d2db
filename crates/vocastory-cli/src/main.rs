use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use eyre::Result;
use tracing_subscriber::EnvFilter;

use vocastory_cli::config;
use vocastory_cli::local_store::LocalStore;
use vocastory_cli::session::Session;
use vocastory_storage::connector::HttpConnector;

mod terminal;

#[derive(Parser)]
#[command(name = "vocastory", version, about = "Author stories with vocabulary glossaries")]
struct Cli {
    /// Directory holding config.json and remembered field values.
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the wizard (default).
    Run {
        /// Also write each preview as an HTML page to this path.
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// Print the effective config.
    Config,
    /// Forget remembered credentials and key phrase.
    Forget,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if cli.log_json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let dir = match cli.config_dir {
        Some(dir) => dir,
        None => config::default_config_dir()?,
    };
    let app_config = config::load_config(&dir)?;
    if !config::has_config(&dir) {
        config::save_config(&dir, &app_config)?;
    }

    match cli.command.unwrap_or(Command::Run { html: None }) {
        Command::Run { html } => {
            let connector = Arc::new(HttpConnector::new(app_config.http_store_config()));
            let local = Arc::new(LocalStore::open(&dir));
            let session = Session::new(connector, local, &app_config);
            terminal::run(session, html.as_deref()).await
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&app_config)?);
            Ok(())
        }
        Command::Forget => LocalStore::open(&dir).clear(),
    }
}
