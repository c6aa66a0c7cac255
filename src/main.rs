use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use incidentdesk::config::{LoggingConfig, ServiceConfig};
use incidentdesk::storage::IncidentStore;

#[derive(Parser)]
#[command(
    name = "incidentdesk",
    about = "Incident tracking service with AI-assisted triage",
    version,
    long_about = None
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        bind: Option<String>,

        /// SQLite database path (overrides config)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Print every stored incident
    List {
        /// SQLite database path (overrides config)
        #[arg(long)]
        db: Option<PathBuf>,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Classify an incident without storing it
    Classify {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,
    },
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config resolution logs which file it used; report that with default
    // settings until the configured subscriber is installed.
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    let mut config = tracing::subscriber::with_default(bootstrap, || {
        ServiceConfig::resolve(cli.config.as_deref())
    })?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Serve { bind, db } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if let Some(db) = db {
                config.database.path = db;
            }
            tracing::info!(bind = %config.server.bind, "Starting IncidentDesk");
            incidentdesk::serve(&config).await?;
        }
        Commands::List { db, json } => {
            if let Some(db) = db {
                config.database.path = db;
            }
            let pool = incidentdesk::storage::open_pool(&config.database.path)?;
            let store = incidentdesk::storage::SqliteIncidentStore::new(pool);
            let incidents = store.list_all()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&incidents)?);
            } else if incidents.is_empty() {
                println!("No incidents found.");
            } else {
                println!(
                    "{:<36} | {:<11} | {:<8} | {:<6} | {:<8} | Title",
                    "ID", "Status", "Priority", "AI Sev", "AI Cat"
                );
                println!(
                    "{:-<36}-|-{:-<11}-|-{:-<8}-|-{:-<6}-|-{:-<8}-|-{:-<30}",
                    "", "", "", "", "", ""
                );
                for i in incidents {
                    println!(
                        "{:<36} | {:<11} | {:<8} | {:<6} | {:<8} | {}",
                        i.id,
                        i.status.as_str(),
                        i.priority.as_str(),
                        i.ai_severity.as_str(),
                        i.ai_category.as_str(),
                        i.title
                    );
                }
            }
        }
        Commands::Classify { title, description } => {
            let classifier = config.classifier.build()?;
            let result = match classifier.classify(&title, &description).await {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(error = %e, "AI analysis failed, using default classification");
                    Default::default()
                }
            };
            println!("severity: {}", result.severity);
            println!("category: {}", result.category);
        }
    }

    Ok(())
}
