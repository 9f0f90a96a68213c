//! Command-line entry point: `opentdb-import import` and `opentdb-import export`

use clap::{Parser, Subcommand};
use opentdb_import::export::{self, DEFAULT_EXPORT_FILE};
use opentdb_import::{
    CategoryConfig, Config, Database, Error, FileTokenStore, Importer, OpenTdbClient, Result,
    TokenManager, TokenStore,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "opentdb-import", version, about = "Import OpenTDB trivia questions into SQLite")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import questions for the configured categories
    Import {
        /// JSON configuration file
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Category to import as ID:NAME (repeatable, replaces the configured list)
        #[arg(long = "category", value_parser = parse_category)]
        categories: Vec<CategoryConfig>,

        /// SQLite database file (overrides the configuration)
        #[arg(long)]
        database: Option<PathBuf>,
    },
    /// Write every stored question to a JSON file
    Export {
        /// JSON configuration file
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Output file
        #[arg(long, short, default_value = DEFAULT_EXPORT_FILE)]
        output: PathBuf,
    },
}

fn parse_category(raw: &str) -> std::result::Result<CategoryConfig, String> {
    let (id, name) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected ID:NAME, got '{}'", raw))?;
    let id = id
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid category id '{}': {}", id, e))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing category name in '{}'", raw));
    }
    Ok(CategoryConfig::new(id, name))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path).await,
        None => Ok(Config::default()),
    }
}

/// Returns whether the run completed without a fatal abort
async fn import(
    config: Option<PathBuf>,
    categories: Vec<CategoryConfig>,
    database: Option<PathBuf>,
) -> Result<bool> {
    let mut config = load_config(config.as_ref()).await?;
    if !categories.is_empty() {
        config.categories = categories;
    }
    if let Some(database) = database {
        config.persistence.database_path = database;
    }
    config.validate()?;

    if config.categories.is_empty() {
        return Err(Error::Config {
            message: "no categories to import; pass --category or list them in the config"
                .to_string(),
            key: Some("categories".to_string()),
        });
    }

    let db = Arc::new(Database::new(&config.persistence.database_path).await?);
    let client = Arc::new(OpenTdbClient::new(&config.api, config.retry.clone())?);
    let token_store: Arc<dyn TokenStore> = match &config.persistence.token_file {
        Some(path) => Arc::new(FileTokenStore::new(path)),
        None => db.clone(),
    };
    let tokens = TokenManager::new(client.clone(), token_store);

    let mut importer = Importer::new(client, db.clone(), tokens, config.import.clone());
    let report = importer.run(&config.categories).await;
    println!("{report}");

    info!(
        questions = db.question_count().await?,
        answers = db.answer_count().await?,
        "Database totals"
    );
    db.close().await;

    Ok(!report.is_aborted())
}

async fn export(config: Option<PathBuf>, output: PathBuf) -> Result<()> {
    let config = load_config(config.as_ref()).await?;
    let db = Database::new(&config.persistence.database_path).await?;
    let total = export::write_json(&db, &output).await?;
    println!("Exported {} questions to {}", total, output.display());
    db.close().await;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::Import {
            config,
            categories,
            database,
        } => import(config, categories, database).await,
        Command::Export { config, output } => export(config, output).await.map(|()| true),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %e, code = e.error_code(), "opentdb-import failed");
            ExitCode::FAILURE
        }
    }
}
