use clap::{Parser, Subcommand};
use kintree::api::HttpServer;
use kintree::db::migrate;
use kintree::{open_store, Config, FamilyTreeService};
use std::sync::Arc;
use anyhow::{Context, Result};

#[derive(Parser, Debug)]
#[command(name = "kintree")]
#[command(version, about = "Genealogical family tree builder with kinship classification")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply migrations and check the database schema (default)
    Verify,
    /// Serve the family tree HTTP API
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", &config.kintree.log_level)
    ).init();

    match args.command.unwrap_or(Command::Verify) {
        Command::Serve => run_http_server(config).await?,
        Command::Verify => run_schema_verification(config).await?,
    }

    Ok(())
}

async fn run_http_server(config: Config) -> Result<()> {
    log::info!("Starting kintree HTTP server v{}", env!("CARGO_PKG_VERSION"));

    let store = open_store(&config).await.context("Failed to open database")?;

    let service = FamilyTreeService::new(Arc::new(store));
    let server = HttpServer::new(service, config.http_server.clone());
    server.run().await?;

    Ok(())
}

async fn run_schema_verification(config: Config) -> Result<()> {
    log::info!("Starting kintree v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Configuration loaded successfully");
    log::info!("Database path: {}", config.db_path().display());

    let store = open_store(&config).await.context("Failed to open database")?;

    let missing = store.db().with_connection(|conn| migrate::missing_tables(conn)).await?;
    if !missing.is_empty() {
        for table in &missing {
            log::error!("Missing table: {}", table);
        }
        anyhow::bail!("Not all required tables exist: {}", missing.join(", "));
    }

    log::info!("✓ Database schema verified");
    Ok(())
}
