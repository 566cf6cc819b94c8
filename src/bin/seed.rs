use clap::Parser;
use kintree::store::{import_family, FamilyFile};
use kintree::{open_store, Config};
use std::path::PathBuf;
use anyhow::{Context, Result};

#[derive(Parser, Debug)]
#[command(name = "seed")]
#[command(about = "Import a JSON family file into the kintree database")]
struct Args {
    /// Family file: {"people": [{"name", "gender", "parents": [names]}]}
    file: PathBuf,
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

    log::info!("Database path: {}", config.db_path().display());

    let family = FamilyFile::from_path(&args.file)
        .with_context(|| format!("Failed to read family file {}", args.file.display()))?;
    let store = open_store(&config).await.context("Failed to open database")?;

    let summary = tokio::task::spawn_blocking(move || import_family(&store, &family)).await??;
    println!("Imported {} people and {} parent edges", summary.people, summary.edges);

    Ok(())
}
