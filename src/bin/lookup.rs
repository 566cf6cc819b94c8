use clap::{Parser, Subcommand};
use kintree::{open_store, Config, FamilyTreeService};
use std::sync::Arc;
use anyhow::{Context, Result};

#[derive(Parser, Debug)]
#[command(name = "lookup")]
#[command(about = "Query family trees in the kintree database")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every relative of a person with their label and level
    Members { name: String },
    /// How the second person relates to the first
    Relationship { first: String, second: String },
    /// Generational distance from the first person to the second
    Distance { first: String, second: String },
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

    let store = open_store(&config).await.context("Failed to open database")?;
    let service = FamilyTreeService::new(Arc::new(store));

    tokio::task::spawn_blocking(move || run(&service, args.command)).await??;
    Ok(())
}

fn run(service: &FamilyTreeService, command: Command) -> Result<()> {
    match command {
        Command::Members { name } => {
            let relatives = service.family_members(&name)?;
            for relative in &relatives {
                println!("{:<3} {:<18} {}", relative.level, relative.label, relative.person.name);
            }
        }
        Command::Relationship { first, second } => {
            let relationship = service.determine_relationship(&first, &second)?;
            if relationship.is_empty() {
                println!("{} is not in {}'s family tree", second, first);
            } else {
                println!("{}", relationship);
            }
        }
        Command::Distance { first, second } => {
            println!("{}", service.kinship_distance(&first, &second)?);
        }
    }
    Ok(())
}
