use anyhow::{Context, Result};
use clap::Parser;
use csv_mongo_loader::cli::{Cli, Command};
use csv_mongo_loader::{Settings, Target, check_connectivity, csv_to_records, load_records, logger};
use tracing::debug;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Loaded before parsing so DATABASE_NAME and COLLECTION_NAME can come from .env.
    let env_file = dotenvy::dotenv();
    let cli = Cli::parse();
    logger::setup(&cli.log_level);

    if let Ok(path) = env_file {
        debug!(path = %path.display(), "Loaded environment file");
    }

    match cli.command {
        Command::Load {
            file,
            database,
            collection,
        } => {
            let settings = Settings::from_env()?;
            let target = Target::new(database, collection)?;
            let records = csv_to_records(&file).await?;
            let no_of_records = load_records(&settings, records, &target)
                .await
                .with_context(|| format!("Loading '{}' into MongoDB", file.display()))?;
            println!("{no_of_records}");
        }
        Command::Convert { file } => {
            for record in csv_to_records(&file).await? {
                println!("{}", serde_json::to_string(&record)?);
            }
        }
        Command::Ping => {
            let settings = Settings::from_env()?;
            println!("{}", check_connectivity(&settings).await?);
        }
    }
    Ok(())
}
