//! Load the historical incident export into the record store.

use anyhow::Context;
use clap::Parser;

use crime_core::constants;
use crime_core::logic::dataset::{self, INGEST_REQUIRED_FIELDS};
use crime_dashboard::config::Config;
use crime_dashboard::store::RecordStore;

#[derive(Parser, Debug)]
#[command(author, version, about = "Ingest the incident export into the record store")]
struct Args {
    /// Historical incident export (Latin-1 CSV)
    #[arg(long, default_value = constants::DEFAULT_DATA_PATH)]
    data: String,

    /// Target collection (defaults to CRIME_COLLECTION)
    #[arg(long)]
    collection: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ingest=info,crime_dashboard=info,crime_core=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_env();
    let collection = args.collection.unwrap_or(config.collection.clone());

    let path = args.data.clone();
    let records = tokio::task::spawn_blocking(move || dataset::read_records(&path))
        .await?
        .with_context(|| format!("failed to read {}", args.data))?;

    let total = records.len();
    let records = dataset::drop_incomplete(records, INGEST_REQUIRED_FIELDS);
    tracing::info!(
        "{} of {} records complete (required: {})",
        records.len(),
        total,
        INGEST_REQUIRED_FIELDS.join(", ")
    );

    let mut store = RecordStore::open(&config.database_url, &collection)
        .await
        .with_context(|| format!("cannot connect to {}", config.database_display()))?;
    store.ensure_schema().await?;
    let inserted = store.insert_many(&records).await?;
    store.close().await?;

    println!("Inserted {} records into `{}`", inserted, collection);
    Ok(())
}
