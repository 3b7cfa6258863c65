use mongodb::bson::Document;
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::{EtlError, Result};
use crate::helpers::profiling::Profiler;
use crate::models::Record;
use crate::services::database::{
    Target, acknowledged_prefix, create_mongo_client, get_collection, insert_batch_to_mongo,
};

/// Inserts `records` into `target` as one ordered batch and returns how many
/// records were submitted.
///
/// An empty batch returns `0` without opening a connection. When MongoDB
/// rejects a record partway through, the records before it remain persisted
/// and the error reports how many that is; nothing is rolled back.
pub async fn load_records(
    settings: &Settings,
    records: Vec<Record>,
    target: &Target,
) -> Result<usize> {
    let total = records.len();
    if total == 0 {
        info!("No records to insert, skipping MongoDB");
        return Ok(0);
    }

    let profiler = Profiler::start();
    let mongo_client = create_mongo_client(settings)
        .await
        .map_err(|source| EtlError::Load {
            operation: "connect",
            source,
        })?;
    let collection = get_collection(&mongo_client, target);

    info!(
        database = %target.database,
        collection = %target.collection,
        records = total,
        "Started inserting data into MongoDB"
    );
    let batch: Vec<Document> = records.into_iter().map(Document::from).collect();
    let result = insert_batch_to_mongo(&collection, batch).await;
    mongo_client.shutdown().await;

    let inserted = result.map_err(|source| match acknowledged_prefix(&source, total) {
        Some(acknowledged) => {
            warn!(acknowledged, total, "Bulk insert stopped partway, prefix left persisted");
            EtlError::PartialLoad {
                acknowledged,
                total,
                source,
            }
        }
        None => EtlError::Load {
            operation: "insert",
            source,
        },
    })?;

    info!(inserted, "Inserted data into MongoDB");
    profiler.report("load");
    Ok(inserted)
}
