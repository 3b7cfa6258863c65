use mongodb::bson::{Document, doc};
use mongodb::error::{Error, ErrorKind};
use mongodb::options::{ClientOptions, InsertManyOptions};
use mongodb::{Client, Collection};
use tracing::debug;

use crate::config::Settings;
use crate::error::{EtlError, Result};

/// Where a batch is written. MongoDB creates both on first insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub database: String,
    pub collection: String,
}

impl Target {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Result<Self> {
        let database = database.into();
        let collection = collection.into();
        if database.trim().is_empty() {
            return Err(EtlError::Config("database name must not be empty".into()));
        }
        if collection.trim().is_empty() {
            return Err(EtlError::Config("collection name must not be empty".into()));
        }
        Ok(Target {
            database,
            collection,
        })
    }
}

/// Builds a client from the settings. The driver connects lazily, so this
/// only fails on a malformed connection string or a failed SRV lookup.
pub async fn create_mongo_client(settings: &Settings) -> mongodb::error::Result<Client> {
    let mut options = ClientOptions::parse(&settings.mongo_url).await?;
    options.connect_timeout = Some(settings.connect_timeout);
    options.server_selection_timeout = Some(settings.server_selection_timeout);
    options.app_name = Some(settings.app_name.clone());
    Client::with_options(options)
}

pub fn get_collection(mongo_client: &Client, target: &Target) -> Collection<Document> {
    mongo_client
        .database(&target.database)
        .collection::<Document>(&target.collection)
}

/// Inserts the whole batch with one ordered `insert_many` and returns the
/// batch length. An empty batch is skipped.
pub async fn insert_batch_to_mongo(
    collection: &Collection<Document>,
    batch: Vec<Document>,
) -> mongodb::error::Result<usize> {
    if batch.is_empty() {
        return Ok(0);
    }
    let total = batch.len();
    let options = InsertManyOptions::builder().ordered(true).build();
    let result = collection.insert_many(batch, options).await?;
    debug!(acknowledged = result.inserted_ids.len(), total, "insert_many returned");
    Ok(total)
}

pub async fn ping(mongo_client: &Client) -> mongodb::error::Result<()> {
    mongo_client
        .database("admin")
        .run_command(doc! { "ping": 1 }, None)
        .await?;
    Ok(())
}

/// Number of leading records persisted before an ordered bulk insert of
/// `total` records failed, or `None` when the failure is not a bulk-write
/// failure and the persisted prefix is unknown.
pub fn acknowledged_prefix(error: &Error, total: usize) -> Option<usize> {
    match error.kind.as_ref() {
        ErrorKind::BulkWrite(failure) => Some(
            failure
                .write_errors
                .as_ref()
                .and_then(|errors| errors.iter().map(|e| e.index).min())
                .unwrap_or(total),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind as EtlErrorKind;
    use std::time::Duration;

    fn offline_settings() -> Settings {
        Settings {
            mongo_url: "mongodb://127.0.0.1:1/".into(),
            connect_timeout: Duration::from_millis(200),
            server_selection_timeout: Duration::from_millis(500),
            app_name: "csv-mongo-loader-tests".into(),
        }
    }

    #[test]
    fn target_requires_names() {
        assert!(Target::new("Proj1", "Proj1-Data").is_ok());

        let err = Target::new("", "Proj1-Data").unwrap_err();
        assert_eq!(err.kind(), EtlErrorKind::Config);

        let err = Target::new("Proj1", "  ").unwrap_err();
        assert_eq!(err.kind(), EtlErrorKind::Config);
    }

    #[tokio::test]
    async fn client_applies_timeouts_without_connecting() {
        let client = create_mongo_client(&offline_settings()).await.unwrap();
        let collection = get_collection(&client, &Target::new("db", "coll").unwrap());
        assert_eq!(collection.namespace().db, "db");
        assert_eq!(collection.name(), "coll");
    }

    #[tokio::test]
    async fn malformed_url_fails_to_build_a_client() {
        let mut settings = offline_settings();
        settings.mongo_url = "mongodb://".into();
        assert!(create_mongo_client(&settings).await.is_err());
    }

    #[tokio::test]
    async fn empty_batch_is_not_sent() {
        let client = create_mongo_client(&offline_settings()).await.unwrap();
        let collection = get_collection(&client, &Target::new("db", "coll").unwrap());
        let inserted = insert_batch_to_mongo(&collection, Vec::new()).await.unwrap();
        assert_eq!(inserted, 0);
    }

    fn bulk_write_error(failure: Document) -> Error {
        let failure: mongodb::error::BulkWriteFailure =
            mongodb::bson::from_document(failure).unwrap();
        Error::from(ErrorKind::BulkWrite(failure))
    }

    #[test]
    fn prefix_ends_at_first_failing_index() {
        let err = bulk_write_error(doc! {
            "writeErrors": [
                { "index": 3, "code": 11000, "codeName": "DuplicateKey", "errmsg": "dup 3" },
                { "index": 2, "code": 11000, "codeName": "DuplicateKey", "errmsg": "dup 2" },
            ],
        });
        assert_eq!(acknowledged_prefix(&err, 5), Some(2));
    }

    #[test]
    fn write_concern_failure_keeps_whole_batch() {
        let err = bulk_write_error(doc! {
            "writeConcernError": {
                "code": 64,
                "codeName": "WriteConcernFailed",
                "errmsg": "waiting for replication timed out",
            },
        });
        assert_eq!(acknowledged_prefix(&err, 5), Some(5));
    }

    #[tokio::test]
    async fn ping_fails_against_closed_port() {
        let client = create_mongo_client(&offline_settings()).await.unwrap();
        let err = ping(&client).await.unwrap_err();
        assert!(acknowledged_prefix(&err, 3).is_none());
    }
}
