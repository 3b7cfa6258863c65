use tracing::info;

use crate::config::Settings;
use crate::error::{EtlError, Result};
use crate::services::database::{create_mongo_client, ping};

pub const PING_CONFIRMATION: &str =
    "Pinged your deployment. You successfully connected to MongoDB!";

/// Sends a single `ping` to the deployment. Bounded by the configured
/// server selection timeout; nothing is retried.
pub async fn check_connectivity(settings: &Settings) -> Result<String> {
    let mongo_client = create_mongo_client(settings)
        .await
        .map_err(|source| EtlError::Connection { source })?;

    let result = ping(&mongo_client).await;
    mongo_client.shutdown().await;
    result.map_err(|source| EtlError::Connection { source })?;

    info!("MongoDB answered ping");
    Ok(PING_CONFIRMATION.to_string())
}
