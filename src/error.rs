use std::path::PathBuf;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T> = std::result::Result<T, EtlError>;

/// Coarse classification of every failure the loader can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Conversion,
    Load,
}

#[derive(Error, Debug)]
pub enum EtlError {
    /// Required configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The source file could not be read or parsed as CSV.
    #[error("Failed to convert '{}' into records: {source}", .path.display())]
    Conversion {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    /// The driver failed while `operation` was in progress.
    #[error("MongoDB error during {operation}: {source}")]
    Load {
        operation: &'static str,
        #[source]
        source: mongodb::error::Error,
    },

    /// An ordered bulk insert stopped at a rejected record. The first
    /// `acknowledged` records of the batch are persisted and stay persisted.
    #[error("Bulk insert failed after {acknowledged} of {total} records were persisted: {source}")]
    PartialLoad {
        acknowledged: usize,
        total: usize,
        #[source]
        source: mongodb::error::Error,
    },

    #[error("Could not reach MongoDB: {source}")]
    Connection {
        #[source]
        source: mongodb::error::Error,
    },
}

impl EtlError {
    pub fn conversion(path: impl Into<PathBuf>, source: impl Into<BoxError>) -> Self {
        EtlError::Conversion {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EtlError::Config(_) => ErrorKind::Config,
            EtlError::Conversion { .. } => ErrorKind::Conversion,
            EtlError::Load { .. } | EtlError::PartialLoad { .. } | EtlError::Connection { .. } => {
                ErrorKind::Load
            }
        }
    }
}
