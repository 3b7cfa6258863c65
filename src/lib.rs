pub mod cli;
pub mod config;
pub mod error;
pub mod helpers;
pub mod logger;
pub mod models;
pub mod services;

pub use config::Settings;
pub use error::{ErrorKind, EtlError, Result};
pub use models::{Record, Scalar};
pub use services::checker::check_connectivity;
pub use services::converter::csv_to_records;
pub use services::database::Target;
pub use services::loader::load_records;
