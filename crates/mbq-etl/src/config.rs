//! Run configuration
//!
//! The configuration is assembled once at startup (CLI flags with
//! environment-variable defaults) and passed by parameter into every
//! component that needs it. Components never read the environment
//! themselves.

use std::path::PathBuf;

use mbq_common::{MbqError, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// Run Configuration Constants
// ============================================================================

/// Default BigQuery v2 REST endpoint.
pub const DEFAULT_BIGQUERY_ENDPOINT: &str = "https://bigquery.googleapis.com/bigquery/v2";

/// Default number of export jobs running at the same time.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Default number of rows per streaming-insert request. BigQuery caps a
/// single insertAll call at 500 rows.
pub const DEFAULT_INSERT_BATCH_SIZE: usize = 500;

/// MongoDB credentials, kept as separate fields so the driver performs any
/// escaping; they are never interpolated into a connection string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoCredentials {
    pub username: String,
    pub password: String,
}

impl MongoCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// BigQuery connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BigQueryConfig {
    /// REST endpoint; overridable for emulators and tests
    pub endpoint: String,

    /// Pre-minted OAuth bearer token
    pub access_token: String,
}

impl BigQueryConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_BIGQUERY_ENDPOINT.to_string(),
            access_token: access_token.into(),
        }
    }
}

/// Immutable configuration for one export run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// GCP project that owns the destination dataset
    pub project_id: String,

    /// Destination BigQuery dataset
    pub dataset: String,

    /// Path to the CSV file listing collection-to-table mappings
    pub mappings_file: PathBuf,

    /// Source credentials
    pub mongo: MongoCredentials,

    /// Warehouse connection settings
    pub bigquery: BigQueryConfig,

    /// Export jobs running at the same time; 1 means strictly sequential
    pub concurrency: usize,

    /// Rows per streaming-insert request
    pub insert_batch_size: usize,
}

impl RunConfig {
    /// Create a run configuration with default concurrency, batch size and
    /// BigQuery endpoint
    pub fn new(
        project_id: impl Into<String>,
        dataset: impl Into<String>,
        mappings_file: impl Into<PathBuf>,
        mongo: MongoCredentials,
        bigquery_token: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            dataset: dataset.into(),
            mappings_file: mappings_file.into(),
            mongo,
            bigquery: BigQueryConfig::new(bigquery_token),
            concurrency: DEFAULT_CONCURRENCY,
            insert_batch_size: DEFAULT_INSERT_BATCH_SIZE,
        }
    }

    /// Validate that the configuration can drive a run
    pub fn validate(&self) -> Result<()> {
        if self.project_id.is_empty() {
            return Err(MbqError::config("project id must not be empty"));
        }
        if self.dataset.is_empty() {
            return Err(MbqError::config("dataset must not be empty"));
        }
        if self.concurrency == 0 {
            return Err(MbqError::config("concurrency must be at least 1"));
        }
        if self.insert_batch_size == 0 {
            return Err(MbqError::config("insert batch size must be at least 1"));
        }
        Ok(())
    }
}
