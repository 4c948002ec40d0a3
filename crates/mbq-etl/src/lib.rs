//! MBQ ETL Library
//!
//! Exports MongoDB collections into BigQuery tables. Each collection is
//! declared as one row of a CSV mapping file and becomes one export job:
//! stream the collection, normalize every document into a fixed four-field
//! record (`id`, `raw`, `clusterTime`, `op`), and append the records to the
//! mapped destination table.
//!
//! # Example
//!
//! ```no_run
//! use mbq_etl::bigquery::BigQueryClient;
//! use mbq_etl::config::{MongoCredentials, RunConfig};
//! use mbq_etl::orchestrator;
//! use mbq_etl::source::MongoSource;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = RunConfig::new(
//!         "my-project",
//!         "raw_mongo",
//!         "collections.csv",
//!         MongoCredentials::new("reader", "secret"),
//!         "ya29.token",
//!     );
//!     let source = MongoSource::new(config.mongo.clone());
//!     let sink = BigQueryClient::new(&config.bigquery)?;
//!     let summary = orchestrator::run(&config, &source, &sink).await;
//!     println!("{} succeeded, {} failed", summary.succeeded, summary.failed);
//!     Ok(())
//! }
//! ```

pub mod bigquery;
pub mod config;
pub mod mappings;
pub mod orchestrator;
pub mod pipeline;
pub mod record;
pub mod source;

// Re-export commonly used types
pub use orchestrator::{JobOutcome, RunSummary};
pub use record::NormalizedRecord;
