//! Warehouse write collaborator
//!
//! The pipeline writes through the [`WarehouseSink`] trait; [`BigQueryClient`]
//! is the production adapter over the BigQuery v2 REST API. Tests substitute
//! recording sinks.

mod client;
mod types;

pub use client::{BigQueryClient, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use types::{
    raw_document_schema, FieldMode, FieldType, TableFieldSchema, TableReference, TableSchema,
};

use anyhow::Result;
use async_trait::async_trait;

use crate::record::NormalizedRecord;

/// Persists normalized records into warehouse tables
#[async_trait]
pub trait WarehouseSink: Send + Sync {
    /// Create the destination table with the given schema if it does not
    /// exist yet. An existing table is left untouched; rows are only ever
    /// appended.
    async fn prepare_table(&self, table: &TableReference, schema: &TableSchema) -> Result<()>;

    /// Append one batch of rows to the destination table.
    async fn append_rows(&self, table: &TableReference, rows: &[NormalizedRecord]) -> Result<()>;
}
