//! Export jobs
//!
//! A job binds one collection mapping to its destination table and fixed
//! schema, then runs read → normalize → append to completion. Jobs are built
//! immediately before execution and executed once.

use std::time::Instant;

use anyhow::{Context, Result};
use futures::TryStreamExt;
use serde::Serialize;
use tracing::info;

use crate::bigquery::{raw_document_schema, TableReference, TableSchema, WarehouseSink};
use crate::config::RunConfig;
use crate::mappings::CollectionMapping;
use crate::record::{normalize, NormalizedRecord};
use crate::source::DocumentSource;

/// One executable read-transform-write pipeline instance
#[derive(Debug, Clone)]
pub struct Job {
    /// Source binding
    pub mapping: CollectionMapping,

    /// Destination binding
    pub table: TableReference,

    /// Destination schema; identical for every job
    pub schema: TableSchema,

    insert_batch_size: usize,
}

/// Counts for one completed job
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub collection: String,
    pub table: String,
    pub documents_read: u64,
    pub rows_written: u64,
    pub duration_seconds: f64,
}

impl Job {
    /// Bind a mapping to the run configuration
    pub fn build(mapping: &CollectionMapping, config: &RunConfig) -> Self {
        Self {
            mapping: mapping.clone(),
            table: TableReference {
                project_id: config.project_id.clone(),
                dataset_id: config.dataset.clone(),
                table_id: mapping.destination_table(),
            },
            schema: raw_document_schema(),
            insert_batch_size: config.insert_batch_size,
        }
    }

    /// Run the job to completion.
    ///
    /// The transform stage is exactly one [`normalize`] application per
    /// document. Normalized rows are appended in batches; a partially
    /// written table is possible on failure and tolerated by the append-only
    /// model.
    pub async fn execute<S, W>(&self, source: &S, sink: &W) -> Result<JobReport>
    where
        S: DocumentSource + ?Sized,
        W: WarehouseSink + ?Sized,
    {
        let start = Instant::now();

        info!(
            collection = %self.mapping.collection_name,
            table = %self.table,
            "Starting export job"
        );

        sink.prepare_table(&self.table, &self.schema)
            .await
            .context("failed to prepare destination table")?;

        let mut documents = source
            .stream_collection(&self.mapping)
            .await
            .context("failed to open source collection")?;

        let mut batch: Vec<NormalizedRecord> = Vec::with_capacity(self.insert_batch_size);
        let mut documents_read = 0u64;
        let mut rows_written = 0u64;

        while let Some(document) = documents.try_next().await.context("source read failed")? {
            documents_read += 1;
            batch.push(normalize(&document)?);

            if batch.len() >= self.insert_batch_size {
                sink.append_rows(&self.table, &batch)
                    .await
                    .context("failed to append rows")?;
                rows_written += batch.len() as u64;
                batch.clear();
            }
        }

        if !batch.is_empty() {
            sink.append_rows(&self.table, &batch)
                .await
                .context("failed to append rows")?;
            rows_written += batch.len() as u64;
        }

        let report = JobReport {
            collection: self.mapping.collection_name.clone(),
            table: self.table.to_string(),
            documents_read,
            rows_written,
            duration_seconds: start.elapsed().as_secs_f64(),
        };

        info!(
            collection = %report.collection,
            table = %report.table,
            rows = report.rows_written,
            "Export job complete in {:.2}s",
            report.duration_seconds
        );

        Ok(report)
    }
}
