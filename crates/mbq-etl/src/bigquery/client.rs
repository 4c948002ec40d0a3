//! HTTP client for the BigQuery v2 REST API
//!
//! Covers the two calls the exporter needs: `tables.insert` with
//! create-if-needed semantics and `tabledata.insertAll` for appends.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use super::types::{
    InsertRow, Table, TableDataInsertAllRequest, TableDataInsertAllResponse, TableReference,
    TableSchema,
};
use super::WarehouseSink;
use crate::config::BigQueryConfig;
use crate::record::NormalizedRecord;

// ============================================================================
// BigQuery Client Constants
// ============================================================================

/// Timeout for a single API request in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// BigQuery-backed [`WarehouseSink`]
pub struct BigQueryClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl BigQueryClient {
    /// Create a new client against the configured endpoint
    pub fn new(config: &BigQueryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn tables_url(&self, table: &TableReference) -> String {
        format!(
            "{}/projects/{}/datasets/{}/tables",
            self.base_url, table.project_id, table.dataset_id
        )
    }

    fn insert_all_url(&self, table: &TableReference) -> String {
        format!(
            "{}/projects/{}/datasets/{}/tables/{}/insertAll",
            self.base_url, table.project_id, table.dataset_id, table.table_id
        )
    }
}

#[async_trait]
impl WarehouseSink for BigQueryClient {
    async fn prepare_table(&self, table: &TableReference, schema: &TableSchema) -> Result<()> {
        let body = Table {
            table_reference: table.clone(),
            schema: schema.clone(),
        };

        let response = self
            .client
            .post(self.tables_url(table))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("table creation request failed for {}", table))?;

        // Append disposition: an existing table is fine, rows go on top.
        if response.status() == StatusCode::CONFLICT {
            debug!(table = %table, "Destination table already exists, appending");
            return Ok(());
        }

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            bail!("failed to create table {}: {} {}", table, status, detail);
        }

        debug!(table = %table, "Created destination table");
        Ok(())
    }

    async fn append_rows(&self, table: &TableReference, rows: &[NormalizedRecord]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let request = TableDataInsertAllRequest {
            rows: rows
                .iter()
                .map(|record| {
                    Ok(InsertRow {
                        json: serde_json::to_value(record)?,
                    })
                })
                .collect::<Result<Vec<_>>>()?,
        };

        let response = self
            .client
            .post(self.insert_all_url(table))
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("insert request failed for {}", table))?
            .error_for_status()
            .with_context(|| format!("insert rejected for {}", table))?;

        let body: TableDataInsertAllResponse = response
            .json()
            .await
            .with_context(|| format!("unreadable insert response for {}", table))?;

        if !body.insert_errors.is_empty() {
            let first = body
                .insert_errors
                .first()
                .and_then(|e| e.errors.first())
                .and_then(|e| e.message.clone())
                .unwrap_or_else(|| "unknown insert error".to_string());
            bail!(
                "{} of {} rows rejected by {}: {}",
                body.insert_errors.len(),
                rows.len(),
                table,
                first
            );
        }

        Ok(())
    }
}
