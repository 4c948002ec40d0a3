//! Wire types for the BigQuery v2 REST surface
//!
//! Only the slice of the API the exporter touches: table creation and
//! streaming inserts.

use serde::{Deserialize, Serialize};

/// Fully qualified table identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableReference {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
}

impl std::fmt::Display for TableReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}.{}", self.project_id, self.dataset_id, self.table_id)
    }
}

/// Column type; the exporter only ever emits these three
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    String,
    Timestamp,
    Integer,
}

/// Column mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldMode {
    Nullable,
    Required,
    Repeated,
}

/// One column of a table schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub mode: FieldMode,
}

impl TableFieldSchema {
    pub fn nullable(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            mode: FieldMode::Nullable,
        }
    }
}

/// Table schema as the API represents it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub fields: Vec<TableFieldSchema>,
}

/// The fixed destination schema every export job writes: the four fields of
/// a normalized record, in order, all nullable.
pub fn raw_document_schema() -> TableSchema {
    TableSchema {
        fields: vec![
            TableFieldSchema::nullable("id", FieldType::String),
            TableFieldSchema::nullable("raw", FieldType::String),
            TableFieldSchema::nullable("clusterTime", FieldType::Timestamp),
            TableFieldSchema::nullable("op", FieldType::Integer),
        ],
    }
}

/// Body of `tables.insert`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub table_reference: TableReference,
    pub schema: TableSchema,
}

/// Body of `tabledata.insertAll`
#[derive(Debug, Clone, Serialize)]
pub struct TableDataInsertAllRequest {
    pub rows: Vec<InsertRow>,
}

/// One row of an insertAll request
#[derive(Debug, Clone, Serialize)]
pub struct InsertRow {
    pub json: serde_json::Value,
}

/// Response of `tabledata.insertAll`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDataInsertAllResponse {
    #[serde(default)]
    pub insert_errors: Vec<InsertErrors>,
}

/// Per-row errors reported by insertAll
#[derive(Debug, Clone, Deserialize)]
pub struct InsertErrors {
    pub index: Option<u32>,
    #[serde(default)]
    pub errors: Vec<ErrorProto>,
}

/// Error detail as the API reports it
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorProto {
    pub reason: Option<String>,
    pub message: Option<String>,
}
