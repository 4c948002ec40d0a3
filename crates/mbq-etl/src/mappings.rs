//! Collection-to-table mappings
//!
//! The mapping file is a CSV with one row per exported collection:
//!
//! ```csv
//! host_name,database_name,collection_name,table_name
//! mongo-a.internal:27017,crm,customers,crm.customers
//! ```
//!
//! Row order is preserved; it determines the order jobs are started in.

use std::path::Path;

use mbq_common::{MbqError, Result};
use serde::{Deserialize, Serialize};

/// One declared pairing of a source collection and a destination table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionMapping {
    /// Source host, `host` or `host:port`
    pub host_name: String,

    /// Source database
    pub database_name: String,

    /// Source collection
    pub collection_name: String,

    /// Destination table as declared; sanitized before use
    pub table_name: String,
}

impl CollectionMapping {
    /// Destination table id with the declared name sanitized for BigQuery
    pub fn destination_table(&self) -> String {
        sanitize_table_name(&self.table_name)
    }
}

/// Replace every period in a declared table name with an underscore.
///
/// BigQuery table ids cannot contain periods. No other validation happens
/// here; the warehouse rejects anything else that is illegal.
pub fn sanitize_table_name(name: &str) -> String {
    name.replace('.', "_")
}

/// Load the ordered mapping list from a CSV file.
///
/// Returns an error when the file cannot be read or a row cannot be parsed,
/// so callers can tell "failed to load" apart from "zero mappings". The
/// orchestrator treats either outcome as "no work", but only the error is
/// reported as a failed run.
pub fn load_mappings(path: &Path) -> Result<Vec<CollectionMapping>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| csv_error(path, e))?;

    let mut mappings = Vec::new();
    for row in reader.deserialize() {
        let mapping: CollectionMapping = row.map_err(|e| csv_error(path, e))?;
        mappings.push(mapping);
    }

    Ok(mappings)
}

fn csv_error(path: &Path, error: csv::Error) -> MbqError {
    let message = format!("{}: {}", path.display(), error);
    match error.into_kind() {
        csv::ErrorKind::Io(io) => MbqError::Io(io),
        _ => MbqError::mapping_file(message),
    }
}
