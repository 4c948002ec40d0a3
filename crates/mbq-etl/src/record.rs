//! Document normalization
//!
//! Every source document is flattened into the same four-field record before
//! it reaches the warehouse: the document id rendered as text, the full
//! document as portable JSON, the instant of normalization, and an operation
//! marker. Consumers that need the original fields parse `raw`.

use anyhow::Result;
use chrono::{DateTime, Utc};
use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Serialize};

/// Operation marker for inserted/replaced rows. The only operation code the
/// pipeline emits.
pub const OP_INSERT: i64 = 1;

/// The fixed record shape written to every destination table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Document id rendered as text; empty when the document has no `_id`
    pub id: String,

    /// Full document as portable JSON. Extended BSON scalars (ObjectId,
    /// DateTime, Binary, Decimal128, ...) appear in their relaxed Extended
    /// JSON textual forms.
    pub raw: String,

    /// Instant of normalization, not a source-provided time
    #[serde(rename = "clusterTime")]
    pub cluster_time: DateTime<Utc>,

    /// Always [`OP_INSERT`]
    pub op: i64,
}

/// Normalize one source document into the destination record shape.
///
/// Pure function of the document and the current wall clock. Identifier
/// problems never fail the call: an absent `_id` degrades to an empty
/// string, any other value is coerced to its string form.
pub fn normalize(document: &Document) -> Result<NormalizedRecord> {
    let id = extract_id(document);

    // Serialize through relaxed Extended JSON so extended BSON scalars get
    // portable textual forms, then re-serialize the plain JSON value. The
    // resulting string holds no residual non-portable types.
    let portable: serde_json::Value = Bson::from(document.clone()).into_relaxed_extjson();
    let raw = serde_json::to_string(&portable)?;

    Ok(NormalizedRecord {
        id,
        raw,
        cluster_time: Utc::now(),
        op: OP_INSERT,
    })
}

/// Render the document id as text.
///
/// ObjectIds use their canonical hex form, strings pass through unquoted,
/// anything else falls back to its display form.
fn extract_id(document: &Document) -> String {
    match document.get("_id") {
        None => String::new(),
        Some(Bson::ObjectId(oid)) => oid.to_hex(),
        Some(Bson::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;
    use mongodb::bson::{doc, DateTime as BsonDateTime};

    #[test]
    fn test_object_id_uses_canonical_hex_form() {
        let oid = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
        let document = doc! { "_id": oid, "name": "alpha" };

        let record = normalize(&document).unwrap();

        assert_eq!(record.id, "507f1f77bcf86cd799439011");
    }

    #[test]
    fn test_plain_string_id_passes_through() {
        let document = doc! { "_id": "order-42" };

        let record = normalize(&document).unwrap();

        assert_eq!(record.id, "order-42");
    }

    #[test]
    fn test_numeric_id_is_coerced_to_text() {
        let document = doc! { "_id": 42_i32 };

        let record = normalize(&document).unwrap();

        assert_eq!(record.id, "42");
    }

    #[test]
    fn test_missing_id_degrades_to_empty_string() {
        let document = doc! { "name": "no id here" };

        let record = normalize(&document).unwrap();

        assert_eq!(record.id, "");
    }

    #[test]
    fn test_op_is_always_insert() {
        let record = normalize(&doc! { "_id": 1_i64 }).unwrap();
        assert_eq!(record.op, OP_INSERT);
        assert_eq!(record.op, 1);
    }

    #[test]
    fn test_raw_is_portable_json_with_extended_forms() {
        let oid = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
        let document = doc! {
            "_id": oid,
            "created": BsonDateTime::from_millis(1_700_000_000_000),
            "count": 3_i32,
            "nested": { "tag": "x" },
        };

        let record = normalize(&document).unwrap();
        let value: serde_json::Value = serde_json::from_str(&record.raw).unwrap();

        assert_eq!(
            value["_id"]["$oid"],
            serde_json::json!("507f1f77bcf86cd799439011")
        );
        assert!(value["created"]["$date"].is_string());
        assert_eq!(value["count"], serde_json::json!(3));
        assert_eq!(value["nested"]["tag"], serde_json::json!("x"));
    }

    #[test]
    fn test_raw_round_trip_is_idempotent() {
        let document = doc! {
            "_id": ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap(),
            "created": BsonDateTime::from_millis(1_700_000_000_000),
            "tags": ["a", "b"],
            "nested": { "n": 7_i64 },
        };

        let first = normalize(&document).unwrap();

        let value: serde_json::Value = serde_json::from_str(&first.raw).unwrap();
        let map = value.as_object().cloned().unwrap();
        let rehydrated = Document::try_from(map).unwrap();
        let second = normalize(&rehydrated).unwrap();

        assert_eq!(first.raw, second.raw);
    }

    #[test]
    fn test_record_serializes_with_cluster_time_key() {
        let record = normalize(&doc! { "_id": "k" }).unwrap();
        let row = serde_json::to_value(&record).unwrap();

        let keys: Vec<&String> = row.as_object().unwrap().keys().collect();
        assert!(keys.iter().any(|k| *k == "clusterTime"));
        assert!(keys.iter().any(|k| *k == "id"));
        assert!(keys.iter().any(|k| *k == "raw"));
        assert!(keys.iter().any(|k| *k == "op"));
        assert_eq!(row.as_object().unwrap().len(), 4);
    }
}
