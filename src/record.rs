// 🧾 Defect Record - the one entity every stage of the pipeline speaks
// Created by CSV ingestion or manual entry; both produce the same shape.

use serde::{Deserialize, Serialize};

use crate::error::LedgerResult;

/// Sentinel the source spreadsheets use for "no date".
pub const NO_DATE: &str = "X";

/// Default `source` column value.
pub const DEFAULT_SOURCE: &str = "ER";

/// DefectRecord - one defective item reported against a vendor
///
/// Date fields hold either a canonical `YYYY-MM-DD` string, free text the
/// normalizer could not read, or one of the absence markers (`""` / `"X"`).
/// The status of a record is never stored here; it is derived on demand
/// by [`crate::status::StatusClassifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefectRecord {
    // ========================================================================
    // IDENTITY (assigned by the persistence layer, absent during ingestion)
    // ========================================================================
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    // ========================================================================
    // TEMPORAL FIELDS
    // ========================================================================
    /// When the defect was discovered
    #[serde(default)]
    pub check_date: String,
    #[serde(default)]
    pub barcode_date: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub repair_date: String,
    #[serde(default)]
    pub deduction_date: String,
    #[serde(default)]
    pub return_date: String,
    #[serde(default)]
    pub hub_date: String,

    // ========================================================================
    // DESCRIPTIVE FIELDS
    // ========================================================================
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub defect_content: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub manager: String,
    #[serde(default = "default_source")]
    pub source: String,

    // ========================================================================
    // NUMERIC FIELDS
    // ========================================================================
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub cost: f64,

    // ========================================================================
    // FLAGS
    // ========================================================================
    #[serde(default)]
    pub is_deduction_requested: bool,
    #[serde(default)]
    pub is_repaid: bool,
    #[serde(default)]
    pub is_reverted: bool,
}

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

fn default_quantity() -> u32 {
    1
}

impl Default for DefectRecord {
    fn default() -> Self {
        DefectRecord {
            id: None,
            check_date: String::new(),
            barcode_date: String::new(),
            release_date: String::new(),
            repair_date: String::new(),
            deduction_date: String::new(),
            return_date: String::new(),
            hub_date: String::new(),
            vendor: String::new(),
            product_name: String::new(),
            color: String::new(),
            size: String::new(),
            defect_content: String::new(),
            note: String::new(),
            manager: String::new(),
            source: default_source(),
            quantity: default_quantity(),
            cost: 0.0,
            is_deduction_requested: false,
            is_repaid: false,
            is_reverted: false,
        }
    }
}

/// True when a date field carries a value: not blank and not the `"X"` sentinel.
pub fn is_set(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != NO_DATE
}

/// True when a field is non-blank, `"X"` included.
///
/// The overdue rule treats any filled-in repair/deduction/return cell as
/// "something happened", even the sentinel.
pub fn is_filled(value: &str) -> bool {
    !value.trim().is_empty()
}

impl DefectRecord {
    /// `note` followed by `defectContent`, trimmed.
    ///
    /// Keyword rules search this concatenation, so a keyword may straddle the
    /// two fields exactly as it would in the source sheet.
    pub fn combined_text(&self) -> String {
        format!("{}{}", self.note, self.defect_content).trim().to_string()
    }

    /// cost × quantity
    pub fn line_amount(&self) -> f64 {
        self.cost * f64::from(self.quantity)
    }

    /// Vendor name, or `None` for blank vendors.
    pub fn vendor_name(&self) -> Option<&str> {
        let vendor = self.vendor.trim();
        if vendor.is_empty() {
            None
        } else {
            Some(vendor)
        }
    }

    /// Give the record a fresh UUID v4 identity if it has none yet.
    ///
    /// Used by the application shell when handing ingested records to storage.
    pub fn assign_id(&mut self) -> &str {
        self.id
            .get_or_insert_with(|| uuid::Uuid::new_v4().to_string())
            .as_str()
    }

    /// Builder: set the identity explicitly.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Append text to the note, space-separated.
    pub fn append_note(&mut self, text: &str) {
        if self.note.is_empty() {
            self.note = text.to_string();
        } else {
            self.note.push(' ');
            self.note.push_str(text);
        }
    }
}

/// Parse a JSON array of records (the snapshot written by `ingest --out`).
pub fn records_from_json(json: &str) -> LedgerResult<Vec<DefectRecord>> {
    Ok(serde_json::from_str(json)?)
}

/// Pretty-printed JSON array of records.
pub fn records_to_json(records: &[DefectRecord]) -> LedgerResult<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_json_snapshot() {
        let records = vec![
            DefectRecord::default().with_id("a"),
            DefectRecord {
                vendor: "Acme".to_string(),
                ..Default::default()
            },
        ];

        let json = records_to_json(&records).unwrap();
        assert_eq!(records_from_json(&json).unwrap(), records);

        let err = records_from_json("{not json").unwrap_err();
        assert!(matches!(err, crate::error::LedgerError::Json(_)));
    }

    #[test]
    fn test_default_record() {
        let record = DefectRecord::default();

        assert_eq!(record.source, "ER");
        assert_eq!(record.quantity, 1);
        assert_eq!(record.cost, 0.0);
        assert!(record.id.is_none());
        assert!(!record.is_repaid);
    }

    #[test]
    fn test_is_set_sentinels() {
        assert!(!is_set(""));
        assert!(!is_set("   "));
        assert!(!is_set("X"));
        assert!(!is_set(" X "));
        assert!(is_set("2024-01-05"));

        assert!(is_filled("X"));
        assert!(!is_filled("  "));
    }

    #[test]
    fn test_combined_text_and_amount() {
        let record = DefectRecord {
            note: " 차감".to_string(),
            defect_content: "완료 ".to_string(),
            cost: 1250.0,
            quantity: 4,
            ..Default::default()
        };

        assert_eq!(record.combined_text(), "차감완료");
        assert_eq!(record.line_amount(), 5000.0);
    }

    #[test]
    fn test_append_note() {
        let mut record = DefectRecord::default();
        record.append_note("first");
        record.append_note("second");

        assert_eq!(record.note, "first second");
    }

    #[test]
    fn test_assign_id_is_stable() {
        let mut record = DefectRecord::default();
        let first = record.assign_id().to_string();
        let second = record.assign_id().to_string();

        assert_eq!(first, second);
        assert_eq!(first.len(), 36);

        let named = DefectRecord::default().with_id("abc");
        assert_eq!(named.id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_json_camel_case_and_defaults() {
        let json = r#"{"vendor":"Acme","checkDate":"2024-01-05","isRepaid":true}"#;
        let record: DefectRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.vendor, "Acme");
        assert_eq!(record.check_date, "2024-01-05");
        assert!(record.is_repaid);
        assert_eq!(record.quantity, 1);
        assert_eq!(record.source, "ER");

        let back = serde_json::to_string(&record).unwrap();
        assert!(back.contains("\"defectContent\""));
        assert!(!back.contains("\"id\""));
    }
}
