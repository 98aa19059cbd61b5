// Defect Ledger - Core Library
// CSV ingestion, record classification and dashboard aggregation.
// The binary and the integration tests both go through these exports.

pub mod record;
pub mod tokenizer;
pub mod dates;
pub mod keywords;
pub mod rows;
pub mod ingest;
pub mod status;
pub mod dashboard;
pub mod vendor_stats;
pub mod lifecycle;
pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use record::{
    is_filled, is_set, records_from_json, records_to_json, DefectRecord, DEFAULT_SOURCE, NO_DATE,
};
pub use tokenizer::{tokenize, Grid};
pub use dates::{normalize_date, normalize_timestamp, parse_calendar_date};
pub use keywords::{KeywordTable, KEYWORD_TABLE_VERSION};
pub use rows::{build_record, CleanRow, MissingData, RowClass, RowClassifier};
pub use ingest::{IngestReport, Ingestor, SkipCounts, SkipEntry, SkipReason};
pub use status::{StatusClassifier, StatusLabel};
pub use dashboard::{Aggregator, DashboardSummary};
pub use vendor_stats::{deductions_by_vendor, vendor_repair_rates, VendorRepairStat};
pub use lifecycle::Lifecycle;
pub use config::{LedgerConfig, Thresholds};
pub use error::{LedgerError, LedgerResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
