// 📥 Ingestion Driver - CSV text → accepted records + skip ledger
//
// One sequential pass over the tokenized grid. The first row is always the
// canonical header. Every other row ends up in exactly one place:
//   accepted (Valid) / merged into the previous record / skipped with a reason.
//
// Order matters: a Mergeable row can only ever extend the record accepted
// immediately before it, so rows are folded strictly in file order and the
// run keeps its own "last accepted" index. Nothing here is shared between
// runs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::LedgerConfig;
use crate::keywords::KeywordTable;
use crate::record::DefectRecord;
use crate::rows::{build_record, CleanRow, MissingData, RowClass, RowClassifier};
use crate::tokenizer::tokenize;

// ============================================================================
// SKIP LEDGER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Separator,
    RepeatedHeader,
    MissingData,
    Merged,
}

impl SkipReason {
    /// Stable code for reports
    pub fn code(&self) -> &'static str {
        match self {
            SkipReason::Separator => "separator",
            SkipReason::RepeatedHeader => "repeated_header",
            SkipReason::MissingData => "missing_data",
            SkipReason::Merged => "merged",
        }
    }

    /// Display text shown to the operator
    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::Separator => "구분선/메타데이터",
            SkipReason::RepeatedHeader => "중복된 헤더",
            SkipReason::MissingData => "필수 데이터 미비",
            SkipReason::Merged => "이전 행 비고에 병합됨 (Smart Merge)",
        }
    }
}

/// One rejected or merged source row. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipEntry {
    /// 1-based grid row number; the header is line 1
    pub line_number: usize,
    pub reason: SkipReason,
    /// The trimmed row joined with ", " (or, for merges, the merged text)
    pub raw_content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipCounts {
    /// Grid rows, header included
    pub total: usize,
    pub header: usize,
    pub empty: usize,
    pub separator: usize,
    pub repeated_header: usize,
    pub missing_data: usize,
    pub merged: usize,
}

impl SkipCounts {
    /// Rows that did not become a record of their own
    pub fn not_accepted(&self) -> usize {
        self.header + self.empty + self.separator + self.repeated_header + self.missing_data + self.merged
    }
}

// ============================================================================
// INGEST REPORT
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub accepted_records: Vec<DefectRecord>,
    pub skip_ledger: Vec<SkipEntry>,
    pub counts: SkipCounts,
}

impl IngestReport {
    pub fn accepted_count(&self) -> usize {
        self.accepted_records.len()
    }

    /// Contiguous write batches of at most `size` records, in file order.
    /// A batch boundary never splits a record. `size` of 0 is treated as 1.
    pub fn batches(&self, size: usize) -> std::slice::Chunks<'_, DefectRecord> {
        self.accepted_records.chunks(size.max(1))
    }

    pub fn summary(&self) -> String {
        format!(
            "{} rows: {} accepted, {} merged, {} empty, {} separator, {} repeated header, {} missing data",
            self.counts.total,
            self.accepted_count(),
            self.counts.merged,
            self.counts.empty,
            self.counts.separator,
            self.counts.repeated_header,
            self.counts.missing_data
        )
    }
}

// ============================================================================
// INGESTOR
// ============================================================================

/// Run-local state of one ingestion pass.
struct Accumulator {
    report: IngestReport,
    /// Index into `accepted_records` of the merge target
    last_accepted: Option<usize>,
}

impl Accumulator {
    fn skip(&mut self, line_number: usize, reason: SkipReason, raw_content: String) {
        debug!(line = line_number, reason = reason.code(), content = %raw_content, "row skipped");
        self.report.skip_ledger.push(SkipEntry {
            line_number,
            reason,
            raw_content,
        });
    }

    fn last_record(&self) -> Option<&DefectRecord> {
        self.last_accepted
            .and_then(|index| self.report.accepted_records.get(index))
    }
}

pub struct Ingestor<'a> {
    keywords: &'a KeywordTable,
    header_match_min: usize,
    today: NaiveDate,
}

impl<'a> Ingestor<'a> {
    /// `today` anchors the year of bare month/day check dates.
    pub fn new(keywords: &'a KeywordTable, header_match_min: usize, today: NaiveDate) -> Self {
        Ingestor {
            keywords,
            header_match_min,
            today,
        }
    }

    pub fn from_config(config: &'a LedgerConfig, today: NaiveDate) -> Self {
        Self::new(&config.keywords, config.thresholds.header_match_min, today)
    }

    /// Tokenize and ingest a whole CSV document
    pub fn ingest(&self, text: &str) -> IngestReport {
        self.ingest_grid(&tokenize(text))
    }

    /// Ingest an already tokenized grid
    pub fn ingest_grid(&self, grid: &[Vec<String>]) -> IngestReport {
        let classifier = RowClassifier::new(self.keywords, self.header_match_min);

        let mut acc = Accumulator {
            report: IngestReport::default(),
            last_accepted: None,
        };
        acc.report.counts.total = grid.len();

        if grid.is_empty() {
            info!("empty document, nothing to ingest");
            return acc.report;
        }
        acc.report.counts.header = 1;

        for (index, raw) in grid.iter().enumerate().skip(1) {
            let line_number = index + 1;
            let row = CleanRow::new(raw);

            match classifier.classify(&row, acc.last_record()) {
                RowClass::Empty => {
                    acc.report.counts.empty += 1;
                }
                RowClass::Separator => {
                    acc.report.counts.separator += 1;
                    acc.skip(line_number, SkipReason::Separator, row.joined);
                }
                RowClass::RepeatedHeader { .. } => {
                    acc.report.counts.repeated_header += 1;
                    acc.skip(line_number, SkipReason::RepeatedHeader, row.joined);
                }
                RowClass::MissingData(MissingData::Mergeable { loose_text }) => {
                    match acc.last_accepted {
                        Some(target) => {
                            acc.report.accepted_records[target].append_note(&loose_text);
                            acc.report.counts.merged += 1;
                            acc.skip(line_number, SkipReason::Merged, loose_text);
                        }
                        // Mergeable without a target is impossible; treat as unmergeable
                        None => {
                            acc.report.counts.missing_data += 1;
                            acc.skip(line_number, SkipReason::MissingData, row.joined);
                        }
                    }
                }
                RowClass::MissingData(MissingData::Unmergeable) => {
                    acc.report.counts.missing_data += 1;
                    acc.skip(line_number, SkipReason::MissingData, row.joined);
                }
                RowClass::Valid => {
                    let record = build_record(&row, self.today);
                    acc.report.accepted_records.push(record);
                    acc.last_accepted = Some(acc.report.accepted_records.len() - 1);
                }
            }
        }

        info!(
            keywords = %self.keywords.version,
            total = acc.report.counts.total,
            accepted = acc.report.accepted_records.len(),
            skipped = acc.report.skip_ledger.len(),
            merged = acc.report.counts.merged,
            "ingestion complete"
        );

        acc.report
    }
}

// ============================================================================
// TESTS
// ============================================================================
