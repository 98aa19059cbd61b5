// 🚦 Status Classifier - record → lifecycle label
//
// An if/else chain, not independent predicates. First match wins:
//   1. Repaid              isRepaid
//   2. DeductionCompleted  deduction date set, or "차감" without "미차감"
//   3. RepairCompleted     repair date set, or a completion keyword
//   4. DeductionRequested  isDeductionRequested
//   5. Overdue             stale check date, nothing done yet
//   6. Pending
//
// Labels are always derived from the current fields and never stored.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::config::LedgerConfig;
use crate::dates::{elapsed_days, parse_calendar_date};
use crate::keywords::{contains_any, KeywordTable};
use crate::record::{is_filled, is_set, DefectRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLabel {
    Repaid,
    DeductionCompleted,
    RepairCompleted,
    DeductionRequested,
    Overdue,
    Pending,
}

impl StatusLabel {
    pub fn code(&self) -> &'static str {
        match self {
            StatusLabel::Repaid => "repaid",
            StatusLabel::DeductionCompleted => "deduction_completed",
            StatusLabel::RepairCompleted => "repair_completed",
            StatusLabel::DeductionRequested => "deduction_requested",
            StatusLabel::Overdue => "overdue",
            StatusLabel::Pending => "pending",
        }
    }

    /// Display label used in the record table
    pub fn label(&self) -> &'static str {
        match self {
            StatusLabel::Repaid => "재결제됨",
            StatusLabel::DeductionCompleted => "차감완료",
            StatusLabel::RepairCompleted => "수선완료",
            StatusLabel::DeductionRequested => "차감요청",
            StatusLabel::Overdue => "지연",
            StatusLabel::Pending => "대기",
        }
    }
}

impl std::fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub struct StatusClassifier<'a> {
    keywords: &'a KeywordTable,
    overdue_days: i64,
}

impl<'a> StatusClassifier<'a> {
    pub fn new(keywords: &'a KeywordTable, overdue_days: i64) -> Self {
        StatusClassifier {
            keywords,
            overdue_days,
        }
    }

    pub fn from_config(config: &'a LedgerConfig) -> Self {
        Self::new(&config.keywords, config.thresholds.overdue_days)
    }

    /// Derive the status of `record` as seen at `now`.
    pub fn classify(&self, record: &DefectRecord, now: NaiveDateTime) -> StatusLabel {
        let combined = record.combined_text();

        if record.is_repaid {
            return StatusLabel::Repaid;
        }

        if is_set(&record.deduction_date) || self.keywords.has_deduction_text(&combined) {
            return StatusLabel::DeductionCompleted;
        }

        if is_set(&record.repair_date) || contains_any(&combined, &self.keywords.status_completion) {
            return StatusLabel::RepairCompleted;
        }

        if record.is_deduction_requested {
            return StatusLabel::DeductionRequested;
        }

        if self.is_overdue(record, now) {
            return StatusLabel::Overdue;
        }

        StatusLabel::Pending
    }

    /// Overdue: a readable check date more than `overdue_days` in the past,
    /// no repair/deduction/return entry at all, and nothing in the note that
    /// says the item was finished, impossible or discarded.
    pub fn is_overdue(&self, record: &DefectRecord, now: NaiveDateTime) -> bool {
        if !is_set(&record.check_date) {
            return false;
        }
        if is_filled(&record.repair_date)
            || is_filled(&record.deduction_date)
            || is_filled(&record.return_date)
        {
            return false;
        }
        if contains_any(&record.note, &self.keywords.overdue_note_exclusions) {
            return false;
        }

        let Some(checked) = parse_calendar_date(&record.check_date, now.date()) else {
            return false;
        };
        if checked > now.date() {
            return false;
        }

        elapsed_days(checked, now) > self.overdue_days
    }
}

// ============================================================================
// TESTS
// ============================================================================
