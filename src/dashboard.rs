// 📊 Dashboard Aggregator - partition the record set into buckets + totals
//
// Recomputed from scratch on every call; no caching, no shared state.
//
// Buckets use their own predicates, consistent with but deliberately not
// derived from the status classifier (e.g. "거래종료" and hub dates count as
// processed here, and the overdue subset here ignores note keywords).
//
//   deduction-historical  deduction date set, or "차감" without "미차감"
//     ├─ repaid           … and isRepaid
//     └─ pure-deducted    … and not repaid
//   repair-processed      repair/return/hub date set, or a processing keyword,
//                         and not deduction-historical
//   deduction-requested   isDeductionRequested, and not processed
//   pending               not processed, not requested
//     └─ overdue          stale readable check date

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::config::LedgerConfig;
use crate::dates::{elapsed_days, parse_calendar_date};
use crate::keywords::{contains_any, KeywordTable};
use crate::record::{is_set, DefectRecord};

/// Every bucket and total of the dashboard view.
///
/// Item lists borrow from the input slice, in input order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary<'a> {
    pub total_count: usize,
    /// Sum of quantity over all records
    pub total_defects: u64,
    /// Sum of cost × quantity over all records
    pub total_cost: f64,

    pub processed_quantity: u64,
    pub pending_quantity: u64,

    /// Number of deducted, not repaid records
    pub deduction_completed: usize,
    pub deduction_total_amount: f64,
    pub repayment_total_amount: f64,

    pub deduction_requested_quantity: u64,
    pub undeducted_repair_quantity: u64,
    pub self_repair_quantity: u64,

    pub overdue_items_count: usize,
    pub overdue_items: Vec<&'a DefectRecord>,
    pub pending_items: Vec<&'a DefectRecord>,
    pub deduction_requested_items: Vec<&'a DefectRecord>,
    pub processed_items: Vec<&'a DefectRecord>,
    pub repair_processed_items: Vec<&'a DefectRecord>,
    pub deduction_processed_items: Vec<&'a DefectRecord>,
    pub repayment_items: Vec<&'a DefectRecord>,
    pub deduction_repair_items: Vec<&'a DefectRecord>,

    /// round(100 × strict repairs / record count)
    pub total_repair_rate: u32,
}

pub struct Aggregator<'a> {
    keywords: &'a KeywordTable,
    overdue_days: i64,
}

fn quantity_of(items: &[&DefectRecord]) -> u64 {
    items.iter().map(|r| u64::from(r.quantity)).sum()
}

fn amount_of(items: &[&DefectRecord]) -> f64 {
    items.iter().map(|r| r.line_amount()).sum()
}

/// round(100 × part / whole), 0 for an empty whole
pub fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    (100.0 * part as f64 / whole as f64).round() as u32
}

impl<'a> Aggregator<'a> {
    pub fn new(keywords: &'a KeywordTable, overdue_days: i64) -> Self {
        Aggregator {
            keywords,
            overdue_days,
        }
    }

    pub fn from_config(config: &'a LedgerConfig) -> Self {
        Self::new(&config.keywords, config.thresholds.overdue_days)
    }

    /// Deduction recorded by date or by text
    pub fn is_deduction_historical(&self, record: &DefectRecord) -> bool {
        is_set(&record.deduction_date) || self.keywords.has_deduction_text(&record.combined_text())
    }

    /// Repair-side processing (before excluding deduction-historical records)
    pub fn has_repair_processing(&self, record: &DefectRecord) -> bool {
        is_set(&record.repair_date)
            || is_set(&record.return_date)
            || is_set(&record.hub_date)
            || contains_any(&record.combined_text(), &self.keywords.processing)
    }

    /// The narrow repair rule behind the repair rate: a real repair date, or
    /// the exact "수선완료" token in the note. Not the same as bucket
    /// membership, on purpose.
    pub fn is_strict_repair(&self, record: &DefectRecord) -> bool {
        is_set(&record.repair_date) || record.note.contains(self.keywords.repair_complete.as_str())
    }

    fn is_deduction_repair(&self, record: &DefectRecord) -> bool {
        is_set(&record.repair_date)
            || record.note.contains(self.keywords.deduction_then_repair.as_str())
            || record.is_repaid
    }

    fn is_stale(&self, record: &DefectRecord, now: NaiveDateTime) -> bool {
        if !is_set(&record.check_date) {
            return false;
        }
        match parse_calendar_date(&record.check_date, now.date()) {
            Some(checked) => elapsed_days(checked, now) > self.overdue_days,
            None => false,
        }
    }

    /// Build the dashboard for `records` as seen at `now`.
    pub fn summarize<'r>(&self, records: &'r [DefectRecord], now: NaiveDateTime) -> DashboardSummary<'r> {
        // positional membership, so records without an id never collide
        let deduction_flags: Vec<bool> = records
            .iter()
            .map(|r| self.is_deduction_historical(r))
            .collect();
        let repair_flags: Vec<bool> = records
            .iter()
            .zip(&deduction_flags)
            .map(|(r, &deducted)| !deducted && self.has_repair_processing(r))
            .collect();

        let mut deduction_items = Vec::new();
        let mut repair_processed_items = Vec::new();
        let mut deduction_requested_items = Vec::new();
        let mut pending_items = Vec::new();

        for (index, record) in records.iter().enumerate() {
            let processed = deduction_flags[index] || repair_flags[index];

            if deduction_flags[index] {
                deduction_items.push(record);
            }
            if repair_flags[index] {
                repair_processed_items.push(record);
            }
            if record.is_deduction_requested && !processed {
                deduction_requested_items.push(record);
            }
            if !record.is_deduction_requested && !processed {
                pending_items.push(record);
            }
        }

        let (repayment_items, deduction_processed_items): (Vec<&DefectRecord>, Vec<&DefectRecord>) =
            deduction_items.iter().copied().partition(|r| r.is_repaid);

        let deduction_repair_items: Vec<&DefectRecord> = deduction_items
            .iter()
            .copied()
            .filter(|r| self.is_deduction_repair(r))
            .collect();

        let processed_items: Vec<&DefectRecord> = deduction_items
            .iter()
            .chain(repair_processed_items.iter())
            .copied()
            .collect();

        let undeducted_repair: Vec<&DefectRecord> = repair_processed_items
            .iter()
            .copied()
            .filter(|r| r.combined_text().contains(self.keywords.deduction_negation.as_str()))
            .collect();
        let self_repair: Vec<&DefectRecord> = repair_processed_items
            .iter()
            .copied()
            .filter(|r| r.combined_text().contains(self.keywords.self_repair.as_str()))
            .collect();

        let overdue_items: Vec<&DefectRecord> = pending_items
            .iter()
            .copied()
            .filter(|r| self.is_stale(r, now))
            .collect();

        let all: Vec<&DefectRecord> = records.iter().collect();
        let strict_repairs = records.iter().filter(|r| self.is_strict_repair(r)).count();

        DashboardSummary {
            total_count: records.len(),
            total_defects: quantity_of(&all),
            total_cost: amount_of(&all),
            processed_quantity: quantity_of(&processed_items),
            pending_quantity: quantity_of(&pending_items),
            deduction_completed: deduction_processed_items.len(),
            deduction_total_amount: amount_of(&deduction_processed_items),
            repayment_total_amount: amount_of(&repayment_items),
            deduction_requested_quantity: quantity_of(&deduction_requested_items),
            undeducted_repair_quantity: quantity_of(&undeducted_repair),
            self_repair_quantity: quantity_of(&self_repair),
            overdue_items_count: overdue_items.len(),
            overdue_items,
            pending_items,
            deduction_requested_items,
            processed_items,
            repair_processed_items,
            deduction_processed_items,
            repayment_items,
            deduction_repair_items,
            total_repair_rate: percentage(strict_repairs, records.len()),
        }
    }
}

impl DashboardSummary<'_> {
    pub fn summary(&self) -> String {
        format!(
            "{} records ({} pcs): {} processed, {} pending ({} overdue), {} requested | deducted {:.0}, repaid {:.0} | repair rate {}%",
            self.total_count,
            self.total_defects,
            self.processed_quantity,
            self.pending_quantity,
            self.overdue_items_count,
            self.deduction_requested_quantity,
            self.deduction_total_amount,
            self.repayment_total_amount,
            self.total_repair_rate
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
