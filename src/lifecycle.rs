// 🔁 Record Lifecycle - pure transitions between record states
//
// Each transition takes a record and returns the updated copy; writing it
// back is the storage layer's job. Transitions are logged the way the
// operator activity log records them.
//
//   pending ──request──▶ requested ──confirm──▶ deducted ──repay──▶ repaid
//      ▲                    │  ▲                   │                 │
//      └──────cancel────────┘  └──revert_deduction─┘◀─revert_repay───┘

use chrono::NaiveDate;
use tracing::info;

use crate::dates::normalize_timestamp;
use crate::keywords::KeywordTable;
use crate::record::{is_filled, DefectRecord};

pub struct Lifecycle<'a> {
    keywords: &'a KeywordTable,
}

impl<'a> Lifecycle<'a> {
    pub fn new(keywords: &'a KeywordTable) -> Self {
        Lifecycle { keywords }
    }

    /// On save: deduction text without a deduction date gets today's date.
    pub fn stamp_deduction_date(&self, record: &DefectRecord, today: NaiveDate) -> DefectRecord {
        let mut updated = record.clone();
        if self.keywords.has_deduction_text(&record.combined_text()) && !is_filled(&record.deduction_date) {
            updated.deduction_date = normalize_timestamp(&today);
        }
        updated
    }

    pub fn request_deduction(&self, record: &DefectRecord) -> DefectRecord {
        info!(vendor = %record.vendor, product = %record.product_name, "deduction requested");
        DefectRecord {
            is_deduction_requested: true,
            ..record.clone()
        }
    }

    pub fn cancel_deduction_request(&self, record: &DefectRecord) -> DefectRecord {
        info!(vendor = %record.vendor, product = %record.product_name, "deduction request cancelled");
        DefectRecord {
            is_deduction_requested: false,
            ..record.clone()
        }
    }

    /// Confirm a requested deduction: date it, clear the request and any
    /// earlier revert/repayment, and mark the note once.
    pub fn confirm_deduction(&self, record: &DefectRecord, today: NaiveDate, manager: &str) -> DefectRecord {
        let mut updated = record.clone();
        updated.deduction_date = normalize_timestamp(&today);
        updated.is_deduction_requested = false;
        updated.is_reverted = false;
        updated.is_repaid = false;
        updated.manager = manager.to_string();

        let marker = self.keywords.deduction_complete_marker.as_str();
        if !updated.note.contains(marker) {
            updated.append_note(marker);
        }

        info!(
            vendor = %record.vendor,
            product = %record.product_name,
            quantity = record.quantity,
            manager = manager,
            "deduction confirmed"
        );
        updated
    }

    /// Any filled deduction date (the "X" sentinel included) that is not yet repaid.
    pub fn is_repayable(&self, record: &DefectRecord) -> bool {
        is_filled(&record.deduction_date) && !record.is_repaid
    }

    pub fn mark_repaid(&self, record: &DefectRecord) -> DefectRecord {
        let mut updated = record.clone();
        updated.is_repaid = true;
        if !updated.note.contains(self.keywords.repayment_marker.as_str()) {
            let annotation = if updated.note.is_empty() {
                self.keywords.repayment_marker.as_str()
            } else {
                self.keywords.repayment_annotation.as_str()
            };
            updated.append_note(annotation);
        }

        info!(vendor = %record.vendor, product = %record.product_name, "repaid");
        updated
    }

    /// Repaid items that are repayable, ready to be written back together.
    pub fn mark_repaid_batch(&self, records: &[DefectRecord]) -> Vec<DefectRecord> {
        let updated: Vec<DefectRecord> = records
            .iter()
            .filter(|r| self.is_repayable(r))
            .map(|r| self.mark_repaid(r))
            .collect();
        info!(selected = records.len(), repaid = updated.len(), "batch repayment");
        updated
    }

    /// Back to deducted: clear the flag and strip the repayment note text.
    pub fn revert_repayment(&self, record: &DefectRecord) -> DefectRecord {
        let note = record
            .note
            .replace(self.keywords.repayment_annotation.as_str(), "")
            .replace(self.keywords.repayment_marker.as_str(), "")
            .trim()
            .to_string();

        info!(vendor = %record.vendor, product = %record.product_name, "repayment reverted");
        DefectRecord {
            is_repaid: false,
            note,
            ..record.clone()
        }
    }

    /// Back to requested: drop the deduction date and note marker, flag the revert.
    pub fn revert_deduction(&self, record: &DefectRecord) -> DefectRecord {
        let note = record
            .note
            .replace(self.keywords.deduction_complete_marker.as_str(), "")
            .trim()
            .to_string();

        info!(vendor = %record.vendor, product = %record.product_name, "deduction reverted");
        DefectRecord {
            deduction_date: String::new(),
            is_deduction_requested: true,
            is_reverted: true,
            note,
            ..record.clone()
        }
    }

    /// Undo the latest step: repayment if repaid, otherwise the deduction.
    pub fn revert(&self, record: &DefectRecord) -> DefectRecord {
        if record.is_repaid {
            self.revert_repayment(record)
        } else {
            self.revert_deduction(record)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{StatusClassifier, StatusLabel};
    use chrono::NaiveTime;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn record() -> DefectRecord {
        DefectRecord {
            vendor: "Acme".to_string(),
            product_name: "Shirt".to_string(),
            check_date: "2024-06-01".to_string(),
            note: "찢어짐".to_string(),
            ..Default::default()
        }
    }

    fn status(record: &DefectRecord) -> StatusLabel {
        let table = KeywordTable::default();
        StatusClassifier::new(&table, 30).classify(record, today().and_time(NaiveTime::MIN))
    }

    #[test]
    fn test_stamp_deduction_date() {
        let table = KeywordTable::default();
        let lifecycle = Lifecycle::new(&table);

        let mut r = record();
        r.defect_content = "차감 요청".to_string();
        assert_eq!(lifecycle.stamp_deduction_date(&r, today()).deduction_date, "2024-06-15");

        r.deduction_date = "2024-06-01".to_string();
        assert_eq!(lifecycle.stamp_deduction_date(&r, today()).deduction_date, "2024-06-01");

        let mut negated = record();
        negated.note = "미차감".to_string();
        assert_eq!(lifecycle.stamp_deduction_date(&negated, today()).deduction_date, "");
    }

    #[test]
    fn test_full_round_trip() {
        let table = KeywordTable::default();
        let lifecycle = Lifecycle::new(&table);

        let r = record();
        assert_eq!(status(&r), StatusLabel::Pending);

        let requested = lifecycle.request_deduction(&r);
        assert_eq!(status(&requested), StatusLabel::DeductionRequested);

        let deducted = lifecycle.confirm_deduction(&requested, today(), "Kim");
        assert_eq!(status(&deducted), StatusLabel::DeductionCompleted);
        assert_eq!(deducted.note, "찢어짐 차감완료");
        assert_eq!(deducted.deduction_date, "2024-06-15");
        assert_eq!(deducted.manager, "Kim");
        assert!(!deducted.is_deduction_requested);
        assert!(lifecycle.is_repayable(&deducted));

        let repaid = lifecycle.mark_repaid(&deducted);
        assert_eq!(status(&repaid), StatusLabel::Repaid);
        assert_eq!(repaid.note, "찢어짐 차감완료 (재결제)");
        assert!(!lifecycle.is_repayable(&repaid));

        let back_to_deducted = lifecycle.revert(&repaid);
        assert_eq!(status(&back_to_deducted), StatusLabel::DeductionCompleted);
        assert_eq!(back_to_deducted.note, "찢어짐 차감완료");

        let back_to_requested = lifecycle.revert(&back_to_deducted);
        assert_eq!(status(&back_to_requested), StatusLabel::DeductionRequested);
        assert_eq!(back_to_requested.note, "찢어짐");
        assert_eq!(back_to_requested.deduction_date, "");
        assert!(back_to_requested.is_reverted);

        let cancelled = lifecycle.cancel_deduction_request(&back_to_requested);
        assert_eq!(status(&cancelled), StatusLabel::Pending);
    }

    #[test]
    fn test_confirm_marks_note_once() {
        let table = KeywordTable::default();
        let lifecycle = Lifecycle::new(&table);

        let mut r = record();
        r.note = String::new();
        let once = lifecycle.confirm_deduction(&r, today(), "Kim");
        let twice = lifecycle.confirm_deduction(&once, today(), "Lee");

        assert_eq!(once.note, "차감완료");
        assert_eq!(twice.note, "차감완료");
        assert_eq!(twice.manager, "Lee");
    }

    #[test]
    fn test_mark_repaid_empty_note() {
        let table = KeywordTable::default();
        let lifecycle = Lifecycle::new(&table);

        let mut r = record();
        r.note = String::new();
        assert_eq!(lifecycle.mark_repaid(&r).note, "재결제");

        r.note = "이미 재결제".to_string();
        assert_eq!(lifecycle.mark_repaid(&r).note, "이미 재결제");
    }

    #[test]
    fn test_mark_repaid_batch_skips_ineligible() {
        let table = KeywordTable::default();
        let lifecycle = Lifecycle::new(&table);

        let mut dated = record();
        dated.deduction_date = "2024-06-01".to_string();
        let mut already = dated.clone();
        already.is_repaid = true;
        let undated = record();

        let updated = lifecycle.mark_repaid_batch(&[dated, already, undated]);

        assert_eq!(updated.len(), 1);
        assert!(updated[0].is_repaid);
    }

    #[test]
    fn test_sentinel_deduction_date_is_repayable() {
        let table = KeywordTable::default();
        let lifecycle = Lifecycle::new(&table);

        let mut marked = record();
        marked.deduction_date = "X".to_string();
        assert!(lifecycle.is_repayable(&marked));

        let mut blank = record();
        blank.deduction_date = "  ".to_string();
        assert!(!lifecycle.is_repayable(&blank));

        let updated = lifecycle.mark_repaid_batch(&[marked, blank]);
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].deduction_date, "X");
    }
}
