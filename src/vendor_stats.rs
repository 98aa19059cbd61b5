// 🏭 Vendor Board - per-vendor repair progress and deductions

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::dashboard::{percentage, Aggregator};
use crate::keywords::{contains_any, KeywordTable};
use crate::record::{is_set, DefectRecord};

/// Label for records with a blank vendor
pub const UNASSIGNED_VENDOR: &str = "미지정";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorRepairStat {
    pub vendor: String,
    /// Records received
    pub total: usize,
    /// Strict repairs (same rule as the overall repair rate)
    pub completed: usize,
    /// cost × quantity of deduction-historical records
    pub deducted_amount: f64,
    /// round(100 × completed / total)
    pub rate: u32,
}

fn vendor_key(record: &DefectRecord) -> String {
    record.vendor_name().unwrap_or(UNASSIGNED_VENDOR).to_string()
}

/// Repair-rate board, busiest vendor first (ties by name).
pub fn vendor_repair_rates(records: &[DefectRecord], aggregator: &Aggregator) -> Vec<VendorRepairStat> {
    let mut by_vendor: HashMap<String, VendorRepairStat> = HashMap::new();

    for record in records {
        let key = vendor_key(record);
        let stat = by_vendor.entry(key.clone()).or_insert_with(|| VendorRepairStat {
            vendor: key,
            total: 0,
            completed: 0,
            deducted_amount: 0.0,
            rate: 0,
        });

        stat.total += 1;
        if aggregator.is_strict_repair(record) {
            stat.completed += 1;
        }
        if aggregator.is_deduction_historical(record) {
            stat.deducted_amount += record.line_amount();
        }
    }

    let mut stats: Vec<VendorRepairStat> = by_vendor
        .into_values()
        .map(|mut stat| {
            stat.rate = percentage(stat.completed, stat.total);
            stat
        })
        .collect();

    stats.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.vendor.cmp(&b.vendor)));
    stats
}

/// Dated deductions grouped by vendor name.
///
/// Only records with a real deduction date count; notes marked
/// "미차감"/"자체수선" are left out.
pub fn deductions_by_vendor<'r>(
    records: &'r [DefectRecord],
    keywords: &KeywordTable,
) -> BTreeMap<String, Vec<&'r DefectRecord>> {
    let mut groups: BTreeMap<String, Vec<&'r DefectRecord>> = BTreeMap::new();

    for record in records {
        if !is_set(&record.deduction_date) {
            continue;
        }
        if contains_any(&record.note, &keywords.vendor_deduction_exclusions) {
            continue;
        }
        groups.entry(vendor_key(record)).or_default().push(record);
    }

    groups
}

// ============================================================================
// TESTS
// ============================================================================
