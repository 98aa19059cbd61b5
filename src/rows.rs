// 🔍 Row Classifier - one raw cell-row → one outcome
//
// Priority order (first match wins):
//   1. Empty          - every cell blank
//   2. Separator      - divider / metadata marker somewhere in the row
//   3. RepeatedHeader - enough header keywords somewhere in the row
//   4. MissingData    - no vendor, no defect text, no important note
//                       → Mergeable into the previous record's note, or
//                       → Unmergeable (nothing to merge, or nothing to merge into)
//   5. Valid          - build a DefectRecord from the fixed column positions

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::normalize_date;
use crate::keywords::KeywordTable;
use crate::record::{DefectRecord, DEFAULT_SOURCE, NO_DATE};

/// Fixed column positions of the upload sheet (0-indexed).
/// Column 0 is a reserved source column and is never read.
pub mod columns {
    pub const CHECK_DATE: usize = 1;
    pub const BARCODE_DATE: usize = 2;
    pub const VENDOR: usize = 3;
    pub const DEFECT_CONTENT: usize = 4;
    pub const COST: usize = 5;
    pub const PRODUCT_NAME: usize = 6;
    pub const COLOR: usize = 7;
    pub const SIZE: usize = 8;
    pub const QUANTITY: usize = 9;
    pub const SOURCE: usize = 10;
    pub const RELEASE_DATE: usize = 11;
    pub const REPAIR_DATE: usize = 12;
    pub const DEDUCTION_DATE: usize = 13;
    pub const RETURN_DATE: usize = 14;
    pub const HUB_DATE: usize = 15;
    pub const NOTE: usize = 16;
    pub const MANAGER: usize = 17;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RowClass {
    Empty,
    Separator,
    RepeatedHeader { matches: usize },
    MissingData(MissingData),
    Valid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MissingData {
    /// Non-empty cells joined by single spaces, to be appended to the
    /// previous accepted record's note
    Mergeable { loose_text: String },
    Unmergeable,
}

/// A row after per-cell trimming, with its `", "`-joined form used by the
/// substring rules.
#[derive(Debug, Clone)]
pub struct CleanRow {
    pub cells: Vec<String>,
    pub joined: String,
}

impl CleanRow {
    pub fn new(raw: &[String]) -> Self {
        let cells: Vec<String> = raw.iter().map(|c| c.trim().to_string()).collect();
        let joined = cells.join(", ");
        CleanRow { cells, joined }
    }

    /// Cell at `index`, or `""` past the end of a short row.
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.is_empty())
    }

    fn loose_text(&self) -> String {
        self.cells
            .iter()
            .filter(|c| !c.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub struct RowClassifier<'a> {
    keywords: &'a KeywordTable,
    header_match_min: usize,
}

impl<'a> RowClassifier<'a> {
    pub fn new(keywords: &'a KeywordTable, header_match_min: usize) -> Self {
        RowClassifier {
            keywords,
            header_match_min,
        }
    }

    /// Classify one trimmed row.
    ///
    /// `last_accepted` is the most recently accepted record of the current
    /// run; without one, a MissingData row can never be mergeable.
    pub fn classify(&self, row: &CleanRow, last_accepted: Option<&DefectRecord>) -> RowClass {
        if row.is_blank() {
            return RowClass::Empty;
        }

        if self.keywords.is_separator(&row.joined) {
            return RowClass::Separator;
        }

        let matches = self.keywords.header_matches(&row.joined);
        if matches >= self.header_match_min {
            return RowClass::RepeatedHeader { matches };
        }

        let has_basic_data =
            !row.cell(columns::VENDOR).is_empty() || !row.cell(columns::DEFECT_CONTENT).is_empty();
        if !has_basic_data && !self.keywords.has_important_note(row.cell(columns::NOTE)) {
            let loose_text = row.loose_text();
            return match last_accepted {
                Some(_) if !loose_text.is_empty() => {
                    RowClass::MissingData(MissingData::Mergeable { loose_text })
                }
                _ => RowClass::MissingData(MissingData::Unmergeable),
            };
        }

        RowClass::Valid
    }
}

/// Build a record from a Valid row.
///
/// The check date goes through the date normalizer; every other date column
/// is kept as written. Blank barcode dates become `"X"`, blank sources `"ER"`.
pub fn build_record(row: &CleanRow, today: NaiveDate) -> DefectRecord {
    use self::columns::*;

    let or_default = |index: usize, fallback: &str| {
        let value = row.cell(index);
        if value.is_empty() {
            fallback.to_string()
        } else {
            value.to_string()
        }
    };

    DefectRecord {
        id: None,
        check_date: normalize_date(row.cell(CHECK_DATE), today),
        barcode_date: or_default(BARCODE_DATE, NO_DATE),
        vendor: row.cell(VENDOR).to_string(),
        defect_content: row.cell(DEFECT_CONTENT).to_string(),
        cost: parse_cost(row.cell(COST)),
        product_name: row.cell(PRODUCT_NAME).to_string(),
        color: row.cell(COLOR).to_string(),
        size: row.cell(SIZE).to_string(),
        quantity: parse_quantity(row.cell(QUANTITY)),
        source: or_default(SOURCE, DEFAULT_SOURCE),
        release_date: row.cell(RELEASE_DATE).to_string(),
        repair_date: row.cell(REPAIR_DATE).to_string(),
        deduction_date: row.cell(DEDUCTION_DATE).to_string(),
        return_date: row.cell(RETURN_DATE).to_string(),
        hub_date: row.cell(HUB_DATE).to_string(),
        note: row.cell(NOTE).to_string(),
        manager: row.cell(MANAGER).to_string(),
        is_deduction_requested: false,
        is_repaid: false,
        is_reverted: false,
    }
}

/// Cost cell → non-negative number.
///
/// Strips everything except digits, `.` and `-` (currency signs, thousands
/// separators, units), then reads the longest leading number. Anything
/// unreadable or negative becomes 0.
pub fn parse_cost(raw: &str) -> f64 {
    let stripped: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    match leading_number(&stripped) {
        Some(value) if value.is_finite() && value > 0.0 => value,
        _ => 0.0,
    }
}

/// Quantity cell → positive integer; anything unreadable, zero or negative
/// becomes 1.
pub fn parse_quantity(raw: &str) -> u32 {
    let digits: String = raw
        .trim()
        .trim_start_matches('+')
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    match digits.parse::<u32>() {
        Ok(0) | Err(_) => 1,
        Ok(n) => n,
    }
}

fn leading_number(text: &str) -> Option<f64> {
    (1..=text.len())
        .rev()
        .filter(|&end| text.is_char_boundary(end))
        .find_map(|end| text[..end].parse::<f64>().ok())
}

// ============================================================================
// TESTS
// ============================================================================
