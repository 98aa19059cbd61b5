// 🏷️ Keyword Tables - rules as data
//
// Every substring the pipeline searches for lives here, grouped by the rule
// that uses it. Korean tokens are opaque: plain substring matching, no
// stemming, no normalization.
//
// Tables can be overridden from the `[keywords]` section of the TOML config.

use serde::{Deserialize, Serialize};

/// Version tag of the built-in tables.
pub const KEYWORD_TABLE_VERSION: &str = "2024.1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordTable {
    /// Version tag, carried through to logs.
    pub version: String,

    // ========================================================================
    // INGESTION
    // ========================================================================
    /// Visual divider / metadata markers that make a row a separator
    pub separators: Vec<String>,

    /// Known column names; a row matching enough of them is a repeated header
    pub header_keywords: Vec<String>,

    /// Note markers that keep an otherwise empty row (repair, deduction,
    /// impossible, confirmed, discard)
    pub important_note: Vec<String>,

    // ========================================================================
    // STATUS + DASHBOARD
    // ========================================================================
    pub deduction: String,
    pub deduction_negation: String,

    /// Status classifier: text that marks a repair as completed
    pub status_completion: Vec<String>,

    /// Overdue rule: note text that stops the staleness clock
    pub overdue_note_exclusions: Vec<String>,

    /// Dashboard: broader set of "already handled" markers
    pub processing: Vec<String>,

    pub repair_complete: String,
    pub self_repair: String,
    pub deduction_then_repair: String,

    /// Vendor deduction grouping skips notes containing any of these
    pub vendor_deduction_exclusions: Vec<String>,

    // ========================================================================
    // NOTE ANNOTATIONS (lifecycle)
    // ========================================================================
    pub repayment_marker: String,
    pub repayment_annotation: String,
    pub deduction_complete_marker: String,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for KeywordTable {
    fn default() -> Self {
        KeywordTable {
            version: KEYWORD_TABLE_VERSION.to_string(),
            separators: strings(&["날짜구분선", "날짜 구분선", "-----", "₩01ER"]),
            header_keywords: strings(&[
                "담당팀",
                "불량확인일",
                "바코드",
                "불량내용",
                "제품원가",
                "상품명",
                "(경리팀작성)",
                "수선여부",
            ]),
            important_note: strings(&["수선", "차감", "불가", "확정", "폐기"]),
            deduction: "차감".to_string(),
            deduction_negation: "미차감".to_string(),
            status_completion: strings(&[
                "수선완료", "자체수선", "수선불가", "폐기", "반품", "교환", "매입", "인수",
            ]),
            overdue_note_exclusions: strings(&["완료", "불가", "폐기"]),
            processing: strings(&[
                "수선완료", "자체수선", "수선불가", "폐기", "거래종료", "반품", "교환", "매입", "인수",
                "수선X", "차감확정",
            ]),
            repair_complete: "수선완료".to_string(),
            self_repair: "자체수선".to_string(),
            deduction_then_repair: "차감후수선".to_string(),
            vendor_deduction_exclusions: strings(&["미차감", "자체수선"]),
            repayment_marker: "재결제".to_string(),
            repayment_annotation: "(재결제)".to_string(),
            deduction_complete_marker: "차감완료".to_string(),
        }
    }
}

/// True if `text` contains any keyword. Blank keywords never match.
pub fn contains_any(text: &str, keywords: &[String]) -> bool {
    keywords
        .iter()
        .any(|kw| !kw.is_empty() && text.contains(kw.as_str()))
}

/// Number of distinct keywords present in `text`.
pub fn count_matches(text: &str, keywords: &[String]) -> usize {
    keywords
        .iter()
        .filter(|kw| !kw.is_empty() && text.contains(kw.as_str()))
        .count()
}

impl KeywordTable {
    /// "차감" present without "미차감".
    pub fn has_deduction_text(&self, text: &str) -> bool {
        text.contains(self.deduction.as_str()) && !text.contains(self.deduction_negation.as_str())
    }

    pub fn has_important_note(&self, note: &str) -> bool {
        contains_any(note, &self.important_note)
    }

    pub fn is_separator(&self, joined_row: &str) -> bool {
        contains_any(joined_row, &self.separators)
    }

    pub fn header_matches(&self, joined_row: &str) -> usize {
        count_matches(joined_row, &self.header_keywords)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_sizes() {
        let table = KeywordTable::default();

        assert_eq!(table.version, KEYWORD_TABLE_VERSION);
        assert_eq!(table.separators.len(), 4);
        assert_eq!(table.header_keywords.len(), 8);
        assert_eq!(table.important_note.len(), 5);
        assert_eq!(table.status_completion.len(), 8);
        assert_eq!(table.processing.len(), 11);
    }

    #[test]
    fn test_processing_is_broader_than_status_completion() {
        let table = KeywordTable::default();

        for kw in &table.status_completion {
            assert!(table.processing.contains(kw), "missing {}", kw);
        }
        assert!(!table.status_completion.contains(&"거래종료".to_string()));
    }

    #[test]
    fn test_deduction_text_negation() {
        let table = KeywordTable::default();

        assert!(table.has_deduction_text("차감완료"));
        assert!(!table.has_deduction_text("미차감 수선완료"));
        assert!(!table.has_deduction_text("수선완료"));
    }

    #[test]
    fn test_header_matches_counts_keywords_once() {
        let table = KeywordTable::default();

        assert_eq!(table.header_matches("담당팀, 담당팀, 바코드"), 2);
        assert_eq!(table.header_matches("Acme, 찢어짐"), 0);
    }

    #[test]
    fn test_blank_keywords_never_match() {
        assert!(!contains_any("anything", &["".to_string()]));
        assert_eq!(count_matches("anything", &["".to_string()]), 0);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let table: KeywordTable = toml::from_str(
            r#"
            version = "custom"
            separators = ["====="]
            "#,
        )
        .unwrap();

        assert_eq!(table.version, "custom");
        assert_eq!(table.separators, vec!["=====".to_string()]);
        assert_eq!(table.header_keywords.len(), 8);
    }
}
