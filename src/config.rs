// ⚙️ Configuration - keyword tables and thresholds from TOML
//
// Every field has a default, so an empty file (or no file) gives the
// built-in behaviour.
//
//   [thresholds]
//   overdue_days = 30
//   header_match_min = 2
//   batch_size = 400
//
//   [keywords]
//   separators = ["-----", "날짜구분선"]

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::keywords::KeywordTable;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub thresholds: Thresholds,
    pub keywords: KeywordTable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Days after the check date before an untouched record is overdue
    pub overdue_days: i64,

    /// Header-keyword hits needed to call a row a repeated header
    pub header_match_min: usize,

    /// Records per persistence write batch
    pub batch_size: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            overdue_days: 30,
            header_match_min: 2,
            batch_size: 400,
        }
    }
}

impl LedgerConfig {
    /// Load and validate a TOML config file
    pub fn load<P: AsRef<Path>>(path: P) -> LedgerResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), version = %config.keywords.version, "loaded config");
        Ok(config)
    }

    /// Load from `path` if given and present, otherwise use the defaults
    pub fn load_or_default(path: Option<&Path>) -> LedgerResult<Self> {
        match path {
            Some(p) if p.exists() => Self::load(p),
            Some(p) => {
                warn!(path = %p.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(content: &str) -> LedgerResult<Self> {
        let config: LedgerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LedgerResult<()> {
        if self.thresholds.overdue_days < 0 {
            return Err(LedgerError::invalid_config(
                "thresholds.overdue_days",
                format!("must be >= 0, got {}", self.thresholds.overdue_days),
            ));
        }
        if self.thresholds.header_match_min == 0 {
            return Err(LedgerError::invalid_config(
                "thresholds.header_match_min",
                "must be at least 1",
            ));
        }
        if self.thresholds.batch_size == 0 {
            return Err(LedgerError::invalid_config(
                "thresholds.batch_size",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_is_default() {
        let config = LedgerConfig::from_toml_str("").unwrap();

        assert_eq!(config, LedgerConfig::default());
        assert_eq!(config.thresholds.overdue_days, 30);
        assert_eq!(config.thresholds.header_match_min, 2);
        assert_eq!(config.thresholds.batch_size, 400);
    }

    #[test]
    fn test_partial_sections() {
        let config = LedgerConfig::from_toml_str(
            r#"
            [thresholds]
            overdue_days = 45

            [keywords]
            overdue_note_exclusions = ["완료"]
            "#,
        )
        .unwrap();

        assert_eq!(config.thresholds.overdue_days, 45);
        assert_eq!(config.thresholds.batch_size, 400);
        assert_eq!(config.keywords.overdue_note_exclusions, vec!["완료".to_string()]);
        assert_eq!(config.keywords.separators.len(), 4);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = LedgerConfig::from_toml_str("[thresholds]\nbatch_size = 0").unwrap_err();
        assert!(matches!(err, LedgerError::InvalidConfig { ref key, .. } if key == "thresholds.batch_size"));

        let err = LedgerConfig::from_toml_str("[thresholds]\noverdue_days = -1").unwrap_err();
        assert!(err.to_string().contains("overdue_days"));

        let err = LedgerConfig::from_toml_str("[thresholds]\noverdue_days = \"soon\"").unwrap_err();
        assert!(matches!(err, LedgerError::ConfigParse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[thresholds]\nheader_match_min = 3").unwrap();

        let config = LedgerConfig::load(file.path()).unwrap();
        assert_eq!(config.thresholds.header_match_min, 3);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        let config = LedgerConfig::load_or_default(Some(&missing)).unwrap();
        assert_eq!(config, LedgerConfig::default());
        assert_eq!(LedgerConfig::load_or_default(None).unwrap(), LedgerConfig::default());
    }
}
