use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::source::SourceConfig;

/// Complete application configuration.
///
/// ```toml
/// [source]
/// location = "https://raw.githubusercontent.com/.../PFAS_toxicity_data.xlsx"
/// format = "xlsx"        # xlsx | csv | json | parquet; inferred from the extension when omitted
/// delimiter = ","        # delimited text only
/// sheet = "0"            # worksheet name or zero-based index
/// timeout_secs = 60      # no timeout when omitted
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
}

impl AppConfig {
    /// Defaults, overlaid with the TOML file at `path` when one is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.source.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::source::{SourceFormat, DEFAULT_SOURCE};

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = AppConfig::from_toml("").unwrap();
        assert_eq!(cfg.source.location, DEFAULT_SOURCE);
        assert_eq!(cfg.source.delimiter, ',');
    }

    #[test]
    fn source_section_overrides_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            [source]
            location = "https://example.org/export"
            format = "csv"
            delimiter = ";"
            timeout_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(cfg.source.format, Some(SourceFormat::Csv));
        assert_eq!(cfg.source.delimiter, ';');
        assert_eq!(cfg.source.timeout_secs, Some(30));
        assert_eq!(cfg.source.sheet, None);
    }

    #[test]
    fn invalid_source_fails_validation() {
        let err = AppConfig::from_toml(
            r#"
            [source]
            location = "https://github.com/owner/repo/blob/main/data.csv"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("raw.githubusercontent.com"));
    }

    #[test]
    fn unknown_format_name_is_a_parse_error() {
        assert!(AppConfig::from_toml("[source]\nformat = \"xml\"\n").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/toxview.toml"))).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/toxview.toml"));
    }
}
