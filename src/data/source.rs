//! Source location and format: where the table lives and how to parse it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// The published PFASTox toxicity workbook (raw content, not the viewer page).
pub const DEFAULT_SOURCE: &str =
    "https://raw.githubusercontent.com/Zhu-lele/PFASTox-Predictor/main/PFAS_toxicity_data.xlsx";

// ---------------------------------------------------------------------------
// SourceLocation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Local(PathBuf),
    Http(String),
}

impl SourceLocation {
    /// Classify by string inspection only (no filesystem or network calls).
    pub fn parse(location: &str) -> Self {
        if let Some(i) = location.find("://") {
            let scheme = location[..i].to_ascii_lowercase();
            if scheme == "http" || scheme == "https" {
                return SourceLocation::Http(location.to_string());
            }
            if scheme == "file" {
                return SourceLocation::Local(PathBuf::from(&location[i + 3..]));
            }
        }
        SourceLocation::Local(PathBuf::from(location))
    }

    /// Extension of the last path segment, ignoring any query or fragment.
    pub fn extension(&self) -> Option<String> {
        match self {
            SourceLocation::Local(path) => path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase),
            SourceLocation::Http(url) => {
                let after_scheme = url.find("://").map(|i| &url[i + 3..]).unwrap_or(url);
                let path = after_scheme
                    .split(['?', '#'])
                    .next()
                    .unwrap_or_default();
                let (_host, path) = path.split_once('/')?;
                let last = path.rsplit('/').next().unwrap_or(path);
                Path::new(last)
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(str::to_ascii_lowercase)
            }
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocation::Local(path) => write!(f, "{}", path.display()),
            SourceLocation::Http(url) => write!(f, "{url}"),
        }
    }
}

/// For `https://github.com/<owner>/<repo>/blob/<ref>/<path>` return the
/// matching `raw.githubusercontent.com` URL. Anything else is `None`.
pub fn github_raw_url(url: &str) -> Option<String> {
    let rest = url
        .strip_prefix("https://github.com/")
        .or_else(|| url.strip_prefix("http://github.com/"))?;
    let mut parts = rest.splitn(4, '/');
    let owner = parts.next()?;
    let repo = parts.next()?;
    if parts.next()? != "blob" {
        return None;
    }
    let tail = parts.next()?;
    let tail = tail.split(['?', '#']).next().unwrap_or(tail);
    Some(format!(
        "https://raw.githubusercontent.com/{owner}/{repo}/{tail}"
    ))
}

// ---------------------------------------------------------------------------
// SourceFormat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Excel workbook (.xls, .xlsx, .xlsm, .xlsb)
    Xlsx,
    /// Delimited text
    Csv,
    /// JSON array of records
    Json,
    /// Parquet columnar file
    Parquet,
}

impl SourceFormat {
    /// Parse format from extension string (e.g. "xlsx", "csv").
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "xls" | "xlsx" | "xlsm" | "xlsb" => Some(Self::Xlsx),
            "csv" | "tsv" | "txt" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "parquet" | "pq" => Some(Self::Parquet),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SourceFormat::Xlsx => "xlsx",
            SourceFormat::Csv => "csv",
            SourceFormat::Json => "json",
            SourceFormat::Parquet => "parquet",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SourceFormat {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s)
            .ok_or_else(|| LoadError::InvalidSource(format!("unknown format '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Payload sniffing
// ---------------------------------------------------------------------------

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE2_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const PARQUET_MAGIC: &[u8] = b"PAR1";

/// Best guess at what a payload is, from its leading bytes.
pub fn sniff(payload: &[u8]) -> &'static str {
    if payload.starts_with(ZIP_MAGIC) {
        return "a zip container (xlsx)";
    }
    if payload.starts_with(OLE2_MAGIC) {
        return "an OLE2 container (xls)";
    }
    if payload.starts_with(PARQUET_MAGIC) {
        return "a parquet file";
    }
    let head = &payload[..payload.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start().to_ascii_lowercase();
    if text.starts_with("<!doctype html") || text.starts_with("<html") {
        return "an HTML page";
    }
    "text"
}

/// Fail fast when the payload obviously is not `declared`.
pub fn check_payload(declared: SourceFormat, payload: &[u8]) -> Result<(), LoadError> {
    let detected = sniff(payload);
    let ok = match declared {
        SourceFormat::Xlsx => {
            payload.starts_with(ZIP_MAGIC) || payload.starts_with(OLE2_MAGIC)
        }
        SourceFormat::Parquet => payload.starts_with(PARQUET_MAGIC),
        SourceFormat::Csv | SourceFormat::Json => detected == "text",
    };
    if ok {
        Ok(())
    } else {
        Err(LoadError::FormatMismatch { declared, detected })
    }
}

// ---------------------------------------------------------------------------
// SourceConfig
// ---------------------------------------------------------------------------

/// Where the dataset comes from and how to read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// URL (`http(s)://`) or local path.
    pub location: String,
    /// Explicit format; inferred from the location's extension when unset.
    pub format: Option<SourceFormat>,
    /// Field delimiter for delimited text.
    pub delimiter: char,
    /// Worksheet name or zero-based index (first sheet when unset).
    pub sheet: Option<String>,
    /// Request timeout; no timeout when unset.
    pub timeout_secs: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            location: DEFAULT_SOURCE.to_string(),
            format: None,
            delimiter: ',',
            sheet: None,
            timeout_secs: None,
        }
    }
}

/// A [`SourceConfig`] that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSource {
    pub location: SourceLocation,
    pub format: SourceFormat,
    pub delimiter: u8,
    pub sheet: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl SourceConfig {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: SourceFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Check the location and settle the format before anything is fetched.
    pub fn validate(&self) -> Result<ResolvedSource, LoadError> {
        let raw = self.location.trim();
        if raw.is_empty() {
            return Err(LoadError::InvalidSource("empty source location".into()));
        }
        if let Some(raw_url) = github_raw_url(raw) {
            return Err(LoadError::NotRawContent {
                url: raw.to_string(),
                raw_url,
            });
        }

        let location = SourceLocation::parse(raw);
        let format = match self.format {
            Some(f) => f,
            None => location
                .extension()
                .and_then(|ext| SourceFormat::from_extension(&ext))
                .ok_or_else(|| LoadError::UnknownFormat {
                    location: raw.to_string(),
                })?,
        };

        if !self.delimiter.is_ascii() {
            return Err(LoadError::InvalidSource(format!(
                "delimiter '{}' is not a single ASCII character",
                self.delimiter
            )));
        }

        Ok(ResolvedSource {
            location,
            format,
            delimiter: self.delimiter as u8,
            sheet: self.sheet.clone(),
            timeout_secs: self.timeout_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_locations() {
        assert!(matches!(
            SourceLocation::parse("https://example.org/a.csv"),
            SourceLocation::Http(_)
        ));
        assert!(matches!(
            SourceLocation::parse("HTTP://example.org/a.csv"),
            SourceLocation::Http(_)
        ));
        assert_eq!(
            SourceLocation::parse("file:///tmp/a.csv"),
            SourceLocation::Local(PathBuf::from("/tmp/a.csv"))
        );
        assert_eq!(
            SourceLocation::parse("data/tox.xlsx"),
            SourceLocation::Local(PathBuf::from("data/tox.xlsx"))
        );
    }

    #[test]
    fn url_extension_ignores_host_and_query() {
        let loc = SourceLocation::parse("https://host.example/dir/Tox.XLSX?raw=true");
        assert_eq!(loc.extension().as_deref(), Some("xlsx"));
        let bare = SourceLocation::parse("https://host.example.csv");
        assert_eq!(bare.extension(), None);
    }

    #[test]
    fn default_source_infers_xlsx() {
        let resolved = SourceConfig::default().validate().unwrap();
        assert_eq!(resolved.format, SourceFormat::Xlsx);
        assert!(matches!(resolved.location, SourceLocation::Http(_)));
    }

    #[test]
    fn viewer_link_is_rejected_with_raw_alternative() {
        let cfg = SourceConfig::new(
            "https://github.com/Zhu-lele/PFASTox-Predictor/blob/main/PFAS_toxicity_data.csv",
        );
        match cfg.validate() {
            Err(LoadError::NotRawContent { raw_url, .. }) => assert_eq!(
                raw_url,
                "https://raw.githubusercontent.com/Zhu-lele/PFASTox-Predictor/main/PFAS_toxicity_data.csv"
            ),
            other => panic!("expected NotRawContent, got {other:?}"),
        }
    }

    #[test]
    fn missing_extension_needs_explicit_format() {
        let cfg = SourceConfig::new("https://example.org/download");
        assert!(matches!(cfg.validate(), Err(LoadError::UnknownFormat { .. })));

        let cfg = cfg.with_format(SourceFormat::Csv);
        assert_eq!(cfg.validate().unwrap().format, SourceFormat::Csv);
    }

    #[test]
    fn explicit_format_overrides_extension() {
        let cfg = SourceConfig::new("dump.txt").with_format(SourceFormat::Json);
        assert_eq!(cfg.validate().unwrap().format, SourceFormat::Json);
    }

    #[test]
    fn empty_location_is_invalid() {
        let cfg = SourceConfig::new("   ");
        assert!(matches!(cfg.validate(), Err(LoadError::InvalidSource(_))));
    }

    #[test]
    fn sniffing_catches_mismatches() {
        let html = b"  <!DOCTYPE html><html><body>viewer</body></html>";
        assert!(matches!(
            check_payload(SourceFormat::Csv, html),
            Err(LoadError::FormatMismatch { detected: "an HTML page", .. })
        ));
        assert!(check_payload(SourceFormat::Xlsx, html).is_err());

        let zip = b"PK\x03\x04rest-of-archive";
        assert!(check_payload(SourceFormat::Xlsx, zip).is_ok());
        assert!(check_payload(SourceFormat::Csv, zip).is_err());

        assert!(check_payload(SourceFormat::Csv, b"Chemicals,CAS\nPFOA,335-67-1\n").is_ok());
        assert!(check_payload(SourceFormat::Parquet, b"Chemicals,CAS\n").is_err());
        assert!(check_payload(SourceFormat::Parquet, b"PAR1....").is_ok());
    }
}
