/// Data layer: core types, loading, filtering and export.
///
/// Architecture:
/// ```text
///  http(s):// or local path  (.xlsx / .csv / .json / .parquet)
///        │
///        ▼
///   ┌──────────┐
///   │  source   │  validate location + format, sniff payload
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  fetch → parse → Dataset (Schema + records)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  substring over one column → FilterResult
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  FilteredView → CSV bytes
///   └──────────┘
/// ```

pub mod export;
pub mod fetch;
pub mod filter;
pub mod loader;
pub mod model;
pub mod service;
pub mod source;
