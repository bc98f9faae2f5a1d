//! Load, filter and export a tabular toxicity dataset.
//!
//! The [`data`] layer is independent of the desktop front end in the binary:
//!
//! ```no_run
//! use toxview::data::filter::{filter, FilterRequest, FilterableColumn};
//! use toxview::data::loader::load_dataset;
//! use toxview::data::source::SourceConfig;
//!
//! let dataset = load_dataset(&SourceConfig::default())?;
//! let result = filter(&dataset, &FilterRequest::new(FilterableColumn::Species, "zebra"))?;
//! if let Some(view) = result.view() {
//!     let csv = toxview::data::export::export_csv(view)?;
//!     println!("{}", String::from_utf8_lossy(&csv));
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
