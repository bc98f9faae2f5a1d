//! Command-line definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::data::filter::FilterableColumn;
use crate::data::source::SourceFormat;

/// Browse, filter and export the PFASTox toxicity database.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Dataset location (http(s) URL or local path)
    #[arg(long, global = true)]
    pub source: Option<String>,

    /// Dataset format; inferred from the source extension when omitted
    #[arg(long, global = true, value_enum)]
    pub format: Option<SourceFormat>,

    /// Field delimiter for delimited text
    #[arg(long, global = true)]
    pub delimiter: Option<char>,

    /// Worksheet name or zero-based index
    #[arg(long, global = true)]
    pub sheet: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Filter the dataset and write the matches as CSV
    Export {
        /// Column to filter on
        #[arg(long, value_enum)]
        column: FilterableColumn,

        /// Case-insensitive substring to look for
        #[arg(long)]
        pattern: String,

        /// Output file (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print the distinct values of a column, one per line
    Values {
        #[arg(long)]
        column: String,
    },
}

impl Args {
    /// Command-line flags take precedence over the configuration file.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        let source = &mut config.source;
        if let Some(location) = &self.source {
            source.location = location.clone();
        }
        if let Some(format) = self.format {
            source.format = Some(format);
        }
        if let Some(delimiter) = self.delimiter {
            source.delimiter = delimiter;
        }
        if let Some(sheet) = &self.sheet {
            source.sheet = Some(sheet.clone());
        }
        if let Some(timeout) = self.timeout {
            source.timeout_secs = Some(timeout);
        }
    }
}
