use super::export::export_csv;
use super::filter::{filter, list_distinct_values, FilterRequest, FilterResult};
use super::loader::load_resolved;
use super::model::Dataset;
use super::source::{ResolvedSource, SourceConfig};
use crate::error::{InvalidColumnError, LoadError, QueryError};

// ---------------------------------------------------------------------------
// Dataset query service
// ---------------------------------------------------------------------------

/// Stateless facade over a validated source. Each call to [`load`](Self::load)
/// or [`run`](Self::run) reads the source again.
#[derive(Debug, Clone)]
pub struct QueryService {
    source: ResolvedSource,
}

/// Summary of one load → filter → export run.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutput {
    pub total: usize,
    /// `None` when the request carried no pattern.
    pub matched: Option<usize>,
    pub csv: Option<Vec<u8>>,
}

impl QueryService {
    /// Validate `config` up front so a bad source fails before any fetch.
    pub fn new(config: &SourceConfig) -> Result<Self, LoadError> {
        Ok(Self {
            source: config.validate()?,
        })
    }

    pub fn source(&self) -> &ResolvedSource {
        &self.source
    }

    pub fn load(&self) -> Result<Dataset, LoadError> {
        load_resolved(&self.source)
    }

    pub fn distinct_values(
        &self,
        dataset: &Dataset,
        column: &str,
    ) -> Result<Vec<String>, InvalidColumnError> {
        list_distinct_values(dataset, column)
    }

    pub fn run(&self, request: &FilterRequest) -> Result<QueryOutput, QueryError> {
        let dataset = self.load()?;
        let output = match filter(&dataset, request)? {
            FilterResult::NoFilter => QueryOutput {
                total: dataset.len(),
                matched: None,
                csv: None,
            },
            FilterResult::Matches(view) => QueryOutput {
                total: dataset.len(),
                matched: Some(view.len()),
                csv: Some(export_csv(&view)?),
            },
        };
        Ok(output)
    }
}
