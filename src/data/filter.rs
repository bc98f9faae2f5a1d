use std::collections::HashSet;
use std::fmt;

use super::model::{CellValue, Dataset, Record};
use crate::error::InvalidColumnError;

// ---------------------------------------------------------------------------
// Filterable columns
// ---------------------------------------------------------------------------

/// The columns a user may filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum FilterableColumn {
    #[default]
    #[value(name = "Chemicals")]
    Chemicals,
    #[value(name = "CAS")]
    Cas,
    #[value(name = "SMILES")]
    Smiles,
    #[value(name = "Species")]
    Species,
}

impl FilterableColumn {
    pub const ALL: [FilterableColumn; 4] = [
        FilterableColumn::Chemicals,
        FilterableColumn::Cas,
        FilterableColumn::Smiles,
        FilterableColumn::Species,
    ];

    /// Column name as it appears in the dataset header.
    pub fn name(self) -> &'static str {
        match self {
            FilterableColumn::Chemicals => "Chemicals",
            FilterableColumn::Cas => "CAS",
            FilterableColumn::Smiles => "SMILES",
            FilterableColumn::Species => "Species",
        }
    }
}

impl fmt::Display for FilterableColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Request / result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterRequest {
    pub column: FilterableColumn,
    /// Literal substring, matched case-insensitively. Empty means no filter.
    pub pattern: String,
}

impl FilterRequest {
    pub fn new(column: FilterableColumn, pattern: impl Into<String>) -> Self {
        Self {
            column,
            pattern: pattern.into(),
        }
    }

    /// Combine a free-text box and a picked value: typed text wins when
    /// non-empty, otherwise the picked value is used.
    pub fn from_inputs(column: FilterableColumn, typed: &str, picked: Option<&str>) -> Self {
        let pattern = if typed.is_empty() {
            picked.unwrap_or_default()
        } else {
            typed
        };
        Self::new(column, pattern)
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }
}

/// Records of a dataset selected by a filter, in dataset order.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// A view over every record of `dataset`.
    pub fn all(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    pub fn column_names(&self) -> &'a [String] {
        self.dataset.column_names()
    }

    /// Positions of the matching records in the source dataset.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = self.dataset.records();
        self.indices.iter().map(move |&i| &records[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Outcome of [`filter`]. `NoFilter` means "awaiting input", which is not the
/// same as a filter that matched nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterResult<'a> {
    NoFilter,
    Matches(FilteredView<'a>),
}

impl<'a> FilterResult<'a> {
    pub fn view(&self) -> Option<&FilteredView<'a>> {
        match self {
            FilterResult::NoFilter => None,
            FilterResult::Matches(view) => Some(view),
        }
    }

    pub fn is_no_filter(&self) -> bool {
        matches!(self, FilterResult::NoFilter)
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Apply a substring filter over one column.
///
/// The column is checked against the schema before anything else, so a
/// missing column fails even when the pattern is empty. Nulls never match.
pub fn filter<'a>(
    dataset: &'a Dataset,
    request: &FilterRequest,
) -> Result<FilterResult<'a>, InvalidColumnError> {
    let col = dataset.schema().index_of(request.column.name())?;
    if request.is_empty() {
        return Ok(FilterResult::NoFilter);
    }

    let needle = request.pattern.to_lowercase();
    let indices: Vec<usize> = dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| cell_contains(&rec[col], &needle))
        .map(|(i, _)| i)
        .collect();

    log::debug!(
        "Filter {}~{:?}: {} of {} records",
        request.column,
        request.pattern,
        indices.len(),
        dataset.len()
    );
    Ok(FilterResult::Matches(FilteredView { dataset, indices }))
}

/// `needle` must already be lowercase.
fn cell_contains(cell: &CellValue, needle: &str) -> bool {
    match cell.as_text() {
        Some(text) => text.to_lowercase().contains(needle),
        None => false,
    }
}

/// Unique, non-null stringified values of `column`, in first-seen order.
pub fn list_distinct_values(
    dataset: &Dataset,
    column: &str,
) -> Result<Vec<String>, InvalidColumnError> {
    let col = dataset.schema().index_of(column)?;
    let mut seen = HashSet::new();
    Ok(dataset
        .records()
        .iter()
        .filter_map(|rec| rec[col].as_text())
        .filter(|text| seen.insert(text.clone()))
        .collect())
}
