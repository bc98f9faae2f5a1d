use toxview::data::filter::{filter, list_distinct_values, FilterRequest, FilterableColumn, FilterResult};
use toxview::data::loader::load_resolved;
use toxview::data::model::Dataset;
use toxview::data::source::ResolvedSource;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    Preview,
    Filter,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Home, Page::Preview, Page::Filter];

    pub fn label(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Preview => "Data preview",
            Page::Filter => "Data filter",
        }
    }
}

/// Outcome of the current filter inputs, cached between frames.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FilterOutcome {
    /// No pattern typed or picked yet.
    #[default]
    AwaitingInput,
    Matches(Vec<usize>),
    Error(String),
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub source: ResolvedSource,

    /// Loaded dataset (None until a data page is opened).
    pub dataset: Option<Dataset>,

    pub page: Page,

    pub filter_column: FilterableColumn,
    /// Free-text pattern; wins over `picked_value` when non-empty.
    pub typed_pattern: String,
    pub picked_value: Option<String>,
    /// Distinct values of `filter_column` for the picker.
    pub distinct_values: Vec<String>,

    pub outcome: FilterOutcome,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(source: ResolvedSource) -> Self {
        Self {
            source,
            dataset: None,
            page: Page::default(),
            filter_column: FilterableColumn::default(),
            typed_pattern: String::new(),
            picked_value: None,
            distinct_values: Vec::new(),
            outcome: FilterOutcome::default(),
            status_message: None,
        }
    }

    /// Switch page, loading the dataset whenever a data page is shown
    /// without one, so a failed load is retried on the next visit.
    pub fn open_page(&mut self, page: Page) {
        self.page = page;
        if page != Page::Home && self.dataset.is_none() {
            self.reload();
        }
    }

    /// Read the source again and reset derived state.
    pub fn reload(&mut self) {
        match load_resolved(&self.source) {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load dataset: {e}");
                self.dataset = None;
                self.distinct_values.clear();
                self.outcome = FilterOutcome::AwaitingInput;
                self.status_message = Some(format!("Failed to load data: {e}"));
            }
        }
    }

    /// Ingest a newly loaded dataset and recompute the filter.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refresh_distinct_values();
        self.refilter();
    }

    pub fn set_filter_column(&mut self, column: FilterableColumn) {
        if self.filter_column == column {
            return;
        }
        self.filter_column = column;
        self.picked_value = None;
        self.refresh_distinct_values();
        self.refilter();
    }

    pub fn request(&self) -> FilterRequest {
        FilterRequest::from_inputs(
            self.filter_column,
            &self.typed_pattern,
            self.picked_value.as_deref(),
        )
    }

    /// Recompute `outcome` after an input change.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            self.outcome = FilterOutcome::AwaitingInput;
            return;
        };
        self.outcome = match filter(ds, &self.request()) {
            Ok(FilterResult::NoFilter) => FilterOutcome::AwaitingInput,
            Ok(FilterResult::Matches(view)) => FilterOutcome::Matches(view.indices().to_vec()),
            Err(e) => {
                log::error!("Filter failed: {e}");
                FilterOutcome::Error(e.to_string())
            }
        };
    }

    fn refresh_distinct_values(&mut self) {
        self.distinct_values = match &self.dataset {
            Some(ds) => list_distinct_values(ds, self.filter_column.name()).unwrap_or_else(|e| {
                log::warn!("{e}");
                Vec::new()
            }),
            None => Vec::new(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toxview::data::model::{CellValue, Schema};
    use toxview::data::source::SourceConfig;

    fn state() -> AppState {
        let source = SourceConfig::new("unused.csv").validate().unwrap();
        let mut state = AppState::new(source);
        let schema = Schema::from_headers(["Chemicals", "CAS", "SMILES", "Species"]);
        let rows = vec![
            vec!["PFOA".into(), "335-67-1".into(), CellValue::Null, "zebrafish".into()],
            vec!["PFOS".into(), "1763-23-1".into(), CellValue::Null, "fathead minnow".into()],
        ];
        state.set_dataset(Dataset::new(schema, rows).unwrap());
        state
    }

    #[test]
    fn starts_awaiting_input() {
        let state = state();
        assert_eq!(state.outcome, FilterOutcome::AwaitingInput);
        assert_eq!(state.distinct_values, vec!["PFOA", "PFOS"]);
    }

    #[test]
    fn picked_value_filters_until_text_is_typed() {
        let mut state = state();
        state.set_filter_column(FilterableColumn::Species);
        assert_eq!(state.distinct_values, vec!["zebrafish", "fathead minnow"]);

        state.picked_value = Some("fathead minnow".into());
        state.refilter();
        assert_eq!(state.outcome, FilterOutcome::Matches(vec![1]));

        state.typed_pattern = "ZEBRA".into();
        state.refilter();
        assert_eq!(state.outcome, FilterOutcome::Matches(vec![0]));
    }

    #[test]
    fn changing_column_clears_pick() {
        let mut state = state();
        state.picked_value = Some("PFOA".into());
        state.set_filter_column(FilterableColumn::Cas);
        assert_eq!(state.picked_value, None);
        assert_eq!(state.outcome, FilterOutcome::AwaitingInput);
    }

    #[test]
    fn failed_load_keeps_ui_usable() {
        let source = SourceConfig::new("/nonexistent/toxview/data.csv").validate().unwrap();
        let mut state = AppState::new(source);
        state.open_page(Page::Filter);
        assert_eq!(state.page, Page::Filter);
        assert!(state.dataset.is_none());
        assert!(state.status_message.as_deref().unwrap().starts_with("Failed to load data"));

        state.open_page(Page::Home);
        assert_eq!(state.page, Page::Home);
    }

    #[test]
    fn data_page_retries_after_failed_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tox.csv");
        let source = SourceConfig::new(path.to_string_lossy()).validate().unwrap();
        let mut state = AppState::new(source);

        state.open_page(Page::Preview);
        assert!(state.dataset.is_none());
        assert!(state.status_message.is_some());

        std::fs::write(&path, "Chemicals,CAS,SMILES,Species\nPFOA,335-67-1,,zebrafish\n").unwrap();
        state.open_page(Page::Filter);
        assert_eq!(state.dataset.as_ref().map(Dataset::len), Some(1));
        assert_eq!(state.status_message, None);
    }
}
