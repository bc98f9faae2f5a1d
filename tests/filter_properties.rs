//! Property-based tests for filtering, distinct values and export.

use std::collections::HashSet;
use std::io::Write;

use proptest::prelude::*;

use toxview::data::export::export_csv;
use toxview::data::filter::{filter, list_distinct_values, FilterRequest, FilterableColumn};
use toxview::data::loader::load_dataset;
use toxview::data::model::{CellValue, Dataset, Schema};
use toxview::data::source::SourceConfig;

fn cell_strategy() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        4 => "[a-zA-Z0-9 ,\"\n.-]{0,8}".prop_map(CellValue::String),
        1 => prop::sample::select(vec![" PFOA ", "NA", "007", "1.50", "True", "-0", ""])
            .prop_map(CellValue::from),
        1 => any::<i32>().prop_map(|i| CellValue::Integer(i.into())),
        1 => prop::num::f64::NORMAL.prop_map(CellValue::Float),
        1 => (-400i32..400).prop_map(|i| CellValue::Float(f64::from(i) / 8.0)),
        1 => any::<bool>().prop_map(CellValue::Bool),
        1 => Just(CellValue::Null),
    ]
}

fn dataset_strategy() -> impl Strategy<Value = Dataset> {
    prop::collection::vec(prop::collection::vec(cell_strategy(), 4), 0..40).prop_map(|rows| {
        let schema = Schema::from_headers(["Chemicals", "CAS", "SMILES", "Species"]);
        Dataset::new(schema, rows).expect("rows have schema width")
    })
}

fn column_strategy() -> impl Strategy<Value = FilterableColumn> {
    prop::sample::select(FilterableColumn::ALL.to_vec())
}

proptest! {
    /// Every kept record contains the pattern; every dropped one does not.
    #[test]
    fn prop_filter_is_sound_and_complete(
        ds in dataset_strategy(),
        column in column_strategy(),
        pattern in "[a-zA-Z0-9-]{1,3}",
    ) {
        let col = ds.schema().index_of(column.name()).unwrap();
        let result = filter(&ds, &FilterRequest::new(column, pattern.clone())).unwrap();
        let view = result.view().unwrap();
        let kept: HashSet<usize> = view.indices().iter().copied().collect();
        let needle = pattern.to_lowercase();

        for (i, rec) in ds.records().iter().enumerate() {
            let hit = rec[col]
                .as_text()
                .is_some_and(|t| t.to_lowercase().contains(&needle));
            prop_assert_eq!(hit, kept.contains(&i));
        }
        prop_assert!(view.indices().windows(2).all(|w| w[0] < w[1]));
    }

    /// An empty pattern is the sentinel, never an (empty) match set.
    #[test]
    fn prop_empty_pattern_is_sentinel(ds in dataset_strategy(), column in column_strategy()) {
        let result = filter(&ds, &FilterRequest::new(column, "")).unwrap();
        prop_assert!(result.is_no_filter());
    }

    #[test]
    fn prop_distinct_values_unique_and_non_null(ds in dataset_strategy(), column in column_strategy()) {
        let values = list_distinct_values(&ds, column.name()).unwrap();
        let unique: HashSet<&String> = values.iter().collect();
        prop_assert_eq!(unique.len(), values.len());

        let col = ds.schema().index_of(column.name()).unwrap();
        let present: HashSet<String> = ds.records().iter().filter_map(|r| r[col].as_text()).collect();
        prop_assert_eq!(unique.len(), present.len());
        prop_assert!(values.iter().all(|v| present.contains(v)));
    }

    #[test]
    fn prop_export_is_deterministic(
        ds in dataset_strategy(),
        column in column_strategy(),
        pattern in "[a-z0-9]{1,2}",
    ) {
        let result = filter(&ds, &FilterRequest::new(column, pattern)).unwrap();
        let view = result.view().unwrap();
        let first = export_csv(view).unwrap();
        prop_assert_eq!(&first, &export_csv(view).unwrap());

        let rows = csv::Reader::from_reader(first.as_slice()).records().count();
        prop_assert_eq!(rows, view.len());
    }

    /// Exported CSV loads back into the filtered records, cell text for cell text.
    #[test]
    fn prop_export_round_trips_through_csv_load(
        ds in dataset_strategy(),
        column in column_strategy(),
        pattern in "[a-z0-9]{1,2}",
    ) {
        let result = filter(&ds, &FilterRequest::new(column, pattern)).unwrap();
        let view = result.view().unwrap();
        let csv = export_csv(view).unwrap();

        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(&csv).unwrap();
        let reloaded = load_dataset(&SourceConfig::new(file.path().to_string_lossy())).unwrap();

        prop_assert_eq!(reloaded.column_names(), view.column_names());
        prop_assert_eq!(reloaded.len(), view.len());
        for (got, want) in reloaded.records().iter().zip(view.records()) {
            let got: Vec<String> = got.iter().map(ToString::to_string).collect();
            let want: Vec<String> = want.iter().map(ToString::to_string).collect();
            prop_assert_eq!(got, want);
        }
    }
}
