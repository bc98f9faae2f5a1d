use std::path::Path;

use super::filter::FilteredView;
use crate::error::ExportError;

/// Suggested file name for downloads of a filtered view.
pub const EXPORT_FILE_NAME: &str = "filtered_data.csv";

pub const EXPORT_MIME_TYPE: &str = "text/csv";

/// Serialize a view as UTF-8 CSV: header row, one line per record, no index
/// column. Nulls are written as empty fields.
pub fn export_csv(view: &FilteredView<'_>) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(view.column_names())?;
    for record in view.records() {
        writer.write_record(record.iter().map(|cell| cell.to_string()))?;
    }

    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

/// Write [`export_csv`] output to `path`.
pub fn write_csv(view: &FilteredView<'_>, path: &Path) -> Result<(), ExportError> {
    let bytes = export_csv(view)?;
    std::fs::write(path, bytes)?;
    log::info!("Exported {} records to {}", view.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter, FilterRequest, FilterableColumn};
    use crate::data::model::{CellValue, Dataset, Schema};

    fn dataset() -> Dataset {
        let schema = Schema::from_headers(["Chemicals", "CAS", "Species", "Note"]);
        Dataset::new(
            schema,
            vec![
                vec![
                    "PFOA".into(),
                    "335-67-1".into(),
                    "zebrafish".into(),
                    "acute, 96h".into(),
                ],
                vec![
                    "PFOS".into(),
                    "1763-23-1".into(),
                    "fathead minnow".into(),
                    CellValue::Null,
                ],
            ],
        )
        .unwrap()
    }

    #[test]
    fn writes_header_and_quotes_when_needed() {
        let ds = dataset();
        let out = export_csv(&FilteredView::all(&ds)).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Chemicals,CAS,Species,Note\n\
             PFOA,335-67-1,zebrafish,\"acute, 96h\"\n\
             PFOS,1763-23-1,fathead minnow,\n"
        );
    }

    #[test]
    fn exports_only_matching_records() {
        let ds = dataset();
        let result = filter(&ds, &FilterRequest::new(FilterableColumn::Species, "minnow")).unwrap();
        let out = export_csv(result.view().unwrap()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Chemicals,CAS,Species,Note\nPFOS,1763-23-1,fathead minnow,\n"
        );
    }

    #[test]
    fn empty_match_still_has_header() {
        let ds = dataset();
        let result = filter(&ds, &FilterRequest::new(FilterableColumn::Species, "trout")).unwrap();
        let out = export_csv(result.view().unwrap()).unwrap();
        assert_eq!(out, b"Chemicals,CAS,Species,Note\n");
    }

    #[test]
    fn write_csv_creates_file() {
        let ds = dataset();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(EXPORT_FILE_NAME);
        write_csv(&FilteredView::all(&ds), &path).unwrap();
        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, export_csv(&FilteredView::all(&ds)).unwrap());
    }
}
