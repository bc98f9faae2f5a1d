use std::io::Cursor;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use arrow::util::display::array_value_to_string;
use bytes::Bytes;
use calamine::{open_workbook_auto_from_rs, Data, DataType as _, Range, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::fetch::fetch_bytes;
use super::model::{CellValue, Dataset, Record, Schema};
use super::source::{check_payload, ResolvedSource, SourceConfig, SourceFormat};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Validate `source`, fetch its payload and parse it into a [`Dataset`].
///
/// Every call reads the source afresh; nothing is cached.
pub fn load_dataset(source: &SourceConfig) -> Result<Dataset, LoadError> {
    let resolved = source.validate()?;
    load_resolved(&resolved)
}

pub fn load_resolved(source: &ResolvedSource) -> Result<Dataset, LoadError> {
    log::info!("Loading {} source {}", source.format, source.location);
    let payload = fetch_bytes(&source.location, source.timeout_secs)?;
    log::debug!("Fetched {} bytes from {}", payload.len(), source.location);

    let dataset = parse_payload(source, payload)?;
    log::info!(
        "Loaded {} records with columns {:?}",
        dataset.len(),
        dataset.column_names()
    );
    Ok(dataset)
}

/// Parse an already fetched payload. Dispatch by the resolved format.
pub fn parse_payload(source: &ResolvedSource, payload: Bytes) -> Result<Dataset, LoadError> {
    check_payload(source.format, &payload)?;
    match source.format {
        SourceFormat::Xlsx => parse_xlsx(payload, source.sheet.as_deref()),
        SourceFormat::Csv => parse_csv(&payload, source.delimiter),
        SourceFormat::Json => parse_json(&payload),
        SourceFormat::Parquet => parse_parquet(payload),
    }
}

fn build(format: SourceFormat, schema: Schema, records: Vec<Record>) -> Result<Dataset, LoadError> {
    if schema.is_empty() {
        return Err(LoadError::malformed(format, "missing header row"));
    }
    let width = schema.len();
    Dataset::new(schema, records).map_err(|(row, got)| {
        LoadError::malformed(
            format,
            format!("row {row} has {got} fields, header has {width}"),
        )
    })
}

// ---------------------------------------------------------------------------
// Delimited text
// ---------------------------------------------------------------------------

/// Header row with column names, one record per line. Empty fields are Null;
/// other cells are typed by inference (integer, float, bool, string).
fn parse_csv(payload: &[u8], delimiter: u8) -> Result<Dataset, LoadError> {
    let malformed = |e: csv::Error| LoadError::malformed(SourceFormat::Csv, e.to_string());

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(false)
        .from_reader(payload);

    let schema = Schema::from_headers(reader.headers().map_err(malformed)?.iter());

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(malformed)?;
        records.push(record.iter().map(guess_cell_type).collect());
    }

    build(SourceFormat::Csv, schema, records)
}

/// A number or bool is kept only when its stringified form is the field text
/// itself, so `"007"`, `" 12"` or `"NA"` stay strings and exported cells
/// read back unchanged.
fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    let typed = if let Ok(i) = s.parse::<i64>() {
        CellValue::Integer(i)
    } else if let Ok(f) = s.parse::<f64>() {
        CellValue::Float(f)
    } else {
        match s {
            "true" => CellValue::Bool(true),
            "false" => CellValue::Bool(false),
            _ => return CellValue::String(s.to_string()),
        }
    };
    if typed.to_string() == s {
        typed
    } else {
        CellValue::String(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Spreadsheets
// ---------------------------------------------------------------------------

/// First worksheet (or the configured one); first row is the header.
/// Trailing all-empty rows are dropped.
fn parse_xlsx(payload: Bytes, sheet: Option<&str>) -> Result<Dataset, LoadError> {
    let excel = |e: calamine::Error| LoadError::malformed(SourceFormat::Xlsx, e.to_string());

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(payload)).map_err(excel)?;
    if workbook.sheet_names().is_empty() {
        return Err(LoadError::malformed(SourceFormat::Xlsx, "workbook has no worksheets"));
    }

    let range: Range<Data> = match sheet {
        Some(sel) => match sel.parse::<usize>() {
            Ok(idx) => workbook
                .worksheet_range_at(idx)
                .ok_or_else(|| {
                    LoadError::malformed(SourceFormat::Xlsx, format!("no sheet at index {idx}"))
                })?
                .map_err(excel)?,
            Err(_) => workbook.worksheet_range(sel).map_err(excel)?,
        },
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| LoadError::malformed(SourceFormat::Xlsx, "no first sheet"))?
            .map_err(excel)?,
    };

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Err(LoadError::malformed(SourceFormat::Xlsx, "worksheet is empty"));
    };
    let schema = Schema::from_headers(header.iter().map(|c| c.to_string()));

    let mut records: Vec<Record> = rows
        .map(|row| row.iter().map(excel_cell).collect())
        .collect();
    while records
        .last()
        .is_some_and(|r: &Record| r.iter().all(CellValue::is_null))
    {
        records.pop();
    }

    build(SourceFormat::Xlsx, schema, records)
}

fn excel_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Null,
        Data::String(s) if s.trim().is_empty() => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => float_cell(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) => match cell.as_datetime() {
            Some(dt) => CellValue::Date(dt.to_string()),
            None => CellValue::String(cell.to_string()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Date(s.clone()),
    }
}

/// Spreadsheets store every number as a float; whole values become integers.
fn float_cell(f: f64) -> CellValue {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if f.fract() == 0.0 && f.abs() < MAX_EXACT {
        CellValue::Integer(f as i64)
    } else {
        CellValue::Float(f)
    }
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Records-oriented array, the default `to_json(orient='records')` layout:
///
/// ```json
/// [
///   { "Chemicals": "PFOA", "CAS": "335-67-1", "LC50": 12.5 },
///   ...
/// ]
/// ```
///
/// Columns are the union of keys in first-seen order; missing keys are Null.
fn parse_json(payload: &[u8]) -> Result<Dataset, LoadError> {
    let malformed = |m: String| LoadError::malformed(SourceFormat::Json, m);

    let root: JsonValue =
        serde_json::from_slice(payload).map_err(|e| malformed(e.to_string()))?;
    let rows = root
        .as_array()
        .ok_or_else(|| malformed("expected top-level JSON array".into()))?;

    let mut objects = Vec::with_capacity(rows.len());
    let mut columns: Vec<String> = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .ok_or_else(|| malformed(format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let records = objects
        .iter()
        .map(|obj| {
            columns
                .iter()
                .map(|col| obj.get(col).map(json_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    build(SourceFormat::Json, Schema::from_headers(&columns), records)
}

fn json_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Every column becomes a table column. Works with files written by both
/// Pandas (`df.to_parquet()`) and Polars (`df.write_parquet()`).
fn parse_parquet(payload: Bytes) -> Result<Dataset, LoadError> {
    let malformed = |m: String| LoadError::malformed(SourceFormat::Parquet, m);

    let builder = ParquetRecordBatchReaderBuilder::try_new(payload)
        .map_err(|e| malformed(format!("reading parquet metadata: {e}")))?;
    let schema = Schema::from_headers(builder.schema().fields().iter().map(|f| f.name()));
    let reader = builder
        .build()
        .map_err(|e| malformed(format!("building parquet reader: {e}")))?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result.map_err(|e| malformed(format!("reading record batch: {e}")))?;
        for row in 0..batch.num_rows() {
            records.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| arrow_cell(col, row))
                    .collect(),
            );
        }
    }

    build(SourceFormat::Parquet, schema, records)
}

/// Extract a single value from an Arrow column at a given row.
fn arrow_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let typed = match col.data_type() {
        DataType::Utf8 => col
            .as_string_opt::<i32>()
            .map(|a| CellValue::String(a.value(row).to_string())),
        DataType::LargeUtf8 => col
            .as_string_opt::<i64>()
            .map(|a| CellValue::String(a.value(row).to_string())),
        DataType::Boolean => col.as_boolean_opt().map(|a| CellValue::Bool(a.value(row))),
        DataType::Int8 => col.as_primitive_opt::<Int8Type>().map(|a| CellValue::Integer(a.value(row).into())),
        DataType::Int16 => col.as_primitive_opt::<Int16Type>().map(|a| CellValue::Integer(a.value(row).into())),
        DataType::Int32 => col.as_primitive_opt::<Int32Type>().map(|a| CellValue::Integer(a.value(row).into())),
        DataType::Int64 => col.as_primitive_opt::<Int64Type>().map(|a| CellValue::Integer(a.value(row))),
        DataType::UInt8 => col.as_primitive_opt::<UInt8Type>().map(|a| CellValue::Integer(a.value(row).into())),
        DataType::UInt16 => col.as_primitive_opt::<UInt16Type>().map(|a| CellValue::Integer(a.value(row).into())),
        DataType::UInt32 => col.as_primitive_opt::<UInt32Type>().map(|a| CellValue::Integer(a.value(row).into())),
        DataType::UInt64 => col
            .as_primitive_opt::<UInt64Type>()
            .and_then(|a| i64::try_from(a.value(row)).ok())
            .map(CellValue::Integer),
        DataType::Float32 => col.as_primitive_opt::<Float32Type>().map(|a| CellValue::Float(a.value(row).into())),
        DataType::Float64 => col.as_primitive_opt::<Float64Type>().map(|a| CellValue::Float(a.value(row))),
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            array_value_to_string(col.as_ref(), row).ok().map(CellValue::Date)
        }
        _ => None,
    };
    typed.unwrap_or_else(|| match array_value_to_string(col.as_ref(), row) {
        Ok(s) => CellValue::String(s),
        Err(_) => CellValue::String(format!("{:?}", col.data_type())),
    })
}
