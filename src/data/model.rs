use std::collections::HashMap;
use std::fmt;

use crate::error::InvalidColumnError;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common spreadsheet dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date/datetime kept as text.
    Date(String),
    Null,
}

/// The stringified form used for matching, distinct values and export.
/// `Null` renders as the empty string.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) | CellValue::Date(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write_float(f, *v),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

/// Shortest round-trip text. Magnitudes below 1e-4 or from 1e16 up use an
/// exponent (`1e-07`, `1.5e+16`); integral floats keep a trailing `.0` so
/// 1.0 never reads as an integer.
fn write_float(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.is_finite() && v != 0.0 {
        let sci = format!("{v:e}");
        if let Some((mantissa, exp)) = sci.split_once('e') {
            if let Ok(exp) = exp.parse::<i32>() {
                if !(-4..16).contains(&exp) {
                    let sign = if exp < 0 { '-' } else { '+' };
                    return write!(f, "{mantissa}e{sign}{:02}", exp.abs());
                }
            }
        }
    }
    if v.is_finite() && v.fract() == 0.0 {
        write!(f, "{v:.1}")
    } else {
        write!(f, "{v}")
    }
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Stringified value, or `None` for nulls.
    pub fn as_text(&self) -> Option<String> {
        if self.is_null() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Schema – validated column set, computed once at load time
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    columns: Vec<String>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Build a schema from raw header cells.
    ///
    /// Blank headers become `Unnamed: {i}` and repeated names get a numeric
    /// suffix (`name.1`, `name.2`, ...), so every column is addressable.
    pub fn from_headers<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut columns = Vec::new();
        let mut index = HashMap::new();

        for (i, raw) in headers.into_iter().enumerate() {
            let base = match raw.as_ref().trim() {
                "" => format!("Unnamed: {i}"),
                name => name.to_string(),
            };
            let mut name = base.clone();
            let mut dup = 0;
            while index.contains_key(&name) {
                dup += 1;
                name = format!("{base}.{dup}");
            }
            index.insert(name.clone(), columns.len());
            columns.push(name);
        }

        Schema { columns, index }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of `column`, checked against the schema.
    pub fn index_of(&self, column: &str) -> Result<usize, InvalidColumnError> {
        self.index
            .get(column)
            .copied()
            .ok_or_else(|| InvalidColumnError {
                column: column.to_string(),
                available: self.columns.clone(),
            })
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// One row: a cell per schema column, in schema order.
pub type Record = Vec<CellValue>;

/// The full parsed dataset. Immutable once built.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    schema: Schema,
    records: Vec<Record>,
}

impl Dataset {
    /// Build a dataset, checking that every row matches the schema width.
    ///
    /// On a ragged row, returns its zero-based position and width.
    pub fn new(schema: Schema, records: Vec<Record>) -> Result<Self, (usize, usize)> {
        if let Some((row, rec)) = records
            .iter()
            .enumerate()
            .find(|(_, rec)| rec.len() != schema.len())
        {
            return Err((row, rec.len()));
        }
        Ok(Dataset { schema, records })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn column_names(&self) -> &[String] {
        self.schema.columns()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_stringified_form() {
        assert_eq!(CellValue::Integer(42).to_string(), "42");
        assert_eq!(CellValue::Float(1.0).to_string(), "1.0");
        assert_eq!(CellValue::Float(0.25).to_string(), "0.25");
        assert_eq!(CellValue::Float(0.0001).to_string(), "0.0001");
        assert_eq!(CellValue::Float(1e-7).to_string(), "1e-07");
        assert_eq!(CellValue::Float(-2.5e-5).to_string(), "-2.5e-05");
        assert_eq!(CellValue::Float(1e15).to_string(), "1000000000000000.0");
        assert_eq!(CellValue::Float(1e300).to_string(), "1e+300");
        assert_eq!(CellValue::Float(0.0).to_string(), "0.0");
        assert_eq!(CellValue::Bool(false).to_string(), "false");
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(CellValue::Null.as_text(), None);
        assert_eq!(CellValue::from("PFOA").as_text().as_deref(), Some("PFOA"));
    }

    #[test]
    fn schema_names_blank_and_duplicate_headers() {
        let schema = Schema::from_headers(["CAS", "", "LC50", "LC50", "LC50"]);
        assert_eq!(
            schema.columns(),
            &["CAS", "Unnamed: 1", "LC50", "LC50.1", "LC50.2"]
        );
        assert_eq!(schema.index_of("LC50.1"), Ok(3));
    }

    #[test]
    fn unknown_column_lists_available_ones() {
        let schema = Schema::from_headers(["Chemicals", "CAS"]);
        let err = schema.index_of("Species").unwrap_err();
        assert_eq!(err.column, "Species");
        assert_eq!(err.available, vec!["Chemicals", "CAS"]);
        assert!(err.to_string().contains("Chemicals, CAS"));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let schema = Schema::from_headers(["a", "b"]);
        let rows = vec![
            vec![CellValue::Integer(1), CellValue::Integer(2)],
            vec![CellValue::Integer(3)],
        ];
        assert_eq!(Dataset::new(schema, rows), Err((1, 1)));
    }
}
