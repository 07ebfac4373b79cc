use std::fmt;

use chrono::NaiveDateTime;

/// Column name the loader gives the single frequency column.
pub const FREQUENCY_COLUMN: &str = "Frequency";
/// Column holding the synthetic time axis.
pub const TIME_COLUMN: &str = "time";
/// Index label after population.
pub const INDEX_LABEL: &str = "DataPoint";

/// Format used when rendering datetime cells.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Series – a typed column payload
// ---------------------------------------------------------------------------

/// Values of one column, mirroring the handful of dtypes a frequency table uses.
#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    Float(Vec<f64>),
    Integer(Vec<i64>),
    Datetime(Vec<NaiveDateTime>),
    Text(Vec<String>),
}

impl Series {
    pub fn len(&self) -> usize {
        match self {
            Series::Float(v) => v.len(),
            Series::Integer(v) => v.len(),
            Series::Datetime(v) => v.len(),
            Series::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short dtype name used in error messages.
    pub fn dtype(&self) -> &'static str {
        match self {
            Series::Float(_) => "float64",
            Series::Integer(_) => "int64",
            Series::Datetime(_) => "datetime",
            Series::Text(_) => "text",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Series::Float(_) | Series::Integer(_))
    }

    /// Numeric values widened to `f64`, or `None` for non-numeric series.
    pub fn as_f64_vec(&self) -> Option<Vec<f64>> {
        match self {
            Series::Float(v) => Some(v.clone()),
            Series::Integer(v) => Some(v.iter().map(|&i| i as f64).collect()),
            _ => None,
        }
    }

    /// Cell at `row`, for table display and export.
    pub fn cell(&self, row: usize) -> Option<CellValue> {
        match self {
            Series::Float(v) => v.get(row).map(|&x| CellValue::Float(x)),
            Series::Integer(v) => v.get(row).map(|&i| CellValue::Integer(i)),
            Series::Datetime(v) => v.get(row).map(|&d| CellValue::Datetime(d)),
            Series::Text(v) => v.get(row).map(|s| CellValue::Text(s.clone())),
        }
    }
}

// ---------------------------------------------------------------------------
// CellValue – a single rendered cell
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Float(f64),
    Integer(i64),
    Datetime(NaiveDateTime),
    Text(String),
}

impl CellValue {
    /// Render with a fixed number of decimals for floats.
    pub fn render(&self, precision: usize) -> String {
        match self {
            CellValue::Float(v) => format!("{v:.precision$}"),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Float(v) => write!(f, "{v:?}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Datetime(d) => write!(f, "{}", d.format(DATETIME_FORMAT)),
            CellValue::Text(s) => write!(f, "{s}"),
        }
    }
}

// ---------------------------------------------------------------------------
// TimeRepresentation – what the time column currently holds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRepresentation {
    Datetime,
    Mjd,
}

impl fmt::Display for TimeRepresentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeRepresentation::Datetime => write!(f, "datetime"),
            TimeRepresentation::Mjd => write!(f, "MJD"),
        }
    }
}

// ---------------------------------------------------------------------------
// FrequencyDataset – the loaded table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Series,
}

/// An ordered table of named columns plus a zero-based row index.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyDataset {
    /// Label of the row index (`None` until populated).
    pub index_name: Option<String>,
    /// Columns in insertion order.
    pub columns: Vec<Column>,
    /// Current representation of the time column (`None` = unpopulated).
    pub time_repr: Option<TimeRepresentation>,
}

impl FrequencyDataset {
    /// Wrap a raw frequency column as loaded from disk.
    pub fn from_frequencies(values: Vec<f64>) -> Self {
        FrequencyDataset {
            index_name: None,
            columns: vec![Column {
                name: FREQUENCY_COLUMN.to_string(),
                values: Series::Float(values),
            }],
            time_repr: None,
        }
    }

    /// Number of rows (length of the first column).
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Series> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.values)
    }

    /// Replace a column's values, or append a new column.
    pub fn set_column(&mut self, name: &str, values: Series) {
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(col) => col.values = values,
            None => self.columns.push(Column {
                name: name.to_string(),
                values,
            }),
        }
    }

    /// Label used for the index column in tables and exports.
    pub fn index_label(&self) -> &str {
        self.index_name.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn from_frequencies_names_the_column() {
        let ds = FrequencyDataset::from_frequencies(vec![1.0, 2.0]);
        assert_eq!(ds.column_names(), vec![FREQUENCY_COLUMN]);
        assert_eq!(ds.len(), 2);
        assert!(ds.time_repr.is_none());
        assert_eq!(ds.index_label(), "");
    }

    #[test]
    fn set_column_replaces_in_place() {
        let mut ds = FrequencyDataset::from_frequencies(vec![1.0]);
        ds.set_column(TIME_COLUMN, Series::Float(vec![0.5]));
        ds.set_column(TIME_COLUMN, Series::Float(vec![0.25]));
        assert_eq!(ds.column_names(), vec![FREQUENCY_COLUMN, TIME_COLUMN]);
        assert_eq!(ds.column(TIME_COLUMN), Some(&Series::Float(vec![0.25])));
    }

    #[test]
    fn numeric_classification() {
        assert!(Series::Float(vec![]).is_numeric());
        assert!(Series::Integer(vec![1]).is_numeric());
        assert!(!Series::Text(vec!["a".into()]).is_numeric());
        assert_eq!(
            Series::Integer(vec![2, 3]).as_f64_vec(),
            Some(vec![2.0, 3.0])
        );
        assert_eq!(Series::Text(vec![]).as_f64_vec(), None);
    }

    #[test]
    fn cell_rendering() {
        let dt = NaiveDate::from_ymd_opt(1997, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        assert_eq!(CellValue::Datetime(dt).render(10), "1997-01-01 08:00:00");
        assert_eq!(CellValue::Float(50449.0).render(10), "50449.0000000000");
        assert_eq!(CellValue::Integer(7).render(3), "7");
        assert_eq!(CellValue::Float(5.0).to_string(), "5.0");
    }
}
