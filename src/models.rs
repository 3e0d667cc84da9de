use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Which mission's dataset the uploaded CSV belongs to. The prediction
/// API selects its model from this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetCategory {
    Kepler,
    K2,
    Tess,
}

impl DatasetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetCategory::Kepler => "kepler",
            DatasetCategory::K2 => "k2",
            DatasetCategory::Tess => "tess",
        }
    }
}

impl fmt::Display for DatasetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetCategory {
    type Err = ();

    /// Case-insensitive: the form field arrives in whatever case the
    /// browser sent it.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kepler" => Ok(DatasetCategory::Kepler),
            "k2" => Ok(DatasetCategory::K2),
            "tess" => Ok(DatasetCategory::Tess),
            _ => Err(()),
        }
    }
}

/// A single CSV cell with its inferred scalar type.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    /// Convert to a JSON value. This is the sanitization boundary:
    /// `Number::from_f64` returns `None` for NaN and ±Inf, so non-finite
    /// floats become JSON null and can never reach the wire.
    pub fn into_json(self) -> Value {
        match self {
            Cell::Null => Value::Null,
            Cell::Bool(b) => Value::Bool(b),
            Cell::Int(i) => Value::from(i),
            Cell::Float(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
            Cell::Text(s) => Value::String(s),
        }
    }
}

/// One named CSV column, cells in source row order.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

/// Parsed CSV contents, columns in source order. Request-scoped: built
/// from the upload, consumed by `Payload::from_table`, then dropped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<Column>,
}

impl Table {
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.cells.len())
    }
}

/// Request body for the prediction API: the dataset tag plus one JSON
/// array per column (column-oriented, not transposed to rows).
#[derive(Debug, Clone, Serialize)]
pub struct Payload {
    pub dataset_type: DatasetCategory,
    pub data: Map<String, Value>,
}

impl Payload {
    /// Build the API payload from a parsed table. Pure and infallible;
    /// duplicate column names keep the last occurrence.
    pub fn from_table(table: Table, dataset_type: DatasetCategory) -> Self {
        let mut data = Map::new();
        for column in table.columns {
            let cells: Vec<Value> = column.cells.into_iter().map(Cell::into_json).collect();
            data.insert(column.name, Value::Array(cells));
        }
        Payload { dataset_type, data }
    }
}

/// JSON error envelope returned for every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        ErrorBody {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        ErrorBody {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}
