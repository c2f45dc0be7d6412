use crate::error::{DashboardError, Result};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::fmt;

/// Cell markers treated as missing when loading text data.
const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "-NaN", "nan", "-nan", "null", "NULL", "None", "<NA>", "#N/A",
];

/// A single table cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Missing,
    Number(f64),
    Text(String),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => Ok(()),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Text,
}

/// In-memory table with named, typed columns.
///
/// Every row has exactly `headers.len()` cells, in header order. The table is
/// never mutated after loading.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    types: Vec<ColumnType>,
    rows: Vec<Vec<Value>>,
}

/// The first few rows of a table, as shown above the charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub total_rows: usize,
}

impl Table {
    /// Build a table from raw text cells, inferring each column's type.
    ///
    /// A column is numeric only when every non-missing cell parses as a number.
    pub fn from_raw(headers: Vec<String>, raw_rows: Vec<Vec<String>>) -> Result<Self> {
        let width = headers.len();
        if let Some((idx, row)) = raw_rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(DashboardError::Parse(format!(
                "Row {} has {} fields, expected {}",
                idx + 1,
                row.len(),
                width
            )));
        }

        let headers = dedup_headers(headers);
        let types: Vec<ColumnType> = (0..width)
            .map(|col| infer_column_type(raw_rows.iter().map(|r| r[col].as_str())))
            .collect();

        let rows = raw_rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .zip(&types)
                    .map(|(cell, ty)| convert_cell(cell, *ty))
                    .collect()
            })
            .collect();

        Ok(Self { headers, types, rows })
    }

    /// Create a Table from a JSON Array of Objects
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        let array = value.as_array().ok_or_else(|| {
            DashboardError::Parse("Input data must be a JSON array of objects".to_string())
        })?;

        let Some(first) = array.first() else {
            return Err(DashboardError::Parse("Input data array is empty".to_string()));
        };

        let first_obj = first.as_object().ok_or_else(|| {
            DashboardError::Parse("Items in array must be objects".to_string())
        })?;
        let headers: Vec<String> = first_obj.keys().cloned().collect();

        let mut rows = Vec::with_capacity(array.len());
        for item in array {
            let obj = item.as_object().ok_or_else(|| {
                DashboardError::Parse("Items in array must be objects".to_string())
            })?;

            let mut row = Vec::with_capacity(headers.len());
            for header in &headers {
                let cell = match obj.get(header) {
                    Some(JsonValue::String(s)) => s.clone(),
                    Some(JsonValue::Number(n)) => n.to_string(),
                    Some(JsonValue::Bool(b)) => b.to_string(),
                    Some(JsonValue::Null) | None => String::new(),
                    _ => {
                        return Err(DashboardError::Parse(format!(
                            "Unsupported value type for field '{}'",
                            header
                        )))
                    }
                };
                row.push(cell);
            }
            rows.push(row);
        }

        Self::from_raw(headers, rows)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Exact, case-sensitive column lookup.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.column_index(name).map(|idx| self.types[idx])
    }

    pub fn head(&self, n: usize) -> TablePreview {
        TablePreview {
            columns: self.headers.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
            total_rows: self.rows.len(),
        }
    }

    /// Serialize back to comma-separated text with a header row.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|v| v.to_string()))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| DashboardError::Parse(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| DashboardError::Parse(e.to_string()))
    }
}

/// A cell is missing when it is a known marker or any other spelling that
/// parses to NaN (`NAN`, `+nan`, ...).
pub fn is_missing_marker(cell: &str) -> bool {
    let cell = cell.trim();
    MISSING_MARKERS.contains(&cell) || cell.parse::<f64>().map_or(false, |n| n.is_nan())
}

fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|n| !n.is_nan())
}

fn infer_column_type<'a>(cells: impl Iterator<Item = &'a str>) -> ColumnType {
    let mut cells = cells.filter(|c| !is_missing_marker(c));
    if cells.all(|c| parse_number(c).is_some()) {
        ColumnType::Numeric
    } else {
        ColumnType::Text
    }
}

fn convert_cell(cell: String, ty: ColumnType) -> Value {
    if is_missing_marker(&cell) {
        return Value::Missing;
    }
    match ty {
        ColumnType::Numeric => parse_number(&cell).map_or(Value::Missing, Value::Number),
        ColumnType::Text => Value::Text(cell),
    }
}

/// Later duplicates of a header get `.1`, `.2`, ... appended.
fn dedup_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(headers.len());
    for header in headers {
        let mut name = header.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{}.{}", header, suffix);
            suffix += 1;
        }
        seen.insert(name.clone());
        out.push(name);
    }
    out
}
