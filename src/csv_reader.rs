// Table loading from uploaded bytes

use crate::data::Table;
use crate::error::{DashboardError, Result};
use std::path::Path;
use tracing::debug;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// How the uploaded bytes are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadFormat {
    /// Delimited text with a header row
    #[default]
    Csv,
    /// A JSON array of objects, one per row
    Json,
}

impl UploadFormat {
    /// `.json` files are records; everything else is read as CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => UploadFormat::Json,
            _ => UploadFormat::Csv,
        }
    }
}

pub fn load_upload(bytes: &[u8], format: UploadFormat) -> Result<Table> {
    match format {
        UploadFormat::Csv => load_table(bytes),
        UploadFormat::Json => load_json_records(bytes),
    }
}

/// Load an uploaded byte stream as a table. The first row is the header.
pub fn load_table(bytes: &[u8]) -> Result<Table> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.is_empty() {
        return Err(DashboardError::Parse("No columns to parse from file".to_string()));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    let table = Table::from_raw(headers, rows)?;
    debug!(columns = table.headers().len(), rows = table.len(), "loaded table");
    Ok(table)
}

/// Load a JSON array of objects. Keys of the first object become the headers.
pub fn load_json_records(bytes: &[u8]) -> Result<Table> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| DashboardError::Parse(format!("Invalid JSON records: {}", e)))?;

    let table = Table::from_json(&value)?;
    debug!(columns = table.headers().len(), rows = table.len(), "loaded JSON records");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ColumnType, Value};

    #[test]
    fn test_load_basic() {
        let table = load_table(b"sales_date,sales_amount\n2024-01-01,100\n2024-01-02,150\n").unwrap();
        assert_eq!(table.headers(), &["sales_date", "sales_amount"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_type("sales_date"), Some(ColumnType::Text));
        assert_eq!(table.rows()[1][1], Value::Number(150.0));
    }

    #[test]
    fn test_load_strips_bom() {
        let table = load_table(b"\xEF\xBB\xBFregion,sales_amount\nEast,5\n").unwrap();
        assert!(table.has_column("region"));
    }

    #[test]
    fn test_quoted_fields() {
        let table = load_table(b"product,sales_amount\n\"Widget, large\",3\n").unwrap();
        assert_eq!(table.rows()[0][0], Value::Text("Widget, large".to_string()));
    }

    #[test]
    fn test_header_only() {
        let table = load_table(b"product,sales_amount\n").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.headers().len(), 2);
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(matches!(load_table(b""), Err(DashboardError::Parse(_))));
    }

    #[test]
    fn test_inconsistent_widths_fail() {
        let result = load_table(b"a,b\n1,2\n3\n");
        assert!(matches!(result, Err(DashboardError::Parse(_))));
    }

    #[test]
    fn test_invalid_utf8_fails() {
        let result = load_table(b"a,b\n\xff\xfe,2\n");
        assert!(matches!(result, Err(DashboardError::Parse(_))));
    }

    #[test]
    fn test_round_trip() {
        let source = "region,product,sales_amount\nEast,Widget,10\nWest,Gadget,2.5\nNorth,,7\n";
        let table = load_table(source.as_bytes()).unwrap();
        let written = table.to_csv().unwrap();
        assert_eq!(written, source);
        assert_eq!(load_table(written.as_bytes()).unwrap(), table);
    }

    #[test]
    fn test_load_json_records() {
        let table = load_upload(
            br#"[{"product": "Widget", "sales_amount": 3}, {"product": "Gadget", "sales_amount": "NaN"}]"#,
            UploadFormat::Json,
        )
        .unwrap();
        assert_eq!(table.headers(), &["product", "sales_amount"]);
        assert_eq!(table.column_type("sales_amount"), Some(ColumnType::Numeric));
        assert_eq!(table.rows()[1][1], Value::Missing);
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let result = load_upload(b"[{\"a\": 1}", UploadFormat::Json);
        assert!(matches!(result, Err(DashboardError::Parse(_))));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(UploadFormat::from_path(Path::new("sales.json")), UploadFormat::Json);
        assert_eq!(UploadFormat::from_path(Path::new("SALES.JSON")), UploadFormat::Json);
        assert_eq!(UploadFormat::from_path(Path::new("sales.csv")), UploadFormat::Csv);
        assert_eq!(UploadFormat::from_path(Path::new("sales")), UploadFormat::Csv);
    }
}
