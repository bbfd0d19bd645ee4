//! Turns raw pricing-table descriptors into canonical [`Table`]s.
//!
//! Each descriptor carries a `layout` literal of the shape
//! `{'rows': [{'cells': [...]}, ...]}`. The first row becomes the header,
//! the rest become data rows, and the price info cell of every data row is
//! decoded from its JSON-string form when needed. Failures are confined to
//! the table (skipped) or the cell (left raw); a run never aborts on bad
//! input.

pub mod literal;

use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{Cell, RawTable, Table, PRICE_COLUMN};
use literal::{parse_literal, LiteralError};

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("table {index} has no layout attribute")]
    MissingLayout { index: usize },

    #[error("table {index} layout could not be parsed: {source}")]
    Literal {
        index: usize,
        #[source]
        source: LiteralError,
    },

    #[error("table {index} layout has no header row")]
    MissingRows { index: usize },

    #[error("price cell is not region pricing data: {0}")]
    PriceCell(String),
}

/// Outcome of a normalization run
#[derive(Debug, Default)]
pub struct NormalizeReport {
    /// Tables that were normalized, in source order
    pub tables: Vec<Table>,
    /// Descriptors that were skipped, with the reason
    pub skipped: Vec<NormalizeError>,
    /// Rows whose price cell was left undecoded
    pub cell_errors: usize,
}

/// Normalize every descriptor, skipping the ones that cannot be parsed.
pub fn normalize_tables(raw_tables: &[RawTable]) -> NormalizeReport {
    let mut report = NormalizeReport::default();

    for (index, raw) in raw_tables.iter().enumerate() {
        // Operators count tables from 1
        match normalize_table(index + 1, raw) {
            Ok((table, cell_errors)) => {
                debug!(
                    table = index + 1,
                    columns = table.header.len(),
                    rows = table.rows.len(),
                    "Normalized table"
                );
                report.cell_errors += cell_errors;
                report.tables.push(table);
            }
            Err(e) => {
                warn!("Skipping table: {}", e);
                report.skipped.push(e);
            }
        }
    }

    report
}

fn normalize_table(index: usize, raw: &RawTable) -> Result<(Table, usize), NormalizeError> {
    let layout = raw
        .layout
        .as_deref()
        .ok_or(NormalizeError::MissingLayout { index })?;

    let layout = parse_literal(layout).map_err(|source| NormalizeError::Literal { index, source })?;

    let mut rows = layout
        .get("rows")
        .and_then(Value::as_array)
        .map(|rows| rows.iter().map(row_cells))
        .ok_or(NormalizeError::MissingRows { index })?;

    let header = rows
        .next()
        .ok_or(NormalizeError::MissingRows { index })?
        .iter()
        .map(header_text)
        .collect();

    let mut cell_errors = 0;
    let rows = rows
        .map(|mut cells| {
            if let Err(e) = normalize_price_cell(&mut cells) {
                warn!(table = index, "Error parsing price_by_region: {}", e);
                cell_errors += 1;
            }
            cells
        })
        .collect();

    Ok((Table { header, rows }, cell_errors))
}

fn row_cells(row: &Value) -> Vec<Value> {
    row.get("cells")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn header_text(cell: &Value) -> String {
    Cell::new(cell).text().unwrap_or_else(|| cell.to_string())
}

/// Decode the price info cell of a data row in place.
///
/// Objects are already canonical and are left untouched. Strings are parsed
/// as JSON and must yield an object; on failure the cell keeps its raw value.
pub fn normalize_price_cell(cells: &mut [Value]) -> Result<(), NormalizeError> {
    let Some(cell) = cells.get_mut(PRICE_COLUMN) else {
        return Ok(());
    };

    if let Value::String(raw) = cell {
        let decoded = decode_price_info(raw)?;
        *cell = Value::Object(decoded);
    }

    Ok(())
}

fn decode_price_info(raw: &str) -> Result<Map<String, Value>, NormalizeError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(obj)) => Ok(obj),
        Ok(_) => Err(NormalizeError::PriceCell(raw.to_string())),
        Err(e) => Err(NormalizeError::PriceCell(format!("{}: {}", raw, e))),
    }
}

/// Read upstream descriptors from a JSON array file
pub fn read_raw_tables(path: &Path) -> anyhow::Result<Vec<RawTable>> {
    let content = std::fs::read_to_string(path)?;
    let tables = serde_json::from_str(&content)?;
    Ok(tables)
}

/// Write the canonical dataset as pretty-printed JSON
pub fn write_dataset(path: &Path, tables: &[Table]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(tables)?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), tables = tables.len(), "Wrote pricing dataset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const LAYOUT: &str = r#"{'rows': [
        {'cells': ['Machine type', 'CPUs', 'Memory', 'Price']},
        {'cells': ['n2-standard-4', '4', '16GB', '{"priceByRegion": {"useast1": 0.2}}']},
        {'cells': ['n2-standard-8', '8', '32GB', {'priceByRegion': {'useast1': 0.4}}]},
    ]}"#;

    #[test]
    fn test_header_and_rows() {
        let report = normalize_tables(&[RawTable::new(LAYOUT)]);
        assert!(report.skipped.is_empty());
        assert_eq!(report.tables.len(), 1);

        let table = &report.tables[0];
        assert_eq!(table.header, vec!["Machine type", "CPUs", "Memory", "Price"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][3], json!({"priceByRegion": {"useast1": 0.2}}));
        assert_eq!(table.rows[1][3], json!({"priceByRegion": {"useast1": 0.4}}));
    }

    #[test]
    fn test_native_object_is_left_unchanged() {
        let original = json!({"priceByRegion": {"useast1": 0.2, "europewest1": 0.25}});
        let mut cells = vec![json!("n2"), json!("4"), json!("16GB"), original.clone()];

        normalize_price_cell(&mut cells).unwrap();
        assert_eq!(cells[3], original);

        normalize_price_cell(&mut cells).unwrap();
        assert_eq!(cells[3], original);
    }

    #[test]
    fn test_string_and_native_cells_converge() {
        let native = json!({"priceByRegion": {"useast1": 0.2}});
        let mut from_string = vec![json!("n2"), json!("4"), json!("16GB"), json!(native.to_string())];
        let mut from_native = vec![json!("n2"), json!("4"), json!("16GB"), native];

        normalize_price_cell(&mut from_string).unwrap();
        normalize_price_cell(&mut from_native).unwrap();
        assert_eq!(from_string, from_native);
    }

    #[test]
    fn test_undecodable_price_cell_keeps_row() {
        let layout = r#"{'rows': [
            {'cells': ['Machine type', 'CPUs', 'Memory', 'Price']},
            {'cells': ['n2-standard-4', '4', '16GB', 'not json']},
            {'cells': ['n2-standard-8', '8', '32GB', '0.4']},
        ]}"#;

        let report = normalize_tables(&[RawTable::new(layout)]);
        assert_eq!(report.cell_errors, 2);

        let table = &report.tables[0];
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][3], json!("not json"));
        assert_eq!(table.rows[1][3], json!("0.4"));
    }

    #[test]
    fn test_short_rows_are_kept() {
        let layout = "{'rows': [{'cells': ['Note']}, {'cells': ['Prices exclude tax']}, {}]}";
        let report = normalize_tables(&[RawTable::new(layout)]);

        let table = &report.tables[0];
        assert_eq!(table.header, vec!["Note"]);
        assert_eq!(table.rows, vec![vec![json!("Prices exclude tax")], vec![]]);
    }

    #[test]
    fn test_wrapped_header_cells() {
        let layout = "{'rows': [{'cells': [{'value': 'Machine type'}, 'CPUs']}]}";
        let report = normalize_tables(&[RawTable::new(layout)]);
        assert_eq!(report.tables[0].header, vec!["Machine type", "CPUs"]);
        assert!(report.tables[0].is_machine_type_table());
    }

    #[test]
    fn test_bad_tables_are_skipped() {
        let raw = vec![
            RawTable::new(LAYOUT),
            RawTable::new("{'rows': [ {'cells': "),
            RawTable::default(),
            RawTable::new("{'rows': []}"),
            RawTable::new(LAYOUT),
        ];

        let report = normalize_tables(&raw);
        assert_eq!(report.tables.len(), 2);
        assert_eq!(report.skipped.len(), 3);
        assert!(matches!(report.skipped[0], NormalizeError::Literal { index: 2, .. }));
        assert!(matches!(report.skipped[1], NormalizeError::MissingLayout { index: 3 }));
        assert!(matches!(report.skipped[2], NormalizeError::MissingRows { index: 4 }));
    }

    #[test]
    fn test_deeply_nested_layout_is_skipped() {
        let depth = 500;
        let deep = format!("{{'rows': [{}{}]}}", "[".repeat(depth), "]".repeat(depth));
        let raw = vec![RawTable::new(deep), RawTable::new("{'rows': [{'cells': ['A']}]}")];

        let report = normalize_tables(&raw);
        assert_eq!(report.tables.len(), 1);
        assert_eq!(report.tables[0].header, vec!["A"]);
        assert!(matches!(report.skipped[..], [NormalizeError::Literal { index: 1, .. }]));
    }

    #[test]
    fn test_footnote_with_backslash_keeps_table() {
        let layout = r#"{'rows': [
            {'cells': ['Machine type', 'CPUs', 'Memory', 'Price']},
            {'cells': ['n2-standard-4', '4', '16GB', '{"priceByRegion": {"useast1": 0.2}}']},
            {'cells': ['Footnote: C:\d path']},
        ]}"#;

        let report = normalize_tables(&[RawTable::new(layout)]);
        assert!(report.skipped.is_empty());
        assert_eq!(report.tables[0].rows[1], vec![json!(r"Footnote: C:\d path")]);
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("structured_pricing_data.json");

        let report = normalize_tables(&[RawTable::new(LAYOUT)]);
        write_dataset(&path, &report.tables).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let tables: Vec<Table> = serde_json::from_str(&content).unwrap();
        assert_eq!(tables, report.tables);
    }
}
