//! Order spreadsheet reader.

use std::path::Path;
use std::str::FromStr;

use calamine::{Data, Reader, open_workbook_auto};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::models::OligoOrderLine;

/// Header of the oligo name column.
pub const NAME_COLUMN: &str = "Oligo Name";
/// Header of the requested amount column.
pub const AMOUNT_COLUMN: &str = "Amount";
/// Header of the length column.
pub const LENGTH_COLUMN: &str = "mer";
/// Header of the 5' modification column.
pub const MOD5_COLUMN: &str = "5`Mod";
/// Header of the 3' modification column.
pub const MOD3_COLUMN: &str = "3`Mod";

/// Column positions of the fields the engine reads.
struct OrderColumns {
    name: usize,
    amount: usize,
    length: usize,
    mod5: usize,
    mod3: usize,
}

impl OrderColumns {
    fn locate(header: &[Data]) -> EngineResult<Self> {
        let find = |wanted: &str| {
            header
                .iter()
                .position(|cell| cell_text(cell).is_some_and(|h| h == wanted))
                .ok_or_else(|| EngineError::MalformedOrder {
                    row: 0,
                    message: format!("missing column '{wanted}'"),
                })
        };

        Ok(Self {
            name: find(NAME_COLUMN)?,
            amount: find(AMOUNT_COLUMN)?,
            length: find(LENGTH_COLUMN)?,
            mod5: find(MOD5_COLUMN)?,
            mod3: find(MOD3_COLUMN)?,
        })
    }
}

/// Reads the order lines from the first sheet of an `.xlsx` file.
///
/// The first row is the header; columns are found by name, so their order does
/// not matter. Blank rows are skipped.
///
/// # Errors
///
/// - `InputDiscovery` if the file cannot be opened or has no sheet.
/// - `MalformedOrder` for a missing column, a blank name, a non-numeric
///   amount, or a length that is not a positive integer.
pub fn read_order_sheet(path: &Path) -> EngineResult<Vec<OligoOrderLine>> {
    let path_label = path.display().to_string();

    let mut workbook = open_workbook_auto(path)
        .map_err(|e| EngineError::discovery(&path_label, format!("cannot open workbook: {e}")))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| EngineError::discovery(&path_label, "workbook has no sheets"))?
        .map_err(|e| EngineError::discovery(&path_label, format!("cannot read sheet: {e}")))?;

    let mut rows = range.rows();
    let header = rows.next().ok_or_else(|| EngineError::MalformedOrder {
        row: 0,
        message: "sheet is empty".to_string(),
    })?;
    let columns = OrderColumns::locate(header)?;

    let mut lines = Vec::new();
    for (row, cells) in rows.enumerate() {
        if cells.iter().all(|c| matches!(c, Data::Empty)) {
            debug!(row, "Skipping blank order row");
            continue;
        }
        lines.push(parse_row(row, cells, &columns)?);
    }

    info!(path = %path_label, lines = lines.len(), "Read order sheet");
    Ok(lines)
}

fn parse_row(row: usize, cells: &[Data], columns: &OrderColumns) -> EngineResult<OligoOrderLine> {
    let malformed = |message: String| EngineError::MalformedOrder { row, message };
    let cell = |i: usize| cells.get(i).unwrap_or(&Data::Empty);

    let name = cell_text(cell(columns.name))
        .filter(|n| !n.is_empty())
        .ok_or_else(|| malformed(format!("'{NAME_COLUMN}' is blank")))?;

    let amount = cell_decimal(cell(columns.amount)).ok_or_else(|| {
        malformed(format!(
            "'{AMOUNT_COLUMN}' of '{name}' is not a number: {:?}",
            cell(columns.amount)
        ))
    })?;

    let length = cell_positive_integer(cell(columns.length)).ok_or_else(|| {
        malformed(format!(
            "'{LENGTH_COLUMN}' of '{name}' is not a positive integer: {:?}",
            cell(columns.length)
        ))
    })?;

    let mod5 = cell_text(cell(columns.mod5)).unwrap_or_default();
    let mod3 = cell_text(cell(columns.mod3)).unwrap_or_default();

    Ok(OligoOrderLine::new(name, amount, length, &mod5, &mod3))
}

/// Text content of a cell, trimmed. Whole floats print without a fraction.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => Some(s.trim().to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", *f as i64)),
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numeric value of a cell. Floats go through their shortest decimal form so
/// that a stored `0.2` becomes exactly `0.2`.
fn cell_decimal(cell: &Data) -> Option<Decimal> {
    match cell {
        Data::Int(i) => Some(Decimal::from(*i)),
        Data::Float(f) if f.is_finite() => Decimal::from_str(&f.to_string()).ok(),
        Data::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

fn cell_positive_integer(cell: &Data) -> Option<u32> {
    let value = cell_decimal(cell)?;
    if value.fract() != Decimal::ZERO || value <= Decimal::ZERO {
        return None;
    }
    value.to_u32()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use tempfile::tempdir;

    enum Cell<'a> {
        Text(&'a str),
        Number(f64),
        Blank,
    }

    fn write_sheet(path: &Path, header: &[&str], rows: &[Vec<Cell>]) {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (c, h) in header.iter().enumerate() {
            sheet.write_string(0, c as u16, *h).unwrap();
        }
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32 + 1, c as u16);
                match cell {
                    Cell::Text(s) => {
                        sheet.write_string(r, c, *s).unwrap();
                    }
                    Cell::Number(n) => {
                        sheet.write_number(r, c, *n).unwrap();
                    }
                    Cell::Blank => {}
                }
            }
        }
        workbook.save(path).unwrap();
    }

    const HEADER: [&str; 5] = ["Oligo Name", "Amount", "mer", "5`Mod", "3`Mod"];

    #[test]
    fn test_reads_lines_with_numeric_cells() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("order.xlsx");
        write_sheet(
            &path,
            &HEADER,
            &[
                vec![
                    Cell::Text("P1"),
                    Cell::Number(1.0),
                    Cell::Number(20.0),
                    Cell::Text(" FAM "),
                    Cell::Text("BHQ1"),
                ],
                vec![
                    Cell::Text("P2"),
                    Cell::Number(0.2),
                    Cell::Number(18.0),
                    Cell::Blank,
                    Cell::Blank,
                ],
            ],
        );

        let lines = read_order_sheet(&path).unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].name, "P1");
        assert_eq!(lines[0].amount, Decimal::ONE);
        assert_eq!(lines[0].length, 20);
        assert_eq!(lines[0].mod5, "FAM");
        assert_eq!(lines[0].mod3, "BHQ1");
        assert_eq!(lines[1].amount, Decimal::new(2, 1));
        assert!(lines[1].is_unmodified());
    }

    #[test]
    fn test_columns_are_found_by_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("order.xlsx");
        write_sheet(
            &path,
            &["mer", "3`Mod", "Oligo Name", "5`Mod", "Amount"],
            &[vec![
                Cell::Number(25.0),
                Cell::Text("BHQ2"),
                Cell::Text("probe"),
                Cell::Text("CY5"),
                Cell::Text("0.2"),
            ]],
        );

        let lines = read_order_sheet(&path).unwrap();
        assert_eq!(lines[0].name, "probe");
        assert_eq!(lines[0].length, 25);
        assert_eq!(lines[0].mod5, "CY5");
        assert_eq!(lines[0].amount, Decimal::new(2, 1));
    }

    #[test]
    fn test_missing_column_is_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("order.xlsx");
        write_sheet(&path, &["Oligo Name", "Amount", "mer", "5`Mod"], &[]);

        match read_order_sheet(&path) {
            Err(EngineError::MalformedOrder { message, .. }) => {
                assert!(message.contains("3`Mod"));
            }
            other => panic!("Expected MalformedOrder, got {:?}", other),
        }
    }

    #[test]
    fn test_fractional_length_is_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("order.xlsx");
        write_sheet(
            &path,
            &HEADER,
            &[vec![
                Cell::Text("P1"),
                Cell::Number(1.0),
                Cell::Number(20.5),
                Cell::Blank,
                Cell::Blank,
            ]],
        );

        match read_order_sheet(&path) {
            Err(EngineError::MalformedOrder { row, message }) => {
                assert_eq!(row, 0);
                assert!(message.contains("mer"));
            }
            other => panic!("Expected MalformedOrder, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_amount_is_kept_for_the_engine() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("order.xlsx");
        write_sheet(
            &path,
            &HEADER,
            &[vec![
                Cell::Text("P1"),
                Cell::Number(1.5),
                Cell::Number(20.0),
                Cell::Blank,
                Cell::Blank,
            ]],
        );

        let lines = read_order_sheet(&path).unwrap();
        assert_eq!(lines[0].amount, Decimal::new(15, 1));
    }

    #[test]
    fn test_unreadable_file_is_discovery_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("order.xlsx");
        std::fs::write(&path, b"not a zip").unwrap();

        assert!(matches!(
            read_order_sheet(&path),
            Err(EngineError::InputDiscovery { .. })
        ));
    }
}
