//! Spreadsheet output for the billing statement.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tracing::info;

use crate::error::{EngineError, EngineResult};

use super::emitter::{STATEMENT_HEADERS, StatementRow};

/// Writes the statement rows to a single-sheet `.xlsx` file at `path`.
///
/// The header row is bold and columns are autofitted. Grouped amounts are
/// written as text, the review columns as numbers. An existing file is
/// overwritten.
pub fn write_statement(rows: &[StatementRow], path: &Path) -> EngineResult<()> {
    let to_error = |e: XlsxError| EngineError::StatementWrite {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    fill_sheet(worksheet, rows).map_err(to_error)?;
    workbook.save(path).map_err(to_error)?;

    info!(path = %path.display(), rows = rows.len(), "Wrote billing statement");
    Ok(())
}

fn fill_sheet(worksheet: &mut Worksheet, rows: &[StatementRow]) -> Result<(), XlsxError> {
    let header_format = Format::new().set_bold();

    for (col, header) in STATEMENT_HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        worksheet.write_string(r, 0, &row.item_name)?;
        worksheet.write_string(r, 1, &row.spec)?;
        worksheet.write_number(r, 2, f64::from(row.quantity))?;
        worksheet.write_string(r, 3, &row.unit_price)?;
        worksheet.write_string(r, 4, &row.supply_amount)?;
        worksheet.write_string(r, 5, &row.tax)?;
        worksheet.write_string(r, 6, &row.remark)?;
        worksheet.write_number(r, 7, row.synthesis_unit_cost as f64)?;
        worksheet.write_number(r, 8, f64::from(row.length))?;
        worksheet.write_number(r, 9, row.synthesis_subtotal as f64)?;
        worksheet.write_number(r, 10, row.modification as f64)?;
        worksheet.write_number(r, 11, row.purification as f64)?;
    }

    worksheet.autofit();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Reader, open_workbook_auto};
    use tempfile::tempdir;

    fn sample_row() -> StatementRow {
        StatementRow {
            item_name: "P1".to_string(),
            spec: "1umole".to_string(),
            quantity: 1,
            unit_price: "20,800".to_string(),
            supply_amount: "20,800".to_string(),
            tax: "2,080".to_string(),
            remark: "2024-0915".to_string(),
            synthesis_unit_cost: 1000,
            length: 20,
            synthesis_subtotal: 20_000,
            modification: 300,
            purification: 500,
        }
    }

    #[test]
    fn test_statement_round_trips_through_reader() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("거래명세서-2024-0915.xlsx");

        write_statement(&[sample_row()], &path).unwrap();

        let mut workbook = open_workbook_auto(&path).unwrap();
        let sheet = workbook.sheet_names()[0].clone();
        let range = workbook.worksheet_range(&sheet).unwrap();

        assert_eq!(range.get_size(), (2, 12));
        assert_eq!(
            range.get_value((0, 0)),
            Some(&Data::String("품명".to_string()))
        );
        assert_eq!(
            range.get_value((0, 11)),
            Some(&Data::String("정제".to_string()))
        );
        assert_eq!(
            range.get_value((1, 3)),
            Some(&Data::String("20,800".to_string()))
        );
        assert_eq!(range.get_value((1, 9)), Some(&Data::Float(20_000.0)));
    }

    #[test]
    fn test_missing_parent_directory_is_statement_write_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.xlsx");

        match write_statement(&[sample_row()], &path) {
            Err(EngineError::StatementWrite { path: p, .. }) => {
                assert!(p.ends_with("out.xlsx"));
            }
            other => panic!("Expected StatementWrite, got {:?}", other),
        }
    }
}
