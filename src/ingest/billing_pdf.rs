//! Billing table extraction from the supplier's shipment PDF.
//!
//! The document is converted with `pdftotext -layout`, which keeps the visual
//! column layout as runs of spaces. A table is a block of consecutive lines
//! that each hold at least two cells, where cells are separated by two or more
//! spaces. The first line of a block is its header. Each body cell belongs to
//! the header it overlaps most; a cell that overlaps no header goes to the
//! nearest one. Left-aligned, centered and right-aligned headers all keep
//! their cells, and blank cells stay blank instead of shifting the row left.

use std::path::Path;
use std::process::Command;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::models::RawTable;

/// A cell: words separated by at most one space.
static CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+(?: \S+)*").expect("cell pattern is valid"));

/// Extracts the `table_index`-th table (zero-based) from a billing PDF.
///
/// # Errors
///
/// `InputDiscovery` if `pdftotext` is not installed, fails, or the document
/// holds fewer than `table_index + 1` tables.
pub fn extract_billing_table(path: &Path, table_index: usize) -> EngineResult<RawTable> {
    let text = run_pdftotext(path)?;
    let tables = split_tables(&text);

    debug!(path = %path.display(), tables = tables.len(), "Detected tables in billing document");

    let count = tables.len();
    let table = tables.into_iter().nth(table_index).ok_or_else(|| {
        EngineError::discovery(
            path.display().to_string(),
            format!("expected at least {} tables, found {count}", table_index + 1),
        )
    })?;

    info!(
        path = %path.display(),
        table_index,
        columns = table.header.len(),
        rows = table.rows.len(),
        "Extracted billing table"
    );
    Ok(table)
}

/// Runs `pdftotext -layout <file> -` and returns its stdout.
fn run_pdftotext(path: &Path) -> EngineResult<String> {
    let label = path.display().to_string();

    which::which("pdftotext").map_err(|_| {
        EngineError::discovery(&label, "pdftotext not installed (poppler-utils)")
    })?;

    let output = Command::new("pdftotext")
        .arg("-layout")
        .arg(path)
        .arg("-")
        .output()
        .map_err(|e| EngineError::discovery(&label, format!("failed to run pdftotext: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(EngineError::discovery(
            &label,
            format!(
                "pdftotext failed (exit {}): {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            ),
        ));
    }

    let text = String::from_utf8_lossy(&output.stdout).into_owned();
    if text.trim().is_empty() {
        return Err(EngineError::discovery(
            &label,
            "no text layer; scanned documents are not supported",
        ));
    }
    Ok(text)
}

/// A cell with its character span on the line.
#[derive(Debug)]
struct Span {
    start: usize,
    end: usize,
    text: String,
}

fn line_cells(line: &str) -> Vec<Span> {
    CELL.find_iter(line)
        .map(|m| {
            let start = line[..m.start()].chars().count();
            let text = m.as_str().to_string();
            Span {
                start,
                end: start + text.chars().count(),
                text,
            }
        })
        .collect()
}

/// Splits layout text into tables, in document order.
///
/// # Example
///
/// ```
/// use oligo_billing::ingest::split_tables;
///
/// let text = "\
/// 품명            단가      공급가액
/// 5`FAM-3`BHQ1    30,000    30,000
///
/// Page 1 of 1
/// ";
/// let tables = split_tables(text);
/// assert_eq!(tables.len(), 1);
/// assert_eq!(tables[0].header, vec!["품명", "단가", "공급가액"]);
/// assert_eq!(tables[0].rows[0][0], "5`FAM-3`BHQ1");
/// ```
pub fn split_tables(text: &str) -> Vec<RawTable> {
    let mut tables = Vec::new();
    let mut block: Vec<Vec<Span>> = Vec::new();

    for line in text.lines() {
        let line = line.replace('\u{c}', "");
        let cells = line_cells(&line);
        if cells.len() >= 2 {
            block.push(cells);
        } else {
            flush_block(&mut block, &mut tables);
        }
    }
    flush_block(&mut block, &mut tables);

    tables
}

fn flush_block(block: &mut Vec<Vec<Span>>, tables: &mut Vec<RawTable>) {
    let mut lines = std::mem::take(block).into_iter();
    let Some(header) = lines.next() else {
        return;
    };
    let rows: Vec<Vec<String>> = lines.map(|cells| align_row(&header, cells)).collect();
    if rows.is_empty() {
        return;
    }

    tables.push(RawTable {
        header: header.into_iter().map(|s| s.text).collect(),
        rows,
    });
}

/// Places each body cell under its header column. Cells that land on an
/// already filled column are joined to it with a space.
fn align_row(header: &[Span], cells: Vec<Span>) -> Vec<String> {
    let mut row = vec![String::new(); header.len()];
    for cell in cells {
        let col = header_for(header, &cell);
        if row[col].is_empty() {
            row[col] = cell.text;
        } else {
            row[col].push(' ');
            row[col].push_str(&cell.text);
        }
    }
    row
}

/// Index of the header with the widest overlap, else the smallest gap.
/// Ties go to the left-most header.
fn header_for(header: &[Span], cell: &Span) -> usize {
    header
        .iter()
        .enumerate()
        .min_by_key(|(_, h)| {
            let overlap = cell.end.min(h.end).saturating_sub(cell.start.max(h.start));
            if overlap > 0 {
                (0, usize::MAX - overlap)
            } else {
                let gap = h.start.saturating_sub(cell.end) + cell.start.saturating_sub(h.end);
                (1, gap)
            }
        })
        .map_or(0, |(i, _)| i)
}
