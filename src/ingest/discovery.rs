//! Order directory discovery.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};

/// The input files found in one order directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderInputs {
    /// The order identifier, taken from the directory's base name.
    pub order_id: String,
    /// The order directory itself.
    pub order_dir: PathBuf,
    /// The customer's order spreadsheet.
    pub order_sheet: PathBuf,
    /// The supplier's billing document.
    pub billing_pdf: PathBuf,
}

/// Scans `order_dir` recursively for the order spreadsheet and billing PDF.
///
/// Exactly one `.xlsx` and exactly one `.pdf` must be present. Files named
/// `statement_file_name` (the statement this tool writes) and spreadsheet lock
/// files (`~$...`) are ignored.
///
/// # Errors
///
/// `InputDiscovery` if the directory does not exist, cannot be read, or holds
/// zero or several files of either kind.
pub fn discover_inputs(order_dir: &Path, statement_file_name: &str) -> EngineResult<OrderInputs> {
    let dir_label = order_dir.display().to_string();

    if !order_dir.is_dir() {
        return Err(EngineError::discovery(&dir_label, "order directory not found"));
    }

    let order_id = order_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| EngineError::discovery(&dir_label, "cannot derive an order id"))?;

    let mut sheets = Vec::new();
    let mut pdfs = Vec::new();
    collect_files(order_dir, statement_file_name, &mut sheets, &mut pdfs)?;

    let order_sheet = exactly_one(sheets, "xlsx", &dir_label)?;
    let billing_pdf = exactly_one(pdfs, "pdf", &dir_label)?;

    info!(
        order_id = %order_id,
        order_sheet = %order_sheet.display(),
        billing_pdf = %billing_pdf.display(),
        "Discovered order inputs"
    );

    Ok(OrderInputs {
        order_id,
        order_dir: order_dir.to_path_buf(),
        order_sheet,
        billing_pdf,
    })
}

fn collect_files(
    dir: &Path,
    statement_file_name: &str,
    sheets: &mut Vec<PathBuf>,
    pdfs: &mut Vec<PathBuf>,
) -> EngineResult<()> {
    let entries = fs::read_dir(dir)
        .map_err(|e| EngineError::discovery(dir.display().to_string(), e.to_string()))?;

    for entry in entries {
        let path = entry
            .map_err(|e| EngineError::discovery(dir.display().to_string(), e.to_string()))?
            .path();

        if path.is_dir() {
            collect_files(&path, statement_file_name, sheets, pdfs)?;
            continue;
        }

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name == statement_file_name || name.starts_with("~$") {
            debug!(path = %path.display(), "Skipping generated or lock file");
            continue;
        }

        if has_extension(&path, "xlsx") {
            sheets.push(path);
        } else if has_extension(&path, "pdf") {
            pdfs.push(path);
        }
    }

    Ok(())
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn exactly_one(mut found: Vec<PathBuf>, kind: &str, dir_label: &str) -> EngineResult<PathBuf> {
    match found.len() {
        1 => Ok(found.remove(0)),
        0 => Err(EngineError::discovery(
            dir_label,
            format!("no .{kind} file found"),
        )),
        n => Err(EngineError::discovery(
            dir_label,
            format!("expected one .{kind} file, found {n}"),
        )),
    }
}
