//! Error types for the oligo billing reconciliation engine.
//!
//! Every failure aborts the run. The only soft failure in the pipeline, a
//! mismatch between the expected and invoiced totals, is not an error at all and
//! is reported through [`crate::models::ReconciliationResult::matches`].

use thiserror::Error;

/// The main error type for the reconciliation engine.
///
/// # Example
///
/// ```
/// use oligo_billing::error::EngineError;
///
/// let error = EngineError::IndexOutOfRange { index: 5, len: 2 };
/// assert_eq!(
///     error.to_string(),
///     "Matcher returned index 5 but only 2 candidates were offered"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A required input file was missing, duplicated, or unreadable.
    #[error("Input discovery failed for '{path}': {message}")]
    InputDiscovery {
        /// The directory or file being inspected.
        path: String,
        /// What went wrong.
        message: String,
    },

    /// The order spreadsheet did not have the expected shape.
    #[error("Malformed order row {row}: {message}")]
    MalformedOrder {
        /// Zero-based data row index (header excluded).
        row: usize,
        /// A description of the problem.
        message: String,
    },

    /// The billing table is missing a column or holds an unparseable
    /// currency cell.
    #[error("Malformed catalog column '{column}': {message}")]
    MalformedCatalog {
        /// The column header involved.
        column: String,
        /// A description of the problem, including the row and raw cell text.
        message: String,
    },

    /// An exact catalog lookup matched zero or several rows.
    #[error("Expected exactly one catalog entry for '{label}', found {matches}")]
    AmbiguousCatalogEntry {
        /// The label that was looked up.
        label: String,
        /// How many rows matched.
        matches: usize,
    },

    /// An order line requested a synthesis scale other than 1 or 0.2 umole.
    #[error("Invalid quantity tier for oligo '{oligo}': {value}")]
    InvalidQuantityTier {
        /// The oligo name of the offending line.
        oligo: String,
        /// The requested amount.
        value: String,
    },

    /// The best-match service was unreachable or replied with something other
    /// than an integer.
    #[error("Matching service error: {message}")]
    MatchingService {
        /// A description of the failure.
        message: String,
    },

    /// The best-match service returned an index outside the candidate list.
    #[error("Matcher returned index {index} but only {len} candidates were offered")]
    IndexOutOfRange {
        /// The returned index.
        index: i64,
        /// Number of candidates.
        len: usize,
    },

    /// A required credential was not present in the environment.
    #[error("Missing credential: environment variable {var} is not set")]
    MissingCredential {
        /// The environment variable name.
        var: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The billing statement could not be written.
    #[error("Failed to write statement '{path}': {message}")]
    StatementWrite {
        /// The output path.
        path: String,
        /// A description of the failure.
        message: String,
    },
}

impl EngineError {
    pub(crate) fn matching(message: impl Into<String>) -> Self {
        Self::MatchingService {
            message: message.into(),
        }
    }

    pub(crate) fn discovery(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InputDiscovery {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
