//! Roster rows: column discovery, date qualification, and classification.

pub mod classify;
pub mod qualify;

use chrono::NaiveDate;

pub use classify::{classify_grid, Classification, RosterColumns};
pub use qualify::{parse_sheet_date, QualificationRule};

/// One worker's row, rebuilt from cell text on every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerRow {
    /// 0-based grid row, in the pre-move coordinate space.
    pub row_index: usize,
    pub email: String,
    pub last_paid: Option<NaiveDate>,
    pub hire: Option<NaiveDate>,
}

/// Why a row was passed over without classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    InsufficientColumns,
    MissingEmail,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::InsufficientColumns => write!(f, "insufficient columns"),
            SkipReason::MissingEmail => write!(f, "no email"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedRow {
    pub row_index: usize,
    pub reason: SkipReason,
}

/// First header index whose cell text satisfies `predicate`.
///
/// Empty cells are never offered to the predicate.
pub fn find_column<F>(header: &[Option<String>], predicate: F) -> Option<usize>
where
    F: Fn(&str) -> bool,
{
    header
        .iter()
        .position(|cell| cell.as_deref().is_some_and(|text| predicate(text)))
}

/// Trimmed, non-empty text of a cell.
pub(crate) fn cell_text(row: &[Option<String>], column: usize) -> Option<&str> {
    row.get(column)
        .and_then(|cell| cell.as_deref())
        .map(str::trim)
        .filter(|text| !text.is_empty())
}
