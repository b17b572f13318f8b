//! Row classification: one pass over the roster grid.
//!
//! Rows are visited from the bottom up. Each qualifying row contributes a red
//! highlight across the column span and a ticked checkbox in the flag column,
//! both addressed by the row's original index.

use crate::config::SweepConfig;
use crate::error::SweepError;
use crate::google_api::sheets::SheetGrid;
use crate::mutate::{PendingEdit, Rgb};

use super::qualify::{parse_sheet_date, QualificationRule};
use super::{cell_text, find_column, SkipReason, SkippedRow, WorkerRow};

/// Fixed column positions of the roster layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterColumns {
    pub hire_date: usize,
    pub last_paid: usize,
    pub flag: usize,
    /// Email search bound and minimum row width.
    pub span: usize,
}

impl From<&SweepConfig> for RosterColumns {
    fn from(config: &SweepConfig) -> Self {
        Self {
            hire_date: config.hire_date_column,
            last_paid: config.last_paid_column,
            flag: config.flag_column,
            span: config.column_span,
        }
    }
}

/// Result of classifying every data row of the grid.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Rows to revoke and relocate, in discovery (bottom-up) order.
    pub qualified: Vec<WorkerRow>,
    pub not_qualified: Vec<WorkerRow>,
    pub skipped: Vec<SkippedRow>,
    /// Highlight + checkbox edits for every qualified row.
    pub edits: Vec<PendingEdit>,
}

impl Classification {
    pub fn qualified_rows(&self) -> Vec<usize> {
        self.qualified.iter().map(|w| w.row_index).collect()
    }
}

/// Locate the email column by header text, bounded by the column span.
pub fn find_email_column(header: &[Option<String>], span: usize) -> Result<usize, SweepError> {
    find_column(header, |text| text.to_lowercase().contains("email"))
        .filter(|&idx| idx < span)
        .ok_or(SweepError::EmailColumnNotFound { span })
}

/// Classify every data row of `grid` against `rule`.
///
/// Fails before looking at any row if the header is missing or has no email
/// column inside the span.
pub fn classify_grid(
    grid: &SheetGrid,
    columns: &RosterColumns,
    rule: &QualificationRule,
) -> Result<Classification, SweepError> {
    let header = grid
        .rows
        .first()
        .ok_or_else(|| SweepError::EmptySheet(grid.title.clone()))?;
    let email_column = find_email_column(header, columns.span)?;

    log::info!(
        "Processing {} rows of '{}' (email column {}, cutoff {})",
        grid.rows.len().saturating_sub(1),
        grid.title,
        email_column,
        rule.cutoff().date()
    );

    let mut result = Classification::default();

    for (row_index, row) in grid.rows.iter().enumerate().skip(1).rev() {
        if row.len() < columns.span {
            log::debug!("Skipping row {} - insufficient columns", row_index);
            result.skipped.push(SkippedRow {
                row_index,
                reason: SkipReason::InsufficientColumns,
            });
            continue;
        }

        let Some(email) = cell_text(row, email_column) else {
            log::debug!("Skipping row {} - no email", row_index);
            result.skipped.push(SkippedRow {
                row_index,
                reason: SkipReason::MissingEmail,
            });
            continue;
        };

        let worker = WorkerRow {
            row_index,
            email: email.to_string(),
            last_paid: cell_text(row, columns.last_paid).and_then(parse_sheet_date),
            hire: cell_text(row, columns.hire_date).and_then(parse_sheet_date),
        };

        if rule.qualifies(worker.last_paid, worker.hire) {
            log::info!("Worker qualifies (access denied): {} (row {})", worker.email, row_index);
            result.edits.push(PendingEdit::FormatHighlight {
                row: row_index,
                start_column: 0,
                end_column: columns.span,
                color: Rgb::RED,
            });
            result.edits.push(PendingEdit::SetCheckbox {
                row: row_index,
                column: columns.flag,
                checked: true,
            });
            result.qualified.push(worker);
        } else {
            log::debug!("Worker does not qualify: {}", worker.email);
            result.not_qualified.push(worker);
        }
    }

    log::info!(
        "Classified: {} qualify, {} do not, {} skipped",
        result.qualified.len(),
        result.not_qualified.len(),
        result.skipped.len()
    );

    Ok(result)
}
