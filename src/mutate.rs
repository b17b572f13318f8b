//! Spreadsheet mutation: pending edits and the single batch update.
//!
//! Every edit is addressed in the grid's pre-move coordinate space. Moves are
//! assigned from the highest source row down, so the first move lands at the
//! base destination row and later moves never disturb a row still waiting to
//! be cut.

use serde_json::{json, Value};

use crate::google_api::sheets::SheetsService;
use crate::google_api::GoogleApiError;

/// Background color, components in `0.0..=1.0` as the Sheets API expects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Rgb {
    pub const RED: Rgb = Rgb {
        red: 1.0,
        green: 0.0,
        blue: 0.0,
    };
}

/// One queued spreadsheet edit.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingEdit {
    /// Repaint the background of `[start_column, end_column)` on one row.
    FormatHighlight {
        row: usize,
        start_column: usize,
        end_column: usize,
        color: Rgb,
    },
    /// Write a boolean into one cell (renders as a checkbox).
    SetCheckbox {
        row: usize,
        column: usize,
        checked: bool,
    },
    /// Cut `[start_column, end_column)` of `source_row` and paste at column 0
    /// of `destination_row`.
    MoveRow {
        source_row: usize,
        start_column: usize,
        end_column: usize,
        destination_row: usize,
    },
}

impl PendingEdit {
    /// Sheets `batchUpdate` request object for this edit.
    pub fn to_request(&self, sheet_id: i64) -> Value {
        match *self {
            PendingEdit::FormatHighlight {
                row,
                start_column,
                end_column,
                color,
            } => json!({
                "repeatCell": {
                    "range": grid_range(sheet_id, row, start_column, end_column),
                    "cell": {
                        "userEnteredFormat": {
                            "backgroundColor": {
                                "red": color.red,
                                "green": color.green,
                                "blue": color.blue
                            }
                        }
                    },
                    "fields": "userEnteredFormat.backgroundColor"
                }
            }),
            PendingEdit::SetCheckbox {
                row,
                column,
                checked,
            } => json!({
                "updateCells": {
                    "range": grid_range(sheet_id, row, column, column + 1),
                    "rows": [{
                        "values": [{ "userEnteredValue": { "boolValue": checked } }]
                    }],
                    "fields": "userEnteredValue"
                }
            }),
            PendingEdit::MoveRow {
                source_row,
                start_column,
                end_column,
                destination_row,
            } => json!({
                "cutPaste": {
                    "source": grid_range(sheet_id, source_row, start_column, end_column),
                    "destination": {
                        "sheetId": sheet_id,
                        "rowIndex": destination_row,
                        "columnIndex": 0
                    },
                    "pasteType": "PASTE_NORMAL"
                }
            }),
        }
    }
}

fn grid_range(sheet_id: i64, row: usize, start_column: usize, end_column: usize) -> Value {
    json!({
        "sheetId": sheet_id,
        "startRowIndex": row,
        "endRowIndex": row + 1,
        "startColumnIndex": start_column,
        "endColumnIndex": end_column
    })
}

/// Pair each source row with its archive destination.
///
/// Sources are taken highest first; destinations count up from `start_row`.
pub fn assign_destinations(rows: &[usize], start_row: usize) -> Vec<(usize, usize)> {
    let mut sorted = rows.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted
        .into_iter()
        .enumerate()
        .map(|(offset, source)| (source, start_row + offset))
        .collect()
}

/// Append one `MoveRow` per confirmed row, returning the assignments made.
pub fn append_moves(
    edits: &mut Vec<PendingEdit>,
    rows: &[usize],
    start_row: usize,
    column_span: usize,
) -> Vec<(usize, usize)> {
    let assignments = assign_destinations(rows, start_row);
    edits.extend(
        assignments
            .iter()
            .map(|&(source_row, destination_row)| PendingEdit::MoveRow {
                source_row,
                start_column: 0,
                end_column: column_span,
                destination_row,
            }),
    );
    assignments
}

/// What happened to the edit batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// No edits were queued; no request was sent.
    Nothing,
    /// Simulate-only mode: edits were logged, not sent.
    Simulated(usize),
    /// All edits were sent as one batch update.
    Submitted(usize),
}

/// Submit every queued edit, in order, as one batch update.
pub async fn apply_edits(
    sheets: &dyn SheetsService,
    spreadsheet_id: &str,
    sheet_id: i64,
    edits: &[PendingEdit],
    simulate: bool,
) -> Result<BatchOutcome, GoogleApiError> {
    if edits.is_empty() {
        log::info!("No spreadsheet updates to apply");
        return Ok(BatchOutcome::Nothing);
    }

    let requests: Vec<Value> = edits.iter().map(|e| e.to_request(sheet_id)).collect();

    if simulate {
        for edit in edits {
            log::info!("Would apply: {:?}", edit);
        }
        log::info!("Simulate-only: skipped {} update requests", requests.len());
        return Ok(BatchOutcome::Simulated(requests.len()));
    }

    log::info!("Applying {} update requests...", requests.len());
    let count = requests.len();
    sheets.batch_update(spreadsheet_id, requests).await?;
    Ok(BatchOutcome::Submitted(count))
}
