//! Sweep orchestration: classify, revoke, mutate.
//!
//! Strictly sequential. Classification and mutation errors abort the run;
//! revocation failures are contained per file inside `revoke_access`. No
//! phase is retried and nothing already applied is rolled back.

use crate::config::SweepConfig;
use crate::error::SweepError;
use crate::google_api::drive::{DriveService, GoogleDriveClient};
use crate::google_api::sheets::{GoogleSheetsClient, SheetsService};
use crate::mutate::{append_moves, apply_edits, BatchOutcome};
use crate::revoke::{revoke_access, RevocationReport};
use crate::roster::{classify_grid, QualificationRule, RosterColumns};

/// Current phase of a sweep run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepPhase {
    Classify,
    Revoke,
    Mutate,
    Done,
}

impl std::fmt::Display for SweepPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SweepPhase::Classify => write!(f, "Classifying rows"),
            SweepPhase::Revoke => write!(f, "Revoking access"),
            SweepPhase::Mutate => write!(f, "Updating spreadsheet"),
            SweepPhase::Done => write!(f, "Done"),
        }
    }
}

/// Outcome of a completed sweep.
#[derive(Debug, Clone)]
pub struct SweepSummary {
    pub rows_scanned: usize,
    pub qualified: usize,
    pub not_qualified: usize,
    pub skipped: usize,
    pub revocations: Vec<RevocationReport>,
    /// `(source_row, destination_row)` for every relocated row.
    pub moves: Vec<(usize, usize)>,
    pub batch: BatchOutcome,
}

impl SweepSummary {
    pub fn files_failed(&self) -> usize {
        self.revocations.iter().map(RevocationReport::failed).sum()
    }
}

/// One sweep run against a roster spreadsheet.
pub struct Sweep<'a> {
    config: &'a SweepConfig,
    sheets: &'a dyn SheetsService,
    drive: &'a dyn DriveService,
    rule: QualificationRule,
}

impl<'a> Sweep<'a> {
    /// Cutoff is taken from the local clock at construction.
    pub fn new(
        config: &'a SweepConfig,
        sheets: &'a dyn SheetsService,
        drive: &'a dyn DriveService,
    ) -> Self {
        Self {
            config,
            sheets,
            drive,
            rule: QualificationRule::from_lookback(config.lookback_days),
        }
    }

    pub fn with_rule(mut self, rule: QualificationRule) -> Self {
        self.rule = rule;
        self
    }

    fn enter(&self, phase: SweepPhase) {
        log::info!("[{}] {}", self.config.spreadsheet_id, phase);
    }

    pub async fn run(&self) -> Result<SweepSummary, SweepError> {
        let config = self.config;
        if config.simulate {
            log::info!("Simulate-only mode: no permissions or cells will change");
        }

        self.enter(SweepPhase::Classify);
        let grid = self.sheets.get_grid(&config.spreadsheet_id).await?;
        let classification = classify_grid(&grid, &RosterColumns::from(config), &self.rule)?;

        self.enter(SweepPhase::Revoke);
        let mut revocations = Vec::with_capacity(classification.qualified.len());
        let mut confirmed_rows = Vec::with_capacity(classification.qualified.len());
        for worker in &classification.qualified {
            log::info!("Removing access for: {}", worker.email);
            let report =
                revoke_access(self.drive, &worker.email, &config.file_ids, config.simulate).await;
            if report.failed() > 0 {
                log::warn!(
                    "{} of {} files failed for {}",
                    report.failed(),
                    report.files.len(),
                    worker.email
                );
            }
            revocations.push(report);
            confirmed_rows.push(worker.row_index);
        }

        self.enter(SweepPhase::Mutate);
        let mut edits = classification.edits.clone();
        let moves = append_moves(&mut edits, &confirmed_rows, config.start_row, config.column_span);
        let batch = apply_edits(
            self.sheets,
            &config.spreadsheet_id,
            grid.sheet_id,
            &edits,
            config.simulate,
        )
        .await?;

        self.enter(SweepPhase::Done);
        let summary = SweepSummary {
            rows_scanned: grid.rows.len().saturating_sub(1),
            qualified: classification.qualified.len(),
            not_qualified: classification.not_qualified.len(),
            skipped: classification.skipped.len(),
            revocations,
            moves,
            batch,
        };
        log::info!(
            "Sweep complete: {} qualified, {} moved, {} file failures",
            summary.qualified,
            summary.moves.len(),
            summary.files_failed()
        );
        Ok(summary)
    }
}

/// Authorize from the configured token file and run a sweep against Google.
pub async fn run_sweep(config: &SweepConfig) -> Result<SweepSummary, SweepError> {
    let token_path = config.resolved_token_path();
    let access_token = crate::google_api::get_valid_access_token(&token_path).await?;

    let sheets = GoogleSheetsClient::new(access_token.clone());
    let drive = GoogleDriveClient::new(access_token);

    Sweep::new(config, &sheets, &drive).run().await
}
