//! Drive access revocation for one worker across the configured files.
//!
//! Best effort, per file: a failure on one file is logged and recorded, then
//! the next file is tried. Nothing here is retried and nothing here aborts
//! the run.

use crate::google_api::drive::DriveService;
use crate::google_api::GoogleApiError;

/// What happened on one file for one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Removed,
    /// Simulate-only mode found a grant it would have removed.
    WouldRemove,
    /// No grant for this worker on the file.
    NotShared,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRevocation {
    pub file_id: String,
    pub outcome: FileOutcome,
}

/// Per-file outcomes for one worker, in file-id order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevocationReport {
    pub email: String,
    pub files: Vec<FileRevocation>,
}

impl RevocationReport {
    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.outcome)).count()
    }

    pub fn removed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Removed | FileOutcome::WouldRemove))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed(_)))
    }
}

/// Remove `email`'s grant from every file in `file_ids`.
pub async fn revoke_access(
    drive: &dyn DriveService,
    email: &str,
    file_ids: &[String],
    simulate: bool,
) -> RevocationReport {
    let mut files = Vec::with_capacity(file_ids.len());

    for file_id in file_ids {
        log::debug!("Checking permissions for {} on file {}", email, file_id);

        let outcome = match revoke_on_file(drive, email, file_id, simulate).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("Error processing {} for {}: {}", file_id, email, e);
                FileOutcome::Failed(e.to_string())
            }
        };

        match &outcome {
            FileOutcome::Removed => log::info!("Removed access for {} from file {}", email, file_id),
            FileOutcome::WouldRemove => {
                log::info!("Would remove access for {} from file {}", email, file_id)
            }
            FileOutcome::NotShared => log::info!("No access found for {} on file {}", email, file_id),
            FileOutcome::Failed(_) => {}
        }

        files.push(FileRevocation {
            file_id: file_id.clone(),
            outcome,
        });
    }

    RevocationReport {
        email: email.to_string(),
        files,
    }
}

async fn revoke_on_file(
    drive: &dyn DriveService,
    email: &str,
    file_id: &str,
    simulate: bool,
) -> Result<FileOutcome, GoogleApiError> {
    let permissions = drive.list_permissions(file_id).await?;

    let Some(permission) = permissions.iter().find(|p| {
        p.email_address
            .as_deref()
            .is_some_and(|addr| addr.trim().eq_ignore_ascii_case(email))
    }) else {
        return Ok(FileOutcome::NotShared);
    };

    if simulate {
        return Ok(FileOutcome::WouldRemove);
    }

    drive.delete_permission(file_id, &permission.id).await?;
    Ok(FileOutcome::Removed)
}
