//! Google Drive API v3 — file permission listing and removal.

use async_trait::async_trait;
use serde::Deserialize;

use super::{check_status, endpoint, GoogleApiError};

const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3/";

// ============================================================================
// API response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PermissionListResponse {
    #[serde(default)]
    permissions: Vec<Permission>,
    #[serde(default)]
    next_page_token: Option<String>,
}

// ============================================================================
// Public types
// ============================================================================

/// One sharing grant on a Drive file.
///
/// `email_address` is absent for domain/anyone grants.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: String,
    #[serde(default)]
    pub email_address: Option<String>,
}

/// The file-sharing operations the sweep depends on.
#[async_trait]
pub trait DriveService: Send + Sync {
    /// List every permission on `file_id`.
    async fn list_permissions(&self, file_id: &str) -> Result<Vec<Permission>, GoogleApiError>;

    /// Delete one permission from `file_id`.
    async fn delete_permission(
        &self,
        file_id: &str,
        permission_id: &str,
    ) -> Result<(), GoogleApiError>;
}

// ============================================================================
// Drive API
// ============================================================================

/// reqwest-backed Drive client authorized with a bearer token.
pub struct GoogleDriveClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl GoogleDriveClient {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token: access_token.into(),
            base_url: DRIVE_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl DriveService for GoogleDriveClient {
    /// Handles pagination (pageSize=100, pageToken). Shared-drive files are
    /// included via `supportsAllDrives`.
    async fn list_permissions(&self, file_id: &str) -> Result<Vec<Permission>, GoogleApiError> {
        let url = endpoint(&self.base_url, &["files", file_id, "permissions"])?;

        let mut all = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(url.clone())
                .bearer_auth(&self.access_token)
                .query(&[
                    ("fields", "nextPageToken,permissions(id,emailAddress)"),
                    ("supportsAllDrives", "true"),
                    ("pageSize", "100"),
                ]);
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let resp = check_status(request.send().await?).await?;
            let page: PermissionListResponse = resp.json().await?;
            all.extend(page.permissions);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(all)
    }

    async fn delete_permission(
        &self,
        file_id: &str,
        permission_id: &str,
    ) -> Result<(), GoogleApiError> {
        let url = endpoint(
            &self.base_url,
            &["files", file_id, "permissions", permission_id],
        )?;

        let resp = self
            .client
            .delete(url)
            .bearer_auth(&self.access_token)
            .query(&[("supportsAllDrives", "true")])
            .send()
            .await?;
        check_status(resp).await?;

        Ok(())
    }
}
