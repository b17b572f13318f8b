//! Native Google API client for the roster sweep.
//!
//! Direct HTTP via reqwest against Sheets v4 and Drive v3. The token file
//! format is compatible with the authorized-user JSON written by the
//! google-auth libraries, so a token minted elsewhere can be dropped in.
//!
//! Modules:
//! - drive: Drive API v3 permission listing and deletion
//! - sheets: Sheets API v4 grid read and batch update
//! - token_store: token.json persistence

pub mod drive;
pub mod sheets;
pub mod token_store;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ============================================================================
// Token types — compatible with google-auth's authorized-user format
// ============================================================================

/// OAuth2 token payload persisted in token.json.
///
/// Both `token` and `access_token` are accepted on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleToken {
    /// The access token (google-auth writes this as "token")
    #[serde(alias = "access_token")]
    pub token: String,
    /// The refresh token (long-lived, used to get new access tokens)
    pub refresh_token: Option<String>,
    /// Token endpoint URL
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    /// OAuth2 client ID
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Token expiry time (RFC 3339)
    #[serde(default)]
    pub expiry: Option<String>,
    #[serde(default, alias = "email")]
    pub account: Option<String>,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

// ============================================================================
// Error type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GoogleApiError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Token expired or revoked")]
    AuthExpired,
    #[error("Token not found at {0}")]
    TokenNotFound(PathBuf),
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl GoogleApiError {
    /// Raw response body for API errors, used for the fatal error report.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            GoogleApiError::ApiError { message, .. } if !message.is_empty() => {
                Some(message.as_str())
            }
            _ => None,
        }
    }
}

/// Map a non-success response to `GoogleApiError`, passing successes through.
///
/// 401 is reported as `AuthExpired`; any other failure keeps the status and
/// the response body so the caller can surface Google's error payload.
pub(crate) async fn check_status(
    resp: reqwest::Response,
) -> Result<reqwest::Response, GoogleApiError> {
    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(GoogleApiError::AuthExpired);
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(GoogleApiError::ApiError {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(resp)
}

/// Join percent-encoded path segments onto an API base URL.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<url::Url, GoogleApiError> {
    let mut url = url::Url::parse(base)
        .map_err(|e| GoogleApiError::InvalidRequest(format!("{}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| GoogleApiError::InvalidRequest(format!("{} cannot be a base", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

// ============================================================================
// Token I/O
// ============================================================================

/// Default token file path when the config does not name one.
pub fn default_token_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".roster-sweep")
        .join("token.json")
}

/// Check if a token is expired based on its expiry field.
pub fn is_token_expired(token: &GoogleToken) -> bool {
    match &token.expiry {
        None => true, // No expiry = assume expired, try refresh
        Some(expiry_str) => {
            // google-auth stores expiry as "2026-02-08T12:00:00.000000Z" or similar
            match chrono::DateTime::parse_from_rfc3339(expiry_str) {
                Ok(expiry) => {
                    // Consider expired if within 60 seconds of expiry
                    let now = chrono::Utc::now();
                    expiry <= now + chrono::Duration::seconds(60)
                }
                Err(_) => true,
            }
        }
    }
}

// ============================================================================
// Token refresh
// ============================================================================

/// Refresh an access token using the refresh token.
///
/// Returns an updated GoogleToken with new access token and expiry, and
/// persists it back to `path`.
pub async fn refresh_access_token(
    token: &GoogleToken,
    path: &Path,
) -> Result<GoogleToken, GoogleApiError> {
    let refresh_token = token
        .refresh_token
        .as_ref()
        .ok_or(GoogleApiError::AuthExpired)?;

    let client = reqwest::Client::new();

    let mut form = vec![
        ("client_id", token.client_id.as_str()),
        ("refresh_token", refresh_token.as_str()),
        ("grant_type", "refresh_token"),
    ];
    if let Some(secret) = token.client_secret.as_deref() {
        form.push(("client_secret", secret));
    }

    let resp = client.post(&token.token_uri).form(&form).send().await?;
    let status = resp.status();
    let body_text = resp.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(map_refresh_error(status.as_u16(), &body_text));
    }
    let body: serde_json::Value = serde_json::from_str(&body_text)?;

    let access_token = body["access_token"]
        .as_str()
        .ok_or_else(|| GoogleApiError::RefreshFailed("No access_token in response".into()))?;

    let expires_in = body["expires_in"].as_u64().unwrap_or(3600);
    let expiry = chrono::Utc::now() + chrono::Duration::seconds(expires_in as i64);

    let mut new_token = token.clone();
    new_token.token = access_token.to_string();
    new_token.expiry = Some(expiry.to_rfc3339());

    token_store::save_token(path, &new_token)?;
    log::info!("Refreshed Google access token ({})", path.display());

    Ok(new_token)
}

fn map_refresh_error(status: u16, body: &str) -> GoogleApiError {
    let lowered = body.to_lowercase();
    if (status == 400 || status == 401)
        && (lowered.contains("invalid_grant") || lowered.contains("token has been expired"))
    {
        return GoogleApiError::AuthExpired;
    }
    GoogleApiError::RefreshFailed(format!("HTTP {}: {}", status, body))
}

/// Get a valid access token, refreshing if expired.
pub async fn get_valid_access_token(path: &Path) -> Result<String, GoogleApiError> {
    let token = token_store::load_token(path)?;

    if is_token_expired(&token) {
        let refreshed = refresh_access_token(&token, path).await?;
        Ok(refreshed.token)
    } else {
        Ok(token.token)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with_expiry(expiry: Option<String>) -> GoogleToken {
        GoogleToken {
            token: "test".to_string(),
            refresh_token: None,
            token_uri: default_token_uri(),
            client_id: "c".to_string(),
            client_secret: None,
            scopes: vec![],
            expiry,
            account: None,
        }
    }

    #[test]
    fn test_google_token_authorized_user_compat() {
        let json = r#"{
            "token": "ya29.sheet-token",
            "refresh_token": "1//refresh",
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_id": "client.apps.googleusercontent.com",
            "client_secret": "secret",
            "scopes": [
                "https://www.googleapis.com/auth/spreadsheets",
                "https://www.googleapis.com/auth/drive"
            ],
            "expiry": "2026-02-08T12:00:00.000000Z",
            "account": "ops@company.com"
        }"#;

        let token: GoogleToken = serde_json::from_str(json).unwrap();
        assert_eq!(token.token, "ya29.sheet-token");
        assert_eq!(token.account.as_deref(), Some("ops@company.com"));
        assert_eq!(token.scopes.len(), 2);
    }

    #[test]
    fn test_google_token_access_token_alias() {
        let json = r#"{
            "access_token": "ya29.alias-token",
            "refresh_token": "1//refresh",
            "client_id": "client"
        }"#;

        let token: GoogleToken = serde_json::from_str(json).unwrap();
        assert_eq!(token.token, "ya29.alias-token");
        assert_eq!(token.token_uri, "https://oauth2.googleapis.com/token");
        assert!(token.client_secret.is_none());
    }

    #[test]
    fn test_is_token_expired_no_expiry() {
        assert!(is_token_expired(&token_with_expiry(None)));
    }

    #[test]
    fn test_is_token_expired_future() {
        let future = chrono::Utc::now() + chrono::Duration::hours(1);
        assert!(!is_token_expired(&token_with_expiry(Some(future.to_rfc3339()))));
    }

    #[test]
    fn test_is_token_expired_within_skew() {
        let soon = chrono::Utc::now() + chrono::Duration::seconds(30);
        assert!(is_token_expired(&token_with_expiry(Some(soon.to_rfc3339()))));
    }

    #[test]
    fn test_is_token_expired_garbage() {
        assert!(is_token_expired(&token_with_expiry(Some("tomorrow".into()))));
    }

    #[test]
    fn test_map_refresh_error_invalid_grant() {
        let err = map_refresh_error(400, r#"{"error": "invalid_grant"}"#);
        assert!(matches!(err, GoogleApiError::AuthExpired));

        let err = map_refresh_error(500, "backend error");
        assert!(matches!(err, GoogleApiError::RefreshFailed(_)));
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let url = endpoint(
            "https://www.googleapis.com/drive/v3/",
            &["files", "a/b c", "permissions"],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/drive/v3/files/a%2Fb%20c/permissions"
        );
    }

    #[test]
    fn test_response_body_only_for_api_errors() {
        let err = GoogleApiError::ApiError {
            status: 403,
            message: r#"{"error": {"code": 403}}"#.to_string(),
        };
        assert_eq!(err.response_body(), Some(r#"{"error": {"code": 403}}"#));
        assert!(GoogleApiError::AuthExpired.response_body().is_none());
    }
}
