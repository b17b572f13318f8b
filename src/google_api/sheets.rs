//! Google Sheets API v4 — grid read and batch update.
//!
//! The sweep only ever touches the first sheet of the roster spreadsheet.
//! Cells are read as their formatted text, which is what a human sees in the
//! sheet (dates come back as "3/14/2024", not serial numbers).

use async_trait::async_trait;
use serde::Deserialize;

use super::{check_status, endpoint, GoogleApiError};

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/";

// ============================================================================
// API response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpreadsheetResponse {
    #[serde(default)]
    sheets: Vec<SheetRaw>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetRaw {
    properties: SheetProperties,
    #[serde(default)]
    data: Vec<GridDataRaw>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    #[serde(default)]
    sheet_id: i64,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridDataRaw {
    #[serde(default)]
    row_data: Vec<RowDataRaw>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RowDataRaw {
    #[serde(default)]
    values: Vec<CellDataRaw>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CellDataRaw {
    #[serde(default)]
    formatted_value: Option<String>,
}

// ============================================================================
// Public types
// ============================================================================

/// Formatted cell text of one sheet, row-major, in grid order.
///
/// Rows keep the width the API returned: trailing empty cells are not padded,
/// so a short row here is a short row in the sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetGrid {
    pub sheet_id: i64,
    pub title: String,
    pub rows: Vec<Vec<Option<String>>>,
}

impl SpreadsheetResponse {
    fn into_first_grid(self) -> Option<SheetGrid> {
        let sheet = self.sheets.into_iter().next()?;
        let rows = sheet
            .data
            .into_iter()
            .next()
            .map(|grid| {
                grid.row_data
                    .into_iter()
                    .map(|row| {
                        row.values
                            .into_iter()
                            .map(|cell| cell.formatted_value)
                            .collect()
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(SheetGrid {
            sheet_id: sheet.properties.sheet_id,
            title: sheet.properties.title,
            rows,
        })
    }
}

/// The spreadsheet operations the sweep depends on.
#[async_trait]
pub trait SheetsService: Send + Sync {
    /// Read the first sheet of a spreadsheet with its grid data.
    async fn get_grid(&self, spreadsheet_id: &str) -> Result<SheetGrid, GoogleApiError>;

    /// Apply `requests` as one `batchUpdate`, in order.
    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<serde_json::Value>,
    ) -> Result<(), GoogleApiError>;
}

// ============================================================================
// Sheets API
// ============================================================================

/// reqwest-backed Sheets client authorized with a bearer token.
pub struct GoogleSheetsClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl GoogleSheetsClient {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token: access_token.into(),
            base_url: SHEETS_API_BASE.to_string(),
        }
    }

    /// Point the client at a different API root (proxies, emulators).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SheetsService for GoogleSheetsClient {
    async fn get_grid(&self, spreadsheet_id: &str) -> Result<SheetGrid, GoogleApiError> {
        let url = endpoint(&self.base_url, &["spreadsheets", spreadsheet_id])?;

        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("includeGridData", "true"),
                (
                    "fields",
                    "sheets(properties(sheetId,title),data(rowData(values(formattedValue))))",
                ),
            ])
            .send()
            .await?;
        let resp = check_status(resp).await?;

        let spreadsheet: SpreadsheetResponse = resp.json().await?;
        spreadsheet.into_first_grid().ok_or_else(|| {
            GoogleApiError::InvalidRequest(format!("spreadsheet {} has no sheets", spreadsheet_id))
        })
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<serde_json::Value>,
    ) -> Result<(), GoogleApiError> {
        let target = format!("{}:batchUpdate", spreadsheet_id);
        let url = endpoint(&self.base_url, &["spreadsheets", target.as_str()])?;
        let body = serde_json::json!({ "requests": requests });

        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        check_status(resp).await?;

        Ok(())
    }
}
