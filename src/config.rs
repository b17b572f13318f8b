//! Sweep configuration, read once at startup from a JSON file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SweepError;

/// Environment variable naming the config file when no CLI argument is given.
pub const CONFIG_ENV_VAR: &str = "ROSTER_SWEEP_CONFIG";

/// Static sweep configuration.
///
/// Column positions are 0-based grid indices (A = 0). `column_span` is both
/// the width of the highlighted/moved block and the minimum number of cells a
/// row must have to be considered at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepConfig {
    pub spreadsheet_id: String,
    #[serde(default)]
    pub file_ids: Vec<String>,
    /// Simulate-only mode: compute and log, change nothing.
    #[serde(default, alias = "dryRun")]
    pub simulate: bool,
    /// First archive destination row (0-based grid index).
    #[serde(default = "default_start_row")]
    pub start_row: usize,
    #[serde(default = "default_hire_date_column")]
    pub hire_date_column: usize,
    #[serde(default = "default_last_paid_column")]
    pub last_paid_column: usize,
    /// Checkbox column set on qualifying rows.
    #[serde(default = "default_flag_column")]
    pub flag_column: usize,
    #[serde(default = "default_column_span")]
    pub column_span: usize,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_path: Option<PathBuf>,
}

fn default_start_row() -> usize {
    169
}

fn default_hire_date_column() -> usize {
    9 // J
}

fn default_last_paid_column() -> usize {
    11 // L
}

fn default_flag_column() -> usize {
    12 // M
}

fn default_column_span() -> usize {
    13 // A–M
}

fn default_lookback_days() -> u32 {
    60
}

impl SweepConfig {
    /// Config with every default applied for the given spreadsheet.
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            file_ids: Vec::new(),
            simulate: false,
            start_row: default_start_row(),
            hire_date_column: default_hire_date_column(),
            last_paid_column: default_last_paid_column(),
            flag_column: default_flag_column(),
            column_span: default_column_span(),
            lookback_days: default_lookback_days(),
            token_path: None,
        }
    }

    /// Reject configurations the sweep cannot run against.
    pub fn validate(&self) -> Result<(), SweepError> {
        if self.spreadsheet_id.trim().is_empty() {
            return Err(SweepError::Config("spreadsheetId is empty".to_string()));
        }
        if self.column_span == 0 {
            return Err(SweepError::Config("columnSpan must be at least 1".to_string()));
        }
        for (name, column) in [
            ("hireDateColumn", self.hire_date_column),
            ("lastPaidColumn", self.last_paid_column),
            ("flagColumn", self.flag_column),
        ] {
            if column >= self.column_span {
                return Err(SweepError::Config(format!(
                    "{} ({}) is outside columnSpan ({})",
                    name, column, self.column_span
                )));
            }
        }
        if self.file_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(SweepError::Config("fileIds contains a blank entry".to_string()));
        }
        Ok(())
    }

    /// Token file to authorize with, falling back to the default location.
    pub fn resolved_token_path(&self) -> PathBuf {
        self.token_path
            .clone()
            .unwrap_or_else(crate::google_api::default_token_path)
    }
}

/// Default config file location: ~/.roster-sweep/config.json
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".roster-sweep")
        .join("config.json")
}

/// Resolve the config path: explicit argument, then env var, then default.
pub fn resolve_config_path(arg: Option<String>) -> PathBuf {
    arg.map(PathBuf::from)
        .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
        .unwrap_or_else(default_config_path)
}

/// Load and validate the sweep config from `path`.
pub fn load_config(path: &Path) -> Result<SweepConfig, SweepError> {
    if !path.exists() {
        return Err(SweepError::Config(format!(
            "Config file not found at {}. Create it with: {{ \"spreadsheetId\": \"...\", \"fileIds\": [] }}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let config: SweepConfig = serde_json::from_str(&content)
        .map_err(|e| SweepError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

    config.validate()?;
    Ok(config)
}
