//! Google Sheets API v4 source

use std::time::Duration;

use super::parser::{parse_value_range, ColumnNames};
use super::CostSource;
use crate::types::{CloudcostError, CostRow, Result};

/// Default Sheets API base URL
pub const DEFAULT_SHEETS_HOST: &str = "https://sheets.googleapis.com/v4";

/// Default range covering the whole sheet
pub const DEFAULT_SHEETS_RANGE: &str = "A:Z";

/// HTTP request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Reads a spreadsheet range through the Sheets `values` endpoint
pub struct SheetsClient {
    host: String,
    spreadsheet_id: String,
    api_key: String,
    range: String,
    columns: ColumnNames,
}

impl SheetsClient {
    pub fn new(
        host: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        api_key: impl Into<String>,
        range: impl Into<String>,
        columns: ColumnNames,
    ) -> Self {
        Self {
            host: host.into(),
            spreadsheet_id: spreadsheet_id.into(),
            api_key: api_key.into(),
            range: range.into(),
            columns,
        }
    }

    /// `{host}/spreadsheets/{id}/values/{range}?key={key}`
    pub fn url(&self) -> String {
        format!(
            "{}/spreadsheets/{}/values/{}?key={}",
            self.host.trim_end_matches('/'),
            self.spreadsheet_id,
            self.range,
            self.api_key
        )
    }

    fn request(&self) -> std::result::Result<Vec<u8>, String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| format!("HTTP client error: {}", e))?;

        let response = client
            .get(self.url())
            .send()
            .map_err(|e| format!("HTTP request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("Sheets API returned status {}", status.as_u16()));
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| format!("failed to read response body: {}", e))
    }
}

impl CostSource for SheetsClient {
    fn name(&self) -> &str {
        "google-sheets"
    }

    fn fetch(&self) -> Result<Vec<CostRow>> {
        tracing::debug!(spreadsheet = %self.spreadsheet_id, range = %self.range, "fetching sheet");
        let mut body = self.request().map_err(CloudcostError::Fetch)?;
        parse_value_range(&mut body, &self.columns)
    }
}
