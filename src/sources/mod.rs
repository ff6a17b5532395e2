//! Cost sources: the Sheets API and local spreadsheet exports

mod file;
pub mod parser;
mod sheets;

pub use file::FileSource;
pub use parser::{parse_cost, ColumnNames};
pub use sheets::{SheetsClient, DEFAULT_SHEETS_HOST, DEFAULT_SHEETS_RANGE};

use chrono::Utc;

use crate::services::transform;
use crate::types::{CostRow, CostsData, Result};

/// Trait for fetching raw cost rows
pub trait CostSource: Send + Sync {
    /// Source name for logs and status lines (e.g., "google-sheets")
    fn name(&self) -> &str;

    /// Fetch every row of the sheet
    fn fetch(&self) -> Result<Vec<CostRow>>;

    /// Fetch and transform into the dashboard dataset
    fn load(&self) -> Result<CostsData> {
        let rows = self.fetch()?;
        tracing::info!(source = self.name(), rows = rows.len(), "fetched cost rows");
        Ok(transform(rows, Utc::now()))
    }
}
