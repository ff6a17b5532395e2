//! Local spreadsheet exports (.json ValueRange or .csv)

use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use super::parser::{parse_csv, parse_value_range, ColumnNames};
use super::CostSource;
use crate::types::{CloudcostError, CostRow, Result};

/// Cost source backed by one file or a glob of files
pub struct FileSource {
    pattern: String,
    columns: ColumnNames,
}

impl FileSource {
    pub fn new(pattern: impl Into<String>, columns: ColumnNames) -> Self {
        Self {
            pattern: pattern.into(),
            columns,
        }
    }

    /// Files matching the pattern, in sorted path order
    fn collect_files(&self) -> Result<Vec<PathBuf>> {
        let paths = glob::glob(&self.pattern)
            .map_err(|e| CloudcostError::Config(format!("invalid input pattern '{}': {}", self.pattern, e)))?;

        let mut files: Vec<PathBuf> = paths
            .filter_map(|entry| entry.ok())
            .filter(|p| p.is_file())
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(CloudcostError::Config(format!(
                "no input files match '{}'",
                self.pattern
            )));
        }
        Ok(files)
    }

    fn parse_file(&self, path: &Path) -> Result<Vec<CostRow>> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let rows = match extension.as_deref() {
            Some("json") => {
                let mut bytes = fs::read(path)?;
                parse_value_range(&mut bytes, &self.columns)?
            }
            Some("csv") => {
                let file = fs::File::open(path)?;
                parse_csv(file, &self.columns)?
            }
            _ => {
                return Err(CloudcostError::Config(format!(
                    "unsupported input format: {}",
                    path.display()
                )))
            }
        };

        tracing::debug!(path = %path.display(), rows = rows.len(), "parsed input file");
        Ok(rows)
    }
}

impl CostSource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    fn fetch(&self) -> Result<Vec<CostRow>> {
        let files = self.collect_files()?;
        let parsed: Vec<Vec<CostRow>> = files
            .par_iter()
            .map(|f| self.parse_file(f))
            .collect::<Result<_>>()?;
        Ok(parsed.into_iter().flatten().collect())
    }
}
