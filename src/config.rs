//! Configuration management
//!
//! Settings come from `~/.cloudcost/config.json` (camelCase keys), then the
//! environment, then command-line flags:
//! ```json
//! {
//!   "sheetsHost": "https://sheets.googleapis.com/v4",
//!   "spreadsheetId": "1AbC...",
//!   "sheetsApiKey": "...",
//!   "geminiApiUrl": "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent",
//!   "topN": 3,
//!   "columns": { "month": "Mês", "provider": "Provedor", "service": "Serviço", "cost": "Custo" }
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::services::{GeminiClient, DEFAULT_TOP_N};
use crate::sources::{
    ColumnNames, CostSource, FileSource, SheetsClient, DEFAULT_SHEETS_HOST, DEFAULT_SHEETS_RANGE,
};
use crate::types::{CloudcostError, Result};

/// Raw config.json structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    sheets_host: Option<String>,
    spreadsheet_id: Option<String>,
    sheets_api_key: Option<String>,
    sheets_range: Option<String>,
    gemini_api_url: Option<String>,
    gemini_api_key: Option<String>,
    top_n: Option<usize>,
    #[serde(default)]
    columns: ColumnNames,
    input: Option<String>,
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub sheets_host: String,
    pub spreadsheet_id: Option<String>,
    pub sheets_api_key: Option<String>,
    pub sheets_range: String,
    pub gemini_api_url: Option<String>,
    pub gemini_api_key: Option<String>,
    pub top_n: usize,
    pub columns: ColumnNames,
    /// Local file or glob replacing the Sheets source
    pub input: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sheets_host: DEFAULT_SHEETS_HOST.to_string(),
            spreadsheet_id: None,
            sheets_api_key: None,
            sheets_range: DEFAULT_SHEETS_RANGE.to_string(),
            gemini_api_url: None,
            gemini_api_key: None,
            top_n: DEFAULT_TOP_N,
            columns: ColumnNames::default(),
            input: None,
        }
    }
}

/// Application directory (~/.cloudcost)
pub fn app_dir() -> Option<PathBuf> {
    directories::UserDirs::new().map(|d| d.home_dir().join(".cloudcost"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load from the default app directory and the process environment
    pub fn load() -> Self {
        let env: HashMap<String, String> = std::env::vars().collect();
        match app_dir() {
            Some(dir) => Self::load_from(&dir.join("config.json"), &env),
            None => {
                tracing::warn!("could not determine home directory; using defaults");
                Self::default().with_env(&env)
            }
        }
    }

    /// Load from a config file path and an explicit environment
    pub fn load_from(path: &Path, env: &HashMap<String, String>) -> Self {
        Self::read_settings(path).apply(Self::default()).with_env(env)
    }

    /// Missing file → defaults; unreadable or corrupt file → warning + defaults
    fn read_settings(path: &Path) -> SettingsFile {
        if !path.exists() {
            return SettingsFile::default();
        }
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read config");
                return SettingsFile::default();
            }
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "invalid config file, using defaults");
            SettingsFile::default()
        })
    }

    /// Environment overrides (empty values are ignored)
    pub fn with_env(mut self, env: &HashMap<String, String>) -> Self {
        let var = |name: &str| non_empty(env.get(name).cloned());

        if let Some(host) = var("GSHEET_HOST") {
            self.sheets_host = host;
        }
        if let Some(id) = var("GSHEET_ID") {
            self.spreadsheet_id = Some(id);
        }
        if let Some(key) = var("GSHEET_API_KEY") {
            self.sheets_api_key = Some(key);
        }
        if let Some(range) = var("GSHEET_RANGE") {
            self.sheets_range = range;
        }
        if let Some(url) = var("GEMINI_API_URL") {
            self.gemini_api_url = Some(url);
        }
        if let Some(key) = var("GEMINI_API_KEY") {
            self.gemini_api_key = Some(key);
        }
        self
    }

    /// Command-line input path override
    pub fn with_input(mut self, input: Option<String>) -> Self {
        if let Some(path) = non_empty(input) {
            self.input = Some(path);
        }
        self
    }

    /// The cost source this configuration selects
    pub fn source(&self) -> Result<Box<dyn CostSource>> {
        if let Some(input) = &self.input {
            return Ok(Box::new(FileSource::new(input.clone(), self.columns.clone())));
        }

        let id = self.spreadsheet_id.as_deref().ok_or_else(|| {
            CloudcostError::Config("GSHEET_ID is not set (or pass --input <file>)".into())
        })?;
        let key = self
            .sheets_api_key
            .as_deref()
            .ok_or_else(|| CloudcostError::Config("GSHEET_API_KEY is not set".into()))?;

        Ok(Box::new(SheetsClient::new(
            self.sheets_host.clone(),
            id,
            key,
            self.sheets_range.clone(),
            self.columns.clone(),
        )))
    }

    /// The summarizer client for AI insights
    pub fn summarizer(&self) -> Result<GeminiClient> {
        GeminiClient::new(
            self.gemini_api_url.as_deref(),
            self.gemini_api_key.as_deref(),
        )
    }
}

impl SettingsFile {
    fn apply(self, mut config: Config) -> Config {
        if let Some(host) = non_empty(self.sheets_host) {
            config.sheets_host = host;
        }
        config.spreadsheet_id = non_empty(self.spreadsheet_id);
        config.sheets_api_key = non_empty(self.sheets_api_key);
        if let Some(range) = non_empty(self.sheets_range) {
            config.sheets_range = range;
        }
        config.gemini_api_url = non_empty(self.gemini_api_url);
        config.gemini_api_key = non_empty(self.gemini_api_key);
        if let Some(top_n) = self.top_n.filter(|n| *n > 0) {
            config.top_n = top_n;
        }
        config.columns = self.columns;
        config.input = non_empty(self.input);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json"), &HashMap::new());
        assert_eq!(config, Config::default());
        assert_eq!(config.top_n, 3);
        assert_eq!(config.sheets_range, "A:Z");
    }

    #[test]
    fn test_file_values_camel_case() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"spreadsheetId":"abc","sheetsApiKey":"k","topN":5,"columns":{"month":"Period"},"unknownKey":1}"#,
        )
        .unwrap();

        let config = Config::load_from(&path, &HashMap::new());
        assert_eq!(config.spreadsheet_id.as_deref(), Some("abc"));
        assert_eq!(config.top_n, 5);
        assert_eq!(config.columns.month, "Period");
        // unspecified columns keep their defaults
        assert_eq!(config.columns.cost, "Custo");
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let config = Config::load_from(&path, &HashMap::new());
        assert_eq!(config, Config::default());
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_corrupt_file_logs_warning() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            Config::load_from(&path, &HashMap::new());
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"));
        assert!(output.contains("invalid config file"));
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"spreadsheetId":"from-file","sheetsRange":"B:E"}"#).unwrap();

        let config = Config::load_from(
            &path,
            &env(&[
                ("GSHEET_ID", "from-env"),
                ("GSHEET_HOST", "http://proxy"),
                ("GEMINI_API_KEY", "g"),
                ("GSHEET_API_KEY", ""),
            ]),
        );
        assert_eq!(config.spreadsheet_id.as_deref(), Some("from-env"));
        assert_eq!(config.sheets_host, "http://proxy");
        assert_eq!(config.sheets_range, "B:E");
        assert_eq!(config.gemini_api_key.as_deref(), Some("g"));
        assert!(config.sheets_api_key.is_none());
    }

    #[test]
    fn test_with_input_overrides() {
        let config = Config::default().with_input(Some("costs.csv".into()));
        assert_eq!(config.input.as_deref(), Some("costs.csv"));

        let config = Config::default().with_input(None);
        assert!(config.input.is_none());
    }

    #[test]
    fn test_source_selection() {
        let file = Config::default().with_input(Some("costs.csv".into()));
        assert_eq!(file.source().unwrap().name(), "file");

        let sheets = Config::default().with_env(&env(&[("GSHEET_ID", "id"), ("GSHEET_API_KEY", "k")]));
        assert_eq!(sheets.source().unwrap().name(), "google-sheets");
    }

    #[test]
    fn test_source_missing_credentials() {
        let err = Config::default().source().err().unwrap();
        assert!(matches!(err, CloudcostError::Config(_)));

        let only_id = Config::default().with_env(&env(&[("GSHEET_ID", "id")]));
        let err = only_id.source().err().unwrap();
        assert!(err.to_string().contains("GSHEET_API_KEY"));
    }

    #[test]
    fn test_summarizer_requires_gemini_settings() {
        assert!(Config::default().summarizer().is_err());
        let config = Config::default().with_env(&env(&[
            ("GEMINI_API_URL", "http://gemini"),
            ("GEMINI_API_KEY", "k"),
        ]));
        assert!(config.summarizer().is_ok());
    }
}
