use thiserror::Error;

/// cloudcost error types
#[derive(Error, Debug)]
pub enum CloudcostError {
    /// Failed to parse sheet values, CSV, or JSON
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Spreadsheet fetch failed
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Text-generation request failed
    #[error("analysis error: {0}")]
    Analysis(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for cloudcost
pub type Result<T> = std::result::Result<T, CloudcostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CloudcostError::Parse("missing column Custo".into());
        assert_eq!(err.to_string(), "parse error: missing column Custo");
    }

    #[test]
    fn test_fetch_error_display() {
        let err = CloudcostError::Fetch("Google Sheets API error: 403".into());
        assert_eq!(err.to_string(), "fetch error: Google Sheets API error: 403");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CloudcostError = io_err.into();
        assert!(err.to_string().contains("io error"));
    }
}
