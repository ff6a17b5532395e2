//! Spreadsheet payload parsing
//!
//! Both the Sheets API and local exports arrive as a header row followed by
//! data rows. Columns are located by header name, so sheets may reorder or
//! add columns freely.

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::types::{CloudcostError, CostRow, Result};

/// Header names of the four required columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnNames {
    pub month: String,
    pub provider: String,
    pub service: String,
    pub cost: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            month: "Mês".to_string(),
            provider: "Provedor".to_string(),
            service: "Serviço".to_string(),
            cost: "Custo".to_string(),
        }
    }
}

/// Sheets API `ValueRange`
#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// The proxy wraps the range as `{ "data": ValueRange }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Payload {
    Envelope { data: ValueRange },
    Direct(ValueRange),
}

impl Payload {
    fn into_values(self) -> Vec<Vec<serde_json::Value>> {
        match self {
            Payload::Envelope { data } => data.values,
            Payload::Direct(range) => range.values,
        }
    }
}

/// Resolved column positions
#[derive(Debug, Clone, Copy, PartialEq)]
struct ColumnIndex {
    month: usize,
    provider: usize,
    service: usize,
    cost: usize,
}

fn normalize_header(name: &str) -> String {
    name.trim().to_lowercase()
}

fn find_column(headers: &[String], configured: &str, alias: &str) -> Result<usize> {
    let wanted = [normalize_header(configured), normalize_header(alias)];
    headers
        .iter()
        .position(|h| wanted.contains(&normalize_header(h)))
        .ok_or_else(|| CloudcostError::Parse(format!("missing column '{}'", configured)))
}

impl ColumnIndex {
    fn resolve(headers: &[String], names: &ColumnNames) -> Result<Self> {
        Ok(Self {
            month: find_column(headers, &names.month, "Month")?,
            provider: find_column(headers, &names.provider, "Provider")?,
            service: find_column(headers, &names.service, "Service")?,
            cost: find_column(headers, &names.cost, "Cost")?,
        })
    }
}

/// Render a JSON cell as text (numbers keep their JSON form)
fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Length of the longest decimal-number prefix of `s` (after a sign)
fn number_prefix_len(s: &[u8]) -> usize {
    let mut i = 0;
    if matches!(s.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < s.len() && s[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < s.len() && s[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < s.len() && s[j].is_ascii_digit() {
            j += 1;
        }
        digits += j - frac_start;
        if digits > 0 {
            i = j;
        }
    }

    if digits == 0 {
        return 0;
    }

    if i < s.len() && matches!(s[i], b'e' | b'E') {
        let mut j = i + 1;
        if j < s.len() && matches!(s[j], b'+' | b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < s.len() && s[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    i
}

/// Parse a cost cell.
///
/// The first `$` is dropped and the first `,` becomes the decimal point,
/// then the longest numeric prefix is read. Anything unreadable is 0.
pub fn parse_cost(raw: &str) -> f64 {
    let cleaned = raw.replacen('$', "", 1).replacen(',', ".", 1);
    let trimmed = cleaned.trim_start();
    let len = number_prefix_len(trimmed.as_bytes());
    if len == 0 {
        return 0.0;
    }
    trimmed[..len]
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Convert a header plus data records into cost rows
pub fn rows_from_records<I>(headers: &[String], records: I, names: &ColumnNames) -> Result<Vec<CostRow>>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let index = ColumnIndex::resolve(headers, names)?;
    let cell = |record: &[String], i: usize| record.get(i).map(|s| s.trim()).unwrap_or("").to_string();

    Ok(records
        .into_iter()
        .filter(|record| record.iter().any(|c| !c.trim().is_empty()))
        .map(|record| CostRow {
            month: cell(&record, index.month),
            provider: cell(&record, index.provider),
            service: cell(&record, index.service),
            cost: parse_cost(record.get(index.cost).map(String::as_str).unwrap_or("")),
        })
        .collect())
}

fn rows_from_values(values: Vec<Vec<serde_json::Value>>, names: &ColumnNames) -> Result<Vec<CostRow>> {
    let mut rows = values
        .into_iter()
        .map(|row| row.iter().map(cell_text).collect::<Vec<String>>());

    match rows.next() {
        Some(headers) => rows_from_records(&headers, rows, names),
        None => Ok(Vec::new()),
    }
}

/// Parse a ValueRange JSON payload (bare or enveloped).
/// The buffer is mutated in place by the SIMD parser.
pub fn parse_value_range(bytes: &mut [u8], names: &ColumnNames) -> Result<Vec<CostRow>> {
    let payload: Payload = simd_json::serde::from_slice(bytes)
        .map_err(|e| CloudcostError::Parse(format!("invalid sheet JSON: {}", e)))?;
    rows_from_values(payload.into_values(), names)
}

/// Parse CSV text whose first record is the header
pub fn parse_csv<R: Read>(reader: R, names: &ColumnNames) -> Result<Vec<CostRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CloudcostError::Parse(format!("invalid CSV header: {}", e)))?
        .iter()
        .map(String::from)
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| CloudcostError::Parse(format!("invalid CSV record: {}", e)))?;
        records.push(record.iter().map(String::from).collect::<Vec<String>>());
    }

    if headers.is_empty() {
        return Ok(Vec::new());
    }
    rows_from_records(&headers, records, names)
}
