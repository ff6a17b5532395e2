//! CSV export of detail rows

use crate::types::CostRow;

const HEADER: &str = "month,provider,service,cost";
const LINE_SEP: &str = "\r\n";

/// Quote a string field as a JSON string literal
fn quote(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Render rows as CSV: header first, CRLF separators, quoted string fields
pub fn to_csv(rows: &[CostRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(HEADER.to_string());
    lines.extend(rows.iter().map(|row| {
        format!(
            "{},{},{},{}",
            quote(&row.month),
            quote(&row.provider),
            quote(&row.service),
            row.cost
        )
    }));
    lines.join(LINE_SEP)
}
