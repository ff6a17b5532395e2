//! Month label ordering
//!
//! Spreadsheet month columns hold human labels ("Janeiro", "Fev/2025",
//! "2025-03"). This module maps them to a sortable `(year, month)` key so
//! every view lists months chronologically.

use regex::Regex;
use std::sync::LazyLock;

/// Month names accepted in labels, after accent folding and lowercasing
const MONTH_NAMES: [&[&str]; 12] = [
    &["janeiro", "january", "jan"],
    &["fevereiro", "february", "fev", "feb"],
    &["marco", "march", "mar"],
    &["abril", "april", "abr", "apr"],
    &["maio", "may", "mai"],
    &["junho", "june", "jun"],
    &["julho", "july", "jul"],
    &["agosto", "august", "ago", "aug"],
    &["setembro", "september", "set", "sep", "sept"],
    &["outubro", "october", "out", "oct"],
    &["novembro", "november", "nov"],
    &["dezembro", "december", "dez", "dec"],
];

static ISO_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})$").expect("valid ISO month regex"));

static NUMERIC_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{4})$").expect("valid numeric month regex"));

static NAMED_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\p{L}+)\.?(?:[\s/\-]+(\d{4}|\d{2}))?$").expect("valid named month regex")
});

/// Chronological key for a month label
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonthKey {
    /// 0 when the label carries no year
    pub year: i32,
    /// 1-based month number
    pub month: u32,
}

/// Fold Portuguese accents and lowercase ("Março" → "marco")
fn fold(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Resolve a month name (full or abbreviated, pt/en) to its 1-based number
pub fn month_number(name: &str) -> Option<u32> {
    let folded = fold(name.trim());
    MONTH_NAMES
        .iter()
        .position(|names| names.contains(&folded.as_str()))
        .map(|i| i as u32 + 1)
}

fn expand_year(raw: &str) -> Option<i32> {
    let year: i32 = raw.parse().ok()?;
    if raw.len() == 2 {
        Some(2000 + year)
    } else {
        Some(year)
    }
}

/// Parse a month label into a sortable key.
///
/// Accepted shapes: `Janeiro`, `Jan 2025`, `jan/25`, `Março-2024`,
/// `2025-03`, `03/2025`.
pub fn month_key(label: &str) -> Option<MonthKey> {
    let label = label.trim();

    if let Some(caps) = ISO_MONTH.captures(label) {
        let year = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        return (1..=12)
            .contains(&month)
            .then_some(MonthKey { year, month });
    }

    if let Some(caps) = NUMERIC_MONTH.captures(label) {
        let month: u32 = caps[1].parse().ok()?;
        let year = caps[2].parse().ok()?;
        return (1..=12)
            .contains(&month)
            .then_some(MonthKey { year, month });
    }

    let caps = NAMED_MONTH.captures(label)?;
    let month = month_number(&caps[1])?;
    let year = match caps.get(2) {
        Some(y) => expand_year(y.as_str())?,
        None => 0,
    };
    Some(MonthKey { year, month })
}

/// Sort month labels chronologically.
/// Unrecognized labels go last, keeping their relative order.
pub fn sort_months(months: &mut [String]) {
    months.sort_by_cached_key(|m| match month_key(m) {
        Some(key) => (0u8, key),
        None => (1u8, MonthKey { year: 0, month: 0 }),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // ========== month_number ==========

    #[test]
    fn test_month_number_portuguese() {
        assert_eq!(month_number("Janeiro"), Some(1));
        assert_eq!(month_number("Março"), Some(3));
        assert_eq!(month_number("marco"), Some(3));
        assert_eq!(month_number("Dezembro"), Some(12));
    }

    #[test]
    fn test_month_number_english_and_abbrev() {
        assert_eq!(month_number("February"), Some(2));
        assert_eq!(month_number("SEP"), Some(9));
        assert_eq!(month_number("Set"), Some(9));
        assert_eq!(month_number("out"), Some(10));
        assert_eq!(month_number("Oct"), Some(10));
    }

    #[test]
    fn test_month_number_unknown() {
        assert_eq!(month_number("Quarter"), None);
        assert_eq!(month_number(""), None);
    }

    // ========== month_key ==========

    #[test]
    fn test_month_key_plain_name() {
        assert_eq!(month_key("Abril"), Some(MonthKey { year: 0, month: 4 }));
    }

    #[test]
    fn test_month_key_name_with_year() {
        assert_eq!(
            month_key("Jan/2025"),
            Some(MonthKey {
                year: 2025,
                month: 1
            })
        );
        assert_eq!(
            month_key("fev 24"),
            Some(MonthKey {
                year: 2024,
                month: 2
            })
        );
        assert_eq!(
            month_key("Março-2024"),
            Some(MonthKey {
                year: 2024,
                month: 3
            })
        );
    }

    #[test]
    fn test_month_key_numeric_forms() {
        assert_eq!(
            month_key("2025-03"),
            Some(MonthKey {
                year: 2025,
                month: 3
            })
        );
        assert_eq!(
            month_key("11/2024"),
            Some(MonthKey {
                year: 2024,
                month: 11
            })
        );
        assert_eq!(month_key("2025-13"), None);
        assert_eq!(month_key("00/2024"), None);
    }

    #[test]
    fn test_month_key_garbage() {
        assert_eq!(month_key("Q1"), None);
        assert_eq!(month_key("Total"), None);
    }

    // ========== sort_months ==========

    #[test]
    fn test_sort_months_chronological() {
        let mut months = labels(&["Março", "Janeiro", "Fevereiro"]);
        sort_months(&mut months);
        assert_eq!(months, labels(&["Janeiro", "Fevereiro", "Março"]));
    }

    #[test]
    fn test_sort_months_across_years() {
        let mut months = labels(&["Jan/2025", "Dez/2024", "Nov/2024"]);
        sort_months(&mut months);
        assert_eq!(months, labels(&["Nov/2024", "Dez/2024", "Jan/2025"]));
    }

    #[test]
    fn test_sort_months_unknown_last_stable() {
        let mut months = labels(&["Zeta", "Maio", "Alpha", "Abril"]);
        sort_months(&mut months);
        assert_eq!(months, labels(&["Abril", "Maio", "Zeta", "Alpha"]));
    }

    #[test]
    fn test_sort_months_yearless_before_dated() {
        let mut months = labels(&["Jan/2025", "Dezembro"]);
        sort_months(&mut months);
        assert_eq!(months, labels(&["Dezembro", "Jan/2025"]));
    }
}
