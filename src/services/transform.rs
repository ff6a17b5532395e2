//! Reshape parsed sheet rows into the dashboard dataset

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use super::month_order::sort_months;
use crate::types::{CostRow, CostsData, MonthlyTotal};

/// Collect distinct values preserving first appearance
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut result = Vec::new();
    for v in values {
        if seen.insert(v) {
            result.push(v.to_string());
        }
    }
    result
}

/// Build `CostsData` from parsed rows.
///
/// Months are sorted chronologically, providers keep first-appearance order,
/// and monthly totals come only from provider `Total` rows.
pub fn transform(rows: Vec<CostRow>, fetched_at: DateTime<Utc>) -> CostsData {
    let mut unique_months = distinct(rows.iter().map(|r| r.month.as_str()));
    sort_months(&mut unique_months);

    let unique_providers = distinct(rows.iter().map(|r| r.provider.as_str()));

    let (provider_totals_rows, detailed_costs): (Vec<CostRow>, Vec<CostRow>) =
        rows.into_iter().partition(CostRow::is_provider_total);

    let monthly_totals = unique_months
        .iter()
        .map(|month| MonthlyTotal {
            month: month.clone(),
            total: provider_totals_rows
                .iter()
                .filter(|r| &r.month == month)
                .map(|r| r.cost)
                .sum(),
        })
        .collect();

    CostsData {
        unique_months,
        unique_providers,
        monthly_totals,
        detailed_costs,
        provider_totals_rows,
        fetched_at,
    }
}
