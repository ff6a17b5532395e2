//! Aggregator service for computing the dashboard's derived views

use rayon::prelude::*;
use std::collections::HashMap;

use crate::types::{
    BreakdownRow, CostRow, CostTrendPoint, CostsData, Kpis, MonthFilter, ProviderServices,
    ProviderTotal, ServiceCost, TopProviders,
};

/// Default number of providers on the top-providers chart
pub const DEFAULT_TOP_N: usize = 3;

/// Aggregator for computing cost views
pub struct Aggregator;

impl Aggregator {
    /// Detail rows matching the month filter (input order)
    pub fn filtered_details<'a>(data: &'a CostsData, filter: &MonthFilter) -> Vec<&'a CostRow> {
        data.detailed_costs
            .iter()
            .filter(|r| filter.matches(&r.month))
            .collect()
    }

    /// Monthly totals as (month, total) points, chronological
    pub fn monthly_trend(data: &CostsData) -> Vec<(String, f64)> {
        data.monthly_totals
            .iter()
            .map(|m| (m.month.clone(), m.total))
            .collect()
    }

    /// Per-provider totals from Total rows (sorted by total descending).
    ///
    /// Every provider with a Total row is listed, even when the filter
    /// excludes all of its rows.
    pub fn provider_totals(data: &CostsData, filter: &MonthFilter) -> Vec<ProviderTotal> {
        let mut order: Vec<&str> = Vec::new();
        let mut totals: HashMap<&str, f64> = HashMap::new();

        for row in &data.provider_totals_rows {
            let total = totals.entry(row.provider.as_str()).or_insert_with(|| {
                order.push(row.provider.as_str());
                0.0
            });
            if filter.matches(&row.month) {
                *total += row.cost;
            }
        }

        let mut result: Vec<ProviderTotal> = order
            .into_iter()
            .map(|provider| ProviderTotal {
                provider: provider.to_string(),
                total: totals.get(provider).copied().unwrap_or(0.0),
            })
            .collect();

        // Stable sort keeps first-appearance order on ties (NaN-safe)
        result.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        result
    }

    /// First `n` providers of an already sorted total list
    pub fn top_providers(totals: &[ProviderTotal], n: usize) -> TopProviders {
        let providers: Vec<ProviderTotal> = totals.iter().take(n).cloned().collect();
        let total = providers.iter().map(|p| p.total).sum();
        TopProviders { providers, total }
    }

    /// Service costs of one provider, summed per service in first-appearance order.
    /// Total rows never contribute.
    pub fn provider_services(
        data: &CostsData,
        provider: &str,
        filter: &MonthFilter,
    ) -> Vec<ServiceCost> {
        let mut services: Vec<ServiceCost> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for row in data
            .detailed_costs
            .iter()
            .filter(|r| r.provider == provider && filter.matches(&r.month))
            .filter(|r| !r.is_provider_total())
        {
            match index.get(row.service.as_str()) {
                Some(&i) => services[i].cost += row.cost,
                None => {
                    index.insert(row.service.as_str(), services.len());
                    services.push(ServiceCost {
                        service: row.service.clone(),
                        cost: row.cost,
                    });
                }
            }
        }

        services
    }

    /// Service distribution for every provider, in unique-provider order.
    /// Providers without service rows are omitted.
    pub fn services_by_provider(data: &CostsData, filter: &MonthFilter) -> Vec<ProviderServices> {
        data.unique_providers
            .par_iter()
            .map(|provider| {
                ProviderServices::new(
                    provider.clone(),
                    Self::provider_services(data, provider, filter),
                )
            })
            .filter(|ps| !ps.services.is_empty())
            .collect()
    }

    /// Sum Total rows into provider → month → cost
    fn totals_by_provider_month(data: &CostsData) -> HashMap<(&str, &str), f64> {
        let mut map: HashMap<(&str, &str), f64> = HashMap::new();
        for row in &data.provider_totals_rows {
            *map.entry((row.provider.as_str(), row.month.as_str()))
                .or_insert(0.0) += row.cost;
        }
        map
    }

    /// Providers that have at least one Total row, in unique-provider order
    fn providers_with_totals(data: &CostsData) -> Vec<&str> {
        data.unique_providers
            .iter()
            .map(String::as_str)
            .filter(|p| data.provider_totals_rows.iter().any(|r| r.provider == *p))
            .collect()
    }

    /// Pivot: one point per month with each provider's total cost
    pub fn cost_trend(data: &CostsData) -> Vec<CostTrendPoint> {
        let totals = Self::totals_by_provider_month(data);

        data.unique_months
            .iter()
            .map(|month| CostTrendPoint {
                month: month.clone(),
                costs: data
                    .unique_providers
                    .iter()
                    .filter_map(|provider| {
                        totals
                            .get(&(provider.as_str(), month.as_str()))
                            .map(|cost| (provider.clone(), *cost))
                    })
                    .collect(),
            })
            .collect()
    }

    /// Provider × month table with row totals, sorted by total descending
    pub fn breakdown_table(data: &CostsData) -> Vec<BreakdownRow> {
        let totals = Self::totals_by_provider_month(data);

        let mut rows: Vec<BreakdownRow> = Self::providers_with_totals(data)
            .into_iter()
            .map(|provider| {
                let months: Vec<f64> = data
                    .unique_months
                    .iter()
                    .map(|month| {
                        totals
                            .get(&(provider, month.as_str()))
                            .copied()
                            .unwrap_or(0.0)
                    })
                    .collect();
                let total = months.iter().sum();
                BreakdownRow {
                    provider: provider.to_string(),
                    months,
                    total,
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        rows
    }

    /// Total spend for the filter (unknown month → 0)
    pub fn total_cost(data: &CostsData, filter: &MonthFilter) -> f64 {
        match filter {
            MonthFilter::All => data.monthly_totals.iter().map(|m| m.total).sum(),
            MonthFilter::Month(month) => data
                .monthly_totals
                .iter()
                .find(|m| &m.month == month)
                .map(|m| m.total)
                .unwrap_or(0.0),
        }
    }

    /// Mean of monthly totals (0 with no months)
    pub fn avg_monthly_cost(data: &CostsData) -> f64 {
        if data.monthly_totals.is_empty() {
            return 0.0;
        }
        let sum: f64 = data.monthly_totals.iter().map(|m| m.total).sum();
        sum / data.monthly_totals.len() as f64
    }

    /// Percent change from the first to the last month.
    /// 0 with fewer than two months or a zero first month.
    pub fn monthly_growth(data: &CostsData) -> f64 {
        let (first, last) = match (data.monthly_totals.first(), data.monthly_totals.last()) {
            (Some(first), Some(last)) if data.monthly_totals.len() >= 2 => {
                (first.total, last.total)
            }
            _ => return 0.0,
        };
        if first == 0.0 {
            return 0.0;
        }
        (last - first) / first * 100.0
    }

    /// Headline metrics for the overview cards
    pub fn kpis(data: &CostsData, filter: &MonthFilter) -> Kpis {
        Kpis {
            total_cost: Self::total_cost(data, filter),
            avg_monthly_cost: Self::avg_monthly_cost(data),
            growth_pct: Self::monthly_growth(data),
            provider_count: data.unique_providers.len(),
            providers: data.unique_providers.clone(),
            first_month: data.first_month().map(String::from),
            last_month: data.last_month().map(String::from),
        }
    }
}
