//! Cost types for spreadsheet spend data

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Service label that marks a provider's monthly total row
pub const TOTAL_SERVICE: &str = "Total";

/// A single parsed spreadsheet row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostRow {
    pub month: String,
    pub provider: String,
    pub service: String,
    pub cost: f64,
}

impl CostRow {
    pub fn new(
        month: impl Into<String>,
        provider: impl Into<String>,
        service: impl Into<String>,
        cost: f64,
    ) -> Self {
        Self {
            month: month.into(),
            provider: provider.into(),
            service: service.into(),
            cost,
        }
    }

    /// Whether this row carries the provider's total for the month
    pub fn is_provider_total(&self) -> bool {
        self.service == TOTAL_SERVICE
    }
}

/// Month selection applied to filtered views
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MonthFilter {
    #[default]
    All,
    Month(String),
}

impl MonthFilter {
    /// Build a filter from user input ("all" is case-insensitive)
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Month(trimmed.to_string())
        }
    }

    pub fn matches(&self, month: &str) -> bool {
        match self {
            Self::All => true,
            Self::Month(m) => m == month,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => "All months",
            Self::Month(m) => m,
        }
    }
}

impl fmt::Display for MonthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Month(m) => write!(f, "{}", m),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotal {
    pub month: String,
    pub total: f64,
}

/// Transformed dataset backing every dashboard view
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostsData {
    /// Distinct month labels in chronological order
    pub unique_months: Vec<String>,
    /// Distinct providers in first-appearance order
    pub unique_providers: Vec<String>,
    /// One entry per unique month, summed from provider total rows
    pub monthly_totals: Vec<MonthlyTotal>,
    /// Per-service rows (everything except total rows)
    pub detailed_costs: Vec<CostRow>,
    /// Provider total rows
    pub provider_totals_rows: Vec<CostRow>,
    pub fetched_at: DateTime<Utc>,
}

impl CostsData {
    pub fn first_month(&self) -> Option<&str> {
        self.unique_months.first().map(String::as_str)
    }

    pub fn last_month(&self) -> Option<&str> {
        self.unique_months.last().map(String::as_str)
    }

    pub fn has_month(&self, month: &str) -> bool {
        self.unique_months.iter().any(|m| m == month)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderTotal {
    pub provider: String,
    pub total: f64,
}

/// Leading providers and their combined cost
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopProviders {
    pub providers: Vec<ProviderTotal>,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCost {
    pub service: String,
    pub cost: f64,
}

/// Service distribution for one provider
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderServices {
    pub provider: String,
    pub services: Vec<ServiceCost>,
    pub total: f64,
}

impl ProviderServices {
    pub fn new(provider: String, services: Vec<ServiceCost>) -> Self {
        let total = services.iter().map(|s| s.cost).sum();
        Self {
            provider,
            services,
            total,
        }
    }
}

/// One month of the cost-by-provider pivot
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostTrendPoint {
    pub month: String,
    /// (provider, cost) in unique-provider order
    pub costs: Vec<(String, f64)>,
}

impl CostTrendPoint {
    pub fn cost_for(&self, provider: &str) -> Option<f64> {
        self.costs
            .iter()
            .find(|(p, _)| p == provider)
            .map(|(_, c)| *c)
    }
}

/// Row of the provider × month breakdown table
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownRow {
    pub provider: String,
    /// Cost per month, aligned with `CostsData::unique_months`
    pub months: Vec<f64>,
    pub total: f64,
}

/// Headline metrics shown on the overview cards
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub total_cost: f64,
    pub avg_monthly_cost: f64,
    pub growth_pct: f64,
    pub provider_count: usize,
    pub providers: Vec<String>,
    pub first_month: Option<String>,
    pub last_month: Option<String>,
}
