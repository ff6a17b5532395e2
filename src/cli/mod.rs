use std::fmt::Write as _;

use clap::{Parser, Subcommand};
use serde_json::json;

use crate::config::{app_dir, Config};
use crate::logging;
use crate::services::{to_csv, Aggregator, Summarizer};
use crate::tui::widgets::overview::{format_cost, format_growth};
use crate::types::{CloudcostError, CostRow, CostsData, MonthFilter, ProviderServices};

/// Cloud spend dashboard for spreadsheet cost reports
#[derive(Parser)]
#[command(name = "cloudcost")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Read costs from a local CSV/JSON export (file or glob) instead of Google Sheets
    #[arg(long, global = true, value_name = "PATH")]
    input: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Launch interactive TUI (default)
    Tui,

    /// Show headline metrics
    Summary {
        /// Month to total (defaults to all months)
        #[arg(long)]
        month: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show cost per provider
    Providers {
        #[arg(long)]
        month: Option<String>,
        /// Only the N most expensive providers
        #[arg(long)]
        top: Option<usize>,
        #[arg(long)]
        json: bool,
    },

    /// Show the service breakdown of one provider
    Services {
        #[arg(long)]
        provider: String,
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        json: bool,
    },

    /// Show monthly totals and cost by provider per month
    Trend {
        #[arg(long)]
        json: bool,
    },

    /// Show the provider × month breakdown table
    Table {
        #[arg(long)]
        json: bool,
    },

    /// Print detail rows as CSV
    Export {
        #[arg(long)]
        month: Option<String>,
    },

    /// Generate an AI summary of the cost data
    Insights,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let (config, command) = self.prepare(Config::load);

        match command {
            None | Some(Commands::Tui) => crate::tui::run(config),
            Some(command) => {
                let output = command.execute(&config)?;
                print!("{}", output);
                Ok(())
            }
        }
    }

    /// Install logging, then load the configuration so its warnings are recorded
    fn prepare(self, load: impl FnOnce() -> Config) -> (Config, Option<Commands>) {
        match self.command {
            None | Some(Commands::Tui) => {
                if let Some(dir) = app_dir() {
                    logging::init_file(&dir);
                }
            }
            Some(_) => logging::init_stderr(),
        }

        let config = load().with_input(self.input);
        (config, self.command)
    }
}

impl Commands {
    /// Load the dataset and render this command's output
    fn execute(self, config: &Config) -> anyhow::Result<String> {
        if self == Commands::Insights {
            // Fail on missing credentials before fetching anything
            let client = config.summarizer()?;
            let data = config.source()?.load()?;
            let rows: Vec<CostRow> = data.detailed_costs;
            tracing::info!(rows = rows.len(), "requesting insights");
            let mut text = client.summarize(&to_csv(&rows))?;
            if !text.ends_with('\n') {
                text.push('\n');
            }
            return Ok(text);
        }

        let data = config.source()?.load()?;
        Ok(self.render(&data, config.top_n)?)
    }

    /// Render output for an already loaded dataset
    fn render(self, data: &CostsData, top_n: usize) -> Result<String, CloudcostError> {
        match self {
            Commands::Summary { month, json } => {
                let filter = resolve_month(data, month.as_deref())?;
                render_summary(data, &filter, json)
            }
            Commands::Providers { month, top, json } => {
                let filter = resolve_month(data, month.as_deref())?;
                render_providers(data, &filter, top, top_n, json)
            }
            Commands::Services {
                provider,
                month,
                json,
            } => {
                let filter = resolve_month(data, month.as_deref())?;
                render_services(data, &provider, &filter, json)
            }
            Commands::Trend { json } => render_trend(data, json),
            Commands::Table { json } => render_table(data, json),
            Commands::Export { month } => {
                let filter = resolve_month(data, month.as_deref())?;
                let rows: Vec<CostRow> = Aggregator::filtered_details(data, &filter)
                    .into_iter()
                    .cloned()
                    .collect();
                let mut csv = to_csv(&rows);
                csv.push_str("\r\n");
                Ok(csv)
            }
            Commands::Tui | Commands::Insights => Ok(String::new()),
        }
    }
}

/// Turn a `--month` argument into a filter, rejecting unknown months
fn resolve_month(data: &CostsData, month: Option<&str>) -> Result<MonthFilter, CloudcostError> {
    let filter = month.map(MonthFilter::parse).unwrap_or_default();
    match &filter {
        MonthFilter::Month(m) if !data.has_month(m) => Err(CloudcostError::Config(format!(
            "unknown month '{}' (available: {})",
            m,
            data.unique_months.join(", ")
        ))),
        _ => Ok(filter),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, CloudcostError> {
    serde_json::to_string_pretty(value)
        .map(|s| s + "\n")
        .map_err(|e| CloudcostError::Parse(format!("failed to serialize output: {}", e)))
}

fn render_summary(
    data: &CostsData,
    filter: &MonthFilter,
    json: bool,
) -> Result<String, CloudcostError> {
    let kpis = Aggregator::kpis(data, filter);
    if json {
        return to_json(&json!({
            "filter": filter.to_string(),
            "kpis": kpis,
        }));
    }

    let period = match (&kpis.first_month, &kpis.last_month) {
        (Some(first), Some(last)) => format!("{} → {}", first, last),
        _ => "-".to_string(),
    };

    let mut out = String::new();
    let _ = writeln!(out, "Total spend ({}): {}", filter.label(), format_cost(kpis.total_cost));
    let _ = writeln!(out, "Average per month:  {}", format_cost(kpis.avg_monthly_cost));
    let _ = writeln!(out, "Growth ({}): {}", period, format_growth(kpis.growth_pct));
    let _ = writeln!(
        out,
        "Providers:          {} ({})",
        kpis.provider_count,
        kpis.providers.join(", ")
    );
    Ok(out)
}

fn render_providers(
    data: &CostsData,
    filter: &MonthFilter,
    top: Option<usize>,
    default_top: usize,
    json: bool,
) -> Result<String, CloudcostError> {
    let totals = Aggregator::provider_totals(data, filter);
    let shown = match top {
        Some(n) => Aggregator::top_providers(&totals, n).providers,
        None => totals,
    };

    if json {
        return to_json(&shown);
    }

    let mut out = String::new();
    let _ = writeln!(out, "{:<24} {:>14}", "Provider", "Cost");
    for total in &shown {
        let _ = writeln!(out, "{:<24} {:>14}", total.provider, format_cost(total.total));
    }
    let top = Aggregator::top_providers(&shown, top.unwrap_or(default_top));
    let _ = writeln!(
        out,
        "Top {} combined ({}): {}",
        top.providers.len(),
        filter.label(),
        format_cost(top.total)
    );
    Ok(out)
}

fn render_services(
    data: &CostsData,
    provider: &str,
    filter: &MonthFilter,
    json: bool,
) -> Result<String, CloudcostError> {
    if !data.unique_providers.iter().any(|p| p == provider) {
        return Err(CloudcostError::Config(format!(
            "unknown provider '{}' (available: {})",
            provider,
            data.unique_providers.join(", ")
        )));
    }

    let breakdown = ProviderServices::new(
        provider.to_string(),
        Aggregator::provider_services(data, provider, filter),
    );
    if json {
        return to_json(&breakdown);
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} · {}: {}",
        breakdown.provider,
        filter.label(),
        format_cost(breakdown.total)
    );
    for service in &breakdown.services {
        let pct = if breakdown.total > 0.0 {
            service.cost / breakdown.total * 100.0
        } else {
            0.0
        };
        let _ = writeln!(
            out,
            "  {:<24} {:>14} {:>6.1}%",
            service.service,
            format_cost(service.cost),
            pct
        );
    }
    Ok(out)
}

fn render_trend(data: &CostsData, json: bool) -> Result<String, CloudcostError> {
    let monthly = Aggregator::monthly_trend(data);
    let trend = Aggregator::cost_trend(data);

    if json {
        let monthly: Vec<_> = monthly
            .iter()
            .map(|(month, total)| json!({ "month": month, "total": total }))
            .collect();
        let by_provider: Vec<_> = trend
            .iter()
            .map(|point| {
                let costs: serde_json::Map<String, serde_json::Value> = point
                    .costs
                    .iter()
                    .map(|(provider, cost)| (provider.clone(), json!(cost)))
                    .collect();
                json!({ "month": point.month, "costs": costs })
            })
            .collect();
        return to_json(&json!({ "monthlyTotals": monthly, "costByProvider": by_provider }));
    }

    let mut out = String::new();
    let _ = write!(out, "{:<14} {:>14}", "Month", "Total");
    for provider in &data.unique_providers {
        let _ = write!(out, " {:>14}", provider);
    }
    out.push('\n');
    for ((month, total), point) in monthly.iter().zip(&trend) {
        let _ = write!(out, "{:<14} {:>14}", month, format_cost(*total));
        for provider in &data.unique_providers {
            let cost = point.cost_for(provider).unwrap_or(0.0);
            let _ = write!(out, " {:>14}", format_cost(cost));
        }
        out.push('\n');
    }
    Ok(out)
}

fn render_table(data: &CostsData, json: bool) -> Result<String, CloudcostError> {
    let rows = Aggregator::breakdown_table(data);

    if json {
        return to_json(&json!({ "months": data.unique_months, "rows": rows }));
    }

    let mut out = String::new();
    let _ = write!(out, "{:<20}", "Provider");
    for month in &data.unique_months {
        let _ = write!(out, " {:>13}", month);
    }
    let _ = writeln!(out, " {:>13}", "Total");

    for row in &rows {
        let _ = write!(out, "{:<20}", row.provider);
        for cost in &row.months {
            let _ = write!(out, " {:>13}", format_cost(*cost));
        }
        let _ = writeln!(out, " {:>13}", format_cost(row.total));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::transform;
    use chrono::Utc;

    fn sample_data() -> CostsData {
        transform(
            vec![
                CostRow::new("Janeiro", "AWS", "S3", 30.0),
                CostRow::new("Janeiro", "AWS", "RDS", 20.0),
                CostRow::new("Janeiro", "AWS", "Total", 50.0),
                CostRow::new("Janeiro", "Heroku", "Dynos", 10.0),
                CostRow::new("Janeiro", "Heroku", "Total", 10.0),
                CostRow::new("Fevereiro", "AWS", "S3", 60.0),
                CostRow::new("Fevereiro", "AWS", "Total", 60.0),
                CostRow::new("Fevereiro", "Heroku", "Dynos", 15.0),
                CostRow::new("Fevereiro", "Heroku", "Total", 15.0),
            ],
            Utc::now(),
        )
    }

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::try_parse_from(["cloudcost"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.input.is_none());
    }

    #[test]
    fn test_cli_parse_summary() {
        let cli = Cli::try_parse_from(["cloudcost", "summary", "--month", "Janeiro", "--json"])
            .unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Summary {
                month: Some("Janeiro".into()),
                json: true
            })
        );
    }

    #[test]
    fn test_cli_parse_global_input_after_subcommand() {
        let cli =
            Cli::try_parse_from(["cloudcost", "table", "--input", "costs.csv"]).unwrap();
        assert_eq!(cli.input.as_deref(), Some("costs.csv"));
        assert_eq!(cli.command, Some(Commands::Table { json: false }));
    }

    #[test]
    fn test_cli_services_requires_provider() {
        assert!(Cli::try_parse_from(["cloudcost", "services"]).is_err());
    }

    #[test]
    fn test_cli_parse_providers_top() {
        let cli = Cli::try_parse_from(["cloudcost", "providers", "--top", "2"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Providers {
                month: None,
                top: Some(2),
                json: false
            })
        );
    }

    #[test]
    fn test_prepare_installs_logging_before_loading_config() {
        let cli = Cli::try_parse_from(["cloudcost", "table", "--input", "costs.csv"]).unwrap();
        let (config, command) = cli.prepare(|| {
            assert!(tracing::dispatcher::has_been_set());
            Config::default()
        });
        assert_eq!(config.input.as_deref(), Some("costs.csv"));
        assert_eq!(command, Some(Commands::Table { json: false }));
    }

    #[test]
    fn test_resolve_month() {
        let data = sample_data();
        assert_eq!(resolve_month(&data, None).unwrap(), MonthFilter::All);
        assert_eq!(resolve_month(&data, Some("all")).unwrap(), MonthFilter::All);
        assert_eq!(
            resolve_month(&data, Some("Fevereiro")).unwrap(),
            MonthFilter::Month("Fevereiro".into())
        );
    }

    #[test]
    fn test_resolve_unknown_month_lists_available() {
        let data = sample_data();
        let err = resolve_month(&data, Some("Maio")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Maio"));
        assert!(message.contains("Janeiro, Fevereiro"));
    }

    #[test]
    fn test_render_summary_text() {
        let data = sample_data();
        let out = render_summary(&data, &MonthFilter::All, false).unwrap();
        assert!(out.contains("Total spend (All months): $135.00"));
        assert!(out.contains("$67.50"));
        assert!(out.contains("+25.0%"));
    }

    #[test]
    fn test_render_summary_json() {
        let data = sample_data();
        let filter = MonthFilter::Month("Janeiro".into());
        let out = render_summary(&data, &filter, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["filter"], "Janeiro");
        assert!((value["kpis"]["totalCost"].as_f64().unwrap() - 60.0).abs() < 1e-9);
        assert_eq!(value["kpis"]["providerCount"], 2);
        assert!(value["kpis"].get("total_cost").is_none());
    }

    #[test]
    fn test_render_providers_top() {
        let data = sample_data();
        let out = render_providers(&data, &MonthFilter::All, Some(1), 3, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let list = value.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["provider"], "AWS");
    }

    #[test]
    fn test_render_providers_text() {
        let data = sample_data();
        let out = render_providers(&data, &MonthFilter::All, None, 3, false).unwrap();
        assert!(out.contains("AWS"));
        assert!(out.contains("$110.00"));
        assert!(out.contains("Top 2 combined (All months): $135.00"));
    }

    #[test]
    fn test_render_services() {
        let data = sample_data();
        let out = render_services(&data, "AWS", &MonthFilter::All, false).unwrap();
        assert!(out.contains("AWS · All months: $110.00"));
        assert!(out.contains("S3"));
        assert!(out.contains("81.8%"));
    }

    #[test]
    fn test_render_services_unknown_provider() {
        let data = sample_data();
        let err = render_services(&data, "Azure", &MonthFilter::All, false).unwrap_err();
        assert!(matches!(err, CloudcostError::Config(_)));
    }

    #[test]
    fn test_render_trend_json() {
        let data = sample_data();
        let out = render_trend(&data, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["monthlyTotals"][0]["month"], "Janeiro");
        assert!((value["costByProvider"][1]["costs"]["AWS"].as_f64().unwrap() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_render_table_text() {
        let data = sample_data();
        let out = render_table(&data, false).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Provider"));
        assert!(lines[1].starts_with("AWS"));
        assert!(lines[1].ends_with("$110.00"));
    }

    #[test]
    fn test_render_export_filters_month() {
        let data = sample_data();
        let out = Commands::Export {
            month: Some("Fevereiro".into()),
        }
        .render(&data, 3)
        .unwrap();
        assert!(out.starts_with("month,provider,service,cost\r\n"));
        assert_eq!(out.matches("\r\n").count(), 3);
        assert!(!out.contains("Janeiro"));
    }
}
