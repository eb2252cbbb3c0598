use std::path::Path;

use console::style;

use crate::cli::commands::EstimateArgs;
use crate::config::load_config;
use crate::cost::CostGateOutcome;
use crate::errors::GateError;
use crate::utils::formatting::format_cost;

/// Returns whether the estimate is within budget.
pub async fn handle_estimate(args: EstimateArgs) -> Result<bool, GateError> {
    let config = load_config(args.config.as_deref().map(Path::new)).await?;
    let trigger = args.trigger.to_trigger()?;
    let profile = config.resolver()?.resolve(&trigger)?;

    let items = config.cost_model().line_items_for(&profile);
    let outcome = config.estimator()?.estimate(&items, &profile);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", render_estimate(&outcome));
    }
    Ok(outcome.result.passed)
}

pub fn render_estimate(outcome: &CostGateOutcome) -> String {
    let mut out = String::new();
    for item in &outcome.report.items {
        out.push_str(&format!("  {:<20} {:>12}\n", item.component, format_cost(item.monthly_cost)));
    }
    out.push_str(&format!(
        "  {:<20} {:>12}\n  {:<20} {:>12}\n  {:<20} {:>12}\n",
        "Total",
        format_cost(outcome.report.total),
        "Annual",
        format_cost(outcome.report.annual_total),
        "Budget",
        format_cost(outcome.budget_limit),
    ));
    for e in outcome.result.errors() {
        out.push_str(&format!("  {} {}\n", style(&e.error_type).red(), e.message));
    }
    let verdict = if outcome.result.passed {
        style("within budget").green().bold()
    } else if outcome.severe_overage {
        style("severe overage").red().bold()
    } else {
        style("over budget").red().bold()
    };
    out.push_str(&format!("\n{} {}", style("Result:").bold(), verdict));
    out
}
