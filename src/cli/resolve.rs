use std::path::Path;

use console::style;

use crate::cli::commands::ResolveArgs;
use crate::config::load_config;
use crate::errors::GateError;
use crate::models::EnvironmentProfile;
use crate::utils::formatting::format_cost;

pub async fn handle_resolve(args: ResolveArgs) -> Result<(), GateError> {
    let config = load_config(args.config.as_deref().map(Path::new)).await?;
    let trigger = args.trigger.to_trigger()?;
    let profile = config.resolver()?.resolve(&trigger)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        println!("{}", render_profile(&profile));
    }
    Ok(())
}

pub fn render_profile(profile: &EnvironmentProfile) -> String {
    let rows = [
        ("budget", format!("{} / month", format_cost(profile.budget_limit))),
        ("scan policy", profile.scan_policy.as_str().to_string()),
        ("enforcement", profile.enforcement.as_str().to_string()),
        ("rate limit", format!("{} req / 5 min", profile.rate_limit)),
        ("replication", profile.replication_enabled.to_string()),
        ("fail fast", profile.fail_fast.to_string()),
    ];
    let mut out = format!("{} {}", style("Environment:").bold(), style(profile.name).cyan().bold());
    for (label, value) in rows {
        out.push_str(&format!("\n  {:<12} {}", style(label).dim(), value));
    }
    out
}
