use std::path::PathBuf;

use console::style;
use tracing::debug;

use crate::cli::commands::ValidateArgs;
use crate::config::parse_config;
use crate::errors::GateError;

pub async fn handle_validate(args: ValidateArgs) -> Result<(), GateError> {
    let path = PathBuf::from(&args.config);
    let config = parse_config(&path).await?;

    // Build every derived component so invalid overrides surface here too.
    let catalog = config.profile_catalog()?;
    let estimator = config.estimator()?;
    let rules = config.rules();
    let components = config.cost_model().components.len();
    debug!(
        profiles = catalog.iter().count(),
        severe_overage_pct = %estimator.severe_overage_pct(),
        "Configuration components built"
    );

    println!(
        "{} Configuration is valid: {} ({} rules, {} cost components, default branch '{}')",
        style("✓").green(),
        args.config,
        rules.len(),
        components,
        config.default_branch(),
    );
    Ok(())
}
