use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, warn};

use super::schema::CONFIG_SCHEMA;
use super::types::{config_amount, GateConfig};
use crate::errors::GateError;
use crate::models::EnvironmentName;

const MAX_CONFIG_BYTES: u64 = 1_048_576;

pub async fn parse_config(path: &Path) -> Result<GateConfig, GateError> {
    if !path.exists() {
        return Err(GateError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > MAX_CONFIG_BYTES {
        return Err(GateError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    let config = parse_config_str(&content)?;
    debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Load `path` when given, otherwise fall back to built-in defaults.
pub async fn load_config(path: Option<&Path>) -> Result<GateConfig, GateError> {
    match path {
        Some(p) => parse_config(p).await,
        None => Ok(GateConfig::default()),
    }
}

pub fn parse_config_str(content: &str) -> Result<GateConfig, GateError> {
    if content.len() as u64 > MAX_CONFIG_BYTES {
        return Err(GateError::Config("Config file exceeds 1MB limit".into()));
    }

    let yaml: serde_yaml::Value = serde_yaml::from_str(content)
        .map_err(|e| GateError::Config(format!("Config is not valid YAML: {}", e)))?;
    // An empty document means "all defaults".
    if yaml.is_null() {
        return Ok(GateConfig::default());
    }

    validate_schema(&yaml)?;

    let config: GateConfig = serde_yaml::from_value(yaml)
        .map_err(|e| GateError::Config(format!("Config structure error: {}", e)))?;

    validate_conflicts(&config)?;

    Ok(config)
}

/// Validate config against the JSON schema for structural correctness.
/// Violations are logged as warnings; typed parsing decides what is fatal.
fn validate_schema(yaml: &serde_yaml::Value) -> Result<(), GateError> {
    let json_value = serde_json::to_value(yaml)
        .map_err(|e| GateError::Config(format!("Config conversion error: {}", e)))?;

    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| GateError::Config(format!("Schema compilation error: {}", e)))?;

    if let Err(errors) = compiled.validate(&json_value) {
        for e in errors {
            warn!(validation_error = %format!("{} at {}", e, e.instance_path), "Config schema warning");
        }
    }

    Ok(())
}

/// Detect semantic conflicts in the parsed configuration.
pub fn validate_conflicts(config: &GateConfig) -> Result<(), GateError> {
    if config.default_branch.as_deref().is_some_and(|b| b.trim().is_empty()) {
        return Err(GateError::Config("default_branch must not be empty".into()));
    }

    if let Some(ref envs) = config.environments {
        for name in EnvironmentName::ALL {
            if let Some(budget) = envs.get(name).and_then(|o| o.budget_limit.as_ref()) {
                config_amount(budget, &format!("environments.{}.budget_limit", name))?;
            }
        }
    }

    if let Some(tools) = config.scan.as_ref().and_then(|s| s.required_tools.as_ref()) {
        if tools.is_empty() {
            warn!("scan.required_tools is empty; the scan gate will fail with no scanner output");
        }
    }

    if let Some(ref cost) = config.cost {
        if let Some(ref pct) = cost.severe_overage_pct {
            config_amount(pct, "cost.severe_overage_pct")?;
        }
        if let Some(ref components) = cost.components {
            let mut seen = HashSet::new();
            for c in components {
                if !seen.insert(c.component.as_str()) {
                    return Err(GateError::Config(format!(
                        "Duplicate cost component '{}'",
                        c.component
                    )));
                }
                // Bad component amounts are reported by the cost gate at run time.
                if let Err(e) = c.monthly_cost.to_decimal(&c.component) {
                    warn!(component = %c.component, error = %e, "Cost component amount will fail the cost gate");
                }
            }
        }
    }

    if let Some(rules) = config.policy.as_ref().and_then(|p| p.rules.as_ref()) {
        let mut seen = HashSet::new();
        for rule in rules {
            if rule.rule_id.trim().is_empty() {
                return Err(GateError::Config("Policy rule with empty rule_id".into()));
            }
            if !seen.insert(rule.rule_id.as_str()) {
                return Err(GateError::Config(format!("Duplicate policy rule id '{}'", rule.rule_id)));
            }
            rule.predicate.validate().map_err(|e| {
                GateError::Config(format!("Policy rule '{}': {}", rule.rule_id, e))
            })?;
        }
    }

    Ok(())
}
