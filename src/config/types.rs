use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cost::{Amount, ComponentCost, CostEstimator, CostModel, DEFAULT_SEVERE_OVERAGE_PCT};
use crate::environment::{EnvironmentResolver, ProfileCatalog};
use crate::environment::resolver::DEFAULT_BRANCH;
use crate::errors::GateError;
use crate::models::{Enforcement, EnvironmentName, EnvironmentProfile, ScanPolicy, ScanTool};
use crate::policy::{default_rules, PolicyRule};

/// Contents of `deploygate.yaml`. Every section is optional.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct GateConfig {
    pub default_branch: Option<String>,
    pub environments: Option<EnvironmentsConfig>,
    pub scan: Option<ScanConfig>,
    pub cost: Option<CostConfig>,
    pub policy: Option<PolicyConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct EnvironmentsConfig {
    pub dev: Option<ProfileOverride>,
    pub staging: Option<ProfileOverride>,
    pub prod: Option<ProfileOverride>,
}

impl EnvironmentsConfig {
    pub fn get(&self, name: EnvironmentName) -> Option<&ProfileOverride> {
        match name {
            EnvironmentName::Dev => self.dev.as_ref(),
            EnvironmentName::Staging => self.staging.as_ref(),
            EnvironmentName::Prod => self.prod.as_ref(),
        }
    }
}

/// Fields replacing the built-in profile of one environment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProfileOverride {
    pub budget_limit: Option<Amount>,
    pub scan_policy: Option<ScanPolicy>,
    pub enforcement: Option<Enforcement>,
    pub rate_limit: Option<u32>,
    pub replication_enabled: Option<bool>,
    pub fail_fast: Option<bool>,
}

impl ProfileOverride {
    pub fn apply(&self, mut profile: EnvironmentProfile) -> Result<EnvironmentProfile, GateError> {
        if let Some(ref budget) = self.budget_limit {
            profile.budget_limit =
                config_amount(budget, &format!("environments.{}.budget_limit", profile.name))?;
        }
        if let Some(policy) = self.scan_policy {
            profile.scan_policy = policy;
        }
        if let Some(enforcement) = self.enforcement {
            profile.enforcement = enforcement;
        }
        if let Some(rate_limit) = self.rate_limit {
            profile.rate_limit = rate_limit;
        }
        if let Some(replication) = self.replication_enabled {
            profile.replication_enabled = replication;
        }
        if let Some(fail_fast) = self.fail_fast {
            profile.fail_fast = fail_fast;
        }
        Ok(profile)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ScanConfig {
    pub required_tools: Option<Vec<ScanTool>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CostConfig {
    pub severe_overage_pct: Option<Amount>,
    pub components: Option<Vec<ComponentCost>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct PolicyConfig {
    pub rules: Option<Vec<PolicyRule>>,
    /// Keep the built-in rules ahead of `rules` instead of replacing them.
    #[serde(default)]
    pub include_defaults: bool,
}

/// Amounts in configuration are errors of the configuration, not of a gate.
pub(crate) fn config_amount(amount: &Amount, field: &str) -> Result<Decimal, GateError> {
    amount.to_decimal(field).map_err(|e| match e {
        GateError::MalformedCostInput(msg) => GateError::Config(format!("Invalid amount for {}", msg)),
        other => other,
    })
}

impl GateConfig {
    pub fn default_branch(&self) -> &str {
        self.default_branch.as_deref().unwrap_or(DEFAULT_BRANCH)
    }

    pub fn profile_catalog(&self) -> Result<ProfileCatalog, GateError> {
        let mut catalog = ProfileCatalog::builtin();
        if let Some(ref envs) = self.environments {
            for name in EnvironmentName::ALL {
                if let Some(over) = envs.get(name) {
                    catalog = catalog.with_profile(over.apply(EnvironmentProfile::builtin(name))?);
                }
            }
        }
        Ok(catalog)
    }

    pub fn resolver(&self) -> Result<EnvironmentResolver, GateError> {
        Ok(EnvironmentResolver::new(self.default_branch(), self.profile_catalog()?))
    }

    pub fn required_tools(&self) -> Vec<ScanTool> {
        self.scan
            .as_ref()
            .and_then(|s| s.required_tools.clone())
            .unwrap_or_else(|| ScanTool::ALL.to_vec())
    }

    pub fn cost_model(&self) -> CostModel {
        match self.cost.as_ref().and_then(|c| c.components.clone()) {
            Some(components) => CostModel { components },
            None => CostModel::default(),
        }
    }

    pub fn estimator(&self) -> Result<CostEstimator, GateError> {
        let pct = match self.cost.as_ref().and_then(|c| c.severe_overage_pct.as_ref()) {
            Some(amount) => config_amount(amount, "cost.severe_overage_pct")?,
            None => DEFAULT_SEVERE_OVERAGE_PCT,
        };
        Ok(CostEstimator::new(pct))
    }

    pub fn rules(&self) -> Vec<PolicyRule> {
        match self.policy {
            Some(PolicyConfig {
                rules: Some(ref rules),
                include_defaults,
            }) => {
                let mut all = if include_defaults { default_rules() } else { Vec::new() };
                all.extend(rules.iter().cloned());
                all
            }
            _ => default_rules(),
        }
    }
}
