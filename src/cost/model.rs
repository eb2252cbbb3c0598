use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::errors::GateError;
use crate::models::{EnvironmentName, EnvironmentProfile};

/// A currency amount as written in configuration: a YAML/JSON number or a
/// string such as `"8.50"` or `"$8.50"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(serde_json::Number),
    Text(String),
}

impl Amount {
    /// Parse into a non-negative decimal with two fractional digits.
    pub fn to_decimal(&self, component: &str) -> Result<Decimal, GateError> {
        let text = match self {
            Amount::Number(n) => n.to_string(),
            Amount::Text(s) => s.trim().trim_start_matches('$').trim().to_string(),
        };
        let value = Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map_err(|_| {
                GateError::MalformedCostInput(format!(
                    "{}: '{}' is not a numeric amount",
                    component, text
                ))
            })?;
        if value.is_sign_negative() && !value.is_zero() {
            return Err(GateError::MalformedCostInput(format!(
                "{}: negative amount {}",
                component, value
            )));
        }
        Ok(value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }
}

impl From<Decimal> for Amount {
    fn from(d: Decimal) -> Self {
        Amount::Text(d.to_string())
    }
}

impl From<&str> for Amount {
    fn from(s: &str) -> Self {
        Amount::Text(s.to_string())
    }
}

/// A cost line item whose amount has not been validated yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCostItem {
    pub component: String,
    pub monthly_cost: Amount,
}

impl RawCostItem {
    pub fn new(component: impl Into<String>, monthly_cost: impl Into<Amount>) -> Self {
        Self {
            component: component.into(),
            monthly_cost: monthly_cost.into(),
        }
    }
}

/// Base monthly cost of one component, with optional per-environment overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentCost {
    pub component: String,
    pub monthly_cost: Amount,
    /// Only billed when the environment replicates content to a second region.
    #[serde(default)]
    pub replication: bool,
    #[serde(default)]
    pub overrides: BTreeMap<EnvironmentName, Amount>,
}

impl ComponentCost {
    fn new(component: &str, cost: &str) -> Self {
        Self {
            component: component.to_string(),
            monthly_cost: Amount::from(cost),
            replication: false,
            overrides: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    pub components: Vec<ComponentCost>,
}

impl CostModel {
    /// Line items billed for `profile`, in model order.
    pub fn line_items_for(&self, profile: &EnvironmentProfile) -> Vec<RawCostItem> {
        self.components
            .iter()
            .filter(|c| !c.replication || profile.replication_enabled)
            .map(|c| RawCostItem {
                component: c.component.clone(),
                monthly_cost: c
                    .overrides
                    .get(&profile.name)
                    .unwrap_or(&c.monthly_cost)
                    .clone(),
            })
            .collect()
    }
}

impl Default for CostModel {
    /// Reference monthly costs of a small static site: bucket, CDN, DNS,
    /// WAF, monitoring and egress, plus cross-region replication.
    fn default() -> Self {
        let mut replication = ComponentCost::new("S3 Replication", "0.50");
        replication.replication = true;
        Self {
            components: vec![
                ComponentCost::new("S3", "0.25"),
                ComponentCost::new("CloudFront", "8.50"),
                ComponentCost::new("Route53", "0.90"),
                ComponentCost::new("WAF", "6.00"),
                ComponentCost::new("CloudWatch", "2.50"),
                ComponentCost::new("DataTransfer", "9.00"),
                replication,
            ],
        }
    }
}
