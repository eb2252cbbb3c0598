//! Cost gate: totals the environment's line items and checks them against
//! the budget.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::model::RawCostItem;
use crate::errors::GateError;
use crate::models::{CostLineItem, CostReport, EnvironmentProfile, GateDetail, GateResult, Stage};

/// Percentage over budget beyond which an overage is escalated.
pub const DEFAULT_SEVERE_OVERAGE_PCT: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostGateOutcome {
    pub report: CostReport,
    pub result: GateResult,
    pub budget_limit: Decimal,
    /// Total exceeds the budget by more than the configured margin.
    pub severe_overage: bool,
}

#[derive(Debug, Clone)]
pub struct CostEstimator {
    severe_overage_pct: Decimal,
}

impl CostEstimator {
    pub fn new(severe_overage_pct: Decimal) -> Self {
        Self { severe_overage_pct }
    }

    pub fn severe_overage_pct(&self) -> Decimal {
        self.severe_overage_pct
    }

    /// Budget plus the severe-overage margin.
    pub fn severe_threshold(&self, budget_limit: Decimal) -> Result<Decimal, GateError> {
        budget_limit
            .checked_mul(self.severe_overage_pct)
            .and_then(|m| m.checked_div(Decimal::ONE_HUNDRED))
            .and_then(|m| budget_limit.checked_add(m))
            .ok_or_else(|| {
                GateError::MalformedCostInput(format!(
                    "budget {} with a {}% margin overflows",
                    budget_limit, self.severe_overage_pct
                ))
            })
    }

    fn rejected(profile: &EnvironmentProfile, e: GateError) -> CostGateOutcome {
        warn!(environment = %profile.name, error = %e, "Cost input rejected");
        CostGateOutcome {
            report: CostReport::empty(),
            result: GateResult::from_error(Stage::Cost, &e, Vec::new()),
            budget_limit: profile.budget_limit,
            severe_overage: false,
        }
    }

    /// Validate raw amounts into line items, stopping at the first bad one.
    pub fn normalize(items: &[RawCostItem]) -> Result<Vec<CostLineItem>, GateError> {
        items
            .iter()
            .map(|i| {
                let cost = i.monthly_cost.to_decimal(&i.component)?;
                Ok(CostLineItem::new(i.component.clone(), cost))
            })
            .collect()
    }

    pub fn estimate(&self, items: &[RawCostItem], profile: &EnvironmentProfile) -> CostGateOutcome {
        match Self::normalize(items) {
            Ok(items) => self.estimate_items(items, profile),
            Err(e) => Self::rejected(profile, e),
        }
    }

    /// Estimate from already-decimal line items. Amounts are rounded to cents
    /// the same way configured amounts are.
    pub fn estimate_items(&self, items: Vec<CostLineItem>, profile: &EnvironmentProfile) -> CostGateOutcome {
        if let Some(bad) = items.iter().find(|i| i.monthly_cost.is_sign_negative() && !i.monthly_cost.is_zero()) {
            let e = GateError::MalformedCostInput(format!(
                "{}: negative amount {}",
                bad.component, bad.monthly_cost
            ));
            return Self::rejected(profile, e);
        }

        let items = items
            .into_iter()
            .map(|i| {
                let cost = i.monthly_cost.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
                CostLineItem::new(i.component, cost)
            })
            .collect();
        let report = match CostReport::from_items(items) {
            Ok(r) => r,
            Err(e) => return Self::rejected(profile, e),
        };
        let threshold = match self.severe_threshold(profile.budget_limit) {
            Ok(t) => t,
            Err(e) => return Self::rejected(profile, e),
        };
        let passed = report.total <= profile.budget_limit;
        let severe_overage = report.total > threshold;

        if severe_overage {
            warn!(
                environment = %profile.name,
                total = %report.total,
                budget = %profile.budget_limit,
                margin_pct = %self.severe_overage_pct,
                "Severe cost overage"
            );
        }
        info!(
            environment = %profile.name,
            total = %report.total,
            annual = %report.annual_total,
            budget = %profile.budget_limit,
            passed,
            "Cost gate evaluated"
        );

        let details = report.items.iter().cloned().map(GateDetail::CostItem).collect();
        CostGateOutcome {
            result: GateResult::new(Stage::Cost, passed, details),
            report,
            budget_limit: profile.budget_limit,
            severe_overage,
        }
    }
}

impl Default for CostEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_SEVERE_OVERAGE_PCT)
    }
}
