use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::GateError;

/// Monthly cost of one infrastructure component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostLineItem {
    pub component: String,
    pub monthly_cost: Decimal,
}

impl CostLineItem {
    pub fn new(component: impl Into<String>, monthly_cost: Decimal) -> Self {
        Self {
            component: component.into(),
            monthly_cost,
        }
    }
}

/// Ordered line items with their monthly and annual totals.
///
/// Built only through [`CostReport::from_items`], so `total` is always the
/// exact sum of `items` and `annual_total` is `total * 12`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostReport {
    pub items: Vec<CostLineItem>,
    pub total: Decimal,
    pub annual_total: Decimal,
}

impl CostReport {
    /// Sum the items. Totals beyond the range of `Decimal` are rejected as
    /// malformed input.
    pub fn from_items(items: Vec<CostLineItem>) -> Result<Self, GateError> {
        let total = items.iter().try_fold(Decimal::ZERO, |acc, i| {
            acc.checked_add(i.monthly_cost).ok_or_else(|| {
                GateError::MalformedCostInput(format!("{}: monthly total overflows", i.component))
            })
        })?;
        let annual_total = total
            .checked_mul(Decimal::from(12))
            .ok_or_else(|| GateError::MalformedCostInput(format!("annual total of {} overflows", total)))?;
        Ok(Self {
            items,
            total,
            annual_total,
        })
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: Decimal::ZERO,
            annual_total: Decimal::ZERO,
        }
    }
}
