//! Policy gate: evaluates every rule against every planned change and
//! applies the environment's enforcement tier.

use tracing::{debug, info, warn};

use super::plan::PlanSnapshot;
use super::rules::PolicyRule;
use crate::errors::GateError;
use crate::models::{
    EnvironmentProfile, GateDetail, GateResult, PolicyViolation, ResourceChange, Stage,
    ViolationSeverity,
};

pub struct PolicyValidator;

impl PolicyValidator {
    /// Evaluate rules against changes in rule-major order. A predicate that
    /// cannot be evaluated is recorded as an `EvaluationError` violation.
    pub fn violations(changes: &[ResourceChange], rules: &[PolicyRule]) -> Vec<PolicyViolation> {
        let mut violations = Vec::new();
        for rule in rules {
            for change in changes {
                match rule.predicate.evaluate(change) {
                    Ok(true) => {
                        debug!(rule = %rule.rule_id, resource = %change.address, "Rule fired");
                        let message = if rule.description.is_empty() {
                            format!("rule {} matched {} ({})", rule.rule_id, change.address, change.change_kind.as_str())
                        } else {
                            rule.description.clone()
                        };
                        violations.push(PolicyViolation {
                            rule_id: rule.rule_id.clone(),
                            resource_id: change.address.clone(),
                            severity: rule.severity.into(),
                            message,
                        });
                    }
                    Ok(false) => {}
                    Err(reason) => {
                        let e = GateError::PolicyEvaluation {
                            rule_id: rule.rule_id.clone(),
                            resource_id: change.address.clone(),
                            reason,
                        };
                        warn!(error = %e, "Rule could not be evaluated");
                        violations.push(PolicyViolation {
                            rule_id: rule.rule_id.clone(),
                            resource_id: change.address.clone(),
                            severity: ViolationSeverity::EvaluationError,
                            message: e.to_string(),
                        });
                    }
                }
            }
        }
        violations
    }

    pub fn evaluate(
        changes: &[ResourceChange],
        rules: &[PolicyRule],
        profile: &EnvironmentProfile,
    ) -> GateResult {
        let violations = Self::violations(changes, rules);
        let blocked = violations.iter().any(|v| profile.enforcement.blocks(v.severity));

        for v in violations.iter().filter(|v| profile.enforcement.warns(v.severity)) {
            warn!(
                environment = %profile.name,
                rule = %v.rule_id,
                resource = %v.resource_id,
                "Policy violation downgraded to warning"
            );
        }

        info!(
            environment = %profile.name,
            enforcement = ?profile.enforcement,
            changes = changes.len(),
            rules = rules.len(),
            violations = violations.len(),
            passed = !blocked,
            "Policy gate evaluated"
        );

        let details = violations.into_iter().map(GateDetail::Violation).collect();
        GateResult::new(Stage::Policy, !blocked, details)
    }

    /// Evaluate a plan snapshot; a plan that could not be loaded fails the gate.
    pub fn evaluate_plan(
        plan: &PlanSnapshot,
        rules: &[PolicyRule],
        profile: &EnvironmentProfile,
    ) -> GateResult {
        match plan {
            PlanSnapshot::Loaded { changes } => Self::evaluate(changes, rules, profile),
            PlanSnapshot::Unavailable { reason } => {
                let e = GateError::PlanInput(reason.clone());
                warn!(error = %e, "Policy gate has no plan to evaluate");
                GateResult::from_error(Stage::Policy, &e, Vec::new())
            }
        }
    }
}
