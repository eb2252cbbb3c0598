//! Combines the three gate results into the run's overall verdict.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::state::{PipelineState, PipelineStatus, Transition, Verdict};
use crate::cost::CostGateOutcome;
use crate::errors::GateError;
use crate::models::{CostReport, EnvironmentProfile, GateResult, SeverityCounts, Stage};
use crate::scan::ScanGateOutcome;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: String,
    pub tool_version: String,
    pub generated_at: DateTime<Utc>,
    pub environment: EnvironmentProfile,
    pub passed: bool,
    /// Always in scan, cost, policy order.
    pub gates: Vec<GateResult>,
    pub severity_counts: SeverityCounts,
    pub cost_report: CostReport,
    pub budget_limit: Decimal,
    pub severe_overage: bool,
    pub transitions: Vec<Transition>,
    pub duration_ms: u64,
}

impl PipelineReport {
    pub fn gate(&self, stage: Stage) -> Option<&GateResult> {
        self.gates.iter().find(|g| g.stage == stage)
    }

    pub fn failed_stages(&self) -> Vec<Stage> {
        self.gates.iter().filter(|g| !g.passed).map(|g| g.stage).collect()
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::from_passed(self.passed)
    }
}

pub struct Aggregator;

impl Aggregator {
    /// Overall verdict: every stage present and passed. A missing stage fails the run.
    pub fn verdict(gates: &[GateResult]) -> Verdict {
        let all_present = Stage::ALL
            .iter()
            .all(|stage| gates.iter().any(|g| g.stage == *stage));
        Verdict::from_passed(all_present && gates.iter().all(|g| g.passed))
    }

    pub fn aggregate(
        state: &mut PipelineState,
        environment: EnvironmentProfile,
        scan: ScanGateOutcome,
        cost: CostGateOutcome,
        policy: GateResult,
    ) -> Result<PipelineReport, GateError> {
        let gates = vec![scan.result, cost.result, policy];
        let verdict = Self::verdict(&gates);
        state.advance(PipelineStatus::Aggregated(verdict))?;

        info!(
            run_id = %state.run_id,
            environment = %environment.name,
            verdict = ?verdict,
            "Gate results aggregated"
        );

        Ok(PipelineReport {
            run_id: state.run_id.clone(),
            tool_version: tool_version(),
            generated_at: Utc::now(),
            environment,
            passed: verdict == Verdict::Pass,
            gates,
            severity_counts: scan.counts,
            cost_report: cost.report,
            budget_limit: cost.budget_limit,
            severe_overage: cost.severe_overage,
            transitions: state.transitions.clone(),
            duration_ms: state.duration_ms(),
        })
    }
}

pub fn tool_version() -> String {
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{} ({})", env!("CARGO_PKG_VERSION"), hash),
        _ => env!("CARGO_PKG_VERSION").to_string(),
    }
}
