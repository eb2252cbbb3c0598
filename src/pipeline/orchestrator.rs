use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::aggregator::{Aggregator, PipelineReport};
use super::events::PipelineEvent;
use super::phase::display_name;
use super::state::{PipelineState, PipelineStatus};
use crate::cost::{CostEstimator, CostGateOutcome, RawCostItem};
use crate::errors::GateError;
use crate::models::{CostReport, EnvironmentProfile, GateResult, SeverityCounts, Stage};
use crate::policy::{PlanSnapshot, PolicyRule, PolicyValidator};
use crate::scan::{RawScanOutput, ScanGateOutcome, SecurityScanGate};

/// Already-materialized inputs for one run. Each gate takes ownership of its part.
#[derive(Debug, Clone)]
pub struct GateInputs {
    pub scan_outputs: Vec<RawScanOutput>,
    pub cost_items: Vec<RawCostItem>,
    pub plan: PlanSnapshot,
    pub rules: Vec<PolicyRule>,
}

/// What a gate task hands back, whether it finished, failed or was cancelled.
trait StageOutcome: Send + 'static {
    const STAGE: Stage;
    fn gate(&self) -> &GateResult;
    fn cancelled(profile: &EnvironmentProfile) -> Self;
    fn failed(profile: &EnvironmentProfile, error: &GateError) -> Self;
}

impl StageOutcome for ScanGateOutcome {
    const STAGE: Stage = Stage::Scan;

    fn gate(&self) -> &GateResult {
        &self.result
    }

    fn cancelled(_profile: &EnvironmentProfile) -> Self {
        Self {
            result: GateResult::cancelled(Stage::Scan),
            counts: SeverityCounts::default(),
        }
    }

    fn failed(_profile: &EnvironmentProfile, error: &GateError) -> Self {
        Self {
            result: GateResult::from_error(Stage::Scan, error, Vec::new()),
            counts: SeverityCounts::default(),
        }
    }
}

impl StageOutcome for CostGateOutcome {
    const STAGE: Stage = Stage::Cost;

    fn gate(&self) -> &GateResult {
        &self.result
    }

    fn cancelled(profile: &EnvironmentProfile) -> Self {
        Self {
            report: CostReport::empty(),
            result: GateResult::cancelled(Stage::Cost),
            budget_limit: profile.budget_limit,
            severe_overage: false,
        }
    }

    fn failed(profile: &EnvironmentProfile, error: &GateError) -> Self {
        Self {
            report: CostReport::empty(),
            result: GateResult::from_error(Stage::Cost, error, Vec::new()),
            budget_limit: profile.budget_limit,
            severe_overage: false,
        }
    }
}

impl StageOutcome for GateResult {
    const STAGE: Stage = Stage::Policy;

    fn gate(&self) -> &GateResult {
        self
    }

    fn cancelled(_profile: &EnvironmentProfile) -> Self {
        GateResult::cancelled(Stage::Policy)
    }

    fn failed(_profile: &EnvironmentProfile, error: &GateError) -> Self {
        GateResult::from_error(Stage::Policy, error, Vec::new())
    }
}

#[derive(Clone)]
struct StageContext {
    profile: EnvironmentProfile,
    cancel: CancellationToken,
    event_tx: Option<mpsc::UnboundedSender<PipelineEvent>>,
}

impl StageContext {
    fn emit(&self, event: PipelineEvent) {
        if let Some(ref tx) = self.event_tx {
            let _ = tx.send(event);
        }
    }
}

/// Run one gate on the blocking pool. Cancellation only wins while the gate
/// is still computing; a finished result is always kept.
fn spawn_stage<T, F>(ctx: StageContext, work: F) -> JoinHandle<T>
where
    T: StageOutcome,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::spawn(async move {
        let stage = T::STAGE;
        if ctx.cancel.is_cancelled() {
            warn!(stage = %stage, "Gate cancelled before start");
            ctx.emit(PipelineEvent::StageCancelled { stage });
            return T::cancelled(&ctx.profile);
        }

        let handle = tokio::task::spawn_blocking(work);
        let outcome = tokio::select! {
            biased;
            joined = handle => settle(joined, &ctx.profile),
            _ = ctx.cancel.cancelled() => {
                warn!(stage = %stage, "Gate cancelled before completion");
                ctx.emit(PipelineEvent::StageCancelled { stage });
                return T::cancelled(&ctx.profile);
            }
        };

        let passed = outcome.gate().passed;
        info!(stage = %stage, passed, "Gate completed");
        ctx.emit(PipelineEvent::StageCompleted { stage, passed });

        if !passed && ctx.profile.fail_fast && !ctx.cancel.is_cancelled() {
            warn!(stage = %stage, "Blocking failure with fail-fast enabled, cancelling remaining gates");
            ctx.emit(PipelineEvent::FailFastTriggered { stage });
            ctx.cancel.cancel();
        }
        outcome
    })
}

fn settle<T: StageOutcome>(joined: Result<T, JoinError>, profile: &EnvironmentProfile) -> T {
    joined.unwrap_or_else(|e| {
        let stage = T::STAGE;
        let err = GateError::Internal(format!("{} gate task failed: {}", stage, e));
        error!(stage = %stage, error = %err, "Gate task aborted");
        T::failed(profile, &err)
    })
}

/// Runs the three gates for one resolved environment and aggregates them.
pub struct GateOrchestrator {
    profile: EnvironmentProfile,
    estimator: CostEstimator,
    state: Arc<RwLock<PipelineState>>,
    cancel_token: CancellationToken,
    event_tx: Option<mpsc::UnboundedSender<PipelineEvent>>,
}

impl GateOrchestrator {
    pub fn new(profile: EnvironmentProfile, estimator: CostEstimator) -> Self {
        Self {
            profile,
            estimator,
            state: Arc::new(RwLock::new(PipelineState::new(Uuid::new_v4().to_string()))),
            cancel_token: CancellationToken::new(),
            event_tx: None,
        }
    }

    /// Attach an external token (e.g. Ctrl-C). Fail-fast cancels a child of
    /// this token, never the token itself.
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    pub fn with_event_channel(mut self, tx: mpsc::UnboundedSender<PipelineEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub fn profile(&self) -> &EnvironmentProfile {
        &self.profile
    }

    pub async fn run_id(&self) -> String {
        self.state.read().await.run_id.clone()
    }

    pub async fn status(&self) -> PipelineStatus {
        self.state.read().await.status
    }

    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(ref tx) = self.event_tx {
            let _ = tx.send(event);
        }
    }

    async fn enter_stage(&self, stage: Stage) -> Result<(), GateError> {
        self.state.write().await.advance(PipelineStatus::Running(stage))?;
        info!(stage = %stage, "Dispatching gate");
        self.emit(PipelineEvent::StageStarted {
            stage,
            display_name: display_name(stage).to_string(),
        });
        Ok(())
    }

    pub async fn run(&self, inputs: GateInputs) -> Result<PipelineReport, GateError> {
        let run_id = self.run_id().await;
        info!(
            run_id = %run_id,
            environment = %self.profile.name,
            fail_fast = self.profile.fail_fast,
            "Starting gate run"
        );
        self.emit(PipelineEvent::PipelineStarted {
            run_id,
            environment: self.profile.name,
        });

        let ctx = StageContext {
            profile: self.profile.clone(),
            cancel: self.cancel_token.child_token(),
            event_tx: self.event_tx.clone(),
        };
        let GateInputs {
            scan_outputs,
            cost_items,
            plan,
            rules,
        } = inputs;

        self.enter_stage(Stage::Scan).await?;
        let profile = self.profile.clone();
        let scan = spawn_stage(ctx.clone(), move || {
            SecurityScanGate::evaluate(&scan_outputs, &profile)
        });

        self.enter_stage(Stage::Cost).await?;
        let profile = self.profile.clone();
        let estimator = self.estimator.clone();
        let cost = spawn_stage(ctx.clone(), move || estimator.estimate(&cost_items, &profile));

        self.enter_stage(Stage::Policy).await?;
        let profile = self.profile.clone();
        let policy = spawn_stage(ctx, move || {
            PolicyValidator::evaluate_plan(&plan, &rules, &profile)
        });

        let (scan, cost, policy) = futures::future::join3(scan, cost, policy).await;
        let scan = settle(scan, &self.profile);
        let cost = settle(cost, &self.profile);
        let policy = settle(policy, &self.profile);

        let report = {
            let mut state = self.state.write().await;
            Aggregator::aggregate(&mut state, self.profile.clone(), scan, cost, policy)?
        };

        info!(
            run_id = %report.run_id,
            passed = report.passed,
            duration_ms = report.duration_ms,
            "Gate run complete"
        );
        self.emit(PipelineEvent::PipelineCompleted {
            passed: report.passed,
            duration_ms: report.duration_ms,
        });
        Ok(report)
    }
}
