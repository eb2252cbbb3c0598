use std::path::Path;

use futures::future::join_all;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::commands::RunArgs;
use crate::config::{load_config, GateConfig};
use crate::errors::GateError;
use crate::models::{EnvironmentProfile, ScanTool};
use crate::pipeline::{GateInputs, GateOrchestrator};
use crate::policy::{load_plan, PlanSnapshot};
use crate::reporting::{render_event, render_summary, write_json_report, write_markdown_summary};
use crate::scan::{load_report, RawScanOutput};

/// Returns whether the gate passed.
pub async fn handle_run(args: RunArgs, quiet: bool) -> Result<bool, GateError> {
    let config = load_config(args.config.as_deref().map(Path::new)).await?;
    let trigger = args.trigger.to_trigger()?;
    let profile = config.resolver()?.resolve(&trigger)?;
    info!(
        git_ref = %trigger.git_ref,
        event = ?trigger.event_kind,
        environment = %profile.name,
        "Environment resolved"
    );

    let inputs = gather_inputs(&args, &config, &profile).await;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling gates");
            interrupt.cancel();
        }
    });

    let (tx, mut rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if !quiet {
                eprintln!("{}", render_event(&event));
            }
        }
    });

    let orchestrator = GateOrchestrator::new(profile, config.estimator()?)
        .with_cancel_token(cancel)
        .with_event_channel(tx);
    let result = orchestrator.run(inputs).await;
    drop(orchestrator);
    let _ = printer.await;
    let report = result?;

    if let Some(ref output) = args.output {
        write_json_report(&report, Path::new(output)).await?;
    }
    if let Some(ref summary) = args.summary {
        write_markdown_summary(&report, Path::new(summary)).await?;
    }
    if !quiet {
        println!("{}", render_summary(&report));
    }

    Ok(report.passed)
}

/// Load every configured scanner report and the plan. Missing inputs become
/// "unavailable" markers so the affected gate fails instead of the run.
pub async fn gather_inputs(
    args: &RunArgs,
    config: &GateConfig,
    profile: &EnvironmentProfile,
) -> GateInputs {
    let scan_outputs = join_all(config.required_tools().into_iter().map(|tool| {
        let path = match tool {
            ScanTool::Tfsec => args.tfsec.clone(),
            ScanTool::Checkov => args.checkov.clone(),
        };
        async move {
            match path {
                Some(p) => load_report(tool, Path::new(&p)).await,
                None => RawScanOutput::unavailable(
                    tool,
                    format!("no {} report given (--{})", tool, tool),
                ),
            }
        }
    }))
    .await;

    let plan = match args.plan {
        Some(ref p) => load_plan(Path::new(p)).await,
        None => PlanSnapshot::Unavailable {
            reason: "no plan file given (--plan)".to_string(),
        },
    };

    GateInputs {
        scan_outputs,
        cost_items: config.cost_model().line_items_for(profile),
        plan,
        rules: config.rules(),
    }
}
