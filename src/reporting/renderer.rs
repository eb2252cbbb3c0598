use console::style;

use crate::models::{GateResult, Severity, Stage};
use crate::pipeline::phase::display_name;
use crate::pipeline::{PipelineEvent, PipelineReport};
use crate::utils::formatting::{format_cost, format_duration};

/// Render a pipeline event as styled terminal output, returning the formatted line.
pub fn render_event(event: &PipelineEvent) -> String {
    match event {
        PipelineEvent::PipelineStarted { run_id, environment } => {
            format!(
                "\n{} Gate run {} for {}",
                style("▶").green().bold(),
                style(run_id).cyan(),
                style(environment).white().bold(),
            )
        }
        PipelineEvent::StageStarted { display_name, .. } => {
            format!("  {} {}", style("⏳").yellow(), style(display_name).yellow())
        }
        PipelineEvent::StageCompleted { stage, passed } => {
            if *passed {
                format!("  {} {} passed", style("✓").green(), style(display_name(*stage)).green())
            } else {
                format!("  {} {} failed", style("✗").red(), style(display_name(*stage)).red())
            }
        }
        PipelineEvent::StageCancelled { stage } => {
            format!("  {} {} cancelled", style("⏹").dim(), style(display_name(*stage)).dim())
        }
        PipelineEvent::FailFastTriggered { stage } => {
            format!(
                "  {} fail-fast: {} blocked, cancelling remaining gates",
                style("⚠").yellow(),
                display_name(*stage),
            )
        }
        PipelineEvent::PipelineCompleted { passed, duration_ms } => {
            let verdict = if *passed {
                style("✓ Gate passed").green().bold()
            } else {
                style("✗ Gate failed").red().bold()
            };
            format!("{} ({})", verdict, format_duration(*duration_ms))
        }
    }
}

pub fn render_severity_badge(severity: Severity) -> String {
    match severity {
        Severity::Critical => style(" CRITICAL ").white().on_red().bold().to_string(),
        Severity::High => style(" HIGH ").red().bold().to_string(),
        Severity::Medium => style(" MEDIUM ").yellow().to_string(),
        Severity::Low => style(" LOW ").dim().to_string(),
    }
}

fn render_gate_line(report: &PipelineReport, gate: &GateResult) -> String {
    let marker = if gate.cancelled {
        style("⏹").dim()
    } else if gate.passed {
        style("✓").green()
    } else {
        style("✗").red()
    };
    let detail = match gate.stage {
        _ if gate.cancelled => "cancelled".to_string(),
        Stage::Scan => format!("{} findings", report.severity_counts.total()),
        Stage::Cost => format!(
            "{} of {} budget",
            format_cost(report.cost_report.total),
            format_cost(report.budget_limit)
        ),
        Stage::Policy => format!("{} violations", gate.violations().count()),
    };
    format!("  {} {:<15} {}", marker, display_name(gate.stage), style(detail).dim())
}

/// Multi-line terminal summary printed after a run.
pub fn render_summary(report: &PipelineReport) -> String {
    let mut lines = vec![format!(
        "\n{} {}  {}",
        style("Environment").dim(),
        style(report.environment.name).white().bold(),
        style(format!("run {}", report.run_id)).dim(),
    )];
    for gate in &report.gates {
        lines.push(render_gate_line(report, gate));
        for e in gate.errors() {
            lines.push(format!("      {} {}", style(&e.error_type).red(), style(&e.message).red().dim()));
        }
    }

    let counts = &report.severity_counts;
    if counts.total() > 0 {
        let parts: Vec<String> = [Severity::Critical, Severity::High, Severity::Medium, Severity::Low]
            .into_iter()
            .filter(|s| counts.get(*s) > 0)
            .map(|s| format!("{} {}", render_severity_badge(s), counts.get(s)))
            .collect();
        lines.push(format!("  {}", parts.join("  ")));
    }
    if report.severe_overage {
        lines.push(format!("  {} severe cost overage", style("⚠").yellow().bold()));
    }

    let verdict = if report.passed {
        style("PASS").green().bold()
    } else {
        style("FAIL").red().bold()
    };
    lines.push(format!("\n{} {}", style("Result:").bold(), verdict));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_stage_events() {
        console::set_colors_enabled(false);
        let line = render_event(&PipelineEvent::StageCompleted { stage: Stage::Cost, passed: false });
        assert!(line.contains("Cost Estimate failed"));
        let line = render_event(&PipelineEvent::StageCancelled { stage: Stage::Policy });
        assert!(line.contains("Policy Check cancelled"));
    }
}
