//! Markdown rendering of a gate run for CI step summaries and pull-request comments.

use crate::models::{
    Enforcement, GateResult, PolicyViolation, Severity, Stage, ViolationSeverity,
};
use crate::pipeline::phase::display_name;
use crate::pipeline::PipelineReport;
use crate::utils::formatting::{format_cost, format_duration};

/// Findings listed individually before the table is truncated.
const MAX_LISTED_FINDINGS: usize = 50;

fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

fn gate_status(gate: &GateResult) -> &'static str {
    if gate.cancelled {
        "⏹ cancelled"
    } else if gate.passed {
        "✅ pass"
    } else {
        "❌ fail"
    }
}

fn gate_summary(report: &PipelineReport, gate: &GateResult) -> String {
    if gate.cancelled {
        return "cancelled after a blocking failure elsewhere".to_string();
    }
    if let Some(e) = gate.errors().next() {
        return format!("{}: {}", e.error_type, cell(&e.message));
    }
    match gate.stage {
        Stage::Scan => {
            let c = &report.severity_counts;
            format!(
                "{} findings ({} critical, {} high, {} medium, {} low)",
                c.total(),
                c.critical,
                c.high,
                c.medium,
                c.low
            )
        }
        Stage::Cost => {
            let mut s = format!(
                "{} / {} per month",
                format_cost(report.cost_report.total),
                format_cost(report.budget_limit)
            );
            if report.severe_overage {
                s.push_str(" (severe overage)");
            }
            s
        }
        Stage::Policy => format!("{} violations", gate.violations().count()),
    }
}

fn violation_effect(enforcement: Enforcement, severity: ViolationSeverity) -> &'static str {
    if enforcement.blocks(severity) {
        "blocking"
    } else if enforcement.warns(severity) {
        "warning"
    } else {
        "info"
    }
}

pub fn format_gate_table(report: &PipelineReport) -> String {
    let mut out = String::from("| Gate | Result | Summary |\n|---|---|---|\n");
    for gate in &report.gates {
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            display_name(gate.stage),
            gate_status(gate),
            gate_summary(report, gate)
        ));
    }
    out
}

pub fn format_findings_section(report: &PipelineReport) -> String {
    let c = &report.severity_counts;
    let mut out = format!(
        "## Security Findings\n\n| Severity | Count |\n|---|---|\n| Critical | {} |\n| High | {} |\n| Medium | {} |\n| Low | {} |\n| **Total** | **{}** |\n",
        c.critical, c.high, c.medium, c.low, c.total()
    );

    let Some(scan) = report.gate(Stage::Scan) else {
        return out;
    };
    let mut findings: Vec<_> = scan.findings().collect();
    if findings.is_empty() {
        return out;
    }
    findings.sort_by_key(|f| f.severity.rank());

    out.push_str("\n| Severity | Tool | Resource | Rule | Message |\n|---|---|---|---|---|\n");
    for f in findings.iter().take(MAX_LISTED_FINDINGS) {
        out.push_str(&format!(
            "| {} | {} | `{}` | {} | {} |\n",
            severity_label(f.severity),
            f.source,
            cell(&f.resource_id),
            cell(f.rule_id.as_deref().unwrap_or("-")),
            cell(&f.message)
        ));
    }
    if findings.len() > MAX_LISTED_FINDINGS {
        out.push_str(&format!(
            "\n_{} more findings omitted; see the JSON report._\n",
            findings.len() - MAX_LISTED_FINDINGS
        ));
    }
    out
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "🔴 critical",
        Severity::High => "🟠 high",
        Severity::Medium => "🟡 medium",
        Severity::Low => "⚪ low",
    }
}

pub fn format_cost_section(report: &PipelineReport) -> String {
    let cost = &report.cost_report;
    let mut out = String::from("## Cost Estimate\n\n| Component | Monthly |\n|---|---:|\n");
    for item in &cost.items {
        out.push_str(&format!("| {} | {} |\n", cell(&item.component), format_cost(item.monthly_cost)));
    }
    out.push_str(&format!("| **Total** | **{}** |\n", format_cost(cost.total)));
    out.push_str(&format!("| Annual | {} |\n", format_cost(cost.annual_total)));
    out.push_str(&format!(
        "\nBudget for `{}`: {} per month.\n",
        report.environment.name,
        format_cost(report.budget_limit)
    ));
    if report.severe_overage {
        out.push_str("\n> **Severe overage:** the estimate exceeds the budget by more than the allowed margin.\n");
    }
    out
}

pub fn format_violations_section(report: &PipelineReport) -> String {
    let violations: Vec<&PolicyViolation> = report
        .gate(Stage::Policy)
        .map(|g| g.violations().collect())
        .unwrap_or_default();

    let mut out = String::from("## Policy Violations\n\n");
    if violations.is_empty() {
        out.push_str("No policy violations.\n");
        return out;
    }
    out.push_str("| Rule | Resource | Severity | Effect | Message |\n|---|---|---|---|---|\n");
    for v in violations {
        out.push_str(&format!(
            "| {} | `{}` | {} | {} | {} |\n",
            cell(&v.rule_id),
            cell(&v.resource_id),
            v.severity.as_str(),
            violation_effect(report.environment.enforcement, v.severity),
            cell(&v.message)
        ));
    }
    out
}

fn format_errors_section(report: &PipelineReport) -> Option<String> {
    let errors: Vec<_> = report
        .gates
        .iter()
        .flat_map(|g| g.errors().map(move |e| (g.stage, e)))
        .collect();
    if errors.is_empty() {
        return None;
    }
    let mut out = String::from("## Errors\n\n");
    for (stage, e) in errors {
        out.push_str(&format!("- **{}** `{}`: {}\n", display_name(stage), e.error_type, cell(&e.message)));
    }
    Some(out)
}

/// Full Markdown summary of a run.
pub fn format_summary_markdown(report: &PipelineReport) -> String {
    let verdict = if report.passed { "✅ PASS" } else { "❌ FAIL" };
    let profile = &report.environment;

    let mut sections = vec![
        format!(
            "# Deployment Gate: {}\n\n| | |\n|---|---|\n| Environment | `{}` |\n| Scan policy | {} |\n| Enforcement | {} |\n| Run | `{}` |\n| Duration | {} |\n| Version | {} |\n",
            verdict,
            profile.name,
            profile.scan_policy.as_str(),
            profile.enforcement.as_str(),
            report.run_id,
            format_duration(report.duration_ms),
            report.tool_version,
        ),
        format!("## Gates\n\n{}", format_gate_table(report)),
        format_findings_section(report),
        format_cost_section(report),
        format_violations_section(report),
    ];
    if let Some(errors) = format_errors_section(report) {
        sections.push(errors);
    }
    sections.join("\n")
}
