//! Security scan gate: normalizes scanner output and applies the
//! environment's scan policy.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::dedup::deduplicate_findings;
use crate::errors::GateError;
use crate::models::{
    EnvironmentProfile, Finding, GateDetail, GateResult, ScanTool, Severity, SeverityCounts, Stage,
};

/// A finding as reported by a scanner, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFinding {
    pub severity: String,
    pub resource_id: String,
    pub message: String,
    #[serde(default)]
    pub rule_id: Option<String>,
}

/// Whether a scanner actually ran. `Completed` with no findings is a clean
/// scan; `Unavailable` means no result exists at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanRun {
    Completed { findings: Vec<RawFinding> },
    Unavailable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawScanOutput {
    pub tool: ScanTool,
    pub run: ScanRun,
}

impl RawScanOutput {
    pub fn completed(tool: ScanTool, findings: Vec<RawFinding>) -> Self {
        Self {
            tool,
            run: ScanRun::Completed { findings },
        }
    }

    pub fn unavailable(tool: ScanTool, reason: impl Into<String>) -> Self {
        Self {
            tool,
            run: ScanRun::Unavailable {
                reason: reason.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanGateOutcome {
    pub result: GateResult,
    pub counts: SeverityCounts,
}

pub struct SecurityScanGate;

impl SecurityScanGate {
    /// Normalize one raw finding. Unrecognized severity labels are treated as
    /// high so an unknown scanner vocabulary cannot slip past the gate.
    pub fn normalize(tool: ScanTool, raw: RawFinding) -> Finding {
        let severity = Severity::from_label(&raw.severity).unwrap_or_else(|| {
            warn!(tool = %tool, label = %raw.severity, "Unrecognized severity label, treating as high");
            Severity::High
        });
        Finding {
            severity,
            source: tool,
            resource_id: raw.resource_id,
            message: raw.message,
            rule_id: raw.rule_id,
        }
    }

    pub fn evaluate(outputs: &[RawScanOutput], profile: &EnvironmentProfile) -> ScanGateOutcome {
        let mut findings = Vec::new();
        let mut errors = Vec::new();

        if outputs.is_empty() {
            errors.push(GateError::ScanToolUnavailable {
                tool: "all scanners".to_string(),
                reason: "no scan output was provided".to_string(),
            });
        }

        for output in outputs {
            match &output.run {
                ScanRun::Completed { findings: raw } => {
                    info!(tool = %output.tool, findings = raw.len(), "Scan output received");
                    findings.extend(raw.iter().cloned().map(|r| Self::normalize(output.tool, r)));
                }
                ScanRun::Unavailable { reason } => {
                    warn!(tool = %output.tool, reason = %reason, "Scan tool did not run");
                    errors.push(GateError::ScanToolUnavailable {
                        tool: output.tool.to_string(),
                        reason: reason.clone(),
                    });
                }
            }
        }

        let findings = deduplicate_findings(findings);
        let counts = SeverityCounts::from_findings(&findings);
        let blocked = findings.iter().any(|f| profile.scan_policy.blocks(f.severity));

        let mut details: Vec<GateDetail> = findings.into_iter().map(GateDetail::Finding).collect();
        details.extend(errors.iter().map(|e| GateDetail::Error(e.into())));

        let passed = !blocked && errors.is_empty();
        info!(
            environment = %profile.name,
            passed,
            critical = counts.critical,
            high = counts.high,
            medium = counts.medium,
            low = counts.low,
            "Scan gate evaluated"
        );

        ScanGateOutcome {
            result: GateResult::new(Stage::Scan, passed, details),
            counts,
        }
    }
}
