//! Readers for scanner JSON reports produced outside the gate.

use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

use super::gate::{RawFinding, RawScanOutput};
use crate::errors::GateError;
use crate::models::ScanTool;

#[derive(Debug, Deserialize)]
struct TfsecReport {
    #[serde(default)]
    results: Option<Vec<TfsecResult>>,
}

#[derive(Debug, Deserialize)]
struct TfsecResult {
    #[serde(default)]
    rule_id: Option<String>,
    #[serde(default)]
    long_id: Option<String>,
    severity: String,
    #[serde(default)]
    resource: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    location: Option<TfsecLocation>,
}

#[derive(Debug, Deserialize)]
struct TfsecLocation {
    filename: String,
}

/// checkov emits one document per framework, or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CheckovDocument {
    Many(Vec<CheckovReport>),
    One(CheckovReport),
}

#[derive(Debug, Deserialize)]
struct CheckovReport {
    #[serde(default)]
    results: Option<CheckovResults>,
}

#[derive(Debug, Deserialize)]
struct CheckovResults {
    #[serde(default)]
    failed_checks: Vec<CheckovCheck>,
}

#[derive(Debug, Deserialize)]
struct CheckovCheck {
    check_id: String,
    #[serde(default)]
    check_name: Option<String>,
    resource: String,
    #[serde(default)]
    severity: Option<String>,
}

/// Parse a scanner's JSON report into raw findings.
pub fn parse_report(tool: ScanTool, content: &str) -> Result<Vec<RawFinding>, GateError> {
    match tool {
        ScanTool::Tfsec => parse_tfsec(content),
        ScanTool::Checkov => parse_checkov(content),
    }
}

fn parse_tfsec(content: &str) -> Result<Vec<RawFinding>, GateError> {
    let report: TfsecReport = serde_json::from_str(content)?;
    let findings = report
        .results
        .unwrap_or_default()
        .into_iter()
        .map(|r| {
            let resource_id = r
                .resource
                .or_else(|| r.location.map(|l| l.filename))
                .unwrap_or_else(|| "unknown".to_string());
            RawFinding {
                severity: r.severity,
                resource_id,
                message: r.description.unwrap_or_default(),
                rule_id: r.long_id.or(r.rule_id),
            }
        })
        .collect();
    Ok(findings)
}

fn parse_checkov(content: &str) -> Result<Vec<RawFinding>, GateError> {
    let reports = match serde_json::from_str::<CheckovDocument>(content)? {
        CheckovDocument::Many(reports) => reports,
        CheckovDocument::One(report) => vec![report],
    };
    let findings = reports
        .into_iter()
        .filter_map(|r| r.results)
        .flat_map(|r| r.failed_checks)
        .map(|c| RawFinding {
            // checkov leaves severity null without a platform key
            severity: c.severity.unwrap_or_else(|| "unknown".to_string()),
            resource_id: c.resource,
            message: c.check_name.unwrap_or_else(|| c.check_id.clone()),
            rule_id: Some(c.check_id),
        })
        .collect();
    Ok(findings)
}

/// Load a scanner report from disk. A missing or unreadable report means the
/// scanner did not run, which is distinct from a clean scan.
pub async fn load_report(tool: ScanTool, path: &Path) -> RawScanOutput {
    if !path.exists() {
        warn!(tool = %tool, path = %path.display(), "Scan report not found");
        return RawScanOutput::unavailable(tool, format!("report not found: {}", path.display()));
    }

    let content = match tokio::fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) => {
            warn!(tool = %tool, error = %e, "Failed to read scan report");
            return RawScanOutput::unavailable(tool, format!("unreadable report: {}", e));
        }
    };

    if content.trim().is_empty() {
        return RawScanOutput::unavailable(tool, "report is empty");
    }

    match parse_report(tool, &content) {
        Ok(findings) => {
            info!(tool = %tool, path = %path.display(), findings = findings.len(), "Loaded scan report");
            RawScanOutput::completed(tool, findings)
        }
        Err(e) => {
            warn!(tool = %tool, error = %e, "Failed to parse scan report");
            RawScanOutput::unavailable(tool, format!("unparseable report: {}", e))
        }
    }
}
