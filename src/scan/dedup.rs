use std::collections::HashMap;
use std::collections::hash_map::Entry;
use crate::models::finding::Finding;

/// Collapse findings reported more than once for the same rule and resource,
/// keeping the highest severity. First-seen order is preserved.
pub fn deduplicate_findings(findings: Vec<Finding>) -> Vec<Finding> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<Finding> = Vec::with_capacity(findings.len());
    for finding in findings {
        match index.entry(dedup_key(&finding)) {
            Entry::Vacant(e) => {
                e.insert(kept.len());
                kept.push(finding);
            }
            Entry::Occupied(e) => {
                let existing = &mut kept[*e.get()];
                // Keep higher severity (lower rank number)
                if finding.severity.rank() < existing.severity.rank() {
                    *existing = finding;
                }
            }
        }
    }
    kept
}

fn dedup_key(finding: &Finding) -> String {
    let rule = finding
        .rule_id
        .as_deref()
        .map(str::to_string)
        .unwrap_or_else(|| normalize_message(&finding.message));
    format!("{}|{}|{}", finding.source, rule, finding.resource_id)
}

fn normalize_message(message: &str) -> String {
    message.to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && c != ' ', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScanTool, Severity};

    fn finding(rule: &str, resource: &str, severity: Severity) -> Finding {
        Finding {
            severity,
            source: ScanTool::Tfsec,
            resource_id: resource.to_string(),
            message: format!("{} on {}", rule, resource),
            rule_id: Some(rule.to_string()),
        }
    }

    #[test]
    fn test_duplicates_keep_highest_severity_in_place() {
        let out = deduplicate_findings(vec![
            finding("aws-s3-enable-versioning", "aws_s3_bucket.site", Severity::Medium),
            finding("aws-cloudfront-enable-waf", "aws_cloudfront_distribution.cdn", Severity::High),
            finding("aws-s3-enable-versioning", "aws_s3_bucket.site", Severity::Critical),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].rule_id.as_deref(), Some("aws-s3-enable-versioning"));
        assert_eq!(out[0].severity, Severity::Critical);
        assert_eq!(out[1].severity, Severity::High);
    }

    #[test]
    fn test_same_rule_different_tools_are_distinct() {
        let mut other = finding("shared", "r", Severity::Low);
        other.source = ScanTool::Checkov;
        let out = deduplicate_findings(vec![finding("shared", "r", Severity::Low), other]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_missing_rule_id_falls_back_to_message() {
        let mut a = finding("x", "r", Severity::Low);
        a.rule_id = None;
        a.message = "Bucket is PUBLIC!".into();
        let mut b = a.clone();
        b.message = "bucket is public".into();
        assert_eq!(deduplicate_findings(vec![a, b]).len(), 1);
    }
}
