use serde::{Deserialize, Serialize};
use serde_json::json;

use super::predicate::Predicate;
use crate::models::{ChangeKind, RuleSeverity};

/// A declarative rule: when `predicate` matches a resource change, the rule
/// fires and records a violation of `severity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub rule_id: String,
    #[serde(default)]
    pub description: String,
    pub severity: RuleSeverity,
    pub predicate: Predicate,
}

fn resource(pattern: &str) -> Predicate {
    Predicate::ResourceType {
        pattern: pattern.to_string(),
    }
}

/// Baseline rules for an S3 + CloudFront static site.
pub fn default_rules() -> Vec<PolicyRule> {
    vec![
        PolicyRule {
            rule_id: "s3-no-public-acl".to_string(),
            description: "S3 buckets must not grant public ACLs".to_string(),
            severity: RuleSeverity::Deny,
            predicate: Predicate::All {
                predicates: vec![
                    resource("aws_s3_bucket*"),
                    Predicate::AttributePresent { attribute: "acl".to_string() },
                    Predicate::AttributeIn {
                        attribute: "acl".to_string(),
                        values: vec![json!("public-read"), json!("public-read-write")],
                    },
                ],
            },
        },
        PolicyRule {
            rule_id: "s3-no-bucket-delete".to_string(),
            description: "Content buckets must not be destroyed by a deployment".to_string(),
            severity: RuleSeverity::Deny,
            predicate: Predicate::All {
                predicates: vec![
                    resource("aws_s3_bucket"),
                    Predicate::ChangeIn { any_of: vec![ChangeKind::Delete] },
                ],
            },
        },
        PolicyRule {
            rule_id: "cloudfront-https-only".to_string(),
            description: "CloudFront must redirect or require HTTPS for viewers".to_string(),
            severity: RuleSeverity::Deny,
            predicate: Predicate::All {
                predicates: vec![
                    resource("aws_cloudfront_distribution"),
                    Predicate::Not {
                        predicate: Box::new(Predicate::ChangeIn { any_of: vec![ChangeKind::Delete] }),
                    },
                    Predicate::AttributeEquals {
                        attribute: "default_cache_behavior.0.viewer_protocol_policy".to_string(),
                        value: json!("allow-all"),
                    },
                ],
            },
        },
        PolicyRule {
            rule_id: "cloudfront-waf-attached".to_string(),
            description: "CloudFront distributions should sit behind a WAF web ACL".to_string(),
            severity: RuleSeverity::Warn,
            predicate: Predicate::All {
                predicates: vec![
                    resource("aws_cloudfront_distribution"),
                    Predicate::Not {
                        predicate: Box::new(Predicate::ChangeIn { any_of: vec![ChangeKind::Delete] }),
                    },
                    Predicate::AttributeMissing { attribute: "web_acl_id".to_string() },
                ],
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_have_unique_ids() {
        let rules = default_rules();
        let mut ids: Vec<_> = rules.iter().map(|r| r.rule_id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), rules.len());
    }

    #[test]
    fn test_default_rules_are_valid() {
        for rule in default_rules() {
            assert!(rule.predicate.validate().is_ok(), "{}", rule.rule_id);
        }
    }

    #[test]
    fn test_rule_deserializes_from_yaml() {
        let yaml = r#"
rule_id: route53-no-delete
description: DNS records must not be deleted
severity: deny
predicate:
  op: all
  predicates:
    - op: resource_type
      pattern: aws_route53_record
    - op: change_kind
      any_of: [delete]
"#;
        let rule: PolicyRule = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rule.severity, RuleSeverity::Deny);
        assert!(matches!(rule.predicate, Predicate::All { .. }));
    }
}
