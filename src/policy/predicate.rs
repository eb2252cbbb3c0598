//! Declarative predicates over a single resource change.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{ChangeKind, ResourceChange};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// Resource type matches a glob such as `aws_s3_bucket*`.
    ResourceType { pattern: String },
    #[serde(rename = "change_kind")]
    ChangeIn { any_of: Vec<ChangeKind> },
    AttributeEquals { attribute: String, value: Value },
    AttributeNotEquals { attribute: String, value: Value },
    AttributeIn { attribute: String, values: Vec<Value> },
    AttributeMissing { attribute: String },
    AttributePresent { attribute: String },
    All { predicates: Vec<Predicate> },
    Any { predicates: Vec<Predicate> },
    Not { predicate: Box<Predicate> },
}

impl Predicate {
    /// Evaluate against `change`. `Err` carries the reason the predicate
    /// could not be decided, e.g. an attribute it compares is absent.
    ///
    /// `all` and `any` short-circuit left to right.
    pub fn evaluate(&self, change: &ResourceChange) -> Result<bool, String> {
        match self {
            Predicate::ResourceType { pattern } => {
                let pattern = glob::Pattern::new(pattern)
                    .map_err(|e| format!("invalid resource type pattern '{}': {}", pattern, e))?;
                Ok(pattern.matches(&change.resource_type))
            }
            Predicate::ChangeIn { any_of } => Ok(any_of.contains(&change.change_kind)),
            Predicate::AttributeEquals { attribute, value } => {
                Ok(required(change, attribute)? == value)
            }
            Predicate::AttributeNotEquals { attribute, value } => {
                Ok(required(change, attribute)? != value)
            }
            Predicate::AttributeIn { attribute, values } => {
                let actual = required(change, attribute)?;
                Ok(values.iter().any(|v| v == actual))
            }
            Predicate::AttributeMissing { attribute } => Ok(lookup(change, attribute).is_none()),
            Predicate::AttributePresent { attribute } => Ok(lookup(change, attribute).is_some()),
            Predicate::All { predicates } => {
                for p in predicates {
                    if !p.evaluate(change)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Predicate::Any { predicates } => {
                for p in predicates {
                    if p.evaluate(change)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Predicate::Not { predicate } => Ok(!predicate.evaluate(change)?),
        }
    }

    /// Static checks that do not need a resource change.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Predicate::ResourceType { pattern } => glob::Pattern::new(pattern)
                .map(|_| ())
                .map_err(|e| format!("invalid resource type pattern '{}': {}", pattern, e)),
            Predicate::ChangeIn { any_of } if any_of.is_empty() => {
                Err("change_kind predicate lists no change kinds".to_string())
            }
            Predicate::AttributeEquals { attribute, .. }
            | Predicate::AttributeNotEquals { attribute, .. }
            | Predicate::AttributeIn { attribute, .. }
            | Predicate::AttributeMissing { attribute }
            | Predicate::AttributePresent { attribute }
                if attribute.trim().is_empty() =>
            {
                Err("attribute path is empty".to_string())
            }
            Predicate::All { predicates } | Predicate::Any { predicates } => {
                predicates.iter().try_for_each(Predicate::validate)
            }
            Predicate::Not { predicate } => predicate.validate(),
            _ => Ok(()),
        }
    }
}

fn required<'a>(change: &'a ResourceChange, path: &str) -> Result<&'a Value, String> {
    lookup(change, path).ok_or_else(|| format!("missing expected attribute '{}'", path))
}

/// Walk a dotted attribute path through nested objects and arrays.
/// A JSON null counts as absent.
fn lookup<'a>(change: &'a ResourceChange, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = change.attributes.get(first)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn change(resource_type: &str, kind: ChangeKind, attrs: Value) -> ResourceChange {
        ResourceChange {
            address: format!("{}.this", resource_type),
            resource_type: resource_type.to_string(),
            change_kind: kind,
            attributes: attrs.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn test_resource_type_glob() {
        let p = Predicate::ResourceType { pattern: "aws_s3_bucket*".into() };
        assert!(p.evaluate(&change("aws_s3_bucket_acl", ChangeKind::Create, json!({}))).unwrap());
        assert!(!p.evaluate(&change("aws_route53_record", ChangeKind::Create, json!({}))).unwrap());
    }

    #[test]
    fn test_nested_attribute_path_with_index() {
        let c = change(
            "aws_cloudfront_distribution",
            ChangeKind::Update,
            json!({"default_cache_behavior": [{"viewer_protocol_policy": "allow-all"}]}),
        );
        let p = Predicate::AttributeEquals {
            attribute: "default_cache_behavior.0.viewer_protocol_policy".into(),
            value: json!("allow-all"),
        };
        assert!(p.evaluate(&c).unwrap());
    }

    #[test]
    fn test_missing_attribute_is_evaluation_error() {
        let c = change("aws_s3_bucket", ChangeKind::Create, json!({"bucket": "site"}));
        let p = Predicate::AttributeEquals { attribute: "acl".into(), value: json!("private") };
        let err = p.evaluate(&c).unwrap_err();
        assert!(err.contains("acl"));
    }

    #[test]
    fn test_null_counts_as_missing() {
        let c = change("aws_s3_bucket", ChangeKind::Create, json!({"acl": null}));
        let p = Predicate::AttributeMissing { attribute: "acl".into() };
        assert!(p.evaluate(&c).unwrap());
    }

    #[test]
    fn test_all_short_circuits_before_attribute_check() {
        let c = change("aws_route53_record", ChangeKind::Create, json!({}));
        let p = Predicate::All {
            predicates: vec![
                Predicate::ResourceType { pattern: "aws_s3_bucket".into() },
                Predicate::AttributeEquals { attribute: "acl".into(), value: json!("public-read") },
            ],
        };
        assert_eq!(p.evaluate(&c), Ok(false));
    }

    #[test]
    fn test_any_and_not() {
        let c = change("aws_s3_bucket", ChangeKind::Delete, json!({}));
        let p = Predicate::Not {
            predicate: Box::new(Predicate::Any {
                predicates: vec![
                    Predicate::ChangeIn { any_of: vec![ChangeKind::Create] },
                    Predicate::ChangeIn { any_of: vec![ChangeKind::Update] },
                ],
            }),
        };
        assert!(p.evaluate(&c).unwrap());
    }

    #[test]
    fn test_deserialize_tagged_predicate() {
        let p: Predicate = serde_yaml::from_str(
            "op: attribute_in\nattribute: acl\nvalues: [public-read, public-read-write]",
        )
        .unwrap();
        assert!(matches!(p, Predicate::AttributeIn { .. }));
        let kind: Predicate = serde_yaml::from_str("op: change_kind\nany_of: [delete]").unwrap();
        assert_eq!(kind, Predicate::ChangeIn { any_of: vec![ChangeKind::Delete] });
    }

    #[test]
    fn test_validate_rejects_bad_pattern_and_empty_kinds() {
        assert!(Predicate::ResourceType { pattern: "aws_[".into() }.validate().is_err());
        assert!(Predicate::ChangeIn { any_of: vec![] }.validate().is_err());
        assert!(Predicate::All {
            predicates: vec![Predicate::AttributePresent { attribute: " ".into() }]
        }
        .validate()
        .is_err());
    }
}
