use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of change a plan proposes for a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Create => "create",
            ChangeKind::Update => "update",
            ChangeKind::Delete => "delete",
        }
    }
}

/// One proposed resource change taken from an infrastructure plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceChange {
    /// Resource address, e.g. `module.site.aws_s3_bucket.content`.
    pub address: String,
    pub resource_type: String,
    pub change_kind: ChangeKind,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

/// Severity a rule author attaches to a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    Deny,
    Warn,
}

/// Severity recorded on a violation. `EvaluationError` is reserved for
/// predicates that could not be evaluated against a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Deny,
    Warn,
    EvaluationError,
}

impl ViolationSeverity {
    /// Deny and evaluation errors belong to the class an environment may block on.
    pub fn is_blocking_class(&self) -> bool {
        matches!(self, ViolationSeverity::Deny | ViolationSeverity::EvaluationError)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationSeverity::Deny => "deny",
            ViolationSeverity::Warn => "warn",
            ViolationSeverity::EvaluationError => "evaluation_error",
        }
    }
}

impl From<RuleSeverity> for ViolationSeverity {
    fn from(s: RuleSeverity) -> Self {
        match s {
            RuleSeverity::Deny => ViolationSeverity::Deny,
            RuleSeverity::Warn => ViolationSeverity::Warn,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyViolation {
    pub rule_id: String,
    pub resource_id: String,
    pub severity: ViolationSeverity,
    pub message: String,
}
