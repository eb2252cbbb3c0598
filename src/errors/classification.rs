use super::types::GateError;

/// How far an error propagates once raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
    /// Aborts the whole run before any gate executes.
    Run,
    /// Aborts only the owning gate; the aggregator still reports the others.
    Gate,
}

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub scope: ErrorScope,
}

impl ErrorClassification {
    pub fn aborts_run(&self) -> bool {
        self.scope == ErrorScope::Run
    }
}

impl GateError {
    /// Classify this error to determine its type and how far it propagates.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            // Run-fatal errors
            GateError::UnresolvedEnvironment(_) => ErrorClassification {
                error_type: "UnresolvedEnvironment",
                scope: ErrorScope::Run,
            },
            GateError::Config(_) => ErrorClassification {
                error_type: "ConfigError",
                scope: ErrorScope::Run,
            },
            GateError::InvalidTransition(_) => ErrorClassification {
                error_type: "InvalidTransition",
                scope: ErrorScope::Run,
            },
            GateError::Internal(_) => ErrorClassification {
                error_type: "InternalError",
                scope: ErrorScope::Run,
            },

            // Gate-fatal errors
            GateError::ScanToolUnavailable { .. } => ErrorClassification {
                error_type: "ScanToolUnavailable",
                scope: ErrorScope::Gate,
            },
            GateError::MalformedCostInput(_) => ErrorClassification {
                error_type: "MalformedCostInput",
                scope: ErrorScope::Gate,
            },
            GateError::PolicyEvaluation { .. } => ErrorClassification {
                error_type: "PolicyEvaluationError",
                scope: ErrorScope::Gate,
            },
            GateError::PlanInput(_) => ErrorClassification {
                error_type: "PlanInputError",
                scope: ErrorScope::Gate,
            },

            // Input loading
            GateError::Io(_) => ErrorClassification {
                error_type: "IoError",
                scope: ErrorScope::Run,
            },
            GateError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                scope: ErrorScope::Run,
            },
            GateError::Yaml(_) => ErrorClassification {
                error_type: "YamlError",
                scope: ErrorScope::Run,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_environment_aborts_run() {
        let err = GateError::UnresolvedEnvironment("release/1.0".into());
        let class = err.classify();
        assert!(class.aborts_run());
        assert_eq!(class.error_type, "UnresolvedEnvironment");
    }

    #[test]
    fn test_scan_tool_unavailable_is_gate_scoped() {
        let err = GateError::ScanToolUnavailable {
            tool: "checkov".into(),
            reason: "report missing".into(),
        };
        let class = err.classify();
        assert_eq!(class.scope, ErrorScope::Gate);
        assert_eq!(class.error_type, "ScanToolUnavailable");
    }

    #[test]
    fn test_malformed_cost_is_gate_scoped() {
        let err = GateError::MalformedCostInput("S3: -1".into());
        assert!(!err.classify().aborts_run());
    }

    #[test]
    fn test_policy_evaluation_is_gate_scoped() {
        let err = GateError::PolicyEvaluation {
            rule_id: "s3-versioning".into(),
            resource_id: "aws_s3_bucket.site".into(),
            reason: "missing attribute".into(),
        };
        assert_eq!(err.classify().scope, ErrorScope::Gate);
    }

    #[test]
    fn test_config_error_aborts_run() {
        let err = GateError::Config("duplicate rule id".into());
        assert!(err.classify().aborts_run());
    }
}
