use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("Unresolved environment: {0}")]
    UnresolvedEnvironment(String),

    #[error("Scan tool unavailable: {tool} ({reason})")]
    ScanToolUnavailable { tool: String, reason: String },

    #[error("Malformed cost input: {0}")]
    MalformedCostInput(String),

    #[error("Policy evaluation error: rule '{rule_id}' on '{resource_id}': {reason}")]
    PolicyEvaluation {
        rule_id: String,
        resource_id: String,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),

    #[error("Plan input error: {0}")]
    PlanInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
