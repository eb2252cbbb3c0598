use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::GateError;
use crate::models::EnvironmentName;

/// CI event that started the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Push,
    PullRequest,
    Manual,
    Tag,
}

impl FromStr for EventKind {
    type Err = GateError;

    /// Accepts both the short names and GitHub Actions event names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "push" => Ok(Self::Push),
            "pull_request" | "pull-request" | "pr" | "pull_request_target" => Ok(Self::PullRequest),
            "manual" | "workflow_dispatch" => Ok(Self::Manual),
            "tag" | "release" => Ok(Self::Tag),
            other => Err(GateError::Config(format!("Unknown event kind: {}", other))),
        }
    }
}

/// Trigger descriptor: the ref being built, how the run was started, and an
/// optional environment picked by hand on a manual dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub event_kind: EventKind,
    #[serde(default)]
    pub manual_environment: Option<EnvironmentName>,
}

impl Trigger {
    pub fn new(git_ref: impl Into<String>, event_kind: EventKind) -> Self {
        Self {
            git_ref: git_ref.into(),
            event_kind,
            manual_environment: None,
        }
    }

    pub fn with_manual_environment(mut self, env: EnvironmentName) -> Self {
        self.manual_environment = Some(env);
        self
    }

    /// The ref with any `refs/heads/` or `refs/tags/` prefix removed.
    pub fn short_ref(&self) -> &str {
        let r = self.git_ref.trim();
        r.strip_prefix("refs/heads/")
            .or_else(|| r.strip_prefix("refs/tags/"))
            .unwrap_or(r)
    }
}
