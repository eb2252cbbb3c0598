//! Reader for Terraform/OpenTofu `show -json` plan documents.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::errors::GateError;
use crate::models::{ChangeKind, ResourceChange};

/// The resource changes a policy gate evaluates, or why there are none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlanSnapshot {
    Loaded { changes: Vec<ResourceChange> },
    Unavailable { reason: String },
}

impl PlanSnapshot {
    pub fn loaded(changes: Vec<ResourceChange>) -> Self {
        PlanSnapshot::Loaded { changes }
    }
}

#[derive(Debug, Deserialize)]
struct PlanDocument {
    #[serde(default)]
    resource_changes: Vec<PlanResourceChange>,
}

#[derive(Debug, Deserialize)]
struct PlanResourceChange {
    address: String,
    #[serde(default)]
    mode: Option<String>,
    #[serde(rename = "type")]
    resource_type: String,
    change: PlanChange,
}

#[derive(Debug, Deserialize)]
struct PlanChange {
    actions: Vec<String>,
    #[serde(default)]
    before: Value,
    #[serde(default)]
    after: Value,
}

/// Map plan actions onto a change kind. Replacements count as creates;
/// no-op and read actions yield `None`.
fn change_kind(actions: &[String]) -> Result<Option<ChangeKind>, GateError> {
    let actions: Vec<&str> = actions.iter().map(String::as_str).collect();
    match actions.as_slice() {
        ["create"] => Ok(Some(ChangeKind::Create)),
        ["update"] => Ok(Some(ChangeKind::Update)),
        ["delete"] => Ok(Some(ChangeKind::Delete)),
        ["delete", "create"] | ["create", "delete"] => Ok(Some(ChangeKind::Create)),
        ["no-op"] | ["read"] | [] => Ok(None),
        other => Err(GateError::PlanInput(format!("unsupported plan actions {:?}", other))),
    }
}

pub fn parse_plan(content: &str) -> Result<Vec<ResourceChange>, GateError> {
    let doc: PlanDocument = serde_json::from_str(content)?;
    let mut changes = Vec::new();
    for rc in doc.resource_changes {
        if rc.mode.as_deref() == Some("data") {
            continue;
        }
        let Some(kind) = change_kind(&rc.change.actions)? else {
            debug!(address = %rc.address, "Skipping unchanged resource");
            continue;
        };
        let state = match kind {
            ChangeKind::Delete => rc.change.before,
            ChangeKind::Create | ChangeKind::Update => rc.change.after,
        };
        let attributes = match state {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        changes.push(ResourceChange {
            address: rc.address,
            resource_type: rc.resource_type,
            change_kind: kind,
            attributes,
        });
    }
    Ok(changes)
}

/// Load a plan from disk. Read and parse failures become an unavailable
/// snapshot so only the policy gate fails.
pub async fn load_plan(path: &Path) -> PlanSnapshot {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read plan");
            return PlanSnapshot::Unavailable {
                reason: format!("cannot read {}: {}", path.display(), e),
            };
        }
    };
    match parse_plan(&content) {
        Ok(changes) => {
            info!(path = %path.display(), changes = changes.len(), "Loaded plan");
            PlanSnapshot::Loaded { changes }
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to parse plan");
            PlanSnapshot::Unavailable {
                reason: format!("cannot parse {}: {}", path.display(), e),
            }
        }
    }
}
