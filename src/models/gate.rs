use serde::{Deserialize, Serialize};

use super::cost::CostLineItem;
use super::finding::Finding;
use super::policy::PolicyViolation;
use crate::errors::GateError;

/// Pipeline stage a gate result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Scan,
    Cost,
    Policy,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Scan, Stage::Cost, Stage::Policy];
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scan => write!(f, "scan"),
            Self::Cost => write!(f, "cost"),
            Self::Policy => write!(f, "policy"),
        }
    }
}

/// A fatal gate error surfaced in the gate's details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateErrorRecord {
    pub error_type: String,
    pub message: String,
}

impl From<&GateError> for GateErrorRecord {
    fn from(e: &GateError) -> Self {
        Self {
            error_type: e.classify().error_type.to_string(),
            message: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GateDetail {
    Finding(Finding),
    Violation(PolicyViolation),
    CostItem(CostLineItem),
    Error(GateErrorRecord),
}

/// Pass/fail decision of one gate plus the records that drove it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateResult {
    pub stage: Stage,
    pub passed: bool,
    pub details: Vec<GateDetail>,
    /// Set when the gate was cancelled before it produced a decision.
    #[serde(default)]
    pub cancelled: bool,
}

impl GateResult {
    pub fn new(stage: Stage, passed: bool, details: Vec<GateDetail>) -> Self {
        Self {
            stage,
            passed,
            details,
            cancelled: false,
        }
    }

    /// A gate aborted by a fatal error. The error is kept in the details
    /// after any records gathered before it.
    pub fn from_error(stage: Stage, error: &GateError, mut details: Vec<GateDetail>) -> Self {
        details.push(GateDetail::Error(error.into()));
        Self::new(stage, false, details)
    }

    pub fn cancelled(stage: Stage) -> Self {
        Self {
            stage,
            passed: false,
            details: Vec::new(),
            cancelled: true,
        }
    }

    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.details.iter().filter_map(|d| match d {
            GateDetail::Finding(f) => Some(f),
            _ => None,
        })
    }

    pub fn violations(&self) -> impl Iterator<Item = &PolicyViolation> {
        self.details.iter().filter_map(|d| match d {
            GateDetail::Violation(v) => Some(v),
            _ => None,
        })
    }

    pub fn errors(&self) -> impl Iterator<Item = &GateErrorRecord> {
        self.details.iter().filter_map(|d| match d {
            GateDetail::Error(e) => Some(e),
            _ => None,
        })
    }

    pub fn has_error(&self) -> bool {
        self.errors().next().is_some()
    }
}
