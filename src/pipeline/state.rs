use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::GateError;
use crate::models::Stage;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn from_passed(passed: bool) -> Self {
        if passed {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}

/// Run lifecycle: `Pending → Running(scan) → Running(cost) → Running(policy) → Aggregated`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Pending,
    Running(Stage),
    Aggregated(Verdict),
}

impl PipelineStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStatus::Aggregated(_))
    }

    fn can_advance_to(&self, next: &PipelineStatus) -> bool {
        use PipelineStatus::*;
        matches!(
            (self, next),
            (Pending, Running(Stage::Scan))
                | (Running(Stage::Scan), Running(Stage::Cost))
                | (Running(Stage::Cost), Running(Stage::Policy))
                | (Running(Stage::Policy), Aggregated(_))
        )
    }
}

impl std::fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running(stage) => write!(f, "running({})", stage),
            Self::Aggregated(Verdict::Pass) => write!(f, "aggregated(pass)"),
            Self::Aggregated(Verdict::Fail) => write!(f, "aggregated(fail)"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transition {
    pub status: PipelineStatus,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    pub run_id: String,
    pub status: PipelineStatus,
    pub transitions: Vec<Transition>,
    pub start_time: DateTime<Utc>,
}

impl PipelineState {
    pub fn new(run_id: impl Into<String>) -> Self {
        let start_time = Utc::now();
        Self {
            run_id: run_id.into(),
            status: PipelineStatus::Pending,
            transitions: vec![Transition {
                status: PipelineStatus::Pending,
                at: start_time,
            }],
            start_time,
        }
    }

    pub fn advance(&mut self, next: PipelineStatus) -> Result<(), GateError> {
        if !self.status.can_advance_to(&next) {
            return Err(GateError::InvalidTransition(format!("{} -> {}", self.status, next)));
        }
        self.status = next;
        self.transitions.push(Transition {
            status: next,
            at: Utc::now(),
        });
        Ok(())
    }

    pub fn duration_ms(&self) -> u64 {
        Utc::now()
            .signed_duration_since(self.start_time)
            .num_milliseconds()
            .unsigned_abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_lifecycle() {
        let mut state = PipelineState::new("run-1");
        state.advance(PipelineStatus::Running(Stage::Scan)).unwrap();
        state.advance(PipelineStatus::Running(Stage::Cost)).unwrap();
        state.advance(PipelineStatus::Running(Stage::Policy)).unwrap();
        state.advance(PipelineStatus::Aggregated(Verdict::Fail)).unwrap();
        assert!(state.status.is_terminal());
        assert_eq!(state.transitions.len(), 5);
    }

    #[test]
    fn test_cannot_skip_stages() {
        let mut state = PipelineState::new("run-2");
        let err = state.advance(PipelineStatus::Running(Stage::Cost)).unwrap_err();
        assert!(matches!(err, GateError::InvalidTransition(_)));
        assert_eq!(state.status, PipelineStatus::Pending);
    }

    #[test]
    fn test_terminal_state_is_final() {
        let mut state = PipelineState::new("run-3");
        state.advance(PipelineStatus::Running(Stage::Scan)).unwrap();
        state.advance(PipelineStatus::Running(Stage::Cost)).unwrap();
        state.advance(PipelineStatus::Running(Stage::Policy)).unwrap();
        state.advance(PipelineStatus::Aggregated(Verdict::Pass)).unwrap();
        assert!(state.advance(PipelineStatus::Running(Stage::Scan)).is_err());
        assert!(state.advance(PipelineStatus::Aggregated(Verdict::Fail)).is_err());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(PipelineStatus::Running(Stage::Cost)).unwrap();
        assert_eq!(json, serde_json::json!({"running": "cost"}));
        let json = serde_json::to_value(PipelineStatus::Pending).unwrap();
        assert_eq!(json, serde_json::json!("pending"));
    }
}
