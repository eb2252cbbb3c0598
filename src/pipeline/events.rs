use crate::models::{EnvironmentName, Stage};

/// Progress messages streamed from the orchestrator to a consumer such as the CLI.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    PipelineStarted {
        run_id: String,
        environment: EnvironmentName,
    },
    StageStarted {
        stage: Stage,
        display_name: String,
    },
    StageCompleted {
        stage: Stage,
        passed: bool,
    },
    /// A sibling's blocking failure cancelled this stage before it finished.
    StageCancelled {
        stage: Stage,
    },
    /// A blocking failure in `stage` triggered fail-fast cancellation.
    FailFastTriggered {
        stage: Stage,
    },
    PipelineCompleted {
        passed: bool,
        duration_ms: u64,
    },
}
