pub mod aggregator;
pub mod events;
pub mod orchestrator;
pub mod phase;
pub mod state;

pub use aggregator::{Aggregator, PipelineReport};
pub use events::PipelineEvent;
pub use orchestrator::{GateInputs, GateOrchestrator};
pub use state::{PipelineState, PipelineStatus, Transition, Verdict};
