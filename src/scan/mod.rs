pub mod adapters;
pub mod dedup;
pub mod gate;

pub use adapters::{load_report, parse_report};
pub use gate::{RawFinding, RawScanOutput, ScanGateOutcome, ScanRun, SecurityScanGate};
