pub mod types;
pub mod classification;

pub use types::GateError;
pub use classification::{ErrorClassification, ErrorScope};
