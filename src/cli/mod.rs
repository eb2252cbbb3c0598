pub mod commands;
pub mod estimate;
pub mod resolve;
pub mod run;
pub mod validate;

pub use commands::{Cli, Commands, LogFormat};

use crate::errors::GateError;

/// Process exit code for an error that aborted a command.
pub fn exit_code(error: &GateError) -> i32 {
    match error {
        GateError::Config(_) | GateError::Yaml(_) => 2,
        GateError::UnresolvedEnvironment(_) => 3,
        _ => 4,
    }
}
