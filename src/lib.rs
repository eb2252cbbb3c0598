//! Deployment gate orchestrator: resolves the target environment for a CI
//! trigger, runs the security scan, cost and policy gates concurrently, and
//! aggregates them into a single pass/fail verdict.

pub mod cli;
pub mod config;
pub mod cost;
pub mod environment;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod policy;
pub mod reporting;
pub mod scan;
pub mod utils;
