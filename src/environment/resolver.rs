//! Maps a CI trigger onto the environment profile for the run.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::catalog::ProfileCatalog;
use super::trigger::{EventKind, Trigger};
use crate::errors::GateError;
use crate::models::{EnvironmentName, EnvironmentProfile};

pub const DEFAULT_BRANCH: &str = "main";

static RELEASE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v\d+\.\d+\.\d+$").expect("valid release tag pattern"));

static CANDIDATE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v\d+\.\d+\.\d+-rc[0-9A-Za-z.\-]*$").expect("valid candidate tag pattern")
});

const DEV_BRANCH_PREFIXES: &[&str] = &["feature/", "bugfix/"];

/// Pure resolver: identical triggers always yield identical profiles.
#[derive(Debug, Clone)]
pub struct EnvironmentResolver {
    default_branch: String,
    catalog: ProfileCatalog,
}

impl EnvironmentResolver {
    pub fn new(default_branch: impl Into<String>, catalog: ProfileCatalog) -> Self {
        Self {
            default_branch: default_branch.into(),
            catalog,
        }
    }

    pub fn default_branch(&self) -> &str {
        &self.default_branch
    }

    pub fn catalog(&self) -> &ProfileCatalog {
        &self.catalog
    }

    /// Apply the resolution rules in order; the first match wins.
    pub fn resolve_name(&self, trigger: &Trigger) -> Result<EnvironmentName, GateError> {
        if let Some(env) = trigger.manual_environment {
            debug!(environment = %env, "Resolved from manual input");
            return Ok(env);
        }

        let r = trigger.short_ref();

        if RELEASE_TAG.is_match(r) {
            debug!(git_ref = r, "Resolved release tag");
            return Ok(EnvironmentName::Prod);
        }

        if CANDIDATE_TAG.is_match(r) {
            debug!(git_ref = r, "Resolved release candidate tag");
            return Ok(EnvironmentName::Staging);
        }

        if r == self.default_branch && trigger.event_kind == EventKind::Push {
            debug!(git_ref = r, "Resolved default branch push");
            return Ok(EnvironmentName::Staging);
        }

        if DEV_BRANCH_PREFIXES.iter().any(|p| r.starts_with(p)) {
            debug!(git_ref = r, "Resolved work branch");
            return Ok(EnvironmentName::Dev);
        }

        Err(GateError::UnresolvedEnvironment(format!(
            "no rule matches ref '{}' for {:?} event",
            trigger.git_ref, trigger.event_kind
        )))
    }

    pub fn resolve(&self, trigger: &Trigger) -> Result<EnvironmentProfile, GateError> {
        let name = self.resolve_name(trigger)?;
        Ok(self.catalog.profile(name))
    }
}

impl Default for EnvironmentResolver {
    fn default() -> Self {
        Self::new(DEFAULT_BRANCH, ProfileCatalog::builtin())
    }
}
