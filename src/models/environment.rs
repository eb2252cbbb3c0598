use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::finding::Severity;
use super::policy::ViolationSeverity;
use crate::errors::GateError;

/// Deployment tier a run targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentName {
    Dev,
    Staging,
    Prod,
}

impl EnvironmentName {
    pub const ALL: [EnvironmentName; 3] = [Self::Dev, Self::Staging, Self::Prod];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Staging => "staging",
            Self::Prod => "prod",
        }
    }
}

impl std::fmt::Display for EnvironmentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnvironmentName {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Dev),
            "staging" | "stage" => Ok(Self::Staging),
            "prod" | "production" => Ok(Self::Prod),
            other => Err(GateError::Config(format!("Unknown environment: {}", other))),
        }
    }
}

/// How the security scan gate treats high-severity findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPolicy {
    BlockHighCritical,
    WarnOnly,
}

impl ScanPolicy {
    pub fn blocks(&self, severity: Severity) -> bool {
        match self {
            Self::BlockHighCritical => matches!(severity, Severity::Critical | Severity::High),
            Self::WarnOnly => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlockHighCritical => "block_high_critical",
            Self::WarnOnly => "warn_only",
        }
    }
}

/// Policy enforcement strictness for an environment tier.
///
/// `Inform` records everything as informational, `Warn` surfaces blocking
/// violations as warnings, `Block` fails the gate on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Enforcement {
    Inform,
    Warn,
    Block,
}

impl Enforcement {
    pub fn for_environment(name: EnvironmentName) -> Self {
        match name {
            EnvironmentName::Dev => Self::Inform,
            EnvironmentName::Staging => Self::Warn,
            EnvironmentName::Prod => Self::Block,
        }
    }

    /// Whether a violation of this severity fails the policy gate.
    pub fn blocks(&self, severity: ViolationSeverity) -> bool {
        match self {
            Self::Block => severity.is_blocking_class(),
            Self::Warn | Self::Inform => false,
        }
    }

    /// Whether a violation of this severity should be surfaced as a warning.
    pub fn warns(&self, severity: ViolationSeverity) -> bool {
        match self {
            Self::Warn => severity.is_blocking_class(),
            Self::Block | Self::Inform => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inform => "inform",
            Self::Warn => "warn",
            Self::Block => "block",
        }
    }
}

/// Resolved deployment tier and the enforcement parameters attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentProfile {
    pub name: EnvironmentName,
    pub budget_limit: Decimal,
    pub scan_policy: ScanPolicy,
    pub enforcement: Enforcement,
    /// WAF requests per five-minute window.
    pub rate_limit: u32,
    pub replication_enabled: bool,
    /// Cancel sibling gates once one gate fails with a blocking result.
    pub fail_fast: bool,
}

impl EnvironmentProfile {
    pub fn builtin(name: EnvironmentName) -> Self {
        match name {
            EnvironmentName::Dev => Self {
                name,
                budget_limit: Decimal::new(1000, 2),
                scan_policy: ScanPolicy::WarnOnly,
                enforcement: Enforcement::Inform,
                rate_limit: 2000,
                replication_enabled: false,
                fail_fast: false,
            },
            EnvironmentName::Staging => Self {
                name,
                budget_limit: Decimal::new(2500, 2),
                scan_policy: ScanPolicy::BlockHighCritical,
                enforcement: Enforcement::Warn,
                rate_limit: 2000,
                replication_enabled: false,
                fail_fast: false,
            },
            EnvironmentName::Prod => Self {
                name,
                budget_limit: Decimal::new(5000, 2),
                scan_policy: ScanPolicy::BlockHighCritical,
                enforcement: Enforcement::Block,
                rate_limit: 5000,
                replication_enabled: true,
                fail_fast: true,
            },
        }
    }
}
