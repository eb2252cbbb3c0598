use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::environment::{EventKind, Trigger};
use crate::errors::GateError;
use crate::models::EnvironmentName;

#[derive(Parser)]
#[command(
    name = "deploygate",
    version,
    about = "Deployment gate for static-site infrastructure changes"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run all gates for the triggering ref and report a verdict
    Run(RunArgs),
    /// Show the environment profile a trigger resolves to
    Resolve(ResolveArgs),
    /// Run only the cost estimate for the resolved environment
    Estimate(EstimateArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

#[derive(Args, Clone, Debug)]
pub struct TriggerArgs {
    /// Git ref being deployed (branch, tag, or refs/... form)
    #[arg(long = "ref")]
    pub git_ref: String,

    /// Triggering event: push, pull_request, manual, tag (GitHub event names accepted)
    #[arg(long, default_value = "push")]
    pub event: String,

    /// Environment chosen on a manual dispatch: dev, staging, prod
    #[arg(long)]
    pub environment: Option<String>,
}

impl TriggerArgs {
    pub fn to_trigger(&self) -> Result<Trigger, GateError> {
        let event_kind: EventKind = self.event.parse()?;
        let mut trigger = Trigger::new(self.git_ref.clone(), event_kind);
        if let Some(ref env) = self.environment {
            let name: EnvironmentName = env.parse()?;
            trigger = trigger.with_manual_environment(name);
        }
        Ok(trigger)
    }
}

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[command(flatten)]
    pub trigger: TriggerArgs,

    /// Plan JSON from `terraform show -json` / `tofu show -json`
    #[arg(long)]
    pub plan: Option<String>,

    /// tfsec JSON report
    #[arg(long)]
    pub tfsec: Option<String>,

    /// checkov JSON report
    #[arg(long)]
    pub checkov: Option<String>,

    /// Write the full JSON report to this path
    #[arg(short, long)]
    pub output: Option<String>,

    /// Append a Markdown summary to this path (e.g. $GITHUB_STEP_SUMMARY)
    #[arg(long)]
    pub summary: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct ResolveArgs {
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[command(flatten)]
    pub trigger: TriggerArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone, Debug)]
pub struct EstimateArgs {
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[command(flatten)]
    pub trigger: TriggerArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone, Debug)]
pub struct ValidateArgs {
    /// Path to YAML config file
    pub config: String,
}
