use deploygate::cli::commands::{EstimateArgs, RunArgs, TriggerArgs, ValidateArgs};
use deploygate::cli::{estimate, exit_code, run, validate};
use deploygate::errors::GateError;
use deploygate::models::{EnvironmentName, Stage};
use deploygate::reporting::read_json_report;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const TFSEC_CLEAN: &str = r#"{"results": null}"#;

const CHECKOV_REPORT: &str = r#"[
  {
    "check_type": "terraform",
    "results": {
      "failed_checks": [
        {
          "check_id": "CKV_AWS_18",
          "check_name": "Ensure the S3 bucket has access logging enabled",
          "resource": "aws_s3_bucket.site",
          "severity": "LOW"
        }
      ]
    }
  }
]"#;

const PLAN: &str = r#"{
  "format_version": "1.2",
  "resource_changes": [
    {
      "address": "aws_s3_bucket.site",
      "mode": "managed",
      "type": "aws_s3_bucket",
      "change": { "actions": ["create"], "before": null, "after": { "bucket": "www.example.com", "acl": "private" } }
    },
    {
      "address": "data.aws_iam_policy_document.read",
      "mode": "data",
      "type": "aws_iam_policy_document",
      "change": { "actions": ["read"], "before": null, "after": {} }
    }
  ]
}"#;

const CONFIG: &str = r#"
environments:
  dev:
    budget_limit: 40
"#;

fn write(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

fn trigger(git_ref: &str, event: &str) -> TriggerArgs {
    TriggerArgs {
        git_ref: git_ref.to_string(),
        event: event.to_string(),
        environment: None,
    }
}

fn run_args(dir: &TempDir, git_ref: &str) -> RunArgs {
    RunArgs {
        config: Some(write(dir, "deploygate.yaml", CONFIG)),
        trigger: trigger(git_ref, "push"),
        plan: Some(write(dir, "plan.json", PLAN)),
        tfsec: Some(write(dir, "tfsec.json", TFSEC_CLEAN)),
        checkov: Some(write(dir, "checkov.json", CHECKOV_REPORT)),
        output: Some(dir.path().join("out/report.json").to_string_lossy().into_owned()),
        summary: Some(dir.path().join("summary.md").to_string_lossy().into_owned()),
    }
}

#[tokio::test]
async fn run_writes_json_and_markdown_reports() {
    let dir = TempDir::new().unwrap();
    let args = run_args(&dir, "feature/login-fix");
    let output = args.output.clone().unwrap();
    let summary = args.summary.clone().unwrap();

    let passed = run::handle_run(args, true).await.unwrap();
    assert!(passed);

    let report = read_json_report(Path::new(&output)).await.unwrap();
    assert!(report.passed);
    assert_eq!(report.environment.name, EnvironmentName::Dev);
    assert_eq!(report.severity_counts.low, 1);
    assert_eq!(report.gate(Stage::Scan).unwrap().findings().count(), 1);

    let md = fs::read_to_string(&summary).unwrap();
    assert!(md.contains("# Deployment Gate: ✅ PASS"));
    assert!(md.contains("CKV_AWS_18"));
}

#[tokio::test]
async fn summary_file_is_appended() {
    let dir = TempDir::new().unwrap();
    let summary = dir.path().join("summary.md");
    fs::write(&summary, "## Earlier step\n").unwrap();

    let mut args = run_args(&dir, "feature/login-fix");
    args.summary = Some(summary.to_string_lossy().into_owned());
    run::handle_run(args, true).await.unwrap();

    let md = fs::read_to_string(&summary).unwrap();
    assert!(md.starts_with("## Earlier step\n"));
    assert!(md.contains("# Deployment Gate"));
}

#[tokio::test]
async fn missing_report_fails_gate_not_run() {
    let dir = TempDir::new().unwrap();
    let mut args = run_args(&dir, "feature/login-fix");
    args.checkov = None;
    let output = args.output.clone().unwrap();

    let passed = run::handle_run(args, true).await.unwrap();
    assert!(!passed);

    let report = read_json_report(Path::new(&output)).await.unwrap();
    let scan = report.gate(Stage::Scan).unwrap();
    assert!(!scan.passed);
    assert!(scan.errors().any(|e| e.message.contains("checkov")));
}

#[tokio::test]
async fn missing_plan_fails_policy_gate() {
    let dir = TempDir::new().unwrap();
    let mut args = run_args(&dir, "feature/login-fix");
    args.plan = Some(dir.path().join("absent.json").to_string_lossy().into_owned());
    let output = args.output.clone().unwrap();

    assert!(!run::handle_run(args, true).await.unwrap());
    let report = read_json_report(Path::new(&output)).await.unwrap();
    let policy = report.gate(Stage::Policy).unwrap();
    assert_eq!(policy.errors().next().map(|e| e.error_type.as_str()), Some("PlanInputError"));
}

#[tokio::test]
async fn unresolved_ref_exits_with_code_3() {
    let dir = TempDir::new().unwrap();
    let args = run_args(&dir, "hotfix/urgent");
    let err = run::handle_run(args, true).await.unwrap_err();
    assert!(matches!(err, GateError::UnresolvedEnvironment(_)));
    assert_eq!(exit_code(&err), 3);
}

#[tokio::test]
async fn estimate_reports_budget_check() {
    let passed = estimate::handle_estimate(EstimateArgs {
        config: None,
        trigger: trigger("feature/login-fix", "push"),
        json: true,
    })
    .await
    .unwrap();
    // 27.15 against the built-in dev budget of 10.00
    assert!(!passed);
}

#[tokio::test]
async fn validate_rejects_conflicting_config() {
    let dir = TempDir::new().unwrap();
    let good = write(&dir, "good.yaml", CONFIG);
    assert!(validate::handle_validate(ValidateArgs { config: good }).await.is_ok());

    let bad = write(
        &dir,
        "bad.yaml",
        "cost:\n  components:\n    - { component: WAF, monthly_cost: 6 }\n    - { component: WAF, monthly_cost: 6 }\n",
    );
    let err = validate::handle_validate(ValidateArgs { config: bad }).await.unwrap_err();
    assert_eq!(exit_code(&err), 2);
}
