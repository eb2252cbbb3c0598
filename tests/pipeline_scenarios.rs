use deploygate::cost::{CostEstimator, CostModel, RawCostItem};
use deploygate::environment::{EventKind, EnvironmentResolver, Trigger};
use deploygate::errors::GateError;
use deploygate::models::{
    ChangeKind, EnvironmentName, EnvironmentProfile, ResourceChange, ScanTool, Severity, Stage,
    ViolationSeverity,
};
use deploygate::pipeline::{GateInputs, GateOrchestrator, PipelineStatus, Verdict};
use deploygate::policy::{default_rules, PlanSnapshot};
use deploygate::scan::{RawFinding, RawScanOutput};
use rust_decimal::Decimal;
use serde_json::json;
use tokio_util::sync::CancellationToken;

fn clean_scans() -> Vec<RawScanOutput> {
    vec![
        RawScanOutput::completed(ScanTool::Tfsec, Vec::new()),
        RawScanOutput::completed(ScanTool::Checkov, Vec::new()),
    ]
}

fn site_bucket(acl: &str) -> ResourceChange {
    let attributes = json!({ "bucket": "www.example.com", "acl": acl });
    ResourceChange {
        address: "aws_s3_bucket.site".to_string(),
        resource_type: "aws_s3_bucket".to_string(),
        change_kind: ChangeKind::Create,
        attributes: attributes.as_object().cloned().unwrap_or_default(),
    }
}

fn inputs_for(profile: &EnvironmentProfile, changes: Vec<ResourceChange>) -> GateInputs {
    GateInputs {
        scan_outputs: clean_scans(),
        cost_items: CostModel::default().line_items_for(profile),
        plan: PlanSnapshot::loaded(changes),
        rules: default_rules(),
    }
}

async fn run(profile: EnvironmentProfile, inputs: GateInputs) -> deploygate::pipeline::PipelineReport {
    GateOrchestrator::new(profile, CostEstimator::default())
        .run(inputs)
        .await
        .unwrap()
}

#[tokio::test]
async fn feature_branch_in_dev_fails_on_cost_with_severe_overage() {
    let resolver = EnvironmentResolver::default();
    let profile = resolver
        .resolve(&Trigger::new("feature/login-fix", EventKind::Push))
        .unwrap();
    assert_eq!(profile.name, EnvironmentName::Dev);

    let inputs = inputs_for(&profile, vec![site_bucket("private")]);
    let report = run(profile, inputs).await;

    assert_eq!(report.cost_report.total, Decimal::new(2715, 2));
    assert_eq!(report.cost_report.annual_total, Decimal::new(32580, 2));
    assert!(report.severe_overage);
    assert!(!report.gate(Stage::Cost).unwrap().passed);
    assert!(report.gate(Stage::Scan).unwrap().passed);
    assert!(report.gate(Stage::Policy).unwrap().passed);
    assert!(!report.passed);
    assert_eq!(report.failed_stages(), vec![Stage::Cost]);
}

#[tokio::test]
async fn release_tag_in_prod_with_clean_inputs_passes() {
    let resolver = EnvironmentResolver::default();
    let profile = resolver
        .resolve(&Trigger::new("v1.2.3", EventKind::Tag))
        .unwrap();
    assert_eq!(profile.name, EnvironmentName::Prod);
    assert!(profile.replication_enabled);

    let inputs = inputs_for(&profile, vec![site_bucket("private")]);
    let report = run(profile, inputs).await;

    assert!(report.passed);
    assert_eq!(report.severity_counts.total(), 0);
    assert_eq!(report.cost_report.total, Decimal::new(2765, 2));
    assert!(report
        .cost_report
        .items
        .iter()
        .any(|i| i.component == "S3 Replication"));
    assert_eq!(
        report.transitions.iter().map(|t| t.status).collect::<Vec<_>>(),
        vec![
            PipelineStatus::Pending,
            PipelineStatus::Running(Stage::Scan),
            PipelineStatus::Running(Stage::Cost),
            PipelineStatus::Running(Stage::Policy),
            PipelineStatus::Aggregated(Verdict::Pass),
        ]
    );
}

#[tokio::test]
async fn release_candidate_resolves_to_staging() {
    let resolver = EnvironmentResolver::default();
    let profile = resolver
        .resolve(&Trigger::new("refs/tags/v1.2.3-rc1", EventKind::Tag))
        .unwrap();
    assert_eq!(profile.name, EnvironmentName::Staging);

    let report = run(profile.clone(), inputs_for(&profile, Vec::new())).await;
    assert_eq!(report.environment.name, EnvironmentName::Staging);
    assert!(!report.gate(Stage::Cost).unwrap().passed);
    assert!(!report.severe_overage);
}

#[tokio::test]
async fn unknown_branch_is_unresolved() {
    let err = EnvironmentResolver::default()
        .resolve(&Trigger::new("hotfix/urgent", EventKind::Push))
        .unwrap_err();
    assert!(matches!(err, GateError::UnresolvedEnvironment(_)));
    assert!(err.classify().aborts_run());
}

fn generous(mut profile: EnvironmentProfile) -> EnvironmentProfile {
    profile.budget_limit = Decimal::new(100, 0);
    profile.fail_fast = false;
    profile
}

#[tokio::test]
async fn public_bucket_denied_in_prod_but_informational_in_dev() {
    let prod = generous(EnvironmentProfile::builtin(EnvironmentName::Prod));
    let report = run(prod.clone(), inputs_for(&prod, vec![site_bucket("public-read")])).await;
    let policy = report.gate(Stage::Policy).unwrap();
    assert!(!policy.passed);
    assert!(!report.passed);
    let violation = policy.violations().next().unwrap();
    assert_eq!(violation.rule_id, "s3-no-public-acl");
    assert_eq!(violation.severity, ViolationSeverity::Deny);

    let staging = generous(EnvironmentProfile::builtin(EnvironmentName::Staging));
    let report = run(staging.clone(), inputs_for(&staging, vec![site_bucket("public-read")])).await;
    assert!(report.gate(Stage::Policy).unwrap().passed);
    assert!(report.passed);

    let dev = generous(EnvironmentProfile::builtin(EnvironmentName::Dev));
    let report = run(dev.clone(), inputs_for(&dev, vec![site_bucket("public-read")])).await;
    let policy = report.gate(Stage::Policy).unwrap();
    assert!(policy.passed);
    assert_eq!(policy.violations().count(), 1);
    assert!(report.passed);
}

#[tokio::test]
async fn high_finding_blocks_staging_but_not_dev() {
    let finding = RawFinding {
        severity: "high".to_string(),
        resource_id: "aws_cloudfront_distribution.cdn".to_string(),
        message: "Distribution allows outdated TLS".to_string(),
        rule_id: Some("aws-cloudfront-use-secure-tls-policy".to_string()),
    };

    for (env, expect_pass) in [(EnvironmentName::Staging, false), (EnvironmentName::Dev, true)] {
        let profile = generous(EnvironmentProfile::builtin(env));
        let mut inputs = inputs_for(&profile, Vec::new());
        inputs.scan_outputs = vec![
            RawScanOutput::completed(ScanTool::Tfsec, vec![finding.clone()]),
            RawScanOutput::completed(ScanTool::Checkov, Vec::new()),
        ];
        let report = run(profile, inputs).await;
        assert_eq!(report.severity_counts.high, 1);
        assert_eq!(report.gate(Stage::Scan).unwrap().passed, expect_pass, "{}", env);
        assert_eq!(
            report.gate(Stage::Scan).unwrap().findings().next().map(|f| f.severity),
            Some(Severity::High)
        );
    }
}

#[tokio::test]
async fn missing_scanner_fails_scan_gate_only() {
    let profile = generous(EnvironmentProfile::builtin(EnvironmentName::Dev));
    let mut inputs = inputs_for(&profile, Vec::new());
    inputs.scan_outputs = vec![
        RawScanOutput::completed(ScanTool::Tfsec, Vec::new()),
        RawScanOutput::unavailable(ScanTool::Checkov, "checkov not installed"),
    ];
    let report = run(profile, inputs).await;

    let scan = report.gate(Stage::Scan).unwrap();
    assert!(!scan.passed);
    assert_eq!(scan.errors().next().map(|e| e.error_type.as_str()), Some("ScanToolUnavailable"));
    assert!(report.gate(Stage::Cost).unwrap().passed);
    assert!(report.gate(Stage::Policy).unwrap().passed);
    assert!(!report.passed);
}

#[tokio::test]
async fn malformed_cost_fails_cost_gate_only() {
    let profile = generous(EnvironmentProfile::builtin(EnvironmentName::Staging));
    let mut inputs = inputs_for(&profile, Vec::new());
    inputs.cost_items = vec![
        RawCostItem::new("S3", "0.25"),
        RawCostItem::new("CloudFront", "eight fifty"),
    ];
    let report = run(profile, inputs).await;

    let cost = report.gate(Stage::Cost).unwrap();
    assert!(!cost.passed);
    assert!(cost.has_error());
    assert!(report.gate(Stage::Scan).unwrap().passed);
    assert!(report.gate(Stage::Policy).unwrap().passed);
}

#[tokio::test]
async fn unevaluable_predicate_is_recorded_and_blocks_in_prod() {
    let profile = generous(EnvironmentProfile::builtin(EnvironmentName::Prod));
    let distribution = ResourceChange {
        address: "aws_cloudfront_distribution.cdn".to_string(),
        resource_type: "aws_cloudfront_distribution".to_string(),
        change_kind: ChangeKind::Update,
        attributes: json!({ "web_acl_id": "arn:aws:wafv2:acl" })
            .as_object()
            .cloned()
            .unwrap_or_default(),
    };
    let report = run(profile.clone(), inputs_for(&profile, vec![distribution])).await;

    let policy = report.gate(Stage::Policy).unwrap();
    let violation = policy.violations().next().unwrap();
    assert_eq!(violation.rule_id, "cloudfront-https-only");
    assert_eq!(violation.severity, ViolationSeverity::EvaluationError);
    assert!(!policy.passed);
}

#[tokio::test]
async fn external_cancellation_reports_cancelled_gates() {
    let token = CancellationToken::new();
    token.cancel();
    let profile = EnvironmentProfile::builtin(EnvironmentName::Staging);
    let inputs = inputs_for(&profile, Vec::new());
    let report = GateOrchestrator::new(profile, CostEstimator::default())
        .with_cancel_token(token)
        .run(inputs)
        .await
        .unwrap();

    assert!(!report.passed);
    assert_eq!(report.gates.len(), 3);
    for gate in &report.gates {
        assert!(gate.cancelled);
        assert!(!gate.passed);
    }
}

#[tokio::test]
async fn fail_fast_keeps_computed_results() {
    // Prod is fail-fast; the cost gate fails against a tiny budget.
    let mut profile = EnvironmentProfile::builtin(EnvironmentName::Prod);
    profile.budget_limit = Decimal::ONE;
    let inputs = inputs_for(&profile, vec![site_bucket("private")]);
    let report = run(profile, inputs).await;

    assert!(!report.passed);
    let cost = report.gate(Stage::Cost).unwrap();
    assert!(!cost.cancelled);
    assert!(!cost.passed);
    for gate in report.gates.iter().filter(|g| g.cancelled) {
        assert!(!gate.passed);
        assert!(gate.details.is_empty());
    }
}
