use crate::models::Stage;

pub struct StageDefinition {
    pub stage: Stage,
    pub display_name: &'static str,
    pub description: &'static str,
}

pub static STAGES: &[StageDefinition] = &[
    StageDefinition {
        stage: Stage::Scan,
        display_name: "Security Scan",
        description: "Static and vulnerability scanner findings against the scan policy",
    },
    StageDefinition {
        stage: Stage::Cost,
        display_name: "Cost Estimate",
        description: "Monthly component costs against the environment budget",
    },
    StageDefinition {
        stage: Stage::Policy,
        display_name: "Policy Check",
        description: "Planned resource changes against declarative policy rules",
    },
];

pub fn display_name(stage: Stage) -> &'static str {
    STAGES
        .iter()
        .find(|d| d.stage == stage)
        .map(|d| d.display_name)
        .unwrap_or("Unknown")
}
