use std::path::Path;

use tracing::info;

use super::formatter::format_summary_markdown;
use crate::errors::GateError;
use crate::pipeline::PipelineReport;

async fn ensure_parent(path: &Path) -> Result<(), GateError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    Ok(())
}

pub async fn write_json_report(report: &PipelineReport, path: &Path) -> Result<(), GateError> {
    ensure_parent(path).await?;
    let json = serde_json::to_string_pretty(report)?;
    tokio::fs::write(path, json).await?;
    info!(path = %path.display(), "JSON report written");
    Ok(())
}

/// Write the Markdown summary. An existing file is appended to, matching how
/// CI step-summary files accumulate output from several steps.
pub async fn write_markdown_summary(report: &PipelineReport, path: &Path) -> Result<(), GateError> {
    use tokio::io::AsyncWriteExt;

    ensure_parent(path).await?;
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(format_summary_markdown(report).as_bytes()).await?;
    file.write_all(b"\n").await?;
    file.flush().await?;
    info!(path = %path.display(), "Markdown summary written");
    Ok(())
}

pub async fn read_json_report(path: &Path) -> Result<PipelineReport, GateError> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}
