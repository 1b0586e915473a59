//! JSON export of the record sequence
//!
//! Export is read-only and refuses sequences that fail the completeness check,
//! so a broken board never produces a file that would later be re-imported.

use std::path::{Path, PathBuf};

use tokio::fs;

use shared::{component_info, logging::Component, Investor, ProjectId};
use crate::core::validate_for_save;
use crate::error::BoardResult;

const DEFAULT_FILE_STEM: &str = "investors";

/// Pretty JSON of the full sequence
pub fn to_json(records: &[Investor]) -> BoardResult<String> {
    validate_for_save(records)?;
    Ok(serde_json::to_string_pretty(records)?)
}

/// `<project>.json`, or `investors.json` without a project
pub fn export_file_name(project: Option<&ProjectId>) -> String {
    let stem = project.map(ProjectId::as_str).unwrap_or(DEFAULT_FILE_STEM);
    format!("{stem}.json")
}

/// Write the export into `dir`, returning the written path
pub async fn export_to_file(records: &[Investor], dir: &Path, project: Option<&ProjectId>) -> BoardResult<PathBuf> {
    let content = to_json(records)?;
    fs::create_dir_all(dir).await?;

    let path = dir.join(export_file_name(project));
    fs::write(&path, content).await?;

    component_info!(Component::Board, "📁 Exported {} records to {}", records.len(), path.display());
    Ok(path)
}
