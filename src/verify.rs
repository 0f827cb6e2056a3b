use crate::cli::CommonArgs;
use crate::git::ScratchHistory;
use crate::model::{VerifyOutput, SCHEMA_VERSION};
use crate::pattern::PatternStore;
use crate::render::{output_json, output_verify};
use anyhow::Context;
use chrono::Utc;
use std::path::PathBuf;

pub fn exec(common: CommonArgs, work_dir: PathBuf, json: bool) -> anyhow::Result<()> {
    let pattern = PatternStore::load_or_default(&common.pattern)
        .with_context(|| format!("Failed to load pattern from {}", common.pattern.display()))?;
    let history = ScratchHistory::open(&work_dir)
        .with_context(|| format!("Failed to open scratch repository {}", work_dir.display()))?;

    let per_day = history
        .commits_per_day()
        .context("Failed to read scratch repository history")?;
    let mismatches = crate::git::diff_counts(&pattern, &per_day);

    let output = VerifyOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        repository_path: history.path().to_string_lossy().to_string(),
        expected_commits: pattern.total(),
        actual_commits: per_day.values().map(|&c| c as u64).sum(),
        mismatches,
    };

    if json {
        output_json(&output)?;
    } else {
        output_verify(&output)?;
    }

    if !output.mismatches.is_empty() {
        anyhow::bail!("{} day(s) differ from the pattern", output.mismatches.len());
    }
    Ok(())
}
