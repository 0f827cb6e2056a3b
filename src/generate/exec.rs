use super::{spawn, Engine, LocalFs};
use crate::cli::CommonArgs;
use crate::error::GpaintError;
use crate::git::{git_available, SystemGit};
use crate::model::{CommitJob, GenerationEvent, Identity, Outcome};
use crate::pattern::PatternStore;
use anyhow::Context;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::info;

fn required(flag: &str, value: Option<String>) -> anyhow::Result<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => anyhow::bail!("--{flag} is required (or set GPAINT_{})", flag.to_uppercase()),
    }
}

pub fn exec(
    common: CommonArgs,
    name: Option<String>,
    email: Option<String>,
    remote: Option<String>,
    work_dir: PathBuf,
) -> anyhow::Result<()> {
    if !git_available() {
        return Err(GpaintError::GitNotFound.into());
    }

    let identity = Identity {
        name: required("name", name)?,
        email: required("email", email)?,
    };
    let remote = required("remote", remote)?;

    let pattern = PatternStore::load_or_default(&common.pattern)
        .with_context(|| format!("Failed to load pattern from {}", common.pattern.display()))?;
    let total = pattern.total();
    info!(total, pattern = %common.pattern.display(), "starting generation");

    println!(
        "Generating {} commit(s) across {} day(s) in {}",
        style(total).green().bold(),
        pattern.active_days().count(),
        work_dir.display()
    );

    let job = CommitJob::new(identity, remote, pattern, work_dir);
    let handle = spawn(Engine::new(SystemGit::new(), LocalFs), job)
        .context("Failed to start generation worker")?;

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.green/white}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );

    let mut outcome: Option<Outcome> = None;
    for event in handle.events.iter() {
        match event {
            GenerationEvent::Stage(stage) if !stage.is_terminal() => pb.set_message(stage.label()),
            GenerationEvent::Stage(_) => {}
            GenerationEvent::Progress(percent) => pb.set_position(percent as u64),
            GenerationEvent::Finished(result) => outcome = Some(result),
        }
    }

    let outcome = outcome.unwrap_or_else(|| handle.wait());
    if outcome.success {
        pb.set_position(100);
        pb.finish_with_message("Done");
        println!("{} {}", style("✔").green(), outcome.message);
        Ok(())
    } else {
        pb.abandon_with_message("Failed");
        anyhow::bail!(outcome.message)
    }
}
