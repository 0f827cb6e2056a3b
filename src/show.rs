use crate::calendar;
use crate::cli::CommonArgs;
use crate::model::{CalendarOutput, SCHEMA_VERSION};
use crate::pattern::PatternStore;
use crate::render::{output_calendar, output_json};
use anyhow::Context;
use chrono::Utc;

pub fn exec(common: CommonArgs, json: bool) -> anyhow::Result<()> {
    let pattern = PatternStore::load_or_default(&common.pattern)
        .with_context(|| format!("Failed to load pattern from {}", common.pattern.display()))?;
    let today = common.today();
    let view = calendar::build(today, &pattern);
    let active_days = view.bound_days().filter(|c| c.count > 0).count();

    if json {
        let output = CalendarOutput {
            version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            today,
            pattern_path: common.pattern.to_string_lossy().to_string(),
            total_commits: view.total(),
            active_days,
            calendar: view,
        };
        output_json(&output)?;
    } else {
        output_calendar(&view, active_days)?;
    }

    Ok(())
}
