use crate::cli::CommonArgs;
use crate::pattern::PatternStore;
use crate::util::parse_date;
use anyhow::Context;
use console::style;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

fn load(common: &CommonArgs) -> anyhow::Result<PatternStore> {
    PatternStore::load_or_default(&common.pattern)
        .with_context(|| format!("Failed to load pattern from {}", common.pattern.display()))
}

fn save(common: &CommonArgs, pattern: &PatternStore) -> anyhow::Result<()> {
    pattern
        .save(&common.pattern)
        .with_context(|| format!("Failed to save pattern to {}", common.pattern.display()))?;
    debug!(path = %common.pattern.display(), days = pattern.len(), "pattern saved");
    Ok(())
}

pub fn set(common: CommonArgs, date: &str, count: u32) -> anyhow::Result<()> {
    let date = parse_date(date)?;
    let mut pattern = load(&common)?;
    pattern.set(date, count)?;
    save(&common, &pattern)?;
    println!("{date}: {} commit(s)", style(count).green());
    Ok(())
}

pub fn reset(common: CommonArgs) -> anyhow::Result<()> {
    let mut pattern = load(&common)?;
    pattern.reset();
    save(&common, &pattern)?;
    println!("Pattern cleared");
    Ok(())
}

pub fn fill(common: CommonArgs, min: u32, max: u32, seed: Option<u64>) -> anyhow::Result<()> {
    let mut pattern = load(&common)?;
    let today = common.today();
    match seed {
        Some(seed) => pattern.random_fill(min, max, today, &mut StdRng::seed_from_u64(seed))?,
        None => pattern.random_fill(min, max, today, &mut rand::thread_rng())?,
    }
    save(&common, &pattern)?;
    println!(
        "Filled the calendar up to {today} with {}-{} commits per day ({} total)",
        min,
        max,
        style(pattern.total()).green()
    );
    Ok(())
}
