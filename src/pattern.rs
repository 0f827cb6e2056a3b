use crate::error::{GpaintError, Result};
use crate::util::calendar_days;
use chrono::NaiveDate;
use rand::Rng;
use std::collections::BTreeMap;
use std::path::Path;

/// Highest commit count a single day may ask for.
pub const MAX_COUNT: u32 = 100;

/// Sparse mapping of day to requested commit count. Missing days count as zero.
///
/// Iteration is chronological; a generation run commits in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternStore {
    days: BTreeMap<NaiveDate, u32>,
}

fn check_count(count: u32) -> Result<u32> {
    if count > MAX_COUNT {
        return Err(GpaintError::InvalidCount {
            count,
            min: 0,
            max: MAX_COUNT,
        });
    }
    Ok(count)
}

impl PatternStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, date: NaiveDate) -> u32 {
        self.days.get(&date).copied().unwrap_or(0)
    }

    pub fn set(&mut self, date: NaiveDate, count: u32) -> Result<()> {
        let count = check_count(count)?;
        self.days.insert(date, count);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.days.clear();
    }

    /// Overwrite every calendar day up to `today` with a uniform draw from `min..=max`.
    pub fn random_fill<R: Rng>(&mut self, min: u32, max: u32, today: NaiveDate, rng: &mut R) -> Result<()> {
        check_count(max)?;
        if min > max {
            return Err(GpaintError::InvalidCount { count: min, min: 0, max });
        }
        for day in calendar_days(today) {
            self.days.insert(day, rng.gen_range(min..=max));
        }
        Ok(())
    }

    pub fn total(&self) -> u64 {
        self.days.values().map(|&c| c as u64).sum()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, u32)> + '_ {
        self.days.iter().map(|(d, c)| (*d, *c))
    }

    pub fn active_days(&self) -> impl Iterator<Item = (NaiveDate, u32)> + '_ {
        self.iter().filter(|(_, count)| *count > 0)
    }

    pub fn to_snapshot(&self) -> BTreeMap<NaiveDate, u32> {
        self.days.clone()
    }

    pub fn from_snapshot(snapshot: BTreeMap<NaiveDate, u32>) -> Result<Self> {
        for &count in snapshot.values() {
            check_count(count)?;
        }
        Ok(Self { days: snapshot })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: BTreeMap<NaiveDate, u32> = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.days)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Like [`PatternStore::load`], but a missing file yields an empty pattern.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut json = self.to_json()?;
        json.push('\n');
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}
