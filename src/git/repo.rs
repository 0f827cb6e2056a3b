use crate::error::{GpaintError, Result};
use crate::model::DayMismatch;
use crate::pattern::PatternStore;
use chrono::{DateTime, NaiveDate};
use gix::{ObjectId, Repository};
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::path::{Path, PathBuf};

/// Read-only view of a generated scratch repository.
pub struct ScratchHistory {
    repo: Repository,
    path: PathBuf,
}

impl ScratchHistory {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let repo = gix::open(&path)?;
        Ok(Self { repo, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Count reachable commits by the calendar day of their commit time.
    ///
    /// The day is taken in the commit's own UTC offset, which is what a
    /// hosting service shows for a backdated `YYYY-MM-DDT12:00:00` commit.
    pub fn commits_per_day(&self) -> Result<BTreeMap<NaiveDate, u32>> {
        let mut per_day = BTreeMap::new();

        let mut head = self.repo.head()?;
        if head.is_unborn() {
            return Ok(per_day);
        }
        let head_commit = head.peel_to_commit_in_place()?;

        let mut seen: HashSet<ObjectId> = HashSet::new();
        let mut stack: VecDeque<ObjectId> = VecDeque::from([head_commit.id]);

        while let Some(commit_id) = stack.pop_back() {
            if !seen.insert(commit_id) {
                continue;
            }

            let commit = self.repo.find_commit(commit_id)?;
            let time = commit.time()?;
            let local_secs = time.seconds + time.offset as i64;
            let day = DateTime::from_timestamp(local_secs, 0)
                .ok_or_else(|| GpaintError::InvalidDate(format!("Invalid timestamp: {}", time.seconds)))?
                .date_naive();
            *per_day.entry(day).or_insert(0) += 1;

            for pid in commit.parent_ids() {
                stack.push_back(pid.into());
            }
        }

        Ok(per_day)
    }
}

/// Days where `actual` disagrees with the pattern, oldest first.
pub fn diff_counts(pattern: &PatternStore, actual: &BTreeMap<NaiveDate, u32>) -> Vec<DayMismatch> {
    let days: BTreeSet<NaiveDate> = pattern
        .active_days()
        .map(|(day, _)| day)
        .chain(actual.keys().copied())
        .collect();

    days.into_iter()
        .filter_map(|date| {
            let expected = pattern.get(date);
            let actual = actual.get(&date).copied().unwrap_or(0);
            (expected != actual).then_some(DayMismatch { date, expected, actual })
        })
        .collect()
}
