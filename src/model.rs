use crate::error::FailureKind;
use crate::pattern::PatternStore;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::path::PathBuf;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

/// Everything one generation run needs. The pattern is an owned snapshot.
#[derive(Debug, Clone)]
pub struct CommitJob {
    pub identity: Identity,
    pub remote_url: String,
    pub pattern: PatternStore,
    pub work_dir: PathBuf,
}

impl CommitJob {
    pub fn new(identity: Identity, remote_url: impl Into<String>, pattern: PatternStore, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            identity,
            remote_url: remote_url.into(),
            pattern,
            work_dir: work_dir.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressState {
    pub completed: u64,
    pub total: u64,
}

impl ProgressState {
    pub fn new(total: u64) -> Self {
        Self { completed: 0, total }
    }

    pub fn advance(&mut self) -> u8 {
        self.completed += 1;
        self.percent()
    }

    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        (self.completed.min(self.total) * 100 / self.total) as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Preparing,
    Committing,
    Pushing,
    Succeeded,
    Failed,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Succeeded | Stage::Failed)
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Idle => "Idle",
            Stage::Preparing => "Preparing scratch repository",
            Stage::Committing => "Creating commits",
            Stage::Pushing => "Pushing to remote",
            Stage::Succeeded => "Done",
            Stage::Failed => "Failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
    pub kind: Option<FailureKind>,
}

impl Outcome {
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into(), kind: None }
    }

    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        Self { success: false, message: message.into(), kind: Some(kind) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationEvent {
    Stage(Stage),
    Progress(u8),
    Finished(Outcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    None,
    Low,
    Medium,
    High,
    Max,
}

impl Intensity {
    pub fn from_count(count: u32) -> Self {
        match count {
            0 => Intensity::None,
            1 => Intensity::Low,
            2..=3 => Intensity::Medium,
            4..=6 => Intensity::High,
            _ => Intensity::Max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub count: u32,
    pub intensity: Intensity,
}

/// One calendar column, Monday first. `None` slots are outside the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekColumn {
    pub days: [Option<DayCell>; 7],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthLabel {
    pub month: String,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekdayLabel {
    pub label: &'static str,
    pub row: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarView {
    pub weeks: Vec<WeekColumn>,
    pub month_labels: Vec<MonthLabel>,
    pub weekday_labels: Vec<WeekdayLabel>,
}

impl CalendarView {
    pub fn bound_days(&self) -> impl Iterator<Item = &DayCell> {
        self.weeks.iter().flat_map(|w| w.days.iter().flatten())
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.bound_days().next().map(|c| c.date)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.bound_days().last().map(|c| c.date)
    }

    pub fn total(&self) -> u64 {
        self.bound_days().map(|c| c.count as u64).sum()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub today: NaiveDate,
    pub pattern_path: String,
    pub total_commits: u64,
    pub active_days: usize,
    pub calendar: CalendarView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayMismatch {
    pub date: NaiveDate,
    pub expected: u32,
    pub actual: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repository_path: String,
    pub expected_commits: u64,
    pub actual_commits: u64,
    pub mismatches: Vec<DayMismatch>,
}
