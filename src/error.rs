use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GpaintError>;

#[derive(Error, Debug)]
pub enum GpaintError {
    #[error("Invalid commit count {count}: expected a value between {min} and {max}")]
    InvalidCount { count: u32, min: u32, max: u32 },
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("git executable not found on PATH; install git from https://git-scm.com/ and retry")]
    GitNotFound,
    #[error(
        "Scratch directory {} is locked or access was denied ({reason}). \
         Close every program that may be using it (file explorers, editors, git shells), \
         or remove the directory manually, then retry.",
        .path.display()
    )]
    DirectoryLocked { path: PathBuf, reason: String },
    #[error("Push failed:\n{0}")]
    PushRejected(String),
    #[error("`git {command}` failed: {stderr}")]
    GitCommand { command: String, stderr: String },
    #[error("Generation cancelled after {completed} of {total} commits")]
    Cancelled { completed: u64, total: u64 },
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Other: {0}")]
    Other(String),
    #[error("Git error: {0}")]
    Git(#[from] Box<gix::open::Error>),
    #[error("Reference find error: {0}")]
    RefFind(#[from] Box<gix::reference::find::existing::Error>),
    #[error("Head peel error: {0}")]
    HeadPeel(#[from] Box<gix::head::peel::to_commit::Error>),
    #[error("Object find with conversion error: {0}")]
    ObjectFindConv(#[from] Box<gix::object::find::existing::with_conversion::Error>),
    #[error("Object decode error: {0}")]
    ObjectDecode(#[from] Box<gix::objs::decode::Error>),
}

/// Coarse failure classes reported to callers of a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidCount,
    GitNotFound,
    DirectoryLocked,
    PushRejected,
    Cancelled,
    UnexpectedFailure,
}

impl GpaintError {
    pub fn kind(&self) -> FailureKind {
        match self {
            GpaintError::InvalidCount { .. } => FailureKind::InvalidCount,
            GpaintError::GitNotFound => FailureKind::GitNotFound,
            GpaintError::DirectoryLocked { .. } => FailureKind::DirectoryLocked,
            GpaintError::PushRejected(_) => FailureKind::PushRejected,
            GpaintError::Cancelled { .. } => FailureKind::Cancelled,
            _ => FailureKind::UnexpectedFailure,
        }
    }
}

// Manual From implementations for unboxed to boxed conversions
impl From<gix::open::Error> for GpaintError {
    fn from(err: gix::open::Error) -> Self {
        GpaintError::Git(Box::new(err))
    }
}

impl From<gix::reference::find::existing::Error> for GpaintError {
    fn from(err: gix::reference::find::existing::Error) -> Self {
        GpaintError::RefFind(Box::new(err))
    }
}

impl From<gix::head::peel::to_commit::Error> for GpaintError {
    fn from(err: gix::head::peel::to_commit::Error) -> Self {
        GpaintError::HeadPeel(Box::new(err))
    }
}

impl From<gix::object::find::existing::with_conversion::Error> for GpaintError {
    fn from(err: gix::object::find::existing::with_conversion::Error) -> Self {
        GpaintError::ObjectFindConv(Box::new(err))
    }
}

impl From<gix::objs::decode::Error> for GpaintError {
    fn from(err: gix::objs::decode::Error) -> Self {
        GpaintError::ObjectDecode(Box::new(err))
    }
}
