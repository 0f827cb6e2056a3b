pub mod calendar;
pub mod cli;
pub mod edit;
pub mod error;
pub mod generate;
pub mod git;
pub mod model;
pub mod pattern;
pub mod render;
pub mod show;
pub mod util;
pub mod verify;

pub use error::{FailureKind, GpaintError, Result};
pub use pattern::PatternStore;
