pub mod repo;
pub mod runner;

pub use repo::{diff_counts, ScratchHistory};
pub use runner::{git_available, GitOutput, GitRunner, SystemGit};
