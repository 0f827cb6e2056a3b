pub mod engine;
pub mod exec;
pub mod fs;
pub mod worker;

pub use engine::{CancelToken, Engine, BRANCH, REMOTE, SCRATCH_FILE};
pub use exec::exec;
pub use fs::{LocalFs, ScratchFs};
pub use worker::{spawn, GenerationHandle};
