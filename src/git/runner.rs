use crate::error::Result;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Captured result of one git invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs git subcommands inside a working directory.
///
/// The generation engine only talks to git through this trait, which keeps it
/// testable without a real repository or remote.
pub trait GitRunner: Send {
    /// Runs `git <args>` in `dir` with extra environment variables and blocks until it exits.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned. A non-zero exit is not an error here.
    fn run(&self, dir: &Path, args: &[&str], envs: &[(&str, &str)]) -> Result<GitOutput>;
}

/// Shells out to the `git` executable.
#[derive(Debug, Clone)]
pub struct SystemGit {
    program: PathBuf,
}

impl SystemGit {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("git"),
        }
    }

    pub fn with_program<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// True when the executable can be launched at all.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false)
    }
}

impl Default for SystemGit {
    fn default() -> Self {
        Self::new()
    }
}

impl GitRunner for SystemGit {
    fn run(&self, dir: &Path, args: &[&str], envs: &[(&str, &str)]) -> Result<GitOutput> {
        debug!(dir = %dir.display(), ?args, "git");
        let output = Command::new(&self.program)
            .args(args)
            .envs(envs.iter().copied())
            .current_dir(dir)
            .output()?;
        Ok(GitOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Preflight check for the `git` executable on PATH.
pub fn git_available() -> bool {
    SystemGit::new().is_available()
}
