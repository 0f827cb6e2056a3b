use super::fs::{is_lock_error, ScratchFs};
use crate::error::{GpaintError, Result};
use crate::git::{GitOutput, GitRunner};
use crate::model::{CommitJob, GenerationEvent, Outcome, ProgressState, Stage};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// File inside the scratch repository that every commit appends to.
pub const SCRATCH_FILE: &str = "activity.txt";
pub const BRANCH: &str = "main";
pub const REMOTE: &str = "origin";

/// Cooperative stop flag, checked between commits.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Turns a [`CommitJob`] into a pushed, backdated history.
///
/// Runs `Preparing -> Committing -> Pushing` strictly in order, one git
/// process at a time. Any failure ends the run in `Failed`; nothing is retried.
pub struct Engine<G, F> {
    git: G,
    fs: F,
}

impl<G: GitRunner, F: ScratchFs> Engine<G, F> {
    pub fn new(git: G, fs: F) -> Self {
        Self { git, fs }
    }

    /// Runs the job to completion, reporting stage changes and progress through `emit`.
    ///
    /// Errors never escape: they are folded into the returned [`Outcome`].
    pub fn run(&self, job: &CommitJob, cancel: &CancelToken, emit: &mut dyn FnMut(GenerationEvent)) -> Outcome {
        match self.drive(job, cancel, emit) {
            Ok(total) => {
                info!(total, remote = %job.remote_url, "generation succeeded");
                emit(GenerationEvent::Stage(Stage::Succeeded));
                Outcome::succeeded(format!(
                    "Created {total} commit(s) and pushed them to {}",
                    job.remote_url
                ))
            }
            Err(err) => {
                warn!(kind = ?err.kind(), "generation failed: {err}");
                emit(GenerationEvent::Stage(Stage::Failed));
                Outcome::failed(err.kind(), err.to_string())
            }
        }
    }

    fn drive(&self, job: &CommitJob, cancel: &CancelToken, emit: &mut dyn FnMut(GenerationEvent)) -> Result<u64> {
        emit(GenerationEvent::Stage(Stage::Preparing));
        self.prepare(job)?;

        let mut progress = ProgressState::new(job.pattern.total());
        info!(total = progress.total, dir = %job.work_dir.display(), "committing");
        emit(GenerationEvent::Stage(Stage::Committing));
        self.commit_all(job, &mut progress, cancel, emit)?;

        if cancel.is_cancelled() {
            return Err(cancelled(&progress));
        }

        emit(GenerationEvent::Stage(Stage::Pushing));
        self.push(job)?;
        Ok(progress.total)
    }

    fn prepare(&self, job: &CommitJob) -> Result<()> {
        let dir = job.work_dir.as_path();
        if self.fs.exists(dir) {
            debug!(dir = %dir.display(), "removing previous scratch directory");
            if let Err(err) = self.fs.remove_dir_all(dir) {
                if is_lock_error(&err) {
                    return Err(GpaintError::DirectoryLocked {
                        path: dir.to_path_buf(),
                        reason: err.to_string(),
                    });
                }
                return Err(GpaintError::Other(format!(
                    "Failed to remove {}: {err}",
                    dir.display()
                )));
            }
        }

        self.fs.create_dir_all(dir)?;
        self.git(dir, &["init"], &[])?;
        self.git(dir, &["config", "user.name", &job.identity.name], &[])?;
        self.git(dir, &["config", "user.email", &job.identity.email], &[])?;
        Ok(())
    }

    fn commit_all(
        &self,
        job: &CommitJob,
        progress: &mut ProgressState,
        cancel: &CancelToken,
        emit: &mut dyn FnMut(GenerationEvent),
    ) -> Result<()> {
        let dir = job.work_dir.as_path();
        let file = dir.join(SCRATCH_FILE);

        for (date, count) in job.pattern.active_days() {
            let stamp = format!("{date}T12:00:00");
            let envs = [("GIT_AUTHOR_DATE", stamp.as_str()), ("GIT_COMMITTER_DATE", stamp.as_str())];

            for seq in 1..=count {
                if cancel.is_cancelled() {
                    return Err(cancelled(progress));
                }
                self.fs.append_line(&file, &format!("{date} commit {seq}"))?;
                self.git(dir, &["add", SCRATCH_FILE], &[])?;
                let message = format!("Commit for {date} #{seq}");
                self.git(dir, &["commit", "-m", &message], &envs)?;
                emit(GenerationEvent::Progress(progress.advance()));
            }
        }
        Ok(())
    }

    fn push(&self, job: &CommitJob) -> Result<()> {
        let dir = job.work_dir.as_path();
        self.git(dir, &["branch", "-M", BRANCH], &[])?;
        self.git(dir, &["remote", "add", REMOTE, &job.remote_url], &[])?;

        let out = self.git.run(dir, &["push", "-u", REMOTE, BRANCH, "--force"], &[])?;
        if !out.success() {
            return Err(GpaintError::PushRejected(out.stderr));
        }
        Ok(())
    }

    /// Runs a step that must succeed.
    fn git(&self, dir: &Path, args: &[&str], envs: &[(&str, &str)]) -> Result<GitOutput> {
        let out = self.git.run(dir, args, envs)?;
        if !out.success() {
            return Err(GpaintError::GitCommand {
                command: args.join(" "),
                stderr: out.stderr.trim().to_string(),
            });
        }
        Ok(out)
    }
}

fn cancelled(progress: &ProgressState) -> GpaintError {
    GpaintError::Cancelled {
        completed: progress.completed,
        total: progress.total,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::model::Identity;
    use crate::pattern::PatternStore;
    use pretty_assertions::assert_eq;
    use std::io;
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) struct Call {
        pub args: Vec<String>,
        pub envs: Vec<(String, String)>,
    }

    /// Records every invocation; fails the first call whose args start with `fail_on`.
    #[derive(Clone, Default)]
    pub(crate) struct ScriptedGit {
        pub calls: Arc<Mutex<Vec<Call>>>,
        pub fail_on: Option<(Vec<&'static str>, GitOutput)>,
        pub spawn_error: bool,
    }

    impl ScriptedGit {
        pub fn failing(prefix: &[&'static str], exit_code: i32, stderr: &str) -> Self {
            Self {
                fail_on: Some((
                    prefix.to_vec(),
                    GitOutput {
                        exit_code,
                        stdout: String::new(),
                        stderr: stderr.to_string(),
                    },
                )),
                ..Self::default()
            }
        }

        pub fn args(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().iter().map(|c| c.args.clone()).collect()
        }
    }

    impl GitRunner for ScriptedGit {
        fn run(&self, _dir: &Path, args: &[&str], envs: &[(&str, &str)]) -> Result<GitOutput> {
            if self.spawn_error {
                return Err(io::Error::new(io::ErrorKind::NotFound, "program not found").into());
            }
            self.calls.lock().unwrap().push(Call {
                args: args.iter().map(|a| a.to_string()).collect(),
                envs: envs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            });
            if let Some((prefix, output)) = &self.fail_on {
                if args.starts_with(prefix) {
                    return Ok(output.clone());
                }
            }
            Ok(GitOutput {
                exit_code: 0,
                stdout: String::new(),
                stderr: String::new(),
            })
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum FsOp {
        Remove(PathBuf),
        Create(PathBuf),
        Append(PathBuf, String),
    }

    #[derive(Clone, Default)]
    pub(crate) struct FakeFs {
        pub ops: Arc<Mutex<Vec<FsOp>>>,
        pub existing: bool,
        pub remove_error: Option<io::ErrorKind>,
    }

    impl FakeFs {
        pub fn ops(&self) -> Vec<FsOp> {
            self.ops.lock().unwrap().clone()
        }
    }

    impl ScratchFs for FakeFs {
        fn exists(&self, _path: &Path) -> bool {
            self.existing
        }

        fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
            if let Some(kind) = self.remove_error {
                return Err(io::Error::new(kind, "Access is denied. (os error 5)"));
            }
            self.ops.lock().unwrap().push(FsOp::Remove(path.to_path_buf()));
            Ok(())
        }

        fn create_dir_all(&self, path: &Path) -> io::Result<()> {
            self.ops.lock().unwrap().push(FsOp::Create(path.to_path_buf()));
            Ok(())
        }

        fn append_line(&self, path: &Path, line: &str) -> io::Result<()> {
            self.ops
                .lock()
                .unwrap()
                .push(FsOp::Append(path.to_path_buf(), line.to_string()));
            Ok(())
        }
    }

    pub(crate) fn job(pattern_json: &str) -> CommitJob {
        CommitJob::new(
            Identity {
                name: "Octo Cat".to_string(),
                email: "octo@example.com".to_string(),
            },
            "https://example.com/octo/activity.git",
            PatternStore::from_json(pattern_json).unwrap(),
            "/tmp/gpaint-scratch",
        )
    }

    fn run(git: &ScriptedGit, fs: &FakeFs, job: &CommitJob) -> (Outcome, Vec<GenerationEvent>) {
        run_with(git, fs, job, &CancelToken::new())
    }

    fn run_with(
        git: &ScriptedGit,
        fs: &FakeFs,
        job: &CommitJob,
        cancel: &CancelToken,
    ) -> (Outcome, Vec<GenerationEvent>) {
        let engine = Engine::new(git.clone(), fs.clone());
        let mut events = Vec::new();
        let outcome = engine.run(job, cancel, &mut |e| events.push(e));
        (outcome, events)
    }

    fn stages(events: &[GenerationEvent]) -> Vec<Stage> {
        events
            .iter()
            .filter_map(|e| match e {
                GenerationEvent::Stage(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    fn percents(events: &[GenerationEvent]) -> Vec<u8> {
        events
            .iter()
            .filter_map(|e| match e {
                GenerationEvent::Progress(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn follows_git_protocol_for_each_unit_of_work() {
        let git = ScriptedGit::default();
        let fs = FakeFs::default();
        let job = job(r#"{"2024-01-01": 2, "2024-01-03": 0}"#);

        let (outcome, events) = run(&git, &fs, &job);

        assert!(outcome.success, "{}", outcome.message);
        assert_eq!(
            git.args(),
            vec![
                strings(&["init"]),
                strings(&["config", "user.name", "Octo Cat"]),
                strings(&["config", "user.email", "octo@example.com"]),
                strings(&["add", "activity.txt"]),
                strings(&["commit", "-m", "Commit for 2024-01-01 #1"]),
                strings(&["add", "activity.txt"]),
                strings(&["commit", "-m", "Commit for 2024-01-01 #2"]),
                strings(&["branch", "-M", "main"]),
                strings(&["remote", "add", "origin", "https://example.com/octo/activity.git"]),
                strings(&["push", "-u", "origin", "main", "--force"]),
            ]
        );

        let calls = git.calls.lock().unwrap().clone();
        let commit_envs: Vec<_> = calls
            .iter()
            .filter(|c| c.args[0] == "commit")
            .map(|c| c.envs.clone())
            .collect();
        let expected_env = vec![
            ("GIT_AUTHOR_DATE".to_string(), "2024-01-01T12:00:00".to_string()),
            ("GIT_COMMITTER_DATE".to_string(), "2024-01-01T12:00:00".to_string()),
        ];
        assert_eq!(commit_envs, vec![expected_env.clone(), expected_env]);
        assert!(calls.iter().all(|c| !c.envs.iter().any(|(_, v)| v.starts_with("2024-01-03"))));

        let scratch = PathBuf::from("/tmp/gpaint-scratch");
        assert_eq!(
            fs.ops(),
            vec![
                FsOp::Create(scratch.clone()),
                FsOp::Append(scratch.join(SCRATCH_FILE), "2024-01-01 commit 1".to_string()),
                FsOp::Append(scratch.join(SCRATCH_FILE), "2024-01-01 commit 2".to_string()),
            ]
        );

        assert_eq!(percents(&events), vec![50, 100]);
        assert_eq!(
            stages(&events),
            vec![Stage::Preparing, Stage::Committing, Stage::Pushing, Stage::Succeeded]
        );
    }

    #[test]
    fn commits_in_date_order_regardless_of_file_order() {
        let git = ScriptedGit::default();
        let job = job(r#"{"2024-03-01": 1, "2023-12-25": 1, "2024-01-10": 1}"#);

        let (outcome, _) = run(&git, &FakeFs::default(), &job);
        assert!(outcome.success);

        let messages: Vec<_> = git
            .args()
            .into_iter()
            .filter(|a| a[0] == "commit")
            .map(|a| a[2].clone())
            .collect();
        assert_eq!(
            messages,
            vec![
                "Commit for 2023-12-25 #1",
                "Commit for 2024-01-10 #1",
                "Commit for 2024-03-01 #1",
            ]
        );
    }

    #[test]
    fn progress_is_monotonic_and_ends_at_100() {
        let job = job(r#"{"2024-01-01": 3, "2024-01-02": 4}"#);
        let (_, events) = run(&ScriptedGit::default(), &FakeFs::default(), &job);
        let p = percents(&events);
        assert_eq!(p.len(), 7);
        assert!(p.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(p.first(), Some(&14));
        assert_eq!(p.last(), Some(&100));
    }

    #[test]
    fn empty_pattern_still_pushes() {
        let git = ScriptedGit::default();
        let (outcome, events) = run(&git, &FakeFs::default(), &job("{}"));

        assert!(outcome.success);
        assert!(percents(&events).is_empty());
        let args = git.args();
        assert!(!args.iter().any(|a| a[0] == "commit" || a[0] == "add"));
        assert_eq!(args.last().unwrap(), &strings(&["push", "-u", "origin", "main", "--force"]));
    }

    #[test]
    fn existing_directory_is_replaced() {
        let fs = FakeFs {
            existing: true,
            ..FakeFs::default()
        };
        let (outcome, _) = run(&ScriptedGit::default(), &fs, &job("{}"));
        assert!(outcome.success);
        let scratch = PathBuf::from("/tmp/gpaint-scratch");
        assert_eq!(&fs.ops()[..2], &[FsOp::Remove(scratch.clone()), FsOp::Create(scratch)]);
    }

    #[test]
    fn locked_directory_stops_before_anything_is_created() {
        let git = ScriptedGit::default();
        let fs = FakeFs {
            existing: true,
            remove_error: Some(io::ErrorKind::PermissionDenied),
            ..FakeFs::default()
        };

        let (outcome, events) = run(&git, &fs, &job(r#"{"2024-01-01": 1}"#));

        assert!(!outcome.success);
        assert_eq!(outcome.kind, Some(FailureKind::DirectoryLocked));
        assert!(outcome.message.contains("/tmp/gpaint-scratch"));
        assert!(fs.ops().is_empty());
        assert!(git.args().is_empty());
        assert_eq!(stages(&events), vec![Stage::Preparing, Stage::Failed]);
    }

    #[test]
    fn other_removal_errors_are_unexpected() {
        let git = ScriptedGit::default();
        let fs = FakeFs {
            existing: true,
            remove_error: Some(io::ErrorKind::Other),
            ..FakeFs::default()
        };
        let (outcome, _) = run(&git, &fs, &job("{}"));
        assert_eq!(outcome.kind, Some(FailureKind::UnexpectedFailure));
        assert!(fs.ops().is_empty());
        assert!(git.args().is_empty());
    }

    #[test]
    fn rejected_push_forwards_remote_text() {
        let git = ScriptedGit::failing(&["push"], 128, "remote: Permission denied");
        let (outcome, events) = run(&git, &FakeFs::default(), &job(r#"{"2024-01-01": 1}"#));

        assert!(!outcome.success);
        assert_eq!(outcome.kind, Some(FailureKind::PushRejected));
        assert!(outcome.message.contains("remote: Permission denied"));
        assert_eq!(
            stages(&events),
            vec![Stage::Preparing, Stage::Committing, Stage::Pushing, Stage::Failed]
        );
    }

    #[test]
    fn failed_commit_aborts_without_pushing() {
        let git = ScriptedGit::failing(&["commit"], 1, "fatal: unable to write new index file");
        let (outcome, events) = run(&git, &FakeFs::default(), &job(r#"{"2024-01-01": 3}"#));

        assert_eq!(outcome.kind, Some(FailureKind::UnexpectedFailure));
        assert!(outcome.message.contains("unable to write new index file"));
        assert!(percents(&events).is_empty());
        assert!(!git.args().iter().any(|a| a[0] == "push"));
    }

    #[test]
    fn spawn_failure_is_unexpected() {
        let git = ScriptedGit {
            spawn_error: true,
            ..ScriptedGit::default()
        };
        let (outcome, _) = run(&git, &FakeFs::default(), &job("{}"));
        assert_eq!(outcome.kind, Some(FailureKind::UnexpectedFailure));
        assert!(outcome.message.contains("program not found"));
    }

    #[test]
    fn cancellation_stops_between_commits() {
        let git = ScriptedGit::default();
        let engine = Engine::new(git.clone(), FakeFs::default());
        let cancel = CancelToken::new();
        let job = job(r#"{"2024-01-01": 5}"#);

        let mut events = Vec::new();
        let outcome = engine.run(&job, &cancel, &mut |e| {
            if e == GenerationEvent::Progress(20) {
                cancel.cancel();
            }
            events.push(e);
        });

        assert_eq!(outcome.kind, Some(FailureKind::Cancelled));
        assert!(outcome.message.contains("1 of 5"));
        assert_eq!(percents(&events), vec![20]);
        assert_eq!(git.args().iter().filter(|a| a[0] == "commit").count(), 1);
        assert!(!git.args().iter().any(|a| a[0] == "push"));
    }

    #[test]
    fn cancelled_empty_run_does_not_push() {
        let git = ScriptedGit::default();
        let cancel = CancelToken::new();
        cancel.cancel();
        let (outcome, _) = run_with(&git, &FakeFs::default(), &job("{}"), &cancel);
        assert_eq!(outcome.kind, Some(FailureKind::Cancelled));
        assert!(!git.args().iter().any(|a| a[0] == "push"));
    }
}
