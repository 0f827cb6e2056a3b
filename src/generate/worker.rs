use super::engine::{CancelToken, Engine};
use super::fs::ScratchFs;
use crate::error::FailureKind;
use crate::git::GitRunner;
use crate::model::{CommitJob, GenerationEvent, Outcome};
use crossbeam_channel::{unbounded, Receiver};
use std::thread::{self, JoinHandle};

/// A generation run executing on its own thread.
///
/// Events arrive in order on `events`: stage changes and progress ticks, then
/// exactly one [`GenerationEvent::Finished`], after which the channel closes.
pub struct GenerationHandle {
    pub events: Receiver<GenerationEvent>,
    pub cancel: CancelToken,
    join: JoinHandle<()>,
}

impl GenerationHandle {
    /// Drains remaining events and returns the terminal outcome.
    pub fn wait(self) -> Outcome {
        let mut outcome = None;
        for event in self.events.iter() {
            if let GenerationEvent::Finished(o) = event {
                outcome = Some(o);
            }
        }
        // A panicking worker never sends `Finished`.
        let _ = self.join.join();
        outcome.unwrap_or_else(|| {
            Outcome::failed(
                FailureKind::UnexpectedFailure,
                "Generation worker stopped without reporting a result",
            )
        })
    }
}

/// Starts `job` on a background thread and returns immediately.
pub fn spawn<G, F>(engine: Engine<G, F>, job: CommitJob) -> std::io::Result<GenerationHandle>
where
    G: GitRunner + 'static,
    F: ScratchFs + 'static,
{
    let (tx, rx) = unbounded();
    let cancel = CancelToken::new();
    let worker_cancel = cancel.clone();

    let join = thread::Builder::new()
        .name("gpaint-generate".to_string())
        .spawn(move || {
            let outcome = engine.run(&job, &worker_cancel, &mut |event| {
                let _ = tx.send(event);
            });
            let _ = tx.send(GenerationEvent::Finished(outcome));
        })?;

    Ok(GenerationHandle {
        events: rx,
        cancel,
        join,
    })
}
