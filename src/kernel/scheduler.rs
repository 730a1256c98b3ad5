use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use super::collab::Address;
use super::entry::ExecutionEntryPoint;
use super::error::EvalError;

/// How a freshly created thread evaluates its closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThreadKind {
    /// Evaluate to weak head normal form.
    Generic,
    /// Run an IO action and force its result.
    StrictIo,
    /// Run an IO action, leaving the result lazy.
    LazyIo,
}

impl ThreadKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ThreadKind::Generic => "generic",
            ThreadKind::StrictIo => "strict IO",
            ThreadKind::LazyIo => "lazy IO",
        }
    }

    /// Scheduler command that creates a thread of this kind.
    pub fn command(&self) -> &'static str {
        match self {
            ThreadKind::Generic => "createGenThread",
            ThreadKind::StrictIo => "createStrictIOThread",
            ThreadKind::LazyIo => "createIOThread",
        }
    }
}

impl fmt::Display for ThreadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// The concurrency engine. Owns threads, their state machines and the run
/// loop; this layer only starts it and submits work.
pub trait Scheduler: Send + Sync {
    /// Activate the run loop. Called exactly once per runtime, after the
    /// entry point is fully built.
    fn run(&self, entry: &Arc<ExecutionEntryPoint>);

    /// Queue creation of a thread evaluating `closure`. Must not block.
    fn submit_create_thread(&self, kind: ThreadKind, closure: Address) -> Completion;
}

/// Eventual result of a submitted thread: the address of its return value.
#[derive(Debug)]
pub struct Completion {
    rx: oneshot::Receiver<Result<Address, EvalError>>,
}

/// Scheduler-side half of a [`Completion`].
#[derive(Debug)]
pub struct CompletionSender {
    tx: oneshot::Sender<Result<Address, EvalError>>,
}

impl Completion {
    pub fn channel() -> (CompletionSender, Completion) {
        let (tx, rx) = oneshot::channel();
        (CompletionSender { tx }, Completion { rx })
    }

    /// A completion that has already settled.
    pub fn ready(result: Result<Address, EvalError>) -> Self {
        let (tx, rx) = Self::channel();
        tx.complete(result);
        rx
    }

    pub async fn wait(self) -> Result<Address, EvalError> {
        self.rx.await.unwrap_or(Err(EvalError::SchedulerDropped))
    }

    /// Non-blocking poll. `None` while the thread is still running.
    pub fn try_result(&mut self) -> Option<Result<Address, EvalError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(EvalError::SchedulerDropped)),
        }
    }
}

impl CompletionSender {
    /// Settle the completion. A caller that stopped waiting is not an error.
    pub fn complete(self, result: Result<Address, EvalError>) {
        let _ = self.tx.send(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_carry_tags_and_commands() {
        assert_eq!(ThreadKind::Generic.tag(), "generic");
        assert_eq!(ThreadKind::StrictIo.to_string(), "strict IO");
        assert_eq!(ThreadKind::LazyIo.command(), "createIOThread");
    }

    #[tokio::test]
    async fn ready_completion_resolves() {
        assert_eq!(Completion::ready(Ok(42)).wait().await, Ok(42));
    }

    #[tokio::test]
    async fn dropped_sender_is_reported() {
        let (tx, rx) = Completion::channel();
        drop(tx);
        assert_eq!(rx.wait().await, Err(EvalError::SchedulerDropped));
    }

    #[test]
    fn try_result_polls_without_blocking() {
        let (tx, mut rx) = Completion::channel();
        assert_eq!(rx.try_result(), None);
        tx.complete(Err(EvalError::ThreadFailed("boom".to_string())));
        assert_eq!(rx.try_result(), Some(Err(EvalError::ThreadFailed("boom".to_string()))));
    }
}
